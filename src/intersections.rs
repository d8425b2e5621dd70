//! Ray-segment, ray-rectangle and rectangle-rectangle intersection predicates.

use crate::geometry::{Ray, Rectangle, Vector2};

/// Finds the intersection point between a ray and a line segment, or `None`
/// if no such point exists.
///
/// Based on the standard parametric line-intersection formula. Divisions
/// are avoided unless a hit is confirmed: the signs and magnitudes of the
/// numerator/denominator pairs are checked first.
pub fn ray_segment_intersection(ray: &Ray, segment: (Vector2, Vector2)) -> Option<Vector2> {
    let x1 = ray.origin.x;
    let y1 = ray.origin.y;
    let ray_point = ray.origin + ray.direction;
    let x2 = ray_point.x;
    let y2 = ray_point.y;
    let (x3, y3) = (segment.0.x, segment.0.y);
    let (x4, y4) = (segment.1.x, segment.1.y);

    let t_num = (x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4);
    let t_den = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    let u_num = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3));
    let u_den = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);

    if u_den != 0.0
        && (u_num * u_den) >= 0.0
        && u_num.abs() <= u_den.abs()
        && t_den != 0.0
        && (t_num * t_den) >= 0.0
    {
        let u = u_num / u_den;
        Some(Vector2::new(x3 + u * (x4 - x3), y3 + u * (y4 - y3)))
    } else {
        None
    }
}

/// Finds the intersection between a ray and a rectangle: the intersection
/// point closest to the ray's origin, and its Euclidean distance, or
/// `(None, None)` if the ray misses every side.
pub fn ray_rect_intersection(ray: &Ray, rect: &Rectangle) -> (Option<Vector2>, Option<f64>) {
    let mut closest_point = None;
    let mut closest_sqr_distance = None;

    for i in 0..4 {
        let a = rect.verts[i];
        let b = rect.verts[(i + 1) % 4];

        if let Some(inter) = ray_segment_intersection(ray, (a, b)) {
            let sqr_distance = (inter - ray.origin).sqr_magnitude();
            if closest_sqr_distance.is_none() || closest_sqr_distance.unwrap() > sqr_distance {
                closest_point = Some(inter);
                closest_sqr_distance = Some(sqr_distance);
            }
        }
    }

    match (closest_point, closest_sqr_distance) {
        (Some(p), Some(sqr_d)) => (Some(p), Some(sqr_d.sqrt())),
        _ => (None, None),
    }
}

/// Determines whether rectangles `a` and `b` intersect, using the
/// Separating Axis Theorem specialised to quads: for each edge of a
/// rectangle, the opposite vertex of the owning rectangle fixes a
/// reference side; if every vertex of the other rectangle lies on the
/// opposite side, that edge separates them.
pub fn rect_rect_intersection(a: &Rectangle, b: &Rectangle) -> bool {
    !separating_edge_exists(a, b) && !separating_edge_exists(b, a)
}

fn separating_edge_exists(owner: &Rectangle, other: &Rectangle) -> bool {
    for i in 0..4 {
        let seg_a = owner.verts[i];
        let seg_b = owner.verts[(i + 1) % 4];
        let check_point = owner.verts[(i + 2) % 4];

        let check_side = point_side_of_line(check_point, seg_a, seg_b);

        let all_other_side = other
            .verts
            .iter()
            .all(|&v| point_side_of_line(v, seg_a, seg_b) != check_side);

        if all_other_side {
            return true;
        }
    }
    false
}

/// The sign of `(x-x1)(y2-y1) - (y-y1)(x2-x1)` for point `(x,y)` and line
/// `(line_a, line_b)`. Meaningless on its own; only useful compared against
/// another point's side.
fn point_side_of_line(point: Vector2, line_a: Vector2, line_b: Vector2) -> bool {
    let (x, y) = (point.x, point.y);
    let (x1, y1) = (line_a.x, line_a.y);
    let (x2, y2) = (line_b.x, line_b.y);
    ((x - x1) * (y2 - y1) - (y - y1) * (x2 - x1)) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(v0: (f64, f64), v1: (f64, f64), v2: (f64, f64), v3: (f64, f64)) -> Rectangle {
        Rectangle::new(v0.into(), v1.into(), v2.into(), v3.into())
    }

    #[test]
    fn ray_misses_rectangle_behind_it() {
        let ray = Ray::new(Vector2::zero(), Vector2::new(1.0, 0.0));
        let r = rect((10.0, 10.0), (20.0, 10.0), (20.0, 20.0), (10.0, 20.0));
        let (point, dist) = ray_rect_intersection(&ray, &r);
        assert!(point.is_none());
        assert!(dist.is_none());
    }

    #[test]
    fn ray_hits_rectangle_straddling_its_axis() {
        let ray = Ray::new(Vector2::zero(), Vector2::new(1.0, 0.0));
        let r = rect((10.0, -5.0), (20.0, -5.0), (20.0, 5.0), (10.0, 5.0));
        let (point, dist) = ray_rect_intersection(&ray, &r);
        let point = point.unwrap();
        assert!((point.x - 10.0).abs() < 1e-9);
        assert!((point.y - 0.0).abs() < 1e-9);
        assert!((dist.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn overlapping_rectangles_intersect() {
        let a = rect((0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0));
        let b = rect((1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0));
        assert!(rect_rect_intersection(&a, &b));
    }

    #[test]
    fn disjoint_rectangles_do_not_intersect() {
        let a = rect((0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0));
        let b = rect((3.0, 3.0), (5.0, 3.0), (5.0, 5.0), (3.0, 5.0));
        assert!(!rect_rect_intersection(&a, &b));
    }

    #[test]
    fn rect_rect_intersection_is_symmetric() {
        let a = rect((0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0));
        let b = rect((2.0, 1.0), (6.0, 1.0), (6.0, 4.0), (2.0, 4.0));
        assert_eq!(rect_rect_intersection(&a, &b), rect_rect_intersection(&b, &a));
    }

    #[test]
    fn parallel_ray_and_segment_never_divide() {
        let ray = Ray::new(Vector2::zero(), Vector2::new(1.0, 0.0));
        // Segment parallel to the ray: both denominators zero, no division attempted.
        let inter = ray_segment_intersection(&ray, (Vector2::new(0.0, 5.0), Vector2::new(10.0, 5.0)));
        assert!(inter.is_none());
    }
}
