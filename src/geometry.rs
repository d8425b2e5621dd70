//! 2D geometry primitives: vectors, rays, and oriented rectangles.
//!
//! Strictly functional, no I/O. Angles are in radians throughout.

use serde::{Deserialize, Serialize};

/// A 2D cartesian vector (or point, depending on context).
///
/// `unit_from_angle` uses screen-space convention: `(cos θ, -sin θ)`. The
/// negated sine must be preserved everywhere angles feed into a direction,
/// since car heading and sensor-ray offsets are defined in this same space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    pub fn zero() -> Self {
        Vector2 { x: 0.0, y: 0.0 }
    }

    pub fn sqr_magnitude(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Slow path (uses `sqrt`); prefer `sqr_magnitude` for comparisons.
    pub fn magnitude(&self) -> f64 {
        self.sqr_magnitude().sqrt()
    }

    pub fn normalized(&self) -> Vector2 {
        *self / self.magnitude()
    }

    /// The angle `θ` such that `Vector2::unit_from_angle(θ) * self.magnitude() == self`,
    /// i.e. the angle consistent with the screen-space convention used by
    /// `unit_from_angle` (note this is `atan2(-y, x)`, not `atan2(y, x)`).
    pub fn angle(&self) -> f64 {
        (-self.y).atan2(self.x)
    }

    /// Returns a new vector with the same magnitude, rotated by `angle_off`
    /// in the same screen-space sense as `unit_from_angle`: rotating
    /// `unit_from_angle(a)` by `b` yields `unit_from_angle(a + b)`.
    pub fn rotated(&self, angle_off: f64) -> Vector2 {
        let (s, c) = angle_off.sin_cos();
        Vector2::new(self.x * c + self.y * s, self.y * c - self.x * s)
    }

    /// Constructs a unit vector with the given angle, in screen-space
    /// convention: `(cos θ, -sin θ)`.
    pub fn unit_from_angle(angle: f64) -> Vector2 {
        Vector2::new(angle.cos(), -angle.sin())
    }

    pub fn dot(&self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from(t: (f64, f64)) -> Self {
        Vector2::new(t.0, t.1)
    }
}

impl std::ops::Add for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Mul<Vector2> for f64 {
    type Output = Vector2;
    fn mul(self, rhs: Vector2) -> Vector2 {
        rhs * self
    }
}

impl std::ops::Div<f64> for Vector2 {
    type Output = Vector2;
    fn div(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}

impl std::ops::Neg for Vector2 {
    type Output = Vector2;
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

/// An origin and a unit-length direction. Construction normalizes the
/// direction if it is not already unit-length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vector2,
    pub direction: Vector2,
}

impl Ray {
    pub fn new(origin: Vector2, direction: Vector2) -> Self {
        let direction = if (direction.sqr_magnitude() - 1.0).abs() > 1e-12 {
            direction.normalized()
        } else {
            direction
        };
        Ray { origin, direction }
    }
}

/// An oriented convex quad: four ordered vertices, plus a precomputed
/// pruning radius used by the raycast broad phase. Does not check
/// convexity; callers only ever produce axis-aligned or 45-degree-rotated
/// quads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub verts: [Vector2; 4],
    /// `max(|v0-v1|, |v1-v3|) / 2)^2` — a conservative bounding radius used
    /// to prune walls out of raycast broad-phase checks.
    pub sqr_half_side: f64,
}

impl Rectangle {
    pub fn new(v0: Vector2, v1: Vector2, v2: Vector2, v3: Vector2) -> Self {
        let side_a = (v0 - v1).magnitude();
        let side_b = (v1 - v3).magnitude();
        let half_side = (side_a / 2.0).max(side_b / 2.0);
        Rectangle {
            verts: [v0, v1, v2, v3],
            sqr_half_side: half_side * half_side,
        }
    }
}
