//! Ties cars, walls and checkpoints together into one tick loop: physics
//! integration, wall collision, checkpoint progress, sensor raycasting and
//! fitness scoring.

use crate::car::Car;
use crate::config::SimConfig;
use crate::geometry::{Ray, Rectangle, Vector2};
use crate::intersections::{rect_rect_intersection, ray_rect_intersection};

/// Per-car driver input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// `[normalized_velocity, r0, r1, r2]`: velocity in `[-1, 1]`, each ray
/// distance in `[0, 1]` (1.0 meaning no hit within range).
pub type SensorInfo = [f64; 4];

pub struct Simulation {
    cars: Vec<Car>,
    dead: Vec<bool>,
    last_reached: Vec<usize>,
    walls: Vec<Rectangle>,
    checkpoints: Vec<Vector2>,
    tracked_car: usize,
    camera_position: Vector2,
    cfg: SimConfig,
}

impl Simulation {
    /// Places `num_cars` cars at `start_pos` with heading 0, all alive, all
    /// at checkpoint 0; tracks car 0.
    pub fn new(num_cars: usize, start_pos: Vector2, walls: Vec<Rectangle>, checkpoints: Vec<Vector2>, cfg: SimConfig) -> Self {
        assert!(num_cars > 0, "simulation must have at least one car");
        assert!(!checkpoints.is_empty(), "checkpoint list must not be empty");

        Simulation {
            cars: vec![Car::new(start_pos); num_cars],
            dead: vec![false; num_cars],
            last_reached: vec![0; num_cars],
            walls,
            checkpoints,
            tracked_car: 0,
            camera_position: start_pos,
            cfg,
        }
    }

    pub fn track_car(&mut self, index: usize) {
        self.tracked_car = index;
    }

    pub fn all_dead(&self) -> bool {
        self.dead.iter().all(|&d| d)
    }

    pub fn camera_position(&self) -> Vector2 {
        self.camera_position
    }

    /// Advances every still-alive car by `dt` seconds under `controls`,
    /// updates checkpoint progress and collisions, then returns a sensor
    /// vector per car (including dead ones, whose values are unused but
    /// harmless).
    #[tracing::instrument(skip(self, controls))]
    pub fn update(&mut self, dt: f64, controls: &[Controls]) -> Vec<SensorInfo> {
        assert_eq!(controls.len(), self.cars.len());

        let mut new_deaths = 0;

        for i in 0..self.cars.len() {
            if self.dead[i] {
                continue;
            }

            let mut acceleration = 0.0;
            if controls[i].forward {
                acceleration += self.cfg.car_acceleration;
            }
            if controls[i].backward {
                acceleration -= self.cfg.car_acceleration;
            }
            if controls[i].left {
                self.cars[i].direction += self.cfg.car_rotation_speed;
            }
            if controls[i].right {
                self.cars[i].direction -= self.cfg.car_rotation_speed;
            }

            self.cars[i].set_move_acceleration(acceleration, &self.cfg);
            self.cars[i].physics_update(dt, &self.cfg);

            let car_box = self.cars[i].bounding_box(&self.cfg);
            let collided = self.walls.iter().any(|wall| rect_rect_intersection(wall, &car_box));
            if collided {
                self.dead[i] = true;
                new_deaths += 1;
                continue;
            }

            let next_idx = (self.last_reached[i] + 1) % self.checkpoints.len();
            let next_checkpoint = self.checkpoints[next_idx];
            let sqr_dist = (self.cars[i].position - next_checkpoint).sqr_magnitude();
            if sqr_dist < self.cfg.checkpoint_sqr_radius() {
                self.last_reached[i] = next_idx;
            }
        }

        self.camera_position = self.cars[self.tracked_car].position;

        if new_deaths > 0 {
            tracing::trace!(new_deaths, alive = self.dead.iter().filter(|&&d| !d).count(), "tick completed");
        }

        self.compute_sensor_info()
    }

    fn compute_sensor_info(&self) -> Vec<SensorInfo> {
        self.cars
            .iter()
            .map(|car| {
                let rays = car.sight_rays(&self.cfg);
                let mut info = [car.velocity / self.cfg.max_velocity, 1.0, 1.0, 1.0];
                for (k, ray) in rays.iter().enumerate() {
                    let (_, dist) = self.raycast_against_walls(ray, self.cfg.max_ray_length);
                    if let Some(d) = dist {
                        if d <= self.cfg.max_ray_length {
                            info[k + 1] = d / self.cfg.max_ray_length;
                        }
                    }
                }
                info
            })
            .collect()
    }

    /// Prunes walls whose closest-vertex lower bound exceeds `max_len`,
    /// then returns the closest hit among the remaining candidates.
    /// `max_len = 0.0` disables pruning.
    pub fn raycast_against_walls(&self, ray: &Ray, max_len: f64) -> (Option<Vector2>, Option<f64>) {
        let max_sqr_len = max_len * max_len;

        let mut closest_point = None;
        let mut closest_dist = None;

        for wall in &self.walls {
            if max_len != 0.0 {
                let lower_bound = wall
                    .verts
                    .iter()
                    .map(|&v| (v - ray.origin).sqr_magnitude() - wall.sqr_half_side)
                    .fold(f64::INFINITY, f64::min);
                if lower_bound >= max_sqr_len {
                    continue;
                }
            }

            let (point, dist) = ray_rect_intersection(ray, wall);
            if let (Some(p), Some(d)) = (point, dist) {
                if closest_dist.is_none() || d < closest_dist.unwrap() {
                    closest_point = Some(p);
                    closest_dist = Some(d);
                }
            }
        }

        (closest_point, closest_dist)
    }

    /// Per-car fitness: distance travelled along the checkpoint chain,
    /// scaled down by `fitness_scale` to keep scores in a small range.
    pub fn get_cars_fitness(&self) -> Vec<f64> {
        let n = self.checkpoints.len();
        let mut checkpoint_acc = vec![0.0; n];
        for i in 1..n {
            checkpoint_acc[i] = checkpoint_acc[i - 1] + (self.checkpoints[i] - self.checkpoints[i - 1]).magnitude();
        }

        self.cars
            .iter()
            .enumerate()
            .map(|(i, car)| {
                let k = self.last_reached[i];
                let prev = self.checkpoints[(k + n - 1) % n];
                let d_prev = (car.position - prev).magnitude();
                let l = (self.checkpoints[k] - prev).magnitude();

                let raw = if d_prev < l {
                    if k == 0 {
                        0.0
                    } else {
                        checkpoint_acc[(k + n - 1) % n] + d_prev
                    }
                } else {
                    checkpoint_acc[k] + (car.position - self.checkpoints[k]).magnitude()
                };

                raw * self.cfg.fitness_scale
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_track() -> (Vector2, Vec<Rectangle>, Vec<Vector2>) {
        let start = Vector2::zero();
        let checkpoints = vec![start, Vector2::new(500.0, 0.0), Vector2::new(1000.0, 0.0)];
        (start, vec![], checkpoints)
    }

    #[test]
    fn car_progresses_through_checkpoints_when_driving_forward() {
        let (start, walls, checkpoints) = straight_track();
        let cfg = SimConfig::default();
        let mut sim = Simulation::new(1, start, walls, checkpoints, cfg);

        let controls = [Controls { forward: true, ..Default::default() }];
        for _ in 0..400 {
            sim.update(0.1, &controls);
        }
        assert!(!sim.all_dead());
        let fitness = sim.get_cars_fitness();
        assert!(fitness[0] > 0.0);
    }

    #[test]
    fn collision_kills_the_car_permanently() {
        let start = Vector2::zero();
        let wall = Rectangle::new(
            Vector2::new(50.0, -50.0),
            Vector2::new(150.0, -50.0),
            Vector2::new(150.0, 50.0),
            Vector2::new(50.0, 50.0),
        );
        let checkpoints = vec![start, Vector2::new(500.0, 0.0)];
        let cfg = SimConfig::default();
        let mut sim = Simulation::new(1, start, vec![wall], checkpoints, cfg);

        let controls = [Controls { forward: true, ..Default::default() }];
        for _ in 0..100 {
            sim.update(0.1, &controls);
        }
        assert!(sim.all_dead());

        let position_before = sim.cars[0].position;
        sim.update(0.1, &controls);
        assert_eq!(sim.cars[0].position, position_before);
    }

    #[test]
    fn raycast_against_walls_never_exceeds_max_len() {
        let start = Vector2::zero();
        let wall = Rectangle::new(
            Vector2::new(10.0, -10.0),
            Vector2::new(20.0, -10.0),
            Vector2::new(20.0, 10.0),
            Vector2::new(10.0, 10.0),
        );
        let checkpoints = vec![start, Vector2::new(500.0, 0.0)];
        let cfg = SimConfig::default();
        let sim = Simulation::new(1, start, vec![wall], checkpoints, cfg);

        let ray = Ray::new(start, Vector2::new(1.0, 0.0));
        let (_, dist) = sim.raycast_against_walls(&ray, 220.0);
        assert!(dist.unwrap() <= 220.0);
    }

    #[test]
    fn sensor_info_reports_full_range_ray_as_one() {
        let (start, walls, checkpoints) = straight_track();
        let cfg = SimConfig::default();
        let mut sim = Simulation::new(1, start, walls, checkpoints, cfg);
        let controls = [Controls::default()];
        let info = sim.update(0.1, &controls);
        assert_eq!(info[0][1], 1.0);
        assert_eq!(info[0][2], 1.0);
        assert_eq!(info[0][3], 1.0);
    }

    #[test]
    #[should_panic]
    fn new_rejects_empty_checkpoints() {
        let cfg = SimConfig::default();
        Simulation::new(1, Vector2::zero(), vec![], vec![], cfg);
    }
}
