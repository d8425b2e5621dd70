//! Car kinematics: position/direction/velocity integration, sensor rays, and
//! the rotated bounding box used for collision checks.

use crate::config::SimConfig;
use crate::geometry::{Ray, Rectangle, Vector2};

/// A car's kinematic state. Heading is in radians; velocity and
/// acceleration are signed scalars along the heading direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Car {
    pub position: Vector2,
    pub direction: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl Car {
    pub fn new(position: Vector2) -> Self {
        Car {
            position,
            direction: 0.0,
            velocity: 0.0,
            acceleration: 0.0,
        }
    }

    /// Integrates position and velocity by `dt` seconds, then clamps
    /// `|velocity|` to `cfg.max_velocity` and snaps sub-threshold drift to
    /// zero.
    pub fn physics_update(&mut self, dt: f64, cfg: &SimConfig) {
        self.position = self.position + dt * self.velocity * Vector2::unit_from_angle(self.direction);
        self.velocity += dt * self.acceleration;

        if self.velocity.abs() < 0.9 {
            self.velocity = 0.0;
        }

        if self.velocity.abs() > cfg.max_velocity {
            self.velocity = self.velocity.signum() * cfg.max_velocity;
        }
    }

    /// Stores `acceleration` as the car's requested acceleration for the
    /// next `physics_update`, then applies friction opposing the current
    /// velocity, clamped so friction never overshoots the velocity itself.
    pub fn set_move_acceleration(&mut self, acceleration: f64, cfg: &SimConfig) {
        self.acceleration = acceleration;

        if self.velocity.abs() > 0.0 {
            let friction_magnitude = self.velocity.abs().min(cfg.friction_accel);
            self.acceleration -= friction_magnitude.copysign(self.velocity);
        }
    }

    /// Three sensor rays sharing the car's position, offset from heading by
    /// `{-ray_angle, 0, +ray_angle}`.
    pub fn sight_rays(&self, cfg: &SimConfig) -> [Ray; 3] {
        [
            Ray::new(self.position, Vector2::unit_from_angle(self.direction - cfg.ray_angle)),
            Ray::new(self.position, Vector2::unit_from_angle(self.direction)),
            Ray::new(self.position, Vector2::unit_from_angle(self.direction + cfg.ray_angle)),
        ]
    }

    /// The car's rotated bounding box, a `car_box_width x car_box_height`
    /// rectangle centred at `position`. Expensive (four rotations);
    /// callers should cache the result within a tick.
    pub fn bounding_box(&self, cfg: &SimConfig) -> Rectangle {
        let half_width = cfg.car_box_width / 2.0;
        let half_height = cfg.car_box_height / 2.0;
        let corner = |x: f64, y: f64| Vector2::new(x, y).rotated(self.direction) + self.position;
        Rectangle::new(
            corner(half_width, half_height),
            corner(half_width, -half_height),
            corner(-half_width, -half_height),
            corner(-half_width, half_height),
        )
    }

    /// `|velocity| / max_velocity`, in `[0, 1]`.
    pub fn normalized_speed(&self, cfg: &SimConfig) -> f64 {
        self.velocity.abs() / cfg.max_velocity
    }
}
