//! The typed boundary a map/track generator must satisfy. Decoding an
//! actual track image is out of scope for this crate; this module exists
//! so a decoder (or a test fixture) has a concrete contract to implement.

use crate::errors::{EvoError, EvoResult};
use crate::geometry::{Rectangle, Vector2};

/// Produces a starting position, a wall list, and an ordered checkpoint
/// list. The first checkpoint must coincide with the starting position.
pub trait MapSource {
    fn generate(&self) -> EvoResult<(Vector2, Vec<Rectangle>, Vec<Vector2>)>;
}

/// A hand-built fixture: returns exactly the data it was constructed with.
/// Used by tests and by any driver that already has a decoded track.
#[derive(Debug, Clone)]
pub struct FixedMap {
    pub start_pos: Vector2,
    pub walls: Vec<Rectangle>,
    pub checkpoints: Vec<Vector2>,
}

impl MapSource for FixedMap {
    fn generate(&self) -> EvoResult<(Vector2, Vec<Rectangle>, Vec<Vector2>)> {
        if self.checkpoints.is_empty() {
            return Err(EvoError::InvalidMap("checkpoint list must not be empty".into()));
        }
        if self.checkpoints[0] != self.start_pos {
            return Err(EvoError::InvalidMap("first checkpoint must equal the start position".into()));
        }
        Ok((self.start_pos, self.walls.clone(), self.checkpoints.clone()))
    }
}
