//! NEAT neuroevolution and a deterministic 2D driving simulation used to
//! evaluate evolved controllers.
//!
//! The crate has two halves that meet only at the sensor/control
//! boundary: [`population`] grows genomes into [`network::NeuralNetwork`]
//! phenotypes, and [`simulation`] steps cars through a track, producing the
//! sensor vectors those phenotypes consume and the fitness scores that
//! drive the next [`Population::epoch`].

pub mod car;
pub mod config;
pub mod errors;
pub mod genome;
pub mod geometry;
pub mod intersections;
pub mod map;
pub mod network;
pub mod organism;
pub mod population;
pub mod rng;
pub mod simulation;
pub mod species;

pub use config::{NeatConfig, SimConfig, WeightInitRange};
pub use errors::{EvoError, EvoResult};
pub use genome::{ConnectionGene, Genome, MutationKind};
pub use geometry::{Ray, Rectangle, Vector2};
pub use map::{FixedMap, MapSource};
pub use network::{NeuralConnection, NeuralNetwork};
pub use organism::Organism;
pub use population::Population;
pub use simulation::{Controls, SensorInfo, Simulation};
pub use species::Species;
