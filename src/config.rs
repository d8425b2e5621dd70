//! Tunable parameters for the simulation and the NEAT engine.
//!
//! Every numeric constant that affects observable behaviour lives here
//! rather than as a bare module constant, so a driver can load a config
//! from JSON (or any other `serde` format) to run tuning sweeps without
//! recompiling. `Default` reproduces the reference values.

use serde::{Deserialize, Serialize};

use crate::errors::{EvoError, EvoResult};

/// Car physics, sensor geometry, and map-grid constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub max_velocity: f64,
    pub friction_accel: f64,
    pub car_acceleration: f64,
    pub car_rotation_speed: f64,
    pub max_ray_length: f64,
    /// Half-spread of the two outer sensor rays, in radians (25 degrees).
    pub ray_angle: f64,
    pub car_box_width: f64,
    pub car_box_height: f64,
    pub sigmoid_steepness: f64,
    pub grid_size: f64,
    pub wall_insert: f64,
    pub fitness_scale: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            max_velocity: 500.0,
            friction_accel: 200.0,
            car_acceleration: 300.0,
            car_rotation_speed: 0.07,
            max_ray_length: 220.0,
            ray_angle: 25.0_f64.to_radians(),
            car_box_width: 141.0,
            car_box_height: 65.0,
            sigmoid_steepness: 4.9,
            grid_size: 200.0,
            wall_insert: 0.3,
            fitness_scale: 0.01,
        }
    }
}

impl SimConfig {
    /// The squared distance within which a car is considered to have reached
    /// the next checkpoint: `(grid_size * (1 + wall_insert))^2`.
    pub fn checkpoint_sqr_radius(&self) -> f64 {
        let r = self.grid_size * (1.0 + self.wall_insert);
        r * r
    }

    /// Loads a config from a JSON document, e.g. one supplied by a driver
    /// running a tuning sweep. Malformed JSON surfaces as
    /// `EvoError::Serialization`; a structurally valid but nonsensical config
    /// (a non-positive `max_velocity`) surfaces as `EvoError::Config`.
    pub fn from_json(s: &str) -> EvoResult<Self> {
        let cfg: SimConfig = serde_json::from_str(s)?;
        if cfg.max_velocity <= 0.0 {
            return Err(EvoError::Config("max_velocity must be positive".into()));
        }
        Ok(cfg)
    }
}

/// The distribution used to draw a fresh connection weight: both the initial
/// bias-to-output genes of a new genome and any weight drawn during mutation
/// use the same distribution. Resolves Open Question 1 (the source left this
/// ambiguous between `(-1, 1]` and `[0, 1)` in different code paths).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WeightInitRange {
    /// Sample uniformly in `(-1, 1]` via `2r - 1`.
    SignedUnit,
    /// Sample uniformly in `[0, 1)`.
    UnitInterval,
}

/// NEAT parameter surface: mutation probabilities, speciation thresholds,
/// and reproduction policy knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NeatConfig {
    pub node_mutation_chance: f64,
    pub link_mutation_chance: f64,
    pub weight_mutation_chance: f64,
    pub weight_randomized_chance: f64,
    pub weight_perturb_std_dev: f64,
    pub speciation_threshold: f64,
    pub survival_threshold: f64,
    pub mutation_only_offspring: f64,
    pub mutation_after_crossover: f64,
    pub interspecies_mating_rate: f64,
    pub compat_c1: f64,
    pub compat_c2: f64,
    pub compat_c3: f64,
    pub weight_init_range: WeightInitRange,
    /// Number of random proposals tried before giving up on a link mutation.
    pub link_mutation_attempts: u32,
    /// Number of random species draws tried before falling back to intra-species mating.
    pub interspecies_mating_attempts: u32,
    /// Member count above which a species' champion is cloned verbatim into
    /// the next generation (elitism).
    pub elitism_min_species_size: usize,
}

impl NeatConfig {
    /// Loads a config from a JSON document. Malformed JSON surfaces as
    /// `EvoError::Serialization`; out-of-range probabilities (outside
    /// `[0, 1]`) surface as `EvoError::Config` rather than silently
    /// producing a genome that never mutates or always does.
    pub fn from_json(s: &str) -> EvoResult<Self> {
        let cfg: NeatConfig = serde_json::from_str(s)?;
        let probabilities = [
            cfg.node_mutation_chance,
            cfg.link_mutation_chance,
            cfg.weight_mutation_chance,
            cfg.weight_randomized_chance,
            cfg.survival_threshold,
            cfg.mutation_only_offspring,
            cfg.mutation_after_crossover,
            cfg.interspecies_mating_rate,
        ];
        if probabilities.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(EvoError::Config("probabilities must lie within [0, 1]".into()));
        }
        Ok(cfg)
    }
}

impl Default for NeatConfig {
    fn default() -> Self {
        NeatConfig {
            node_mutation_chance: 0.03,
            link_mutation_chance: 0.05,
            weight_mutation_chance: 0.8,
            weight_randomized_chance: 0.1,
            weight_perturb_std_dev: 0.3,
            speciation_threshold: 3.0,
            survival_threshold: 0.2,
            mutation_only_offspring: 0.25,
            mutation_after_crossover: 0.25,
            interspecies_mating_rate: 0.001,
            compat_c1: 1.0,
            compat_c2: 1.0,
            compat_c3: 0.4,
            weight_init_range: WeightInitRange::SignedUnit,
            link_mutation_attempts: 50,
            interspecies_mating_attempts: 6,
            elitism_min_species_size: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_config_round_trips_through_json() {
        let cfg = SimConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back = SimConfig::from_json(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn sim_config_from_json_rejects_malformed_input() {
        let err = SimConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, EvoError::Serialization(_)));
    }

    #[test]
    fn sim_config_from_json_rejects_non_positive_max_velocity() {
        let err = SimConfig::from_json(r#"{"max_velocity": 0.0}"#).unwrap_err();
        assert!(matches!(err, EvoError::Config(_)));
    }

    #[test]
    fn checkpoint_radius_matches_reference_constant() {
        let cfg = SimConfig::default();
        assert!((cfg.checkpoint_sqr_radius() - 67_600.0).abs() < 1e-6);
    }

    #[test]
    fn neat_config_round_trips_through_json() {
        let cfg = NeatConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back = NeatConfig::from_json(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn neat_config_from_json_rejects_malformed_input() {
        let err = NeatConfig::from_json("not json at all").unwrap_err();
        assert!(matches!(err, EvoError::Serialization(_)));
    }

    #[test]
    fn neat_config_from_json_rejects_out_of_range_probability() {
        let err = NeatConfig::from_json(r#"{"node_mutation_chance": 1.5}"#).unwrap_err();
        assert!(matches!(err, EvoError::Config(_)));
    }
}
