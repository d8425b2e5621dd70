//! The top-level NEAT driver: owns the organism pool, the species list, and
//! the three monotonic id counters shared across a run.

use crate::config::NeatConfig;
use crate::genome::innovation::{Counter, InnovationLog};
use crate::genome::Genome;
use crate::network::NeuralNetwork;
use crate::organism::Organism;
use crate::rng::Rng;
use crate::species::Species;

pub struct Population {
    pub population_size: usize,
    pub organisms: Vec<Organism>,
    pub species: Vec<Species>,
    innovation_counter: Counter,
    node_counter: Counter,
    species_counter: Counter,
    neat_cfg: NeatConfig,
    rng: Rng,
}

impl Population {
    pub fn new(size: usize, num_inputs: usize, num_outputs: usize, seed: u64, cfg: NeatConfig) -> Self {
        assert!(size > 0, "population size must be non-zero");
        let mut rng = Rng::seed_from_u64(seed);

        let organisms: Vec<Organism> = (0..size)
            .map(|_| Organism::new(Genome::new_initial(num_inputs, num_outputs, &mut rng, &cfg)))
            .collect();

        Population {
            population_size: size,
            organisms,
            species: Vec::new(),
            innovation_counter: Counter::starting_at(num_outputs as u64),
            node_counter: Counter::starting_at((num_inputs + 1 + num_outputs) as u64),
            species_counter: Counter::starting_at(0),
            neat_cfg: cfg,
            rng,
        }
    }

    /// Compiles every organism's genome into a phenotype, indexed the same
    /// way as `organisms`.
    pub fn build_phenotypes(&self) -> Vec<NeuralNetwork> {
        self.organisms.iter().map(|o| o.genome.build_network()).collect()
    }

    pub fn record_fitness(&mut self, index: usize, value: f64) {
        self.organisms[index].fitness = value;
    }

    /// Assigns every organism to the first species whose representative is
    /// within `speciation_threshold`, creating a new species when none
    /// matches. Species order is significant: it is first-fit, so species
    /// are never sorted before speciating.
    #[tracing::instrument(skip(self))]
    pub fn speciate(&mut self) {
        for species in &mut self.species {
            species.members.clear();
        }

        for idx in 0..self.organisms.len() {
            let mut found = None;
            for (s_idx, species) in self.species.iter().enumerate() {
                let dist = self.organisms[idx]
                    .genome
                    .compatibility_distance(&species.representative, &self.neat_cfg);
                if dist < self.neat_cfg.speciation_threshold {
                    found = Some(s_idx);
                    break;
                }
            }

            match found {
                Some(s_idx) => {
                    self.species[s_idx].members.push(idx);
                    self.organisms[idx].species = Some(s_idx);
                }
                None => {
                    let id = self.species_counter.next();
                    tracing::debug!(species_id = id, "new species created");
                    self.organisms[idx].species = Some(self.species.len());
                    self.species.push(Species::new(id, self.organisms[idx].genome.clone(), idx));
                }
            }
        }

        let before = self.species.len();
        self.species.retain(|s| !s.members.is_empty());
        let extinct = before - self.species.len();
        if extinct > 0 {
            tracing::debug!(extinct, "species went extinct this generation");
        }
    }

    /// Runs one full NEAT generation: speciate, rank, adjust fitness,
    /// allocate offspring counts, reproduce, and replace the organism pool.
    #[tracing::instrument(skip(self))]
    pub fn epoch(&mut self) {
        self.speciate();

        for species in &mut self.species {
            species.rank_organisms(&self.organisms);
        }
        self.species.sort_by(|a, b| {
            b.best_fitness(&self.organisms)
                .partial_cmp(&a.best_fitness(&self.organisms))
                .unwrap()
        });

        for species in &self.species {
            species.adjust_fitness(&mut self.organisms);
        }

        let average_fitness: f64 =
            self.organisms.iter().map(|o| o.adjusted_fitness).sum::<f64>() / self.population_size as f64;
        for organism in &mut self.organisms {
            organism.expected_offspring = organism.adjusted_fitness / average_fitness;
        }

        let mut total_expected_offspring = 0usize;
        let mut fractional_leftover = 0.0;
        for species in &mut self.species {
            fractional_leftover = species.calculate_expected_offspring(&self.organisms, fractional_leftover);
            total_expected_offspring += species.expected_offspring;
        }

        self.species.retain(|s| s.expected_offspring > 0);

        if total_expected_offspring < self.population_size {
            let mut best_idx = 0;
            let mut max_expected = 0;
            for (idx, species) in self.species.iter().enumerate() {
                if species.expected_offspring > max_expected {
                    max_expected = species.expected_offspring;
                    best_idx = idx;
                }
            }
            if !self.species.is_empty() {
                self.species[best_idx].expected_offspring += self.population_size - total_expected_offspring;
            }
        }

        let mut log = InnovationLog::new();
        let mut new_generation: Vec<Genome> = Vec::with_capacity(self.population_size);
        let species_snapshot = self.species.clone();
        for species in &mut self.species {
            species.eliminate_unfit(&self.neat_cfg);
            let children = species.reproduce(
                &self.organisms,
                &species_snapshot,
                &mut log,
                &mut self.innovation_counter,
                &mut self.node_counter,
                &mut self.rng,
                &self.neat_cfg,
            );
            new_generation.extend(children);
        }

        self.organisms = new_generation.into_iter().map(Organism::new).collect();
        tracing::info!(
            generation_size = self.organisms.len(),
            species_count = self.species.len(),
            "epoch complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_population_has_requested_size() {
        let pop = Population::new(20, 4, 2, 1, NeatConfig::default());
        assert_eq!(pop.organisms.len(), 20);
    }

    #[test]
    fn epoch_preserves_population_size() {
        let mut pop = Population::new(30, 3, 2, 2, NeatConfig::default());
        for i in 0..pop.organisms.len() {
            pop.record_fitness(i, (i as f64) * 0.1);
        }
        pop.epoch();
        assert_eq!(pop.organisms.len(), pop.population_size);
    }

    #[test]
    fn epoch_tags_every_organism_with_a_valid_species() {
        let mut pop = Population::new(25, 3, 2, 3, NeatConfig::default());
        for i in 0..pop.organisms.len() {
            pop.record_fitness(i, 1.0);
        }
        pop.epoch();
        pop.speciate();
        for organism in &pop.organisms {
            let s_idx = organism.species.expect("organism must be speciated");
            assert!(pop.species[s_idx].members.iter().any(|&m| std::ptr::eq(&pop.organisms[m], organism)));
        }
    }

    #[test]
    fn build_phenotypes_matches_organism_count() {
        let pop = Population::new(10, 4, 2, 4, NeatConfig::default());
        let nets = pop.build_phenotypes();
        assert_eq!(nets.len(), 10);
        for net in &nets {
            assert_eq!(net.num_outputs, 2);
        }
    }
}
