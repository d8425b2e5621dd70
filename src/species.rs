//! A species: an equivalence class of genomes under compatibility
//! distance. Holds indices into the population's organism pool rather than
//! owning organisms directly, plus an independently-owned representative
//! genome that survives across generations.

use crate::config::NeatConfig;
use crate::genome::innovation::{Counter, InnovationLog};
use crate::genome::Genome;
use crate::organism::Organism;
use crate::rng::Rng;

#[derive(Debug, Clone)]
pub struct Species {
    pub id: u64,
    pub representative: Genome,
    pub members: Vec<usize>,
    pub expected_offspring: usize,
}

impl Species {
    pub fn new(id: u64, representative: Genome, first_member: usize) -> Self {
        Species {
            id,
            representative,
            members: vec![first_member],
            expected_offspring: 0,
        }
    }

    pub fn rank_organisms(&mut self, organisms: &[Organism]) {
        self.members
            .sort_by(|&a, &b| organisms[b].fitness.partial_cmp(&organisms[a].fitness).unwrap());
    }

    pub fn best_fitness(&self, organisms: &[Organism]) -> f64 {
        organisms[self.members[0]].fitness
    }

    /// Fitness sharing: divides every member's raw fitness by species size.
    pub fn adjust_fitness(&self, organisms: &mut [Organism]) {
        let n = self.members.len() as f64;
        for &idx in &self.members {
            organisms[idx].adjusted_fitness = organisms[idx].fitness / n;
        }
    }

    /// Keeps only the top `floor(survival_threshold * |members|) + 1`
    /// members (already sorted by `rank_organisms`).
    pub fn eliminate_unfit(&mut self, cfg: &NeatConfig) {
        let num_parents = (cfg.survival_threshold * self.members.len() as f64).floor() as usize + 1;
        self.members.truncate(num_parents);
    }

    /// Sums `expected_offspring` across members, folding in `fractional_leftover`
    /// and spilling into one extra whole offspring when the combined fraction
    /// exceeds 1. Returns the new carry for the next species.
    pub fn calculate_expected_offspring(&mut self, organisms: &[Organism], fractional_leftover: f64) -> f64 {
        let mut total: f64 = self.members.iter().map(|&idx| organisms[idx].expected_offspring).sum();
        let fractional_part = total - total.floor();

        let mut leftover = fractional_leftover;
        if leftover + fractional_part > 1.0 {
            total += 1.0;
            leftover = leftover + fractional_part - 1.0;
        }

        self.expected_offspring = total.floor() as usize;
        leftover
    }

    /// Roulette-wheel parent selection weighted by raw fitness.
    pub fn choose_parent_proportionally(&self, organisms: &[Organism], total_fitness: f64, rng: &mut Rng) -> usize {
        let ball_land_point = rng.uniform(0.0, 1.0) * total_fitness;
        let mut idx = 0;
        let mut accumulated = organisms[self.members[0]].fitness;
        while accumulated < ball_land_point && idx + 1 < self.members.len() {
            idx += 1;
            accumulated += organisms[self.members[idx]].fitness;
        }
        self.members[idx]
    }

    /// Produces exactly `expected_offspring` child genomes, possibly
    /// crossing over with a champion from another species.
    #[allow(clippy::too_many_arguments)]
    pub fn reproduce(
        &self,
        organisms: &[Organism],
        all_species: &[Species],
        log: &mut InnovationLog,
        innovation_counter: &mut Counter,
        node_counter: &mut Counter,
        rng: &mut Rng,
        cfg: &NeatConfig,
    ) -> Vec<Genome> {
        let mut offspring = Vec::with_capacity(self.expected_offspring);
        let total_fitness: f64 = self.members.iter().map(|&idx| organisms[idx].fitness).sum();

        for i in 0..self.expected_offspring {
            if i == 0 && self.expected_offspring > cfg.elitism_min_species_size {
                offspring.push(organisms[self.members[0]].genome.clone());
                continue;
            }

            if self.members.len() == 1 || rng.gate(cfg.mutation_only_offspring) {
                let parent_idx = self.choose_parent_proportionally(organisms, total_fitness, rng);
                let mut child = organisms[parent_idx].genome.clone();
                child.mutate(log, innovation_counter, node_counter, rng, cfg);
                offspring.push(child);
                continue;
            }

            let first_idx = self.choose_parent_proportionally(organisms, total_fitness, rng);
            let second_idx = if all_species.len() > 1 && rng.gate(cfg.interspecies_mating_rate) {
                let mut found: Option<usize> = None;
                for _ in 0..cfg.interspecies_mating_attempts {
                    let candidate = &all_species[rng.range(0, all_species.len())];
                    if candidate.id != self.id {
                        found = candidate.members.first().copied();
                    }
                }
                found.unwrap_or_else(|| self.choose_parent_proportionally(organisms, total_fitness, rng))
            } else {
                self.choose_parent_proportionally(organisms, total_fitness, rng)
            };

            let first = &organisms[first_idx];
            let second = &organisms[second_idx];
            let mut child = Genome::from_crossover(&first.genome, first.fitness, &second.genome, second.fitness, rng);

            let parent_compat = first.genome.compatibility_distance(&second.genome, cfg);
            if rng.gate(cfg.mutation_after_crossover) || parent_compat == 0.0 {
                child.mutate(log, innovation_counter, node_counter, rng, cfg);
            }
            offspring.push(child);
        }

        offspring
    }
}
