//! Genomes: the genotype NEAT mutates and recombines. A genome is a flat,
//! append-only table of connection genes plus an auxiliary index from
//! output node to incoming gene, rebuilt whenever the gene list changes
//! structurally.

pub mod innovation;

use std::collections::HashMap;

use crate::config::NeatConfig;
use crate::network::{NeuralConnection, NeuralNetwork};
use crate::rng::Rng;
use innovation::{Counter, InnovationLog};

/// One structural gene: a weighted edge between two (global) node ids,
/// tagged with the innovation number that historically marks it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionGene {
    pub in_node: u64,
    pub out_node: u64,
    pub weight: f64,
    pub innovation_num: u64,
    pub disabled: bool,
}

/// Which mutation branch fired during a `mutate` call, surfaced so callers
/// can log it without re-deriving the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    NodeSplit,
    NewLink,
    WeightPerturb,
    None,
}

/// A genome: node-id list plus the connection-gene table. Node ids
/// `[0, num_inputs)` are inputs, `num_inputs` is bias, `[num_inputs+1,
/// num_inputs+1+num_outputs)` are outputs — these are fixed and known to
/// every genome in a population. Ids beyond that are hidden nodes, unique
/// across the whole population, appended in the order they were created.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub nodes: Vec<u64>,
    pub connections: Vec<ConnectionGene>,
    connections_by_out: HashMap<u64, Vec<usize>>,
}

impl Genome {
    /// A fresh genome with only bias-to-output connections, one per
    /// output, given innovation numbers `0..num_outputs`.
    pub fn new_initial(num_inputs: usize, num_outputs: usize, rng: &mut Rng, cfg: &NeatConfig) -> Self {
        let bias_id = num_inputs as u64;
        let nodes: Vec<u64> = (0..(num_inputs + 1 + num_outputs) as u64).collect();

        let mut connections = Vec::with_capacity(num_outputs);
        for i in 0..num_outputs {
            let out_node = (num_inputs + 1 + i) as u64;
            connections.push(ConnectionGene {
                in_node: bias_id,
                out_node,
                weight: rng.sample_weight(cfg.weight_init_range),
                innovation_num: i as u64,
                disabled: false,
            });
        }

        let mut genome = Genome {
            num_inputs,
            num_outputs,
            nodes,
            connections,
            connections_by_out: HashMap::new(),
        };
        genome.rebuild_connections_by_out();
        genome
    }

    fn rebuild_connections_by_out(&mut self) {
        self.connections_by_out.clear();
        for (idx, conn) in self.connections.iter().enumerate() {
            self.connections_by_out.entry(conn.out_node).or_default().push(idx);
        }
    }

    fn has_enabled_connection(&self, in_node: u64, out_node: u64) -> bool {
        self.connections_by_out
            .get(&out_node)
            .into_iter()
            .flatten()
            .any(|&idx| !self.connections[idx].disabled && self.connections[idx].in_node == in_node)
    }

    /// Attempts exactly one mutation branch, gated independently in order:
    /// node-split, then link, then weight. It is possible (by design) for
    /// none to fire in a given call.
    pub fn mutate(
        &mut self,
        log: &mut InnovationLog,
        innovation_counter: &mut Counter,
        node_counter: &mut Counter,
        rng: &mut Rng,
        cfg: &NeatConfig,
    ) -> MutationKind {
        let kind = if rng.gate(cfg.node_mutation_chance) {
            self.mutate_node_split(log, innovation_counter, node_counter, rng);
            MutationKind::NodeSplit
        } else if rng.gate(cfg.link_mutation_chance) {
            if self.mutate_link(log, innovation_counter, rng, cfg) {
                MutationKind::NewLink
            } else {
                MutationKind::None
            }
        } else if rng.gate(cfg.weight_mutation_chance) {
            self.mutate_weights(rng, cfg);
            MutationKind::WeightPerturb
        } else {
            MutationKind::None
        };
        tracing::trace!(?kind, "genome mutation");
        kind
    }

    fn mutate_node_split(
        &mut self,
        log: &mut InnovationLog,
        innovation_counter: &mut Counter,
        node_counter: &mut Counter,
        rng: &mut Rng,
    ) {
        let enabled: Vec<usize> = self
            .connections
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.disabled)
            .map(|(i, _)| i)
            .collect();
        debug_assert!(!enabled.is_empty(), "genome must always retain an enabled connection");
        let idx = enabled[rng.range(0, enabled.len())];

        let (in_node, out_node, old_weight, old_innov) = {
            let c = &self.connections[idx];
            (c.in_node, c.out_node, c.weight, c.innovation_num)
        };
        self.connections[idx].disabled = true;

        let (innov_a, innov_b, new_node) = log.node_split(old_innov, innovation_counter, node_counter);
        self.nodes.push(new_node);
        self.connections.push(ConnectionGene {
            in_node,
            out_node: new_node,
            weight: 1.0,
            innovation_num: innov_a,
            disabled: false,
        });
        self.connections.push(ConnectionGene {
            in_node: new_node,
            out_node,
            weight: old_weight,
            innovation_num: innov_b,
            disabled: false,
        });
        self.rebuild_connections_by_out();
    }

    fn mutate_link(
        &mut self,
        log: &mut InnovationLog,
        innovation_counter: &mut Counter,
        rng: &mut Rng,
        cfg: &NeatConfig,
    ) -> bool {
        let layers = self.node_layers();
        let first_output_idx = self.num_inputs + 1;

        for _ in 0..cfg.link_mutation_attempts {
            let out_idx = rng.range(first_output_idx, self.nodes.len());
            let out_node = self.nodes[out_idx];

            let mut in_idx = rng.range(0, self.nodes.len() - self.num_outputs);
            if first_output_idx <= in_idx && in_idx < first_output_idx + self.num_outputs {
                in_idx = self.nodes.len() - in_idx + self.num_inputs;
            }
            let in_node = self.nodes[in_idx];

            if in_node == out_node || layers[&in_node] > layers[&out_node] {
                continue;
            }
            if self.has_enabled_connection(in_node, out_node) {
                continue;
            }

            let weight = rng.sample_weight(cfg.weight_init_range);
            let innovation_num = log.new_link(in_node, out_node, innovation_counter);
            self.connections.push(ConnectionGene {
                in_node,
                out_node,
                weight,
                innovation_num,
                disabled: false,
            });
            self.rebuild_connections_by_out();
            return true;
        }
        false
    }

    fn mutate_weights(&mut self, rng: &mut Rng, cfg: &NeatConfig) {
        for conn in self.connections.iter_mut().filter(|c| !c.disabled) {
            if rng.gate(cfg.weight_randomized_chance) {
                conn.weight = rng.sample_weight(cfg.weight_init_range);
            } else {
                conn.weight += rng.gaussian(0.0, cfg.weight_perturb_std_dev);
            }
        }
    }

    /// Assigns each node a layer: inputs and bias are layer 0; every other
    /// node's layer is `1 + max(layer of enabled incoming sources)`, found
    /// by repeated scans of the unplaced set. Panics if a full scan places
    /// nothing — a cycle, which must never occur in a valid genome.
    pub fn node_layers(&self) -> HashMap<u64, u64> {
        let mut layer: HashMap<u64, u64> = HashMap::new();
        for &node in &self.nodes[0..=self.num_inputs] {
            layer.insert(node, 0);
        }

        let mut to_place: Vec<u64> = self.nodes[self.num_inputs + 1..].to_vec();
        while !to_place.is_empty() {
            let mut placed_any = false;
            let mut i = 0;
            while i < to_place.len() {
                let node = to_place[i];
                let incoming = self.connections_by_out.get(&node);
                let mut finalized = true;
                let mut max_prev_layer = 0u64;

                if let Some(incoming) = incoming {
                    for &idx in incoming {
                        let c = &self.connections[idx];
                        if c.disabled {
                            continue;
                        }
                        match layer.get(&c.in_node) {
                            Some(&l) => max_prev_layer = max_prev_layer.max(l),
                            None => {
                                finalized = false;
                                break;
                            }
                        }
                    }
                }

                if finalized {
                    layer.insert(node, max_prev_layer + 1);
                    to_place.remove(i);
                    placed_any = true;
                } else {
                    i += 1;
                }
            }
            if !placed_any {
                panic!("genome contains a cycle: layer assignment made no progress");
            }
        }

        layer
    }

    /// `c1*E + c2*D + c3*(W/M)`, symmetric in `self`/`other`.
    pub fn compatibility_distance(&self, other: &Genome, cfg: &NeatConfig) -> f64 {
        let mut excess = 0u64;
        let mut disjoint = 0u64;
        let mut matching = 0u64;
        let mut weight_diff_sum = 0.0_f64;

        let (a, b) = (&self.connections, &other.connections);
        let (mut i, mut j) = (0usize, 0usize);

        while i < a.len() || j < b.len() {
            if i == a.len() {
                if !b[j].disabled {
                    excess += 1;
                }
                j += 1;
            } else if j == b.len() {
                if !a[i].disabled {
                    excess += 1;
                }
                i += 1;
            } else if a[i].disabled {
                i += 1;
            } else if b[j].disabled {
                j += 1;
            } else {
                let (innov_a, innov_b) = (a[i].innovation_num, b[j].innovation_num);
                if innov_a == innov_b {
                    matching += 1;
                    weight_diff_sum += (a[i].weight - b[j].weight).abs();
                    i += 1;
                    j += 1;
                } else if innov_a < innov_b {
                    disjoint += 1;
                    i += 1;
                } else {
                    disjoint += 1;
                    j += 1;
                }
            }
        }

        let weight_term = if matching == 0 { 0.0 } else { weight_diff_sum / matching as f64 };
        cfg.compat_c1 * excess as f64 + cfg.compat_c2 * disjoint as f64 + cfg.compat_c3 * weight_term
    }

    /// Combines `a` and `b` into a child genome: matching genes are
    /// inherited from a uniformly-random parent, disjoint/excess genes only
    /// from the fitter parent (ties broken by the shorter connection list).
    pub fn from_crossover(a: &Genome, fitness_a: f64, b: &Genome, fitness_b: f64, rng: &mut Rng) -> Genome {
        let a_better = if fitness_a == fitness_b {
            a.connections.len() < b.connections.len()
        } else {
            fitness_a > fitness_b
        };

        let mut nodes: Vec<u64> = (0..(a.num_inputs + 1 + a.num_outputs) as u64).collect();
        let mut connections: Vec<ConnectionGene> = Vec::new();

        let (mut i, mut j) = (0usize, 0usize);
        while i < a.connections.len() || j < b.connections.len() {
            let new_gene = if i == a.connections.len() {
                if a_better {
                    break;
                }
                let gene = b.connections[j];
                j += 1;
                if gene.disabled {
                    continue;
                }
                gene
            } else if j == b.connections.len() {
                if !a_better {
                    break;
                }
                let gene = a.connections[i];
                i += 1;
                if gene.disabled {
                    continue;
                }
                gene
            } else if a.connections[i].disabled {
                i += 1;
                continue;
            } else if b.connections[j].disabled {
                j += 1;
                continue;
            } else {
                let (innov_a, innov_b) = (a.connections[i].innovation_num, b.connections[j].innovation_num);
                if innov_a == innov_b {
                    let gene = if rng.gate(0.5) { a.connections[i] } else { b.connections[j] };
                    i += 1;
                    j += 1;
                    gene
                } else if innov_a < innov_b {
                    let gene = a.connections[i];
                    i += 1;
                    if !a_better {
                        continue;
                    }
                    gene
                } else {
                    let gene = b.connections[j];
                    j += 1;
                    if a_better {
                        continue;
                    }
                    gene
                }
            };

            if !nodes.contains(&new_gene.in_node) {
                nodes.push(new_gene.in_node);
            }
            if !nodes.contains(&new_gene.out_node) {
                nodes.push(new_gene.out_node);
            }
            connections.push(new_gene);
        }

        let mut child = Genome {
            num_inputs: a.num_inputs,
            num_outputs: a.num_outputs,
            nodes,
            connections,
            connections_by_out: HashMap::new(),
        };
        child.rebuild_connections_by_out();
        child
    }

    /// Compiles this genome into a dense-indexed, stateless phenotype.
    /// Node indices follow `[inputs..., bias, outputs..., hidden...]` order.
    pub fn build_network(&self) -> NeuralNetwork {
        let mut dense_index: HashMap<u64, usize> = HashMap::with_capacity(self.nodes.len());
        for (idx, &node) in self.nodes.iter().enumerate() {
            dense_index.insert(node, idx);
        }

        let layers = self.node_layers();
        let mut non_input_nodes: Vec<u64> = self.nodes[self.num_inputs + 1..].to_vec();
        non_input_nodes.sort_by_key(|n| layers[n]);

        let evaluation_order: Vec<usize> = non_input_nodes.iter().map(|n| dense_index[n]).collect();

        let mut connections: Vec<Vec<NeuralConnection>> = vec![Vec::new(); self.nodes.len()];
        for conn in &self.connections {
            if conn.disabled {
                continue;
            }
            let out_idx = dense_index[&conn.out_node];
            let in_idx = dense_index[&conn.in_node];
            connections[out_idx].push(NeuralConnection { in_node: in_idx, weight: conn.weight });
        }

        NeuralNetwork::new(self.num_inputs, self.num_outputs, evaluation_order, connections)
    }
}
