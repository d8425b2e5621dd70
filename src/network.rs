//! The phenotype: a dense, stateless feed-forward network compiled from a
//! genome for fast repeated evaluation.

/// One incoming edge into a node, indexed against the dense node numbering
/// (not the genome's sparse global ids).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeuralConnection {
    pub in_node: usize,
    pub weight: f64,
}

/// A compiled network. Node indices are dense: `[0, num_inputs)` are
/// inputs, `num_inputs` is the bias node, `[num_inputs+1, num_inputs+1+num_outputs)`
/// are outputs, and the remainder are hidden nodes in the order they were
/// added to the source genome.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub num_nodes: usize,
    /// Non-input/bias node indices, in topological (dependency-safe) order.
    pub evaluation_order: Vec<usize>,
    /// `connections[node_index]` holds every incoming edge of that node.
    pub connections: Vec<Vec<NeuralConnection>>,
}

impl NeuralNetwork {
    pub fn new(
        num_inputs: usize,
        num_outputs: usize,
        evaluation_order: Vec<usize>,
        connections: Vec<Vec<NeuralConnection>>,
    ) -> Self {
        let num_nodes = num_inputs + 1 + evaluation_order.len();
        NeuralNetwork {
            num_inputs,
            num_outputs,
            num_nodes,
            evaluation_order,
            connections,
        }
    }

    /// Evaluates the network on `input`, returning `num_outputs` values each
    /// in `(-1, 1)`. Asserts `input.len() == num_inputs`: a mismatched input
    /// vector is a caller bug, not a recoverable condition.
    pub fn evaluate(&self, input: &[f64], sigmoid_steepness: f64) -> Vec<f64> {
        assert_eq!(input.len(), self.num_inputs, "input length must match num_inputs");

        let mut node_values = vec![0.0_f64; self.num_nodes];
        node_values[..self.num_inputs].copy_from_slice(input);
        node_values[self.num_inputs] = 1.0;

        for &node in &self.evaluation_order {
            let sum: f64 = self.connections[node]
                .iter()
                .map(|c| node_values[c.in_node] * c.weight)
                .sum();
            node_values[node] = steep_sigmoid(sum, sigmoid_steepness);
        }

        node_values[self.num_inputs + 1..self.num_inputs + 1 + self.num_outputs].to_vec()
    }
}

/// `2 / (1 + exp(-steepness * x)) - 1`, a sigmoid with range `(-1, 1)`.
pub fn steep_sigmoid(x: f64, steepness: f64) -> f64 {
    2.0 / (1.0 + (-steepness * x).exp()) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_weight_bias_connection_evaluates_to_zero() {
        // num_inputs=0, bias at index 0, single output at index 1, one
        // connection bias->output with weight 0.
        let net = NeuralNetwork::new(
            0,
            1,
            vec![1],
            vec![vec![], vec![NeuralConnection { in_node: 0, weight: 0.0 }]],
        );
        let out = net.evaluate(&[], 4.9);
        assert_eq!(out.len(), 1);
        assert!((out[0] - 0.0).abs() < 1e-9);
    }

    #[test]
    fn large_weight_bias_connection_saturates_near_one() {
        let net = NeuralNetwork::new(
            0,
            1,
            vec![1],
            vec![vec![], vec![NeuralConnection { in_node: 0, weight: 1000.0 }]],
        );
        let out = net.evaluate(&[], 4.9);
        assert!((out[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn hidden_layer_is_evaluated_before_output() {
        // inputs: 1 (index 0), bias index 1, output index 2, hidden index 3.
        // input -> hidden (weight 1), hidden -> output (weight 1).
        let net = NeuralNetwork::new(
            1,
            1,
            vec![3, 2],
            vec![
                vec![],
                vec![],
                vec![NeuralConnection { in_node: 3, weight: 1.0 }],
                vec![NeuralConnection { in_node: 0, weight: 1.0 }],
            ],
        );
        let out = net.evaluate(&[1.0], 4.9);
        let expected_hidden = steep_sigmoid(1.0, 4.9);
        let expected_output = steep_sigmoid(expected_hidden, 4.9);
        assert!((out[0] - expected_output).abs() < 1e-9);
    }

    #[test]
    #[should_panic]
    fn evaluate_panics_on_wrong_input_length() {
        let net = NeuralNetwork::new(2, 1, vec![3], vec![vec![], vec![], vec![], vec![]]);
        net.evaluate(&[1.0], 4.9);
    }
}
