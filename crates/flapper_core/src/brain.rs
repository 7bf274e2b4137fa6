//! Decision functions.
//!
//! The engine only needs `observation -> action`. How a policy was produced
//! (NEAT genome, hand-written rule, lookup table) is none of its business.

use flapper_data::Observation;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const BRAIN_INPUTS: usize = 3;

/// Anything that can pick an action from an observation.
///
/// Called once per living agent per tick. An `Err` aborts the generation.
pub trait DecisionFunction {
    fn evaluate(&self, observation: &Observation) -> anyhow::Result<f64>;
}

impl<F> DecisionFunction for F
where
    F: Fn(&Observation) -> f64,
{
    fn evaluate(&self, observation: &Observation) -> anyhow::Result<f64> {
        Ok(self(observation))
    }
}

/// Fully connected tanh layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// `weights[out][in]`
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

impl Layer {
    fn random<R: Rng>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        Self {
            weights: (0..outputs)
                .map(|_| (0..inputs).map(|_| rng.gen_range(-1.0..1.0)).collect())
                .collect(),
            biases: (0..outputs).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        }
    }

    fn forward(&self, inputs: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                let sum: f64 = row.iter().zip(inputs).map(|(w, x)| w * x).sum();
                (sum + bias).tanh()
            })
            .collect()
    }
}

/// Small feed-forward network with one output, used as a stand-in policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedForward {
    pub layers: Vec<Layer>,
}

impl FeedForward {
    /// Random network with the given hidden layer widths.
    pub fn new_random_with_rng<R: Rng>(hidden: &[usize], rng: &mut R) -> Self {
        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut width = BRAIN_INPUTS;
        for &h in hidden {
            layers.push(Layer::random(width, h, rng));
            width = h;
        }
        layers.push(Layer::random(width, 1, rng));
        Self { layers }
    }

    #[must_use]
    pub fn forward(&self, inputs: [f64; BRAIN_INPUTS]) -> f64 {
        let mut values = inputs.to_vec();
        for layer in &self.layers {
            values = layer.forward(&values);
        }
        values.first().copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.iter().map(Vec::len).sum::<usize>())
            .sum()
    }
}

impl DecisionFunction for FeedForward {
    fn evaluate(&self, observation: &Observation) -> anyhow::Result<f64> {
        Ok(self.forward(observation.as_array()))
    }
}
