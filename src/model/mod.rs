pub mod engine;

pub use engine::{EvolutionEngine, EvolutionRequest, LocalEngine, Trace};

use crate::agent::AgentParameters;
use crate::error::LaunchError;
use crate::network::AdjacencyMatrix;
use crate::opinions::clamp_opinion;
use crate::parameters::Value;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelParameters {
    /// Exponent applied to the bias term.
    pub gamma: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self { gamma: 1.0 }
    }
}

impl ModelParameters {
    pub fn from_value(value: Option<&Value>) -> Result<Self, LaunchError> {
        match value {
            None | Some(Value::None) => Ok(Self::default()),
            Some(v) => match v.as_f64() {
                Some(gamma) if gamma > 0.0 && gamma.is_finite() => Ok(Self { gamma }),
                _ => Err(LaunchError::invalid("mod_par", format!("{} is not a finite positive number", v))),
            },
        }
    }
}

/// One synchronous update of every agent.
pub type ModelFunction = fn(&[f64], &AdjacencyMatrix, &AgentParameters, &ModelParameters) -> Vec<f64>;

/// Weighted mean of the opinions agent `i` listens to.
fn neighbour_average(opinions: &[f64], adjacency: &AdjacencyMatrix, i: usize) -> Option<f64> {
    let row = adjacency.row(i);
    let total: f64 = row.iter().map(|w| w.abs()).sum();
    if total == 0.0 {
        return None;
    }
    Some(row.iter().zip(opinions).map(|(w, x)| w * x).sum::<f64>() / total)
}

/// Consensus with bias: own opinion, neighbour pull and a push away from zero.
pub fn consensus_with_bias(
    opinions: &[f64],
    adjacency: &AdjacencyMatrix,
    agents: &AgentParameters,
    params: &ModelParameters,
) -> Vec<f64> {
    opinions
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let w = agents.weights[i];
            let social = match neighbour_average(opinions, adjacency, i) {
                Some(avg) => w.own * x + w.neighbours * avg,
                None => (w.own + w.neighbours) * x,
            };
            let bias = w.bias * x.signum() * x.abs().powf(params.gamma);
            clamp_opinion(social + bias)
        })
        .collect()
}

/// DeGroot averaging, the bias weight is ignored.
pub fn degroot(
    opinions: &[f64],
    adjacency: &AdjacencyMatrix,
    agents: &AgentParameters,
    _params: &ModelParameters,
) -> Vec<f64> {
    opinions
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let w = agents.weights[i];
            let total = w.own + w.neighbours;
            match neighbour_average(opinions, adjacency, i) {
                Some(avg) if total > 0.0 => clamp_opinion((w.own * x + w.neighbours * avg) / total),
                _ => x,
            }
        })
        .collect()
}

pub struct ModelRegistry {
    models: HashMap<String, (String, ModelFunction)>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        let mut registry = Self { models: HashMap::new() };
        registry.register("CB", "consensus with bias", consensus_with_bias);
        registry.register("DG", "DeGroot averaging", degroot);
        registry
    }

    pub fn register(&mut self, label: &str, description: &str, function: ModelFunction) {
        self.models
            .insert(label.to_lowercase(), (description.to_string(), function));
    }

    pub fn resolve(&self, label: &str) -> Option<ModelFunction> {
        self.models.get(&label.trim().to_lowercase()).map(|(_, f)| *f)
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .models
            .iter()
            .map(|(label, (description, _))| format!("{} ({})", label.to_uppercase(), description))
            .collect();
        names.sort();
        names
    }

    pub fn global() -> &'static ModelRegistry {
        use std::sync::OnceLock;
        static REGISTRY: OnceLock<ModelRegistry> = OnceLock::new();
        REGISTRY.get_or_init(ModelRegistry::new)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentWeights;

    fn pair() -> AdjacencyMatrix {
        let mut m = AdjacencyMatrix::new(2).unwrap();
        m.set(0, 1, 1.0);
        m.set(1, 0, 1.0);
        m
    }

    #[test]
    fn registry_lookup() {
        let registry = ModelRegistry::global();
        assert!(registry.resolve("CB").is_some());
        assert!(registry.resolve("cb").is_some());
        assert!(registry.resolve("XX").is_none());
        assert_eq!(registry.list().len(), 2);
    }

    #[test]
    fn consensus_without_bias_averages() {
        let agents = AgentParameters::homogeneous(2, AgentWeights::new(0.5, 0.5, 0.0).unwrap());
        let next = consensus_with_bias(&[-0.4, 0.8], &pair(), &agents, &ModelParameters::default());
        assert!((next[0] - 0.2).abs() < 1e-12);
        assert!((next[1] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn bias_pushes_away_from_zero_and_clamps() {
        let agents = AgentParameters::homogeneous(2, AgentWeights::new(0.0, 0.0, 1.0).unwrap());
        let isolated = AdjacencyMatrix::new(2).unwrap();
        let params = ModelParameters { gamma: 1.0 };
        let next = consensus_with_bias(&[-0.3, 0.6], &isolated, &agents, &params);
        assert_eq!(next, vec![-0.3, 0.6]);

        let agents = AgentParameters::homogeneous(2, AgentWeights::new(0.5, 0.0, 0.5).unwrap());
        let params = ModelParameters { gamma: 0.5 };
        let next = consensus_with_bias(&[0.0, 0.81], &isolated, &agents, &params);
        assert_eq!(next[0], 0.0);
        assert!((next[1] - (0.405 + 0.45)).abs() < 1e-12);
    }

    #[test]
    fn degroot_ignores_bias() {
        let agents = AgentParameters::homogeneous(2, AgentWeights::new(0.25, 0.25, 0.5).unwrap());
        let next = degroot(&[-1.0, 1.0], &pair(), &agents, &ModelParameters::default());
        assert_eq!(next, vec![0.0, 0.0]);
    }

    #[test]
    fn model_parameters() {
        assert_eq!(ModelParameters::from_value(None).unwrap().gamma, 1.0);
        assert_eq!(ModelParameters::from_value(Some(&Value::Float(2.0))).unwrap().gamma, 2.0);
        assert!(ModelParameters::from_value(Some(&Value::Int(0))).is_err());
        assert!(ModelParameters::from_value(Some(&Value::Float(f64::INFINITY))).is_err());
        assert!(ModelParameters::from_value(Some(&Value::Str("x".into()))).is_err());
    }
}
