// Agent weights are (self, neighbours, bias), always normalised to sum 1.

use crate::error::LaunchError;
use crate::parameters::Value;
use crate::simulation::config::AgentParameterSpec;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_JITTER: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentWeights {
    pub own: f64,
    pub neighbours: f64,
    pub bias: f64,
}

impl AgentWeights {
    pub fn new(own: f64, neighbours: f64, bias: f64) -> Result<Self, LaunchError> {
        let total = own + neighbours + bias;
        if own < 0.0 || neighbours < 0.0 || bias < 0.0 || !(total > 0.0 && total.is_finite()) {
            return Err(LaunchError::invalid(
                "par_rep",
                format!("weights ({}, {}, {}) must be finite, non-negative and not all zero", own, neighbours, bias),
            ));
        }
        Ok(Self {
            own: own / total,
            neighbours: neighbours / total,
            bias: bias / total,
        })
    }

    fn jittered(&self, tolerance: f64, rng: &mut dyn RngCore) -> Self {
        let mut jitter = |w: f64| (w * (1.0 + rng.gen_range(-tolerance..=tolerance))).max(0.0);
        let (own, neighbours, bias) = (jitter(self.own), jitter(self.neighbours), jitter(self.bias));
        // falls back to the base weights if every component got clipped to zero
        Self::new(own, neighbours, bias).unwrap_or(*self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentMethod {
    /// 1: every agent shares the same weights
    Homogeneous,
    /// 2: each agent's weights are jittered by the tolerance
    Jittered,
}

/// Per-agent weights handed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentParameters {
    pub method: AgentMethod,
    pub weights: Vec<AgentWeights>,
}

impl AgentParameters {
    pub fn homogeneous(num_agents: usize, weights: AgentWeights) -> Self {
        Self {
            method: AgentMethod::Homogeneous,
            weights: vec![weights; num_agents],
        }
    }

    pub fn resolve(
        spec: &AgentParameterSpec,
        num_agents: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Self, LaunchError> {
        let base = representation(spec.representation.as_ref())?;

        let method = match spec.method.as_ref().map(|m| m.as_i64()) {
            None | Some(Some(1)) => AgentMethod::Homogeneous,
            Some(Some(2)) => AgentMethod::Jittered,
            Some(_) => {
                warn!("Agent parameter method should be 1 or 2, using 1");
                AgentMethod::Homogeneous
            }
        };

        match method {
            AgentMethod::Homogeneous => Ok(Self::homogeneous(num_agents, base)),
            AgentMethod::Jittered => {
                let tolerance = match spec.tolerance.as_ref() {
                    None => DEFAULT_JITTER,
                    Some(v) => v
                        .as_f64()
                        .filter(|t| t.is_finite() && *t >= 0.0)
                        .ok_or_else(|| {
                            LaunchError::invalid("par_tol", format!("{} is not a finite non-negative number", v))
                        })?,
                };
                let weights = (0..num_agents).map(|_| base.jittered(tolerance, rng)).collect();
                Ok(Self { method, weights })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn summary(&self) -> String {
        let n = self.weights.len().max(1) as f64;
        let avg = |f: fn(&AgentWeights) -> f64| self.weights.iter().map(f).sum::<f64>() / n;
        format!(
            "{} agents ({:?}), mean weights: own {:.3}, neighbours {:.3}, bias {:.3}",
            self.weights.len(),
            self.method,
            avg(|w| w.own),
            avg(|w| w.neighbours),
            avg(|w| w.bias),
        )
    }
}

fn representation(value: Option<&Value>) -> Result<AgentWeights, LaunchError> {
    let value = value.ok_or(LaunchError::MissingParameter("par_rep"))?;
    let items = value
        .items()
        .filter(|items| items.len() == 3)
        .ok_or_else(|| LaunchError::invalid("par_rep", format!("{} is not a (self, neighbours, bias) triple", value)))?;

    let mut numbers = [0.0; 3];
    for (slot, item) in numbers.iter_mut().zip(items) {
        *slot = item
            .as_f64()
            .ok_or_else(|| LaunchError::invalid("par_rep", format!("{} is not a number", item)))?;
    }
    AgentWeights::new(numbers[0], numbers[1], numbers[2])
}
