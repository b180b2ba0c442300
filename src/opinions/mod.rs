//! Initial opinion generation: sampling plus the two adjustment heuristics.
//!
//! Opinions live in `[-1, 1]`.

pub mod adjust;

pub use adjust::AdjustMethod;

use crate::error::LaunchError;
use crate::parameters::Value;
use rand::RngCore;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal, Uniform};

pub const DEFAULT_DISTRIBUTION: &str = "[[0, -1.0, 1.0, 1]]";

pub fn clamp_opinion(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}

/// Draws the raw opinion sample.
pub trait OpinionSampler {
    fn sample(
        &self,
        num_agents: usize,
        spec: &Value,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, LaunchError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Component {
    Uniform { low: f64, high: f64, weight: f64 },
    Normal { mean: f64, std_dev: f64, weight: f64 },
}

impl Component {
    fn weight(&self) -> f64 {
        match self {
            Component::Uniform { weight, .. } | Component::Normal { weight, .. } => *weight,
        }
    }

    /// `[kind, a, b, weight]`, kind 0 = uniform on [a, b], kind 1 = normal(a, b)
    pub fn from_value(value: &Value) -> Result<Self, LaunchError> {
        let fields = value
            .items()
            .filter(|items| items.len() == 4)
            .ok_or_else(|| LaunchError::invalid("io_dis", format!("component {} is not [kind, a, b, weight]", value)))?;

        let numbers: Vec<f64> = fields
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| LaunchError::invalid("io_dis", format!("{} is not a number", v)))
            })
            .collect::<Result<_, _>>()?;

        let (a, b, weight) = (numbers[1], numbers[2], numbers[3]);
        if let Some(x) = numbers.iter().find(|x| !x.is_finite()) {
            return Err(LaunchError::invalid("io_dis", format!("component {} holds non-finite {}", value, x)));
        }
        if !(weight >= 0.0) {
            return Err(LaunchError::invalid("io_dis", format!("negative weight {}", weight)));
        }

        match fields[0].as_i64() {
            Some(0) if a <= b && (b - a).is_finite() => Ok(Component::Uniform { low: a, high: b, weight }),
            Some(0) => Err(LaunchError::invalid("io_dis", format!("bad uniform bounds [{}, {}]", a, b))),
            Some(1) if b >= 0.0 => Ok(Component::Normal { mean: a, std_dev: b, weight }),
            Some(1) => Err(LaunchError::invalid("io_dis", format!("negative standard deviation {}", b))),
            _ => Err(LaunchError::invalid("io_dis", format!("unknown distribution kind {}", fields[0]))),
        }
    }

    fn draw(&self, count: usize, rng: &mut dyn RngCore, out: &mut Vec<f64>) -> Result<(), LaunchError> {
        match *self {
            Component::Uniform { low, high, .. } => {
                let dist = Uniform::new_inclusive(low, high);
                out.extend((0..count).map(|_| clamp_opinion(dist.sample(&mut *rng))));
            }
            Component::Normal { mean, std_dev, .. } => {
                let dist = Normal::new(mean, std_dev)
                    .map_err(|e| LaunchError::invalid("io_dis", e.to_string()))?;
                out.extend((0..count).map(|_| clamp_opinion(dist.sample(&mut *rng))));
            }
        }
        Ok(())
    }
}

/// A weighted mixture of uniform / normal components.
#[derive(Debug, Default, Clone, Copy)]
pub struct MixtureSampler;

impl MixtureSampler {
    pub fn components(spec: &Value) -> Result<Vec<Component>, LaunchError> {
        let items = spec
            .items()
            .ok_or_else(|| LaunchError::invalid("io_dis", "expected a list of components"))?;

        // a single bare component is accepted too
        if items.first().is_some_and(|v| v.as_f64().is_some()) {
            return Ok(vec![Component::from_value(spec)?]);
        }

        let components = items.iter().map(Component::from_value).collect::<Result<Vec<_>, _>>()?;
        if components.is_empty() {
            return Err(LaunchError::invalid("io_dis", "no components"));
        }
        if components.iter().map(Component::weight).sum::<f64>() <= 0.0 {
            return Err(LaunchError::invalid("io_dis", "weights sum to zero"));
        }
        Ok(components)
    }
}

impl OpinionSampler for MixtureSampler {
    fn sample(
        &self,
        num_agents: usize,
        spec: &Value,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, LaunchError> {
        let components = Self::components(spec)?;
        let total: f64 = components.iter().map(Component::weight).sum();

        let mut opinions = Vec::with_capacity(num_agents);
        let mut assigned = 0;
        for (i, component) in components.iter().enumerate() {
            let count = if i + 1 == components.len() {
                num_agents - assigned
            } else {
                ((component.weight() / total) * num_agents as f64).floor() as usize
            };
            let count = count.min(num_agents - assigned);
            component.draw(count, rng, &mut opinions)?;
            assigned += count;
        }

        opinions.shuffle(rng);
        Ok(opinions)
    }
}

pub fn mean(opinions: &[f64]) -> f64 {
    if opinions.is_empty() {
        return 0.0;
    }
    opinions.iter().sum::<f64>() / opinions.len() as f64
}

pub fn abs_mean(opinions: &[f64]) -> f64 {
    if opinions.is_empty() {
        return 0.0;
    }
    opinions.iter().map(|x| x.abs()).sum::<f64>() / opinions.len() as f64
}

/// Text histogram over `[-1, 1]`.
pub fn histogram(opinions: &[f64], bins: usize) -> String {
    let bins = bins.max(1);
    let mut counts = vec![0usize; bins];
    for x in opinions {
        let idx = (((x + 1.0) / 2.0) * bins as f64).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    let peak = counts.iter().copied().max().unwrap_or(0).max(1);
    let width = 2.0 / bins as f64;
    let mut out = String::new();
    for (i, count) in counts.iter().enumerate() {
        let low = -1.0 + i as f64 * width;
        let bar = "#".repeat(count * 40 / peak);
        out.push_str(&format!("[{:>+5.2}, {:>+5.2}) {:>5} {}\n", low, low + width, count, bar));
    }
    out
}
