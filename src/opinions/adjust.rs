use super::{abs_mean, clamp_opinion, mean};
use crate::parameters::Value;
use rand::{Rng, RngCore};
use serde::Serialize;
use tracing::{debug, warn};

pub const DEFAULT_TOLERANCE: f64 = 0.01;

const MAX_GLOBAL_ROUNDS: usize = 1000;
const MAX_NUDGES_PER_AGENT: usize = 200;
const MAX_STEP: f64 = 0.25;

/// Heuristics that pull a sample towards a target mean and absolute mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdjustMethod {
    /// Method 1: shift and rescale the whole population.
    Global,
    /// Method 2: nudge one random agent at a time.
    Individual,
}

impl AdjustMethod {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Global),
            2 => Some(Self::Individual),
            _ => None,
        }
    }

    /// Numeric comparison, so `1`, `1.0` and `True` all select method 1.
    pub fn from_value(value: &Value) -> Option<Self> {
        let code = match value {
            Value::Bool(b) => f64::from(u8::from(*b)),
            other => other.as_f64()?,
        };
        if code.fract() != 0.0 {
            return None;
        }
        Self::from_code(code as i64)
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Global => 1,
            Self::Individual => 2,
        }
    }

    pub fn adjust(
        self,
        opinions: Vec<f64>,
        desired_mean: f64,
        desired_abs_mean: f64,
        tolerance: f64,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        match self {
            Self::Global => modify_global(opinions, desired_mean, desired_abs_mean, tolerance),
            Self::Individual => modify_individual(opinions, desired_mean, desired_abs_mean, tolerance, rng),
        }
    }
}

fn within(gap_mean: f64, gap_abs: f64, tolerance: f64) -> bool {
    gap_mean.abs() <= tolerance && gap_abs.abs() <= tolerance
}

pub fn modify_global(mut opinions: Vec<f64>, desired_mean: f64, desired_abs_mean: f64, tolerance: f64) -> Vec<f64> {
    if opinions.is_empty() {
        return opinions;
    }

    for round in 0..MAX_GLOBAL_ROUNDS {
        let m = mean(&opinions);
        let a = abs_mean(&opinions);
        if within(desired_mean - m, desired_abs_mean - a, tolerance) {
            debug!("Global adjustment converged after {} rounds", round);
            return opinions;
        }

        let shift = desired_mean - m;
        for x in opinions.iter_mut() {
            *x = clamp_opinion(*x + shift);
        }

        let a = abs_mean(&opinions);
        if a > 0.0 {
            let factor = desired_abs_mean / a;
            for x in opinions.iter_mut() {
                *x = clamp_opinion(*x * factor);
            }
        }
    }

    warn!(
        "Global adjustment stopped at mean {:.4} / abs mean {:.4} (wanted {} / {})",
        mean(&opinions),
        abs_mean(&opinions),
        desired_mean,
        desired_abs_mean
    );
    opinions
}

pub fn modify_individual(
    mut opinions: Vec<f64>,
    desired_mean: f64,
    desired_abs_mean: f64,
    tolerance: f64,
    rng: &mut dyn RngCore,
) -> Vec<f64> {
    let n = opinions.len();
    if n == 0 {
        return opinions;
    }

    let nf = n as f64;
    let mut sum: f64 = opinions.iter().sum();
    let mut abs_sum: f64 = opinions.iter().map(|x| x.abs()).sum();

    for nudge in 0..MAX_NUDGES_PER_AGENT * n {
        let gap_mean = desired_mean - sum / nf;
        let gap_abs = desired_abs_mean - abs_sum / nf;
        if within(gap_mean, gap_abs, tolerance) {
            debug!("Individual adjustment converged after {} nudges", nudge);
            return opinions;
        }

        let i = rng.gen_range(0..n);
        let old = opinions[i];
        let sign = if old >= 0.0 { 1.0 } else { -1.0 };
        // moving x_i by d moves the mean by d/n and the abs mean by sign*d/n
        let delta = (0.5 * nf * (gap_mean + sign * gap_abs)).clamp(-MAX_STEP, MAX_STEP);
        let new = clamp_opinion(old + delta);

        opinions[i] = new;
        sum += new - old;
        abs_sum += new.abs() - old.abs();
    }

    warn!(
        "Individual adjustment stopped at mean {:.4} / abs mean {:.4} (wanted {} / {})",
        sum / nf,
        abs_sum / nf,
        desired_mean,
        desired_abs_mean
    );
    opinions
}
