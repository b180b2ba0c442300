use crate::opinions::{abs_mean, mean};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionSnapshot {
    pub step: u64,
    pub mean: f64,
    pub abs_mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl OpinionSnapshot {
    pub fn capture(step: u64, opinions: &[f64]) -> Self {
        let m = mean(opinions);
        let variance = if opinions.is_empty() {
            0.0
        } else {
            opinions.iter().map(|x| (x - m).powi(2)).sum::<f64>() / opinions.len() as f64
        };

        Self {
            step,
            mean: m,
            abs_mean: abs_mean(opinions),
            std_dev: variance.sqrt(),
            min: opinions.iter().copied().fold(f64::INFINITY, f64::min),
            max: opinions.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Per-step opinion statistics of one run.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    snapshots: Vec<OpinionSnapshot>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: u64, opinions: &[f64]) -> &OpinionSnapshot {
        self.snapshots.push(OpinionSnapshot::capture(step, opinions));
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn latest(&self) -> Option<&OpinionSnapshot> {
        self.snapshots.last()
    }

    pub fn get_snapshots(&self) -> &[OpinionSnapshot] {
        &self.snapshots
    }

    pub fn into_snapshots(self) -> Vec<OpinionSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_statistics() {
        let s = OpinionSnapshot::capture(3, &[-1.0, 0.0, 1.0]);
        assert_eq!(s.step, 3);
        assert_eq!(s.mean, 0.0);
        assert!((s.abs_mean - 2.0 / 3.0).abs() < 1e-12);
        assert!((s.std_dev - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!((s.min, s.max), (-1.0, 1.0));
    }

    #[test]
    fn collector_keeps_order() {
        let mut metrics = MetricsCollector::new();
        metrics.record(0, &[0.5]);
        metrics.record(1, &[0.25]);
        assert_eq!(metrics.get_snapshots().len(), 2);
        assert_eq!(metrics.latest().map(|s| s.mean), Some(0.25));
    }
}
