//! Sweep results and order-invariant summaries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::SweepKind;

/// A task that failed under the isolate policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    /// Repeat index of the failing task.
    pub repeat: u32,
    /// Rendered error.
    pub message: String,
}

/// Statistics over the repeats of one sweep key.
///
/// Values are sorted before accumulation, so the summary does not depend on
/// the order in which workers delivered them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Number of estimates.
    pub count: usize,
    /// Mean estimate.
    pub mean: f64,
    /// Sample standard deviation (zero for a single estimate).
    pub std_dev: f64,
    /// Standard error of the mean.
    pub std_error: f64,
    /// 95% confidence interval of the mean.
    pub confidence_interval: (f64, f64),
    /// Smallest estimate.
    pub min: f64,
    /// Largest estimate.
    pub max: f64,
}

impl SweepSummary {
    /// Summarize a list of estimates; `None` when empty.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let std_dev = if sorted.len() > 1 {
            (sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        let std_error = std_dev / n.sqrt();
        let ci_half = 1.96 * std_error;

        Some(Self {
            count: sorted.len(),
            mean,
            std_dev,
            std_error,
            confidence_interval: (mean - ci_half, mean + ci_half),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Outcome of a completed sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Which input was varied.
    pub kind: SweepKind,
    /// Estimates per key, ordered by repeat index.
    pub results: BTreeMap<u64, Vec<f64>>,
    /// Isolated failures per key (empty under fail-fast).
    pub failures: BTreeMap<u64, Vec<TaskFailure>>,
    /// Tasks dequeued and executed.
    pub tasks_processed: usize,
    /// Worker threads used.
    pub workers: usize,
}

impl SweepReport {
    /// Whether every task produced an estimate.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.values().all(Vec::is_empty)
    }

    /// Total number of estimates across keys.
    #[must_use]
    pub fn total_results(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }

    /// Total number of isolated failures.
    #[must_use]
    pub fn total_failures(&self) -> usize {
        self.failures.values().map(Vec::len).sum()
    }

    /// Per-key summaries; keys without estimates are omitted.
    #[must_use]
    pub fn summaries(&self) -> BTreeMap<u64, SweepSummary> {
        self.results
            .iter()
            .filter_map(|(key, values)| SweepSummary::from_values(values).map(|s| (*key, s)))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_empty_is_none() {
        assert!(SweepSummary::from_values(&[]).is_none());
    }

    #[test]
    fn test_summary_single_value() {
        let s = SweepSummary::from_values(&[1.5]).unwrap();
        assert_eq!(s.count, 1);
        assert!((s.mean - 1.5).abs() < f64::EPSILON);
        assert!(s.std_dev.abs() < f64::EPSILON);
        assert_eq!(s.confidence_interval, (1.5, 1.5));
    }

    #[test]
    fn test_summary_moments() {
        let s = SweepSummary::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((s.mean - 2.5).abs() < 1e-12);
        // sample variance = 5/3
        assert!((s.std_dev - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((s.std_error - s.std_dev / 2.0).abs() < 1e-12);
        assert!((s.min - 1.0).abs() < f64::EPSILON);
        assert!((s.max - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_order_invariant() {
        let a = SweepSummary::from_values(&[0.1, 1e16, -1e16, 0.3, 0.7]).unwrap();
        let b = SweepSummary::from_values(&[-1e16, 0.7, 0.1, 1e16, 0.3]).unwrap();
        assert_eq!(a.mean.to_bits(), b.mean.to_bits());
        assert_eq!(a.std_dev.to_bits(), b.std_dev.to_bits());
    }

    #[test]
    fn test_report_completeness() {
        let mut report = SweepReport {
            kind: SweepKind::SampleSize,
            results: BTreeMap::from([(10, vec![1.0, 2.0]), (20, vec![])]),
            failures: BTreeMap::new(),
            tasks_processed: 3,
            workers: 2,
        };
        assert!(report.is_complete());
        assert_eq!(report.total_results(), 2);
        assert_eq!(report.summaries().len(), 1);

        report.failures.insert(
            20,
            vec![TaskFailure {
                repeat: 0,
                message: "boom".to_string(),
            }],
        );
        assert!(!report.is_complete());
        assert_eq!(report.total_failures(), 1);
    }
}
