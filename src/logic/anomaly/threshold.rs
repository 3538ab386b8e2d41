//! Contamination Threshold
//!
//! Turns a batch of anomaly scores into labels. Exactly
//! `round(contamination * n)` rows are flagged: the lowest scores, ties
//! broken by row order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContaminationThreshold {
    contamination: f64,
}

impl ContaminationThreshold {
    pub fn new(contamination: f64) -> Self {
        Self { contamination }
    }

    pub fn contamination(&self) -> f64 {
        self.contamination
    }

    /// Number of rows flagged out of `n`
    pub fn cutoff_count(&self, n: usize) -> usize {
        ((self.contamination * n as f64).round() as usize).min(n)
    }

    /// Flag the lowest scores. Lower = more anomalous.
    pub fn select(&self, scores: &[f64]) -> ThresholdOutcome {
        let n = scores.len();
        let count = self.cutoff_count(n);

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            scores[a]
                .partial_cmp(&scores[b])
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut flags = vec![false; n];
        for &i in &order[..count] {
            flags[i] = true;
        }

        let threshold = order[..count].last().map(|&i| scores[i]);
        let mean_score = if n > 0 {
            scores.iter().sum::<f64>() / n as f64
        } else {
            0.0
        };

        ThresholdOutcome {
            flags,
            stats: ThresholdStats {
                threshold,
                contamination: self.contamination,
                mean_score,
                flagged: count,
                sample_count: n,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThresholdOutcome {
    pub flags: Vec<bool>,
    pub stats: ThresholdStats,
}

/// Threshold statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdStats {
    /// Highest flagged score; `None` when nothing is flagged
    pub threshold: Option<f64>,
    pub contamination: f64,
    pub mean_score: f64,
    pub flagged: usize,
    pub sample_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_count_rounds() {
        let t = ContaminationThreshold::new(0.1);
        assert_eq!(t.cutoff_count(100), 10);
        assert_eq!(t.cutoff_count(4), 0);
        assert_eq!(t.cutoff_count(5), 1);
        assert_eq!(t.cutoff_count(0), 0);
    }

    #[test]
    fn test_select_lowest_scores() {
        let t = ContaminationThreshold::new(0.4);
        let outcome = t.select(&[0.4, 0.1, 0.7, 0.2, 0.6]);
        assert_eq!(outcome.flags, vec![false, true, false, true, false]);
        assert_eq!(outcome.stats.threshold, Some(0.2));
        assert_eq!(outcome.stats.flagged, 2);
    }

    #[test]
    fn test_ties_prefer_earlier_rows() {
        let t = ContaminationThreshold::new(0.5);
        let outcome = t.select(&[0.5, 0.5, 0.5, 0.5]);
        assert_eq!(outcome.flags, vec![true, true, false, false]);
    }
}
