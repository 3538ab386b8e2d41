//! Seeded train/test split
//!
//! `n_test = ceil(test_fraction * n)`, drawn from a seeded shuffle of the
//! row indices. Both sides must keep at least one row.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::logic::error::{AnalyticsError, AnalyticsResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn test_size(n: usize, test_fraction: f64) -> usize {
    (test_fraction * n as f64).ceil() as usize
}

/// Fewest rows that leave both sides non-empty. `test_fraction` in (0, 1).
pub fn min_rows(test_fraction: f64) -> usize {
    let mut n = 2;
    while test_size(n, test_fraction) >= n {
        n += 1;
    }
    n
}

pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> AnalyticsResult<SplitIndices> {
    let n_test = test_size(n, test_fraction);
    if n_test == 0 || n_test >= n {
        return Err(AnalyticsError::InsufficientData {
            required: min_rows(test_fraction),
            actual: n,
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let train = indices.split_off(n_test);
    Ok(SplitIndices { train, test: indices })
}

/// Gather rows by index
pub fn take<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}
