// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Robust aggregation of filtered latency samples.

use crate::error::{MetricsError, Result};
use serde::{Deserialize, Serialize};

/// Latency distribution statistics over a filtered sample set, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Median (middle element, or average of the two middle elements)
    pub median: f64,
    /// Population standard deviation
    pub std: f64,
    /// Minimum latency
    pub min: f64,
    /// Maximum latency
    pub max: f64,
    /// Number of samples
    pub sample_count: usize,
}

/// Aggregate a filtered, non-empty sample set.
///
/// The slice is sorted in place before the median is taken, so callers must
/// not rely on its original order afterwards.
///
/// # Errors
///
/// Returns [`MetricsError::EmptyInput`] if `samples` is empty.
pub fn aggregate(samples: &mut [f64]) -> Result<LatencyStats> {
    let average = mean(samples).ok_or(MetricsError::EmptyInput)?;

    samples.sort_by(f64::total_cmp);
    let std = population_std(samples).ok_or(MetricsError::EmptyInput)?;
    let median = median(samples).ok_or(MetricsError::EmptyInput)?;

    let n = samples.len();
    Ok(LatencyStats {
        mean: average,
        median,
        std,
        min: samples[0],
        max: samples[n - 1],
        sample_count: n,
    })
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation (divides by `n`), or `None` for an empty slice.
///
/// A single sample has a deviation of zero.
pub fn population_std(samples: &[f64]) -> Option<f64> {
    let average = mean(samples)?;
    let variance = samples
        .iter()
        .map(|time| {
            let diff = time - average;
            diff * diff
        })
        .sum::<f64>()
        / samples.len() as f64;
    Some(variance.sqrt())
}

/// Median of an already sorted slice, or `None` for an empty slice.
pub fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(3.0));
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_aggregate_sorts_in_place() {
        let mut samples = vec![5.0, 1.0, 4.0, 2.0, 3.0];
        let stats = aggregate(&mut samples).unwrap();

        assert_eq!(samples, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.sample_count, 5);
    }

    #[test]
    fn test_aggregate_population_std() {
        let mut samples = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = aggregate(&mut samples).unwrap();
        assert_eq!(stats.std, 2.0);
        assert_eq!(stats.median, 4.5);
    }

    #[test]
    fn test_aggregate_single_sample() {
        let mut samples = vec![0.25];
        let stats = aggregate(&mut samples).unwrap();
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.median, 0.25);
        assert_eq!(stats.min, stats.max);
    }

    #[test]
    fn test_aggregate_empty_fails() {
        let mut samples: Vec<f64> = Vec::new();
        assert_eq!(aggregate(&mut samples), Err(MetricsError::EmptyInput));
    }
}
