// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Outlier filtering of raw timing samples.
//!
//! Filtering runs in two stages, always in this order:
//!
//! 1. [`delete_incorrect_time`] drops samples below the minimum valid duration
//!    (warm-up noise, timer artifacts).
//! 2. [`three_sigma_rule`] drops samples outside `[mean - 3σ, mean + 3σ]`,
//!    where the mean and σ are computed over the stage-1 output.
//!
//! Swapping the stages changes which samples contribute to the mean and σ.

use crate::stats::{mean, population_std};

/// Number of standard deviations kept on each side of the mean.
pub const SIGMA_BOUND: f64 = 3.0;

/// Keep every sample greater than or equal to `min_valid`.
///
/// The output may be empty. Input order is preserved.
pub fn delete_incorrect_time(samples: &[f64], min_valid: f64) -> Vec<f64> {
    samples
        .iter()
        .copied()
        .filter(|&time| time >= min_valid)
        .collect()
}

/// Keep only samples within three population standard deviations of the mean.
///
/// Both bounds are inclusive. For fewer than two samples σ is zero, so the
/// bound collapses to the mean: a single sample always survives and an empty
/// input stays empty.
pub fn three_sigma_rule(samples: &[f64]) -> Vec<f64> {
    let Some(bounds) = SigmaBounds::from_samples(samples) else {
        return Vec::new();
    };

    samples
        .iter()
        .copied()
        .filter(|&time| bounds.contains(time))
        .collect()
}

/// Apply the threshold filter, then the 3-sigma filter.
pub fn filter_outliers(samples: &[f64], min_valid: f64) -> Vec<f64> {
    let valid = delete_incorrect_time(samples, min_valid);
    let filtered = three_sigma_rule(&valid);

    tracing::debug!(
        raw = samples.len(),
        above_threshold = valid.len(),
        kept = filtered.len(),
        min_valid,
        "Filtered timing samples"
    );

    filtered
}

/// Inclusive acceptance interval of the 3-sigma rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmaBounds {
    /// Lower bound, `mean - 3σ`.
    pub lower: f64,
    /// Upper bound, `mean + 3σ`.
    pub upper: f64,
}

impl SigmaBounds {
    /// Compute the bounds for a sample set. Returns `None` for an empty set.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let average = mean(samples)?;
        let sigma = population_std(samples).unwrap_or(0.0);

        Some(Self {
            lower: average - SIGMA_BOUND * sigma,
            upper: average + SIGMA_BOUND * sigma,
        })
    }

    /// Whether a value lies inside the interval (bounds included).
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}
