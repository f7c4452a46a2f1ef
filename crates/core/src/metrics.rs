// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sync and async reduction of timing samples into performance metrics.
//!
//! # Sync mode
//!
//! Every inference iteration is timed individually. [`reduce_sync`] keeps two
//! views of the same run apart:
//!
//! - `execution_time` and `first_inference_time` come from the raw samples.
//! - Every latency statistic comes from the filtered samples.
//!
//! Throughput is derived from the median latency of a single iteration.
//!
//! # Async mode
//!
//! Only the total duration and the iteration count are known.
//! [`reduce_async`] divides; there is no filtering stage.
//!
//! # Example
//!
//! ```
//! use dlbench_core::metrics::{reduce_async, reduce_sync};
//!
//! let sync = reduce_sync(1, &[0.1, 0.11, 0.09, 0.10], 0.0).unwrap();
//! assert_eq!(sync.first_inference_time, 0.1);
//!
//! let batched = reduce_async(10.0, 4, 5).unwrap();
//! assert_eq!(batched.latency_avg, 2.0);
//! assert_eq!(batched.throughput, 2.0);
//! ```

use crate::error::{MetricsError, Result};
use crate::filter::filter_outliers;
use crate::stats::aggregate;
use crate::throughput::throughput;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimals kept for execution-time and throughput fields.
pub const TIME_PRECISION: i32 = 3;

/// Decimals kept for latency fields.
pub const LATENCY_PRECISION: i32 = 5;

/// Round `value` to `decimals` places after the point.
///
/// Rounds the exact binary value through its decimal rendering, so `0.0055`
/// (stored just below the tie) becomes `0.005`. Scaling by a power of ten
/// first would round the product up instead.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let places = decimals.max(0) as usize;
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

/// How the timing samples of a run were collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionMode {
    /// Per-iteration timings.
    Sync,
    /// Total duration plus iteration count.
    Async,
}

impl fmt::Display for ReductionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => write!(f, "sync"),
            Self::Async => write!(f, "async"),
        }
    }
}

impl FromStr for ReductionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sync" => Ok(Self::Sync),
            "async" => Ok(Self::Async),
            other => Err(format!("unknown mode '{}', expected sync or async", other)),
        }
    }
}

/// Metrics of a sync-mode run. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncMetrics {
    /// Sum of all raw samples
    pub execution_time: f64,
    /// First raw sample (cold start)
    pub first_inference_time: f64,
    /// Mean of the filtered samples
    pub latency_avg: f64,
    /// Median of the filtered samples
    pub latency_median: f64,
    /// Population standard deviation of the filtered samples
    pub latency_std: f64,
    /// Largest filtered sample
    pub latency_max: f64,
    /// Smallest filtered sample
    pub latency_min: f64,
    /// Items per second, from the median latency
    pub throughput: f64,
}

impl SyncMetrics {
    /// Comma-separated `"<avg>,<fps>,<latency>"` line.
    pub fn summary_line(&self) -> String {
        format!(
            "{:.3},{:.3},{:.3}",
            self.latency_avg, self.throughput, self.latency_median
        )
    }

    /// Log the metrics in their human-readable form.
    pub fn log_metrics(&self) {
        tracing::info!("Average time of single pass : {:.3}", self.latency_avg);
        tracing::info!("FPS : {:.3}", self.throughput);
        tracing::info!("Latency : {:.3}", self.latency_median);
    }
}

/// Metrics of an async-mode run. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsyncMetrics {
    /// Total duration as reported
    pub execution_time: f64,
    /// Total duration divided by the iteration count
    pub latency_avg: f64,
    /// Items per second over the whole run
    pub throughput: f64,
}

impl AsyncMetrics {
    /// Comma-separated `"<avg>,<fps>"` line.
    pub fn summary_line(&self) -> String {
        format!("{:.3},{:.3}", self.latency_avg, self.throughput)
    }

    /// Log the metrics in their human-readable form.
    pub fn log_metrics(&self) {
        tracing::info!("Average time of single pass : {:.3}", self.latency_avg);
        tracing::info!("FPS : {:.3}", self.throughput);
    }
}

/// Metrics of either mode.
///
/// Serialized untagged, so a report carries the flat record of the mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerformanceMetrics {
    /// Sync-mode record
    Sync(SyncMetrics),
    /// Async-mode record
    Async(AsyncMetrics),
}

impl PerformanceMetrics {
    /// Mode the record was produced by.
    pub fn mode(&self) -> ReductionMode {
        match self {
            Self::Sync(_) => ReductionMode::Sync,
            Self::Async(_) => ReductionMode::Async,
        }
    }

    /// Total execution time in seconds.
    pub fn execution_time(&self) -> f64 {
        match self {
            Self::Sync(m) => m.execution_time,
            Self::Async(m) => m.execution_time,
        }
    }

    /// Average latency in seconds.
    pub fn latency_avg(&self) -> f64 {
        match self {
            Self::Sync(m) => m.latency_avg,
            Self::Async(m) => m.latency_avg,
        }
    }

    /// Throughput, possibly the undefined sentinel.
    pub fn throughput(&self) -> f64 {
        match self {
            Self::Sync(m) => m.throughput,
            Self::Async(m) => m.throughput,
        }
    }

    /// See [`SyncMetrics::summary_line`] and [`AsyncMetrics::summary_line`].
    pub fn summary_line(&self) -> String {
        match self {
            Self::Sync(m) => m.summary_line(),
            Self::Async(m) => m.summary_line(),
        }
    }

    /// See [`SyncMetrics::log_metrics`] and [`AsyncMetrics::log_metrics`].
    pub fn log_metrics(&self) {
        match self {
            Self::Sync(m) => m.log_metrics(),
            Self::Async(m) => m.log_metrics(),
        }
    }
}

impl From<SyncMetrics> for PerformanceMetrics {
    fn from(metrics: SyncMetrics) -> Self {
        Self::Sync(metrics)
    }
}

impl From<AsyncMetrics> for PerformanceMetrics {
    fn from(metrics: AsyncMetrics) -> Self {
        Self::Async(metrics)
    }
}

/// Reduce per-iteration timings (seconds) into a [`SyncMetrics`] record.
///
/// # Errors
///
/// - [`MetricsError::InsufficientSamples`] if `raw_samples` is empty.
/// - [`MetricsError::EmptyInput`] if filtering rejects every sample.
pub fn reduce_sync(
    batch_size: u64,
    raw_samples: &[f64],
    min_valid_time: f64,
) -> Result<SyncMetrics> {
    let first_inference_time = *raw_samples
        .first()
        .ok_or(MetricsError::InsufficientSamples)?;
    let execution_time: f64 = raw_samples.iter().sum();

    let mut filtered = filter_outliers(raw_samples, min_valid_time);
    let stats = aggregate(&mut filtered)?;
    let fps = throughput(batch_size as f64, stats.median);

    tracing::debug!(
        batch_size,
        raw = raw_samples.len(),
        kept = stats.sample_count,
        median = stats.median,
        "Reduced sync-mode samples"
    );

    Ok(SyncMetrics {
        execution_time: round_to(execution_time, TIME_PRECISION),
        first_inference_time: round_to(first_inference_time, LATENCY_PRECISION),
        latency_avg: round_to(stats.mean, LATENCY_PRECISION),
        latency_median: round_to(stats.median, LATENCY_PRECISION),
        latency_std: round_to(stats.std, LATENCY_PRECISION),
        latency_max: round_to(stats.max, LATENCY_PRECISION),
        latency_min: round_to(stats.min, LATENCY_PRECISION),
        throughput: round_to(fps, TIME_PRECISION),
    })
}

/// Reduce a total duration (seconds) over `iteration_count` batches into an
/// [`AsyncMetrics`] record.
///
/// # Errors
///
/// Returns [`MetricsError::ZeroIterations`] if `iteration_count` is zero.
pub fn reduce_async(
    total_duration: f64,
    batch_size: u64,
    iteration_count: u64,
) -> Result<AsyncMetrics> {
    if iteration_count == 0 {
        return Err(MetricsError::ZeroIterations);
    }

    let average_time = total_duration / iteration_count as f64;
    let fps = throughput(batch_size as f64 * iteration_count as f64, total_duration);

    tracing::debug!(
        batch_size,
        iteration_count,
        total_duration,
        "Reduced async-mode duration"
    );

    Ok(AsyncMetrics {
        execution_time: round_to(total_duration, TIME_PRECISION),
        latency_avg: round_to(average_time, LATENCY_PRECISION),
        throughput: round_to(fps, TIME_PRECISION),
    })
}
