// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Timing reports written by launched benchmark processes.
//!
//! A report is a JSON object:
//!
//! ```json
//! {
//!   "latencies": [12.1, 11.9, 12.0],
//!   "execution_time": 36.0,
//!   "iterations_num": 3,
//!   "batch_size": 1
//! }
//! ```
//!
//! Every field is optional, but sync reduction needs `latencies` and async
//! reduction needs either `execution_time` or `latencies`.

use dlbench_core::{
    reduce_async, reduce_sync, MetricsError, PerformanceMetrics, ReductionMode,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while reading or reducing a timing report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report file could not be read
    #[error("Failed to read timing report: {0}")]
    Io(#[from] std::io::Error),

    /// The report is not valid JSON of the expected shape
    #[error("Failed to parse timing report: {0}")]
    Parse(#[from] serde_json::Error),

    /// The report lacks the data the requested mode needs
    #[error("Timing report has no {0}")]
    MissingField(&'static str),

    /// Reduction failed
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Time unit of the values in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyUnits {
    /// Seconds
    Seconds,
    /// Milliseconds
    Milliseconds,
}

impl LatencyUnits {
    /// Convert a value in these units to seconds.
    pub fn to_seconds(&self, value: f64) -> f64 {
        match self {
            Self::Seconds => value,
            Self::Milliseconds => value / 1000.0,
        }
    }
}

impl fmt::Display for LatencyUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds => write!(f, "seconds"),
            Self::Milliseconds => write!(f, "milliseconds"),
        }
    }
}

impl FromStr for LatencyUnits {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s" | "sec" | "seconds" => Ok(Self::Seconds),
            "ms" | "milliseconds" => Ok(Self::Milliseconds),
            other => Err(format!(
                "unknown latency units '{}', expected seconds or milliseconds",
                other
            )),
        }
    }
}

/// Raw timing output of one benchmark process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    /// Per-iteration latencies in execution order
    #[serde(default, alias = "time_infer")]
    pub latencies: Vec<f64>,
    /// Total execution time, if the launcher computed it
    #[serde(default)]
    pub execution_time: Option<f64>,
    /// Number of iterations run
    #[serde(default, alias = "iterations")]
    pub iterations_num: Option<u64>,
    /// Batch size the launcher used
    #[serde(default)]
    pub batch_size: Option<u64>,
}

impl TimingReport {
    /// Read a report from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let report = Self::from_json_str(&content)?;

        tracing::debug!(
            path = %path.as_ref().display(),
            samples = report.latencies.len(),
            "Read timing report"
        );

        Ok(report)
    }

    /// Parse a report from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Convert every time value from `units` to seconds.
    pub fn into_seconds(mut self, units: LatencyUnits) -> Self {
        for latency in &mut self.latencies {
            *latency = units.to_seconds(*latency);
        }
        self.execution_time = self.execution_time.map(|t| units.to_seconds(t));
        self
    }

    /// Total duration: the reported execution time, or the sum of latencies.
    pub fn total_duration(&self) -> Option<f64> {
        self.execution_time.or_else(|| {
            (!self.latencies.is_empty()).then(|| self.latencies.iter().sum())
        })
    }

    /// Iteration count: the reported one, or the number of latencies.
    pub fn iteration_count(&self) -> u64 {
        self.iterations_num
            .unwrap_or(self.latencies.len() as u64)
    }

    /// Reduce the report, whose values must already be in seconds.
    ///
    /// `batch_size` falls back to the batch size in the report, then to 1.
    pub fn reduce(
        &self,
        mode: ReductionMode,
        batch_size: Option<u64>,
        min_valid_time: f64,
    ) -> Result<PerformanceMetrics> {
        let batch_size = batch_size.or(self.batch_size).unwrap_or(1);

        let metrics = match mode {
            ReductionMode::Sync => {
                if self.latencies.is_empty() {
                    return Err(ReportError::MissingField("latencies"));
                }
                reduce_sync(batch_size, &self.latencies, min_valid_time)?.into()
            }
            ReductionMode::Async => {
                let total = self
                    .total_duration()
                    .ok_or(ReportError::MissingField("execution_time"))?;
                reduce_async(total, batch_size, self.iteration_count())?.into()
            }
        };

        Ok(metrics)
    }
}
