// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark result types.
//!
//! This module provides the BenchmarkResult envelope that carries one
//! reduced metrics record to the report writers.

use chrono::{DateTime, Utc};
use dlbench_core::{PerformanceMetrics, ReductionMode};
use serde::{Deserialize, Serialize};

/// Result of one completed benchmark run.
///
/// The metrics record is produced once per run and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Unique identifier for the benchmark target (model, framework, device).
    pub target_id: String,
    /// How the timing samples were collected.
    pub mode: ReductionMode,
    /// Reduced performance metrics.
    pub metrics: PerformanceMetrics,
    /// Timestamp when the result was produced.
    pub timestamp: DateTime<Utc>,
}

impl BenchmarkResult {
    /// Create a new BenchmarkResult.
    pub fn new(target_id: impl Into<String>, metrics: impl Into<PerformanceMetrics>) -> Self {
        let metrics = metrics.into();
        Self {
            target_id: target_id.into(),
            mode: metrics.mode(),
            metrics,
            timestamp: Utc::now(),
        }
    }

    /// File name used for this result in the raw output directory.
    pub fn file_stem(&self) -> String {
        self.target_id.replace(['/', '\\', ' '], "_")
    }
}
