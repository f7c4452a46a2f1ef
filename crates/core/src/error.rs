// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy of the reduction pipeline.
//!
//! None of these errors is retried or replaced by a default value here.
//! The orchestration layer decides whether to abort the run, skip it, or
//! relaunch the benchmark process.

use thiserror::Error;

/// Errors that can occur while reducing timing samples into metrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    /// The raw sample sequence is empty where a first sample or a sum is required.
    #[error("Insufficient samples: the raw timing sequence is empty")]
    InsufficientSamples,

    /// Every sample was rejected by the threshold or the 3-sigma filter.
    #[error("Empty input: no timing samples left to aggregate after filtering")]
    EmptyInput,

    /// Async reduction was asked to divide by a zero iteration count.
    #[error("Iteration count must be at least 1 to compute an average latency")]
    ZeroIterations,
}

/// Result type for reduction operations.
pub type Result<T> = std::result::Result<T, MetricsError>;
