// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Performance-metrics reduction for DL Benchmark.
//!
//! This crate turns the raw timing output of an inference benchmark run into
//! a stable, outlier-resistant summary: latency mean, median, standard
//! deviation, min and max, throughput, and execution time.
//!
//! The pipeline is pure and single-threaded. It performs no I/O; the raw
//! samples come from a launcher and the resulting record goes to a report
//! writer.
//!
//! # Modules
//!
//! - [`filter`] - Threshold and 3-sigma outlier filtering
//! - [`stats`] - Mean, median, population standard deviation, min, max
//! - [`throughput`] - Units per second with the zero-duration sentinel
//! - [`metrics`] - Sync and async reducers and their metrics records
//! - [`error`] - Error taxonomy

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod filter;
pub mod metrics;
pub mod stats;
pub mod throughput;

pub use error::{MetricsError, Result};
pub use metrics::{
    reduce_async, reduce_sync, AsyncMetrics, PerformanceMetrics, ReductionMode, SyncMetrics,
};
pub use stats::{aggregate, LatencyStats};
pub use throughput::{throughput, THROUGHPUT_UNDEFINED};
