// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark result interface for DL Benchmark.
//!
//! This crate wraps reduced performance metrics in a timestamped
//! [`BenchmarkResult`] and writes them out as JSON and Markdown reports.
//!
//! # Quick Start
//!
//! ```no_run
//! use dlbench_benchmarks::{write_results, BenchmarkResult, OutputFormat};
//! use dlbench_core::reduce_sync;
//!
//! let metrics = reduce_sync(1, &[0.1, 0.11, 0.09, 0.10], 0.0).unwrap();
//! let results = vec![BenchmarkResult::new("tvm/resnet50", metrics)];
//!
//! write_results(&results, "benchmarks/output", OutputFormat::Both).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`result`] - The `BenchmarkResult` struct
//! - [`io`] - I/O operations for reading/writing results
//! - [`markdown`] - Markdown report generation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod io;
pub mod markdown;
pub mod result;

pub use result::BenchmarkResult;

use std::path::Path;
use std::str::FromStr;

/// Which report files to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Raw and combined JSON files only.
    Json,
    /// Markdown summary only.
    Markdown,
    /// JSON files and the Markdown summary.
    #[default]
    Both,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "unknown output format '{}', expected json, markdown or both",
                other
            )),
        }
    }
}

/// Write results to `dir` in the requested format.
///
/// # Errors
///
/// Returns an `io::Error` if writing output files fails.
pub fn write_results(
    results: &[BenchmarkResult],
    dir: impl AsRef<Path>,
    format: OutputFormat,
) -> std::io::Result<()> {
    let dir = dir.as_ref();
    match format {
        OutputFormat::Both => io::write_all_outputs(results, dir),
        OutputFormat::Json => {
            io::ensure_output_dirs(dir)?;
            for result in results {
                io::write_raw_result(result, dir)?;
            }
            io::write_results_json(results, dir.join(io::ALL_RESULTS_FILE))
        }
        OutputFormat::Markdown => io::write_summary(results, dir),
    }
}
