// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! I/O operations for benchmark results.
//!
//! This module reads and writes benchmark results to the filesystem.
//! Given an output directory, the layout is:
//!
//! - `<dir>/raw/<target>.json` - one file per result
//! - `<dir>/all_results.json` - combined results
//! - `<dir>/summary.md` - Markdown summary

use crate::markdown;
use crate::result::BenchmarkResult;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default output directory path.
pub const OUTPUT_DIR: &str = "benchmarks/output";

/// Raw results subdirectory name.
pub const RAW_DIR: &str = "raw";

/// Combined results file name.
pub const ALL_RESULTS_FILE: &str = "all_results.json";

/// Summary file name.
pub const SUMMARY_FILE: &str = "summary.md";

/// Ensure the output directory and its raw subdirectory exist.
pub fn ensure_output_dirs(dir: impl AsRef<Path>) -> io::Result<()> {
    fs::create_dir_all(dir.as_ref().join(RAW_DIR))
}

/// Write benchmark results to a JSON file.
pub fn write_results_json(results: &[BenchmarkResult], path: impl AsRef<Path>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(results)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    fs::write(path, json)
}

/// Write an individual result to the raw directory and return its path.
pub fn write_raw_result(result: &BenchmarkResult, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
    write_raw_file(result, dir.as_ref(), &result.file_stem())
}

fn write_raw_file(result: &BenchmarkResult, dir: &Path, stem: &str) -> io::Result<PathBuf> {
    ensure_output_dirs(dir)?;
    let path = dir.join(RAW_DIR).join(format!("{}.json", stem));
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Write the summary markdown file.
pub fn write_summary(results: &[BenchmarkResult], dir: impl AsRef<Path>) -> io::Result<()> {
    ensure_output_dirs(&dir)?;
    let summary = markdown::generate_summary(results);
    fs::write(dir.as_ref().join(SUMMARY_FILE), summary)
}

/// Write all benchmark outputs (raw JSON, combined JSON and summary).
pub fn write_all_outputs(results: &[BenchmarkResult], dir: impl AsRef<Path>) -> io::Result<()> {
    let dir = dir.as_ref();
    ensure_output_dirs(dir)?;

    // Distinct ids can share a file stem; suffix later ones.
    let mut used = HashSet::new();
    for result in results {
        let base = result.file_stem();
        let mut stem = base.clone();
        let mut n = 2;
        while !used.insert(stem.clone()) {
            stem = format!("{}_{}", base, n);
            n += 1;
        }
        if stem != base {
            tracing::warn!(
                target_id = %result.target_id,
                file = %stem,
                "Raw result file name already taken, using a suffix"
            );
        }
        write_raw_file(result, dir, &stem)?;
    }

    write_results_json(results, dir.join(ALL_RESULTS_FILE))?;
    write_summary(results, dir)?;

    tracing::info!(
        results = results.len(),
        output_dir = %dir.display(),
        "Benchmark outputs written"
    );

    Ok(())
}

/// Read results from a JSON file.
pub fn read_results_json(path: impl AsRef<Path>) -> io::Result<Vec<BenchmarkResult>> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
