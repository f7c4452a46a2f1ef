// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark targets and launcher collaborators for DL Benchmark.
//!
//! This crate provides the [`BenchTarget`] trait for anything that can
//! produce a [`BenchmarkResult`], the [`ReportTarget`] that reduces a timing
//! report written by a launched benchmark process, and the [`launcher`]
//! collaborators (configuration, framework commands, reports, iteration loop).

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod launcher;

use dlbench_benchmarks::BenchmarkResult;
use dlbench_core::ReductionMode;
use launcher::config::{BenchmarkConfig, ConfigAdapterError};
use launcher::framework::{Framework, FrameworkError, LaunchCommand, LaunchEnvironment};
use launcher::report::{LatencyUnits, ReportError, TimingReport};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from any launcher collaborator.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigAdapterError),

    /// Launch command error
    #[error(transparent)]
    Framework(#[from] FrameworkError),

    /// Report reading or reduction error
    #[error("{target}: {source}")]
    Report {
        target: String,
        #[source]
        source: ReportError,
    },
}

/// Benchmark target trait.
///
/// Implement this trait for any component that should be benchmarkable
/// through the result interface.
pub trait BenchTarget {
    /// Returns the unique identifier for this benchmark target.
    fn id(&self) -> String;

    /// Run the benchmark and return results.
    fn run(&self) -> Result<BenchmarkResult, AdapterError>;
}

/// Target backed by a timing report file of a finished launcher run.
#[derive(Debug, Clone)]
pub struct ReportTarget {
    id: String,
    report_path: PathBuf,
    mode: ReductionMode,
    batch_size: Option<u64>,
    min_valid_time: f64,
    units: LatencyUnits,
}

impl ReportTarget {
    /// Sync-mode target over a report in seconds.
    pub fn new(id: impl Into<String>, report_path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            report_path: report_path.into(),
            mode: ReductionMode::Sync,
            batch_size: None,
            min_valid_time: 0.0,
            units: LatencyUnits::Seconds,
        }
    }

    /// Target using the mode, batch size, threshold and units of `config`.
    pub fn from_config(config: &BenchmarkConfig, report_path: impl Into<PathBuf>) -> Self {
        Self::new(config.target_id(), report_path)
            .with_mode(config.parameters.mode)
            .with_batch_size(config.parameters.batch_size)
            .with_min_valid_time(config.parameters.min_inference_time)
            .with_units(config.report_units())
    }

    /// Set the result identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the reduction mode.
    pub fn with_mode(mut self, mode: ReductionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the batch size, overriding the one in the report.
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Set the minimum valid inference time in seconds.
    pub fn with_min_valid_time(mut self, min_valid_time: f64) -> Self {
        self.min_valid_time = min_valid_time;
        self
    }

    /// Set the units of the values in the report.
    pub fn with_units(mut self, units: LatencyUnits) -> Self {
        self.units = units;
        self
    }

    /// Path of the report file.
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    fn reduce(&self) -> Result<BenchmarkResult, ReportError> {
        let report = TimingReport::from_file(&self.report_path)?.into_seconds(self.units);
        let metrics = report.reduce(self.mode, self.batch_size, self.min_valid_time)?;
        Ok(BenchmarkResult::new(self.id.clone(), metrics))
    }
}

impl BenchTarget for ReportTarget {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn run(&self) -> Result<BenchmarkResult, AdapterError> {
        let result = self.reduce().map_err(|source| AdapterError::Report {
            target: self.id.clone(),
            source,
        })?;

        tracing::info!(
            target_id = %result.target_id,
            mode = %result.mode,
            report = %self.report_path.display(),
            "Benchmark report reduced"
        );
        result.metrics.log_metrics();

        Ok(result)
    }
}

/// Load a run configuration and build its launch command.
pub fn load_launch_command(
    config_path: impl AsRef<Path>,
    env: &LaunchEnvironment,
) -> Result<(BenchmarkConfig, LaunchCommand), AdapterError> {
    let config = BenchmarkConfig::load(config_path)?;
    let command = Framework::from_config(&config)?.command(&config, env)?;
    Ok((config, command))
}

/// Outcome of running several targets.
#[derive(Debug, Default)]
pub struct TargetRun {
    /// Results of the targets that succeeded
    pub results: Vec<BenchmarkResult>,
    /// Targets that failed, with their errors
    pub failures: Vec<(String, AdapterError)>,
}

/// Run every target, logging and skipping the ones that fail.
pub fn run_targets(targets: &[Box<dyn BenchTarget>]) -> TargetRun {
    let mut run = TargetRun::default();

    for target in targets {
        match target.run() {
            Ok(result) => run.results.push(result),
            Err(err) => {
                tracing::warn!(target_id = %target.id(), error = %err, "Benchmark target failed");
                run.failures.push((target.id(), err));
            }
        }
    }

    run
}
