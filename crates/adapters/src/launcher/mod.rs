// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Collaborators around the reduction pipeline.
//!
//! - **Config**: run configuration from TOML and the environment
//! - **Framework**: per-framework launch command templates
//! - **Report**: timing reports written by launched processes
//! - **Inference loop**: in-process iteration loop producing timing samples
//!
//! # Example
//!
//! ```ignore
//! use dlbench_adapters::launcher::prelude::*;
//!
//! let config = BenchmarkConfig::load("bench.toml")?;
//! let command = Framework::from_config(&config)?.command(&config, &LaunchEnvironment::default())?;
//!
//! // ... the command is run elsewhere ...
//!
//! let report = TimingReport::from_file(&command.report_path)?.into_seconds(config.report_units());
//! let metrics = report.reduce(config.parameters.mode, Some(config.parameters.batch_size), 0.0)?;
//! ```

pub mod config;
pub mod framework;
pub mod inference_loop;
pub mod report;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use super::config::{BenchmarkConfig, ConfigAdapterError};
    pub use super::framework::{
        Framework, FrameworkError, FrameworkKind, LaunchCommand, LaunchEnvironment,
    };
    pub use super::inference_loop::{time_call, IterationLoop};
    pub use super::report::{LatencyUnits, ReportError, TimingReport};
}

/// Re-export the main types at module level.
pub use self::config::BenchmarkConfig;
pub use self::framework::{Framework, LaunchCommand, LaunchEnvironment};
pub use self::inference_loop::IterationLoop;
pub use self::report::{LatencyUnits, TimingReport};
