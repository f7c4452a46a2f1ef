// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark run configuration.
//!
//! A run is described by a TOML file. Values can be overridden from the
//! environment with the `DLBENCH` prefix and `__` as the nesting separator,
//! e.g. `DLBENCH__PARAMETERS__BATCH_SIZE=8`.
//!
//! # Example
//!
//! ```toml
//! dataset = "/data/imagenet"
//!
//! [model]
//! name = "resnet50_v1"
//!
//! [framework]
//! kind = "tvm"
//! source = "mxnet"
//!
//! [parameters]
//! batch_size = 4
//! iterations = 100
//! test_time_limit = 60
//! min_inference_time = 0.001
//!
//! [inputs]
//! input_shape = [1, 3, 224, 224]
//! normalize = true
//! ```

use super::framework::FrameworkKind;
use super::report::LatencyUnits;
use config::{Config, Environment, File, FileFormat};
use dlbench_core::ReductionMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "DLBENCH";

/// Errors that can occur while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigAdapterError {
    /// The configuration source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value is present but not acceptable
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// The model is given neither by name nor by both file paths
    #[error("Incorrect model parameters. Set model name or file names.")]
    IncorrectModel,
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigAdapterError>;

/// Model location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name, used by launchers that resolve models themselves
    #[serde(default)]
    pub name: Option<String>,
    /// Model description file
    #[serde(default)]
    pub model: Option<PathBuf>,
    /// Model weights file
    #[serde(default)]
    pub weights: Option<PathBuf>,
}

impl ModelConfig {
    /// Human-readable identifier: the name, or the model file stem.
    pub fn display_name(&self) -> String {
        if let Some(name) = non_empty(&self.name) {
            return name.to_string();
        }
        self.model
            .as_deref()
            .and_then(Path::file_stem)
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string())
    }

    /// Both model files are set and non-empty.
    pub fn has_files(&self) -> bool {
        let set = |p: &Option<PathBuf>| p.as_ref().is_some_and(|p| !p.as_os_str().is_empty());
        set(&self.model) && set(&self.weights)
    }

    /// Neither model file is set.
    pub fn has_no_files(&self) -> bool {
        let unset = |p: &Option<PathBuf>| p.as_ref().map_or(true, |p| p.as_os_str().is_empty());
        unset(&self.model) && unset(&self.weights)
    }
}

/// Launcher selection and framework-dependent launcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkConfig {
    /// Launcher family
    pub kind: FrameworkKind,
    /// Source framework of the model (TVM only), defaults to mxnet
    #[serde(default)]
    pub source: Option<String>,
    /// Directory holding the PyTorch C++ benchmark binaries
    #[serde(default)]
    pub cpp_benchmarks_dir: Option<PathBuf>,
    /// TensorRT precision (PyTorch C++ only)
    #[serde(default)]
    pub tensor_rt_precision: Option<String>,
}

/// Framework-independent run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParameters {
    /// Items per inference call
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    /// Iteration ceiling
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    /// Minimum test duration in seconds (0 disables it)
    #[serde(default)]
    pub test_time_limit: f64,
    /// Samples below this duration (seconds) are dropped before aggregation
    #[serde(default)]
    pub min_inference_time: f64,
    /// Target device
    #[serde(default = "default_device")]
    pub device: String,
    /// How the launcher measures time
    #[serde(default = "default_mode")]
    pub mode: ReductionMode,
}

fn default_batch_size() -> u64 {
    1
}

fn default_iterations() -> u64 {
    1
}

fn default_device() -> String {
    "CPU".to_string()
}

fn default_mode() -> ReductionMode {
    ReductionMode::Sync
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            iterations: default_iterations(),
            test_time_limit: 0.0,
            min_inference_time: 0.0,
            device: default_device(),
            mode: default_mode(),
        }
    }
}

/// Input preprocessing settings passed through to the launcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// Name of the model input
    #[serde(default)]
    pub input_name: Option<String>,
    /// Input shape; the first dimension is replaced by the batch size
    #[serde(default)]
    pub input_shape: Option<Vec<u64>>,
    /// Normalize input values
    #[serde(default)]
    pub normalize: bool,
    /// Per-channel mean
    #[serde(default)]
    pub mean: Option<Vec<f64>>,
    /// Per-channel standard deviation
    #[serde(default)]
    pub std: Option<Vec<f64>>,
    /// Channel order permutation
    #[serde(default)]
    pub channel_swap: Option<Vec<u32>>,
}

impl InputConfig {
    /// Input shape with its first dimension replaced by `batch_size`.
    pub fn batched_shape(&self, batch_size: u64) -> Option<Vec<u64>> {
        let shape = self.input_shape.as_ref()?;
        let mut batched = Vec::with_capacity(shape.len().max(1));
        batched.push(batch_size);
        batched.extend(shape.iter().skip(1).copied());
        Some(batched)
    }
}

/// Complete description of one benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Model location
    #[serde(default)]
    pub model: ModelConfig,
    /// Dataset path
    pub dataset: PathBuf,
    /// Launcher selection
    pub framework: FrameworkConfig,
    /// Run parameters
    #[serde(default)]
    pub parameters: RunParameters,
    /// Input preprocessing
    #[serde(default)]
    pub inputs: InputConfig,
    /// Where the launcher writes its timing report
    #[serde(default)]
    pub report_path: Option<PathBuf>,
    /// Units of the latencies in the report, defaults to the launcher's units
    #[serde(default)]
    pub latency_units: Option<LatencyUnits>,
}

impl BenchmarkConfig {
    /// Load a configuration file with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// required fields are missing, or validation fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let builder = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            framework = ?config.framework.kind,
            batch_size = config.parameters.batch_size,
            "Loaded benchmark configuration"
        );

        Ok(config)
    }

    /// Parse a configuration from a TOML string, without environment overrides.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(s, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the deserializer cannot check.
    pub fn validate(&self) -> Result<()> {
        if self.parameters.batch_size == 0 {
            return Err(invalid("parameters.batch_size", "must be at least 1"));
        }
        if self.parameters.iterations == 0 {
            return Err(invalid("parameters.iterations", "must be at least 1"));
        }
        if !(self.parameters.min_inference_time >= 0.0) {
            return Err(invalid(
                "parameters.min_inference_time",
                "must be a non-negative number of seconds",
            ));
        }
        if !(self.parameters.test_time_limit >= 0.0) {
            return Err(invalid(
                "parameters.test_time_limit",
                "must be a non-negative number of seconds",
            ));
        }

        let named = non_empty(&self.model.name).is_some();
        if !self.model.has_files() && !(named && self.model.has_no_files()) {
            return Err(ConfigAdapterError::IncorrectModel);
        }

        Ok(())
    }

    /// Latency units of the report: the configured override or the launcher's own.
    pub fn report_units(&self) -> LatencyUnits {
        self.latency_units
            .unwrap_or_else(|| self.framework.kind.latency_units())
    }

    /// Identifier of this run in reports: `<framework>/<model>`.
    pub fn target_id(&self) -> String {
        format!("{}/{}", self.framework.kind, self.model.display_name())
    }
}

fn invalid(key: &str, reason: &str) -> ConfigAdapterError {
    ConfigAdapterError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
