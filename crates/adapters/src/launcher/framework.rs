// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Framework launch templates.
//!
//! Each supported launcher is a variant of [`Framework`]. A variant knows the
//! executable it runs, the arguments it needs, and the units of the
//! latencies it reports. Commands are built but never executed here.

use super::config::{non_empty, BenchmarkConfig, ConfigAdapterError};
use super::report::LatencyUnits;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Python script driving TVM inference for MXNet models.
pub const TVM_MXNET_SCRIPT: &str = "inference_tvm_mxnet.py";

/// PyTorch C++ benchmark binary.
pub const PYTORCH_BENCHMARK: &str = "pytorch_benchmark";

/// PyTorch C++ benchmark binary built with TensorRT.
pub const PYTORCH_TENSORRT_BENCHMARK: &str = "pytorch_tensorrt_benchmark";

/// Errors that can occur while building a launch command.
#[derive(Debug, Error)]
pub enum FrameworkError {
    /// The model source framework is not one TVM can import
    #[error("Unknown source framework '{name}'. TVM supports: {supported}")]
    UnknownSource { name: String, supported: String },

    /// The source framework is known but has no launch template
    #[error("Unknown framework {0}")]
    UnsupportedFramework(String),

    /// The PyTorch C++ benchmark directory or binary is missing
    #[error("Must provide valid path to the folder with PyTorch Cpp benchmark (cpp_benchmarks_dir): {0}")]
    InvalidBenchmarkPath(String),

    /// TensorRT precision other than FP32
    #[error("Unknown TensorRT precision: {0}")]
    UnknownPrecision(String),

    /// A parameter required by the launcher is not set
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// The configuration no longer passes validation
    #[error(transparent)]
    Config(#[from] ConfigAdapterError),
}

/// Result type for framework operations.
pub type Result<T> = std::result::Result<T, FrameworkError>;

/// Launcher family as written in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkKind {
    /// TVM Python benchmark
    Tvm,
    /// PyTorch C++ benchmark
    PytorchCpp,
}

impl FrameworkKind {
    /// Units of the latencies this launcher writes to its report.
    pub fn latency_units(&self) -> LatencyUnits {
        match self {
            Self::Tvm => LatencyUnits::Seconds,
            Self::PytorchCpp => LatencyUnits::Milliseconds,
        }
    }

    /// Benchmark application name.
    pub fn app_name(&self) -> &'static str {
        match self {
            Self::Tvm => "tvm_python_benchmark",
            Self::PytorchCpp => "pytorch_cpp_benchmark",
        }
    }
}

impl fmt::Display for FrameworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tvm => write!(f, "tvm"),
            Self::PytorchCpp => write!(f, "pytorch_cpp"),
        }
    }
}

/// Source framework of a model compiled with TVM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TvmSource {
    /// Apache MXNet
    MxNet,
    /// ONNX
    Onnx,
    /// Native TVM
    Tvm,
    /// TensorFlow
    Tf,
    /// TensorFlow Lite
    TfLite,
    /// PyTorch
    PyTorch,
}

impl TvmSource {
    /// Every accepted source name.
    pub const SUPPORTED: [&'static str; 6] = ["mxnet", "onnx", "tvm", "tf", "tflite", "pytorch"];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MxNet => "mxnet",
            Self::Onnx => "onnx",
            Self::Tvm => "tvm",
            Self::Tf => "tf",
            Self::TfLite => "tflite",
            Self::PyTorch => "pytorch",
        }
    }
}

impl FromStr for TvmSource {
    type Err = FrameworkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mxnet" => Ok(Self::MxNet),
            "onnx" => Ok(Self::Onnx),
            "tvm" => Ok(Self::Tvm),
            "tf" => Ok(Self::Tf),
            "tflite" => Ok(Self::TfLite),
            "pytorch" => Ok(Self::PyTorch),
            _ => Err(FrameworkError::UnknownSource {
                name: s.to_string(),
                supported: Self::SUPPORTED.join(", "),
            }),
        }
    }
}

/// Where launch scripts and logs live on this machine.
#[derive(Debug, Clone)]
pub struct LaunchEnvironment {
    /// Python interpreter
    pub python: String,
    /// Directory containing the inference scripts
    pub scripts_dir: PathBuf,
    /// Directory for timing reports without an explicit path
    pub logs_dir: PathBuf,
}

impl Default for LaunchEnvironment {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            scripts_dir: PathBuf::from("inference"),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

/// A fully assembled launch invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    /// Executable
    pub program: String,
    /// Arguments, one element per argv entry
    pub args: Vec<String>,
    /// Timing report the launched process will write
    pub report_path: PathBuf,
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}

/// Launcher resolved from a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Framework {
    /// TVM Python benchmark for a model imported from `source`
    Tvm {
        /// Source framework of the model
        source: TvmSource,
    },
    /// PyTorch C++ benchmark binary
    PytorchCpp {
        /// Path of the benchmark binary
        benchmark_path: PathBuf,
    },
}

impl Framework {
    /// Resolve the launcher for a configuration.
    ///
    /// # Errors
    ///
    /// - TVM: unknown source name, or a source without a launch template.
    /// - PyTorch C++: missing benchmark directory or binary, unknown TensorRT precision.
    pub fn from_config(config: &BenchmarkConfig) -> Result<Self> {
        match config.framework.kind {
            FrameworkKind::Tvm => {
                let source = match non_empty(&config.framework.source) {
                    Some(name) => name.parse()?,
                    None => TvmSource::MxNet,
                };
                if source != TvmSource::MxNet {
                    return Err(FrameworkError::UnsupportedFramework(
                        source.as_str().to_string(),
                    ));
                }
                Ok(Self::Tvm { source })
            }
            FrameworkKind::PytorchCpp => {
                let dir = config
                    .framework
                    .cpp_benchmarks_dir
                    .as_deref()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .ok_or_else(|| FrameworkError::InvalidBenchmarkPath("not set".to_string()))?;

                let binary = match non_empty(&config.framework.tensor_rt_precision) {
                    Some("FP32") => PYTORCH_TENSORRT_BENCHMARK,
                    Some(other) => return Err(FrameworkError::UnknownPrecision(other.to_string())),
                    None => PYTORCH_BENCHMARK,
                };

                let benchmark_path = dir.join(binary);
                if !benchmark_path.is_file() {
                    return Err(FrameworkError::InvalidBenchmarkPath(
                        benchmark_path.display().to_string(),
                    ));
                }
                Ok(Self::PytorchCpp { benchmark_path })
            }
        }
    }

    /// Launcher family of this variant.
    pub fn kind(&self) -> FrameworkKind {
        match self {
            Self::Tvm { .. } => FrameworkKind::Tvm,
            Self::PytorchCpp { .. } => FrameworkKind::PytorchCpp,
        }
    }

    /// Default report file name, stamped with `now`.
    pub fn default_report_name(&self, model_name: &str, now: DateTime<Local>) -> String {
        let prefix = match self {
            Self::Tvm { .. } => "tvm_benchmark",
            Self::PytorchCpp { .. } => "pytorch_benchmark",
        };
        format!(
            "{}_{}_{}.json",
            prefix,
            model_name,
            now.format("%d.%m.%y_%H:%M:%S")
        )
    }

    /// Build the launch command for `config`.
    pub fn command(
        &self,
        config: &BenchmarkConfig,
        env: &LaunchEnvironment,
    ) -> Result<LaunchCommand> {
        config.validate()?;

        let report_path = config.report_path.clone().unwrap_or_else(|| {
            env.logs_dir
                .join(self.default_report_name(&config.model.display_name(), Local::now()))
        });

        let command = match self {
            Self::Tvm { .. } => tvm_command(config, env, report_path)?,
            Self::PytorchCpp { benchmark_path } => {
                pytorch_cpp_command(config, benchmark_path, report_path)?
            }
        };

        tracing::debug!(
            app = self.kind().app_name(),
            command = %command,
            "Built launch command"
        );

        Ok(command)
    }
}

/// Argument list under construction.
#[derive(Debug, Default)]
struct Args(Vec<String>);

impl Args {
    fn positional(&mut self, value: impl ToString) -> &mut Self {
        self.0.push(value.to_string());
        self
    }

    fn flag(&mut self, flag: &str) -> &mut Self {
        self.0.push(flag.to_string());
        self
    }

    fn value(&mut self, flag: &str, value: impl ToString) -> &mut Self {
        self.0.push(flag.to_string());
        self.0.push(value.to_string());
        self
    }

    fn path(&mut self, flag: &str, value: &Path) -> &mut Self {
        self.value(flag, value.display())
    }

    fn list<T: ToString>(&mut self, flag: &str, values: &[T]) -> &mut Self {
        self.0.push(flag.to_string());
        self.0.extend(values.iter().map(ToString::to_string));
        self
    }

    fn optional(&mut self, flag: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.value(flag, value);
        }
        self
    }

    fn optional_list<T: ToString>(&mut self, flag: &str, values: Option<&Vec<T>>) -> &mut Self {
        if let Some(values) = values {
            self.list(flag, values);
        }
        self
    }
}

fn tvm_command(
    config: &BenchmarkConfig,
    env: &LaunchEnvironment,
    report_path: PathBuf,
) -> Result<LaunchCommand> {
    let params = &config.parameters;
    let inputs = &config.inputs;
    let shape = inputs
        .batched_shape(params.batch_size)
        .ok_or(FrameworkError::MissingParameter("inputs.input_shape"))?;

    let mut args = Args::default();
    args.positional(env.scripts_dir.join(TVM_MXNET_SCRIPT).display());

    let name = non_empty(&config.model.name);
    match (name, &config.model.model, &config.model.weights) {
        (Some(name), _, _) if config.model.has_no_files() => {
            args.value("-mn", name);
        }
        (_, Some(model), Some(weights)) if config.model.has_files() => {
            args.path("-m", model).path("-w", weights);
        }
        _ => return Err(ConfigAdapterError::IncorrectModel.into()),
    }

    args.path("-i", &config.dataset)
        .list("-is", &shape)
        .value("-b", params.batch_size)
        .value("-ni", params.iterations)
        .path("--report_path", &report_path)
        .optional("--input_name", non_empty(&inputs.input_name));
    if inputs.normalize {
        args.flag("--norm");
    }
    args.optional_list("--mean", inputs.mean.as_ref())
        .optional_list("--std", inputs.std.as_ref())
        .optional_list("--channel_swap", inputs.channel_swap.as_ref())
        .value("--device", &params.device)
        .value("--time", params.test_time_limit);

    Ok(LaunchCommand {
        program: env.python.clone(),
        args: args.0,
        report_path,
    })
}

fn pytorch_cpp_command(
    config: &BenchmarkConfig,
    benchmark_path: &Path,
    report_path: PathBuf,
) -> Result<LaunchCommand> {
    let params = &config.parameters;
    let inputs = &config.inputs;
    let model = config
        .model
        .model
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(FrameworkError::MissingParameter("model.model"))?;

    let mut args = Args::default();
    args.path("-m", model)
        .path("-i", &config.dataset)
        .value("-b", params.batch_size)
        .value("-ni", params.iterations)
        .value("-t", params.test_time_limit)
        .value("-d", &params.device)
        .path("--report_path", &report_path)
        .optional("--input_name", non_empty(&inputs.input_name))
        .optional_list(
            "--input_shape",
            inputs.batched_shape(params.batch_size).as_ref(),
        )
        .optional_list("--mean", inputs.mean.as_ref())
        .optional_list("--std", inputs.std.as_ref());

    Ok(LaunchCommand {
        program: benchmark_path.display().to_string(),
        args: args.0,
        report_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tvm_config(extra: &str) -> BenchmarkConfig {
        BenchmarkConfig::from_toml_str(&format!(
            r#"
            dataset = "/data/imagenet"
            report_path = "/tmp/report.json"
            [model]
            name = "resnet50_v1"
            [framework]
            kind = "tvm"
            {extra}
            [parameters]
            batch_size = 2
            iterations = 10
            test_time_limit = 5.5
            [inputs]
            input_shape = [1, 3, 224, 224]
            "#
        ))
        .unwrap()
    }

    fn env() -> LaunchEnvironment {
        LaunchEnvironment {
            python: "python3".to_string(),
            scripts_dir: PathBuf::from("/opt/scripts"),
            logs_dir: PathBuf::from("/var/log/bench"),
        }
    }

    #[test]
    fn test_tvm_source_parse() {
        assert_eq!("MXNet".parse::<TvmSource>().unwrap(), TvmSource::MxNet);
        assert_eq!("tflite".parse::<TvmSource>().unwrap(), TvmSource::TfLite);

        let err = "caffe".parse::<TvmSource>().unwrap_err();
        assert!(err.to_string().contains("mxnet, onnx, tvm, tf, tflite, pytorch"));
    }

    #[test]
    fn test_tvm_defaults_to_mxnet() {
        let framework = Framework::from_config(&tvm_config("")).unwrap();
        assert_eq!(framework, Framework::Tvm { source: TvmSource::MxNet });
        assert_eq!(framework.kind().latency_units(), LatencyUnits::Seconds);
    }

    #[test]
    fn test_tvm_known_source_without_template() {
        let err = Framework::from_config(&tvm_config("source = \"onnx\"")).unwrap_err();
        assert!(matches!(err, FrameworkError::UnsupportedFramework(ref s) if s == "onnx"));
    }

    #[test]
    fn test_tvm_command_by_name() {
        let config = tvm_config("source = \"mxnet\"");
        let command = Framework::from_config(&config)
            .unwrap()
            .command(&config, &env())
            .unwrap();

        assert_eq!(command.program, "python3");
        assert_eq!(
            command.to_string(),
            "python3 /opt/scripts/inference_tvm_mxnet.py -mn resnet50_v1 -i /data/imagenet \
             -is 2 3 224 224 -b 2 -ni 10 --report_path /tmp/report.json --device CPU --time 5.5"
        );
        assert_eq!(command.report_path, PathBuf::from("/tmp/report.json"));
    }

    #[test]
    fn test_tvm_command_with_files_and_options() {
        let mut config = tvm_config("");
        config.model.name = None;
        config.model.model = Some(PathBuf::from("/models/net.json"));
        config.model.weights = Some(PathBuf::from("/models/net.params"));
        config.inputs.input_name = Some("data".to_string());
        config.inputs.normalize = true;
        config.inputs.mean = Some(vec![0.5, 0.5, 0.5]);
        config.inputs.channel_swap = Some(vec![2, 1, 0]);

        let command = Framework::Tvm { source: TvmSource::MxNet }
            .command(&config, &env())
            .unwrap();
        let args = command.args.join(" ");

        assert!(args.contains("-m /models/net.json -w /models/net.params -i /data/imagenet"));
        assert!(args.contains("--input_name data --norm --mean 0.5 0.5 0.5 --channel_swap 2 1 0"));
        assert!(!args.contains("-mn"));
    }

    #[test]
    fn test_tvm_command_requires_shape() {
        let mut config = tvm_config("");
        config.inputs.input_shape = None;
        let err = Framework::Tvm { source: TvmSource::MxNet }
            .command(&config, &env())
            .unwrap_err();
        assert!(matches!(err, FrameworkError::MissingParameter("inputs.input_shape")));
    }

    #[test]
    fn test_command_revalidates_config() {
        let mut config = tvm_config("");
        config.model.name = None;
        config.model.model = Some(PathBuf::from("/models/net.json"));
        let err = Framework::Tvm { source: TvmSource::MxNet }
            .command(&config, &env())
            .unwrap_err();
        assert!(matches!(err, FrameworkError::Config(ConfigAdapterError::IncorrectModel)));

        let mut config = tvm_config("");
        config.parameters.batch_size = 0;
        let err = Framework::Tvm { source: TvmSource::MxNet }
            .command(&config, &env())
            .unwrap_err();
        assert!(matches!(err, FrameworkError::Config(ConfigAdapterError::InvalidValue { .. })));
    }

    #[test]
    fn test_default_report_name() {
        let now = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        let framework = Framework::PytorchCpp { benchmark_path: PathBuf::from("/bin/pb") };
        assert_eq!(
            framework.default_report_name("resnet", now),
            "pytorch_benchmark_resnet_07.03.24_09:05:01.json"
        );
    }

    fn pytorch_config(dir: &Path, precision: Option<&str>) -> BenchmarkConfig {
        let precision = precision
            .map(|p| format!("tensor_rt_precision = \"{p}\""))
            .unwrap_or_default();
        BenchmarkConfig::from_toml_str(&format!(
            r#"
            dataset = "/data"
            [model]
            model = "/models/net.pt"
            weights = "/models/net.pt"
            [framework]
            kind = "pytorch_cpp"
            cpp_benchmarks_dir = "{}"
            {precision}
            "#,
            dir.display()
        ))
        .unwrap()
    }

    #[test]
    fn test_pytorch_cpp_binary_selection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PYTORCH_BENCHMARK), "").unwrap();
        std::fs::write(dir.path().join(PYTORCH_TENSORRT_BENCHMARK), "").unwrap();

        let plain = Framework::from_config(&pytorch_config(dir.path(), None)).unwrap();
        assert_eq!(
            plain,
            Framework::PytorchCpp { benchmark_path: dir.path().join(PYTORCH_BENCHMARK) }
        );

        let trt = Framework::from_config(&pytorch_config(dir.path(), Some("FP32"))).unwrap();
        assert_eq!(
            trt,
            Framework::PytorchCpp { benchmark_path: dir.path().join(PYTORCH_TENSORRT_BENCHMARK) }
        );

        let err = Framework::from_config(&pytorch_config(dir.path(), Some("FP16"))).unwrap_err();
        assert!(matches!(err, FrameworkError::UnknownPrecision(_)));
    }

    #[test]
    fn test_pytorch_cpp_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let err = Framework::from_config(&pytorch_config(dir.path(), None)).unwrap_err();
        assert!(matches!(err, FrameworkError::InvalidBenchmarkPath(_)));
    }

    #[test]
    fn test_pytorch_cpp_command_uses_logs_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PYTORCH_BENCHMARK), "").unwrap();
        let config = pytorch_config(dir.path(), None);

        let command = Framework::from_config(&config)
            .unwrap()
            .command(&config, &env())
            .unwrap();

        assert!(command.program.ends_with(PYTORCH_BENCHMARK));
        assert!(command.report_path.starts_with("/var/log/bench"));
        assert!(command.args.starts_with(&[
            "-m".to_string(),
            "/models/net.pt".to_string(),
            "-i".to_string(),
            "/data".to_string(),
        ]));
    }
}
