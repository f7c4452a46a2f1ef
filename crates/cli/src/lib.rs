// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI for DL Benchmark.
//!
//! This crate provides the command-line interface: reducing timing reports
//! of finished benchmark runs into performance metrics, printing the launch
//! command of a configured run, and showing the output layout.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dlbench_adapters::launcher::config::BenchmarkConfig;
use dlbench_adapters::launcher::framework::LaunchEnvironment;
use dlbench_adapters::launcher::report::LatencyUnits;
use dlbench_adapters::{load_launch_command, run_targets, BenchTarget, ReportTarget};
use dlbench_benchmarks::{io, write_results, OutputFormat};
use dlbench_core::ReductionMode;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// DL Benchmark CLI.
#[derive(Parser, Debug)]
#[command(name = "dlbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output (debug logging).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reduce timing reports into performance metrics and write results.
    ///
    /// Prints one summary line per report: `<avg>,<fps>,<latency>` in sync
    /// mode, `<avg>,<fps>` in async mode. Results are written to:
    /// - <output>/raw/ - Individual JSON files per report
    /// - <output>/all_results.json - Combined JSON file
    /// - <output>/summary.md - Markdown summary
    Reduce {
        /// Timing report written by a benchmark process (repeatable).
        #[arg(short, long = "report", required = true)]
        reports: Vec<PathBuf>,

        /// Run configuration supplying mode, batch size, threshold and units.
        #[arg(short, long, env = "DLBENCH_CONFIG")]
        config: Option<PathBuf>,

        /// Reduction mode: sync or async.
        #[arg(short, long)]
        mode: Option<ReductionMode>,

        /// Items processed per inference call.
        #[arg(short, long)]
        batch_size: Option<u64>,

        /// Samples below this duration (seconds) are dropped.
        #[arg(long)]
        min_infer_time: Option<f64>,

        /// Units of the values in the report: seconds or milliseconds.
        #[arg(long)]
        units: Option<LatencyUnits>,

        /// Identifier of the result in reports.
        #[arg(long)]
        target_id: Option<String>,

        /// Output directory.
        #[arg(short, long, default_value = io::OUTPUT_DIR)]
        output: PathBuf,

        /// Output format: json, markdown, or both.
        #[arg(short, long, default_value = "both")]
        format: OutputFormat,
    },

    /// Print the launch command of a configured benchmark run.
    Command {
        /// Run configuration.
        #[arg(short, long, env = "DLBENCH_CONFIG")]
        config: PathBuf,

        /// Python interpreter for script-based launchers.
        #[arg(long, default_value = "python3")]
        python: String,

        /// Directory containing the inference scripts.
        #[arg(long, default_value = "inference")]
        scripts_dir: PathBuf,

        /// Directory for timing reports without an explicit path.
        #[arg(long, default_value = "logs")]
        logs_dir: PathBuf,
    },

    /// Show version and output layout.
    Status {
        /// Show detailed status information.
        #[arg(short, long)]
        detailed: bool,
    },
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence.
pub fn init_tracing(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed (tests); keep it.
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Run the CLI with the process arguments.
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the command fails.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);
    execute(cli)
}

/// Execute a parsed command line.
pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Reduce {
            reports,
            config,
            mode,
            batch_size,
            min_infer_time,
            units,
            target_id,
            output,
            format,
        } => {
            let config = config
                .map(|path| {
                    BenchmarkConfig::load(&path)
                        .with_context(|| format!("loading configuration {}", path.display()))
                })
                .transpose()?;

            let base_id = target_id.or_else(|| config.as_ref().map(BenchmarkConfig::target_id));
            let several = reports.len() > 1;

            let targets: Vec<Box<dyn BenchTarget>> = reports
                .iter()
                .map(|path| {
                    let id = report_target_id(base_id.as_deref(), path, several);
                    let mut target = match &config {
                        Some(config) => ReportTarget::from_config(config, path).with_id(id),
                        None => ReportTarget::new(id, path),
                    };
                    if let Some(mode) = mode {
                        target = target.with_mode(mode);
                    }
                    if let Some(batch_size) = batch_size {
                        target = target.with_batch_size(batch_size);
                    }
                    if let Some(min_infer_time) = min_infer_time {
                        target = target.with_min_valid_time(min_infer_time);
                    }
                    if let Some(units) = units {
                        target = target.with_units(units);
                    }
                    Box::new(target) as Box<dyn BenchTarget>
                })
                .collect();

            let run = run_targets(&targets);
            if run.results.is_empty() {
                let reasons: Vec<String> = run
                    .failures
                    .iter()
                    .map(|(_, err)| err.to_string())
                    .collect();
                bail!("no timing report could be reduced: {}", reasons.join("; "));
            }

            for result in &run.results {
                println!("{}", result.metrics.summary_line());
            }

            write_results(&run.results, &output, format)
                .with_context(|| format!("writing results to {}", output.display()))?;

            if cli.verbose {
                for result in &run.results {
                    println!(
                        "  - {} ({}): {}",
                        result.target_id,
                        result.mode,
                        result.metrics.summary_line()
                    );
                }
            }
            if !run.failures.is_empty() {
                tracing::warn!(
                    failed = run.failures.len(),
                    reduced = run.results.len(),
                    "Some timing reports were skipped"
                );
            }

            Ok(())
        }
        Commands::Command {
            config,
            python,
            scripts_dir,
            logs_dir,
        } => {
            let env = LaunchEnvironment {
                python,
                scripts_dir,
                logs_dir,
            };
            let (_, command) = load_launch_command(&config, &env)
                .with_context(|| format!("building launch command from {}", config.display()))?;

            println!("{}", command);
            tracing::info!(report = %command.report_path.display(), "Timing report location");

            Ok(())
        }
        Commands::Status { detailed } => {
            println!("DL Benchmark");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));

            if detailed {
                println!("\nOutput directories:");
                println!("  - {}/", io::OUTPUT_DIR);
                println!("  - {}/{}/", io::OUTPUT_DIR, io::RAW_DIR);
                println!("\nOutput files:");
                println!("  - {}/{}", io::OUTPUT_DIR, io::SUMMARY_FILE);
                println!("  - {}/{}", io::OUTPUT_DIR, io::ALL_RESULTS_FILE);
            }

            Ok(())
        }
    }
}

/// Result identifier for a report: the given base, suffixed with the file
/// stem when several reports share it, or the file stem alone.
fn report_target_id(base: Option<&str>, path: &Path, several: bool) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    match base {
        Some(base) if several => format!("{}/{}", base, stem),
        Some(base) => base.to_string(),
        None => stem,
    }
}
