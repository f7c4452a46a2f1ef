// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Markdown output generation for benchmark results.
//!
//! This module renders benchmark results as markdown reports.

use crate::result::BenchmarkResult;
use dlbench_core::throughput::is_throughput_defined;
use dlbench_core::PerformanceMetrics;
use std::fmt::Write;

/// Render a throughput value, showing the undefined sentinel as `n/a`.
fn format_throughput(value: f64) -> String {
    if is_throughput_defined(value) {
        format!("{:.3}", value)
    } else {
        "n/a".to_string()
    }
}

/// Generate a markdown summary from benchmark results.
pub fn generate_summary(results: &[BenchmarkResult]) -> String {
    let mut output = String::new();

    writeln!(output, "# Benchmark Summary").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339()).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "## Results").unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "| Target ID | Mode | Execution time, s | Average latency, s | Median latency, s | Throughput, FPS |"
    )
    .unwrap();
    writeln!(
        output,
        "|-----------|------|-------------------|--------------------|-------------------|-----------------|"
    )
    .unwrap();

    for result in results {
        let median = match &result.metrics {
            PerformanceMetrics::Sync(m) => format!("{:.5}", m.latency_median),
            PerformanceMetrics::Async(_) => "-".to_string(),
        };
        writeln!(
            output,
            "| {} | {} | {:.3} | {:.5} | {} | {} |",
            result.target_id,
            result.mode,
            result.metrics.execution_time(),
            result.metrics.latency_avg(),
            median,
            format_throughput(result.metrics.throughput()),
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "---").unwrap();
    writeln!(output, "Total benchmarks: {}", results.len()).unwrap();

    output
}

/// Generate detailed markdown report.
pub fn generate_detailed_report(results: &[BenchmarkResult]) -> String {
    let mut output = String::new();

    writeln!(output, "# Detailed Benchmark Report").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339()).unwrap();
    writeln!(output).unwrap();

    for result in results {
        writeln!(output, "## {}", result.target_id).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "**Timestamp:** {}", result.timestamp.to_rfc3339()).unwrap();
        writeln!(output, "**Mode:** {}", result.mode).unwrap();
        writeln!(output, "**Summary:** `{}`", result.metrics.summary_line()).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "**Metrics:**").unwrap();
        writeln!(output, "```json").unwrap();
        writeln!(
            output,
            "{}",
            serde_json::to_string_pretty(&result.metrics).unwrap_or_default()
        )
        .unwrap();
        writeln!(output, "```").unwrap();
        writeln!(output).unwrap();
    }

    output
}
