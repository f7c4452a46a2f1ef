// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! DL Benchmark CLI entry point.

fn main() {
    if let Err(e) = dlbench_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
