// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! Throughput (processed units per second).

/// Sentinel returned by [`throughput`] when the duration is zero.
///
/// It is a valid return value, not an error, and must never be reported as a rate.
pub const THROUGHPUT_UNDEFINED: f64 = -1.0;

/// Units processed per second: `unit_count / duration`.
///
/// The count is a float so that products of large batch sizes and iteration
/// counts cannot overflow. Returns [`THROUGHPUT_UNDEFINED`] when `duration` is
/// zero. Negative durations are outside the contract.
pub fn throughput(unit_count: f64, duration: f64) -> f64 {
    if duration == 0.0 {
        return THROUGHPUT_UNDEFINED;
    }
    unit_count / duration
}

/// Whether a throughput value is an actual rate rather than the sentinel.
pub fn is_throughput_defined(value: f64) -> bool {
    value != THROUGHPUT_UNDEFINED
}
