// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end checks of the reduction pipeline.

use dlbench_core::filter::{delete_incorrect_time, filter_outliers, three_sigma_rule, SigmaBounds};
use dlbench_core::stats::aggregate;
use dlbench_core::{
    reduce_async, reduce_sync, throughput, MetricsError, PerformanceMetrics, SyncMetrics,
};
use proptest::prelude::*;

#[test]
fn sync_reduction_keeps_raw_and_filtered_views_apart() {
    let raw = [0.1, 0.11, 0.09, 0.10, 5.0];
    let metrics = reduce_sync(1, &raw, 0.0).unwrap();

    assert_eq!(metrics.execution_time, 5.4);
    assert_eq!(metrics.first_inference_time, 0.1);
    // Five samples are too few for 3σ to reject the slow iteration.
    assert_eq!(metrics.latency_max, 5.0);
    assert_eq!(metrics.latency_median, 0.1);
    assert_eq!(metrics.throughput, 10.0);
}

#[test]
fn sync_reduction_rejects_outlier_in_long_run() {
    let mut raw = vec![0.1, 0.11, 0.09, 0.10];
    raw.extend(std::iter::repeat([0.1, 0.11, 0.09, 0.10]).take(4).flatten());
    raw.push(5.0);

    let metrics = reduce_sync(1, &raw, 0.0).unwrap();

    assert_eq!(metrics.first_inference_time, 0.1);
    assert_eq!(metrics.execution_time, 7.0);
    assert_eq!(metrics.latency_max, 0.11);
    assert_eq!(metrics.latency_min, 0.09);
    assert_eq!(metrics.latency_avg, 0.1);
    assert_eq!(metrics.latency_median, 0.1);
    assert_eq!(metrics.latency_std, 0.00707);
    assert_eq!(metrics.throughput, 10.0);
}

#[test]
fn sync_reduction_rounding_contract() {
    let third = 1.0 / 3.0;
    let metrics = reduce_sync(1, &[third, third, third], 0.0).unwrap();

    assert_eq!(metrics.execution_time, 1.0);
    assert_eq!(metrics.first_inference_time, 0.33333);
    assert_eq!(metrics.latency_avg, 0.33333);
    assert_eq!(metrics.latency_median, 0.33333);
    assert_eq!(metrics.latency_min, 0.33333);
    assert_eq!(metrics.latency_max, 0.33333);
    assert_eq!(metrics.latency_std, 0.0);
    assert_eq!(metrics.throughput, 3.0);

    let metrics = reduce_sync(1, &[2.0 / 3.0], 0.0).unwrap();
    assert_eq!(metrics.execution_time, 0.667);
    assert_eq!(metrics.latency_median, 0.66667);
    assert_eq!(metrics.throughput, 1.5);
}

#[test]
fn async_reduction() {
    let metrics = reduce_async(10.0, 4, 5).unwrap();
    assert_eq!(metrics.latency_avg, 2.0);
    assert_eq!(metrics.throughput, 2.0);
    assert_eq!(metrics.execution_time, 10.0);

    let metrics = reduce_async(1.0, 1, 3).unwrap();
    assert_eq!(metrics.latency_avg, 0.33333);
    assert_eq!(metrics.throughput, 3.0);
}

#[test]
fn empty_inputs_fail() {
    let mut empty: Vec<f64> = Vec::new();
    assert_eq!(aggregate(&mut empty), Err(MetricsError::EmptyInput));
    assert_eq!(reduce_async(1.0, 1, 0), Err(MetricsError::ZeroIterations));
    assert_eq!(reduce_sync(1, &[], 0.0), Err(MetricsError::InsufficientSamples));
}

#[test]
fn throughput_sentinel() {
    assert_eq!(throughput(100.0, 0.0), -1.0);
    assert_eq!(throughput(100.0, 2.0), 50.0);
}

#[test]
fn metrics_record_field_names() {
    let metrics = PerformanceMetrics::from(reduce_sync(1, &[0.5, 0.5], 0.0).unwrap());
    let json = serde_json::to_value(metrics).unwrap();
    let object = json.as_object().unwrap();

    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "execution_time",
            "first_inference_time",
            "latency_avg",
            "latency_max",
            "latency_median",
            "latency_min",
            "latency_std",
            "throughput",
        ]
    );

    let async_json = serde_json::to_value(PerformanceMetrics::from(
        reduce_async(10.0, 4, 5).unwrap(),
    ))
    .unwrap();
    assert_eq!(async_json.as_object().unwrap().len(), 3);
}

#[test]
fn metrics_record_deserializes_by_shape() {
    let sync: SyncMetrics = reduce_sync(1, &[0.5, 0.5], 0.0).unwrap();
    let text = serde_json::to_string(&PerformanceMetrics::from(sync)).unwrap();
    let parsed: PerformanceMetrics = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, PerformanceMetrics::Sync(sync));

    let parsed: PerformanceMetrics =
        serde_json::from_str(r#"{"execution_time":10.0,"latency_avg":2.0,"throughput":2.0}"#)
            .unwrap();
    assert!(matches!(parsed, PerformanceMetrics::Async(_)));
}

proptest! {
    #[test]
    fn threshold_filter_is_idempotent(
        samples in prop::collection::vec(0.0f64..10.0, 0..64),
        min_valid in 0.0f64..5.0,
    ) {
        let once = delete_incorrect_time(&samples, min_valid);
        let twice = delete_incorrect_time(&once, min_valid);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn three_sigma_partitions_by_bounds(samples in prop::collection::vec(0.0f64..10.0, 1..64)) {
        let bounds = SigmaBounds::from_samples(&samples).unwrap();
        let kept = three_sigma_rule(&samples);

        let expected: Vec<f64> = samples.iter().copied().filter(|&v| bounds.contains(v)).collect();
        prop_assert_eq!(&kept, &expected);
        for value in &samples {
            let inside = bounds.lower <= *value && *value <= bounds.upper;
            prop_assert_eq!(inside, kept.contains(value));
        }
    }

    #[test]
    fn filtered_stats_stay_within_sample_range(
        samples in prop::collection::vec(0.001f64..10.0, 1..64),
    ) {
        let mut filtered = filter_outliers(&samples, 0.0);
        prop_assume!(!filtered.is_empty());
        let stats = aggregate(&mut filtered).unwrap();

        prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
        prop_assert!(stats.std >= 0.0);
        prop_assert!(filtered.windows(2).all(|w| w[0] <= w[1]));
    }
}
