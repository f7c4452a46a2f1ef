// Copyright 2025 DL Benchmark Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-process iteration loop producing per-iteration timing samples.
//!
//! The loop keeps calling the measured function while either ceiling is
//! unmet: the iteration count has not reached `max_iterations`, or the
//! accumulated sample time is still below `min_duration`. Elapsed time is
//! the sum of the samples, not wall-clock time.

use std::time::{Duration, Instant};

/// Iteration-count and duration ceilings of a timing run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationLoop {
    max_iterations: u64,
    min_duration: f64,
}

impl IterationLoop {
    /// Create a loop. A zero `min_duration` disables the duration ceiling.
    pub fn new(max_iterations: u64, min_duration: Duration) -> Self {
        Self {
            max_iterations,
            min_duration: min_duration.as_secs_f64(),
        }
    }

    /// Iteration ceiling.
    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }

    /// Duration ceiling in seconds.
    pub fn min_duration(&self) -> f64 {
        self.min_duration
    }

    fn should_continue(&self, iteration: u64, elapsed: f64) -> bool {
        iteration <= self.max_iterations
            || (self.min_duration > 0.0 && elapsed < self.min_duration)
    }

    /// Run `iteration`, which returns its own duration in seconds, until both
    /// ceilings are met, and return the samples in execution order.
    ///
    /// The first error aborts the loop and is returned as is. An iteration
    /// that always reports zero seconds never satisfies a non-zero duration
    /// ceiling.
    pub fn run<F, E>(&self, mut iteration: F) -> Result<Vec<f64>, E>
    where
        F: FnMut() -> Result<f64, E>,
    {
        tracing::info!(
            max_iterations = self.max_iterations,
            min_duration = self.min_duration,
            "Starting inference loop"
        );

        let mut samples = Vec::new();
        let mut elapsed = 0.0;
        let mut index = 1;

        while self.should_continue(index, elapsed) {
            let exec_time = iteration()?;
            samples.push(exec_time);
            elapsed += exec_time;
            index += 1;

            tracing::trace!(iteration = index - 1, exec_time, elapsed, "Iteration done");
        }

        tracing::info!(
            iterations = samples.len(),
            elapsed,
            "Inference loop finished"
        );

        Ok(samples)
    }

    /// Like [`IterationLoop::run`], but times each call of `call` itself.
    pub fn run_timed<F, T, E>(&self, mut call: F) -> Result<Vec<f64>, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.run(|| {
            let (result, exec_time) = time_call(&mut call);
            result.map(|_| exec_time)
        })
    }
}

/// Call `f` once and return its result with the elapsed time in seconds.
pub fn time_call<T, F>(f: F) -> (T, f64)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    (result, start.elapsed().as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn test_iteration_ceiling_only() {
        let looper = IterationLoop::new(3, Duration::ZERO);
        let samples = looper.run(|| Ok::<_, Infallible>(0.5)).unwrap();
        assert_eq!(samples, vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_duration_ceiling_extends_run() {
        let looper = IterationLoop::new(1, Duration::from_secs(2));
        let samples = looper.run(|| Ok::<_, Infallible>(0.5)).unwrap();
        assert_eq!(samples.len(), 4);
    }

    #[test]
    fn test_iteration_ceiling_extends_run() {
        let looper = IterationLoop::new(5, Duration::from_millis(100));
        let samples = looper.run(|| Ok::<_, Infallible>(1.0)).unwrap();
        assert_eq!(samples.len(), 5);
    }

    #[test]
    fn test_samples_keep_execution_order() {
        let mut next = 0.0;
        let looper = IterationLoop::new(3, Duration::ZERO);
        let samples = looper
            .run(|| {
                next += 0.1;
                Ok::<_, Infallible>(next)
            })
            .unwrap();
        assert!(samples.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_error_aborts_loop() {
        let mut calls = 0;
        let looper = IterationLoop::new(10, Duration::ZERO);
        let result = looper.run(|| {
            calls += 1;
            if calls == 3 {
                Err("device lost")
            } else {
                Ok(0.1)
            }
        });

        assert_eq!(result, Err("device lost"));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_run_timed() {
        let looper = IterationLoop::new(2, Duration::ZERO);
        let samples = looper
            .run_timed(|| {
                std::thread::sleep(Duration::from_millis(5));
                Ok::<_, Infallible>(())
            })
            .unwrap();

        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|&t| t >= 0.005));
    }

    #[test]
    fn test_time_call() {
        let (value, elapsed) = time_call(|| 42);
        assert_eq!(value, 42);
        assert!(elapsed >= 0.0);
    }
}
