//! Parallel parameter sweeps over Monte Carlo estimates.
//!
//! A sweep varies one estimator input (iteration budget, sample size or
//! number of runs) across a list of values. Every `(value, repeat)` pair
//! becomes a [`Task`] in a shared `crossbeam_deque::Injector`; workers drain
//! it with non-blocking steals and stop on the first empty observation.
//!
//! # Reproducibility
//!
//! Task `i` draws from `SimRng::for_stream(seed, i)`, so a sweep returns
//! identical results for every worker count.
//!
//! # Failures
//!
//! Under [`FailurePolicy::Isolate`] a failing task is recorded against its
//! key and the sweep continues. Under [`FailurePolicy::FailFast`] the first
//! failure stops all workers and the sweep returns
//! [`McError::TaskFailed`] naming the parameter.

pub mod report;
pub mod store;

use crossbeam_deque::{Injector, Steal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::classifier::PointClassifier;
use crate::error::{McError, McResult};
use crate::estimator::MonteCarloEstimator;
use crate::rng::SimRng;
use crate::sampling::{Bounds, Sampler};

pub use report::{SweepReport, SweepSummary, TaskFailure};
pub use store::{KeyedStore, ResultStore};

/// Which estimator input a sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepKind {
    /// Vary the iteration budget; sample size is fixed.
    MaxIterations,
    /// Vary the sample size; iteration budget is fixed.
    SampleSize,
    /// Vary the number of runs of the fixed configuration.
    ///
    /// Each value `v` enqueues `v` runs keyed by `v`.
    Runs,
}

impl SweepKind {
    /// Estimator inputs `(sample_size, max_iterations)` for one task.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when the value does not fit the input.
    pub fn configure(self, fixed: &FixedConfig, value: u64) -> McResult<(usize, u32)> {
        match self {
            Self::MaxIterations => {
                let iterations = u32::try_from(value).map_err(|_| {
                    McError::invalid_argument(format!("max_iterations {value} exceeds u32"))
                })?;
                Ok((fixed.sample_size, iterations))
            }
            Self::SampleSize => {
                let size = usize::try_from(value).map_err(|_| {
                    McError::invalid_argument(format!("sample_size {value} exceeds usize"))
                })?;
                Ok((size, fixed.max_iterations))
            }
            Self::Runs => Ok((fixed.sample_size, fixed.max_iterations)),
        }
    }

    /// Number of tasks enqueued for one value.
    #[must_use]
    pub fn tasks_for(self, value: u64, repeats_per_value: u32) -> u64 {
        match self {
            Self::Runs => value,
            Self::MaxIterations | Self::SampleSize => u64::from(repeats_per_value),
        }
    }
}

impl std::fmt::Display for SweepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MaxIterations => "max-iterations",
            Self::SampleSize => "sample-size",
            Self::Runs => "runs",
        };
        f.write_str(name)
    }
}

/// Largest number of tasks one sweep may enqueue.
pub const MAX_TASKS: u64 = 1 << 20;

/// Estimator inputs held constant across a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedConfig {
    /// Points per estimate.
    pub sample_size: usize,
    /// Iteration budget per point.
    pub max_iterations: u32,
    /// Sampling box.
    pub bounds: Bounds,
}

impl Default for FixedConfig {
    fn default() -> Self {
        Self {
            sample_size: 10_000,
            max_iterations: 256,
            bounds: Bounds::MANDELBROT,
        }
    }
}

/// Parameter values and repeat count of one sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepRequest {
    /// Which input is varied.
    pub kind: SweepKind,
    /// Values of the varied input (distinct, positive).
    pub values: Vec<u64>,
    /// Estimates per value (ignored by [`SweepKind::Runs`]).
    pub repeats_per_value: u32,
}

impl SweepRequest {
    /// Create a sweep request.
    #[must_use]
    pub fn new(kind: SweepKind, values: Vec<u64>, repeats_per_value: u32) -> Self {
        Self {
            kind,
            values,
            repeats_per_value,
        }
    }

    /// Total tasks the request expands into, saturating at `u64::MAX`.
    #[must_use]
    pub fn task_count(&self) -> u64 {
        self.values.iter().fold(0u64, |total, &value| {
            total.saturating_add(self.kind.tasks_for(value, self.repeats_per_value))
        })
    }

    /// Check the request can be scheduled.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for empty, zero or duplicate values, a
    /// zero repeat count, or more than [`MAX_TASKS`] tasks.
    pub fn validate(&self) -> McResult<()> {
        if self.values.is_empty() {
            return Err(McError::invalid_argument("sweep needs at least one value"));
        }
        if self.values.contains(&0) {
            return Err(McError::invalid_argument("sweep values must be positive"));
        }
        let distinct: BTreeSet<u64> = self.values.iter().copied().collect();
        if distinct.len() != self.values.len() {
            return Err(McError::invalid_argument(format!(
                "sweep values must be distinct, got {:?}",
                self.values
            )));
        }
        if self.kind != SweepKind::Runs && self.repeats_per_value == 0 {
            return Err(McError::invalid_argument("repeats_per_value must be positive"));
        }
        let total = self.task_count();
        if total > MAX_TASKS {
            return Err(McError::invalid_argument(format!(
                "sweep expands to {total} tasks, limit is {MAX_TASKS}"
            )));
        }
        Ok(())
    }

    /// Expand into tasks, in value order then repeat order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when a run count exceeds `u32`.
    pub fn tasks(&self) -> McResult<Vec<Task>> {
        let mut tasks = Vec::new();
        for &value in &self.values {
            let count = self.kind.tasks_for(value, self.repeats_per_value);
            let count = u32::try_from(count).map_err(|_| {
                McError::invalid_argument(format!("{count} runs for one value exceeds u32"))
            })?;
            for repeat in 0..count {
                let stream = tasks.len() as u64;
                tasks.push(Task {
                    key: value,
                    repeat,
                    stream,
                });
            }
        }
        Ok(tasks)
    }
}

/// One unit of sweep work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    /// Grouping key: the varied parameter value.
    pub key: u64,
    /// Repeat index within the key.
    pub repeat: u32,
    /// RNG stream index of this task.
    pub stream: u64,
}

/// What to do when a task fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the sweep at the first failure.
    FailFast,
    /// Record the failure against its key and continue.
    #[default]
    Isolate,
}

/// Cooperative stop flag, checked by workers between tasks.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    /// Create a lowered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask workers to stop after their current task.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs sweeps across a fixed pool of worker threads.
#[derive(Debug, Clone)]
pub struct ExperimentScheduler {
    workers: usize,
    seed: u64,
    policy: FailurePolicy,
    shutdown: ShutdownSignal,
}

impl ExperimentScheduler {
    /// Scheduler with `workers` threads and seed 42.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `workers == 0`.
    pub fn new(workers: usize) -> McResult<Self> {
        if workers == 0 {
            return Err(McError::invalid_argument("worker_count must be positive"));
        }
        Ok(Self {
            workers,
            seed: 42,
            policy: FailurePolicy::default(),
            shutdown: ShutdownSignal::new(),
        })
    }

    /// Scheduler with one worker per available CPU.
    #[must_use]
    pub fn with_available_parallelism() -> Self {
        Self {
            workers: default_workers(),
            seed: 42,
            policy: FailurePolicy::default(),
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Set the master seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the failure policy.
    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use an externally owned shutdown signal.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Handle for stopping a running sweep.
    #[must_use]
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Configured worker count.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Master seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Failure policy.
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run every task of `request` and block until all workers have exited.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mandelbrot_mc::classifier::EscapeTime;
    /// use mandelbrot_mc::sampling::OrthogonalSampler;
    /// use mandelbrot_mc::scheduler::{ExperimentScheduler, FixedConfig, SweepKind, SweepRequest};
    ///
    /// let scheduler = ExperimentScheduler::new(4).unwrap();
    /// let request = SweepRequest::new(SweepKind::SampleSize, vec![10, 100], 5);
    /// let fixed = FixedConfig { max_iterations: 50, ..FixedConfig::default() };
    /// let report = scheduler
    ///     .run_sweep(&request, &fixed, &OrthogonalSampler, &EscapeTime::default())
    ///     .unwrap();
    /// assert_eq!(report.results.len(), 2);
    /// assert_eq!(report.tasks_processed, 10);
    /// ```
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a malformed request or fixed configuration
    /// - `TaskFailed` for the first failure under fail-fast
    /// - `Cancelled` if the shutdown signal stopped the sweep early
    /// - `WorkerPanicked` if a worker thread panicked
    pub fn run_sweep(
        &self,
        request: &SweepRequest,
        fixed: &FixedConfig,
        sampler: &dyn Sampler,
        classifier: &dyn PointClassifier,
    ) -> McResult<SweepReport> {
        request.validate()?;
        validate_fixed(request.kind, fixed)?;

        let tasks = request.tasks()?;
        let total = tasks.len();
        let queue: Injector<Task> = Injector::new();
        for task in tasks {
            queue.push(task);
        }

        let workers = self.workers.min(total).max(1);
        tracing::info!(
            kind = %request.kind,
            sampler = sampler.name(),
            values = request.values.len(),
            tasks = total,
            workers,
            seed = self.seed,
            "starting sweep"
        );

        let results = ResultStore::with_keys(request.values.iter().copied());
        let failures: KeyedStore<TaskFailure> = KeyedStore::default();
        let processed = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);
        let first_error: Mutex<Option<McError>> = Mutex::new(None);
        let estimator = MonteCarloEstimator::new(sampler, classifier).with_bounds(fixed.bounds);

        let ctx = WorkerContext {
            queue: &queue,
            estimator: &estimator,
            kind: request.kind,
            fixed,
            seed: self.seed,
            policy: self.policy,
            shutdown: &self.shutdown,
            abort: &abort,
            results: &results,
            failures: &failures,
            processed: &processed,
            first_error: &first_error,
        };

        let panicked = std::thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let ctx = &ctx;
                    s.spawn(move || ctx.run(worker))
                })
                .collect();

            let joined: Vec<bool> = handles
                .into_iter()
                .map(|handle| handle.join().is_err())
                .collect();
            joined.iter().position(|&failed| failed)
        });

        if let Some(worker) = panicked {
            return Err(McError::WorkerPanicked { worker });
        }

        let first_error = first_error
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(err) = first_error {
            return Err(err);
        }

        let tasks_processed = processed.into_inner();
        if tasks_processed < total {
            tracing::info!(tasks_processed, total, "sweep cancelled");
            return Err(McError::Cancelled);
        }

        let report = SweepReport {
            kind: request.kind,
            results: results.into_sorted(),
            failures: failures.into_sorted(),
            tasks_processed,
            workers,
        };
        tracing::info!(
            tasks = report.tasks_processed,
            estimates = report.total_results(),
            failures = report.total_failures(),
            "sweep finished"
        );
        Ok(report)
    }
}

/// One worker per available CPU, falling back to 4.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(4)
}

fn validate_fixed(kind: SweepKind, fixed: &FixedConfig) -> McResult<()> {
    if kind != SweepKind::SampleSize && fixed.sample_size == 0 {
        return Err(McError::invalid_argument("fixed sample_size must be positive"));
    }
    if kind != SweepKind::MaxIterations && fixed.max_iterations == 0 {
        return Err(McError::invalid_argument("fixed max_iterations must be positive"));
    }
    fixed.bounds.validate()
}

/// State shared by every worker of one sweep.
struct WorkerContext<'a> {
    queue: &'a Injector<Task>,
    estimator: &'a MonteCarloEstimator<'a>,
    kind: SweepKind,
    fixed: &'a FixedConfig,
    seed: u64,
    policy: FailurePolicy,
    shutdown: &'a ShutdownSignal,
    abort: &'a AtomicBool,
    results: &'a ResultStore,
    failures: &'a KeyedStore<TaskFailure>,
    processed: &'a AtomicUsize,
    first_error: &'a Mutex<Option<McError>>,
}

impl WorkerContext<'_> {
    fn next_task(&self) -> Option<Task> {
        loop {
            match self.queue.steal() {
                Steal::Success(task) => return Some(task),
                Steal::Empty => return None,
                Steal::Retry => {}
            }
        }
    }

    fn execute(&self, task: Task) -> McResult<f64> {
        let (sample_size, max_iterations) = self.kind.configure(self.fixed, task.key)?;
        let mut rng = SimRng::for_stream(self.seed, task.stream);
        self.estimator.estimate(sample_size, max_iterations, &mut rng)
    }

    fn run(&self, worker: usize) {
        let mut completed = 0usize;

        while !self.shutdown.is_raised() && !self.abort.load(Ordering::SeqCst) {
            let Some(task) = self.next_task() else {
                break;
            };

            let outcome = self.execute(task);
            self.processed.fetch_add(1, Ordering::SeqCst);
            completed += 1;

            match outcome {
                Ok(area) => self.results.record(task.key, task.repeat, area),
                Err(err) => match self.policy {
                    FailurePolicy::Isolate => {
                        tracing::warn!(
                            worker,
                            key = task.key,
                            repeat = task.repeat,
                            error = %err,
                            "task failed, continuing"
                        );
                        self.failures.record(
                            task.key,
                            task.repeat,
                            TaskFailure {
                                repeat: task.repeat,
                                message: err.to_string(),
                            },
                        );
                    }
                    FailurePolicy::FailFast => {
                        self.abort.store(true, Ordering::SeqCst);
                        let mut guard = self
                            .first_error
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner);
                        if guard.is_none() {
                            *guard = Some(McError::task_failed(task.key, err));
                        }
                        break;
                    }
                },
            }
        }

        tracing::debug!(worker, completed, "worker exiting");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::classifier::{Complex, EscapeTime, Orbit};
    use crate::sampling::{OrthogonalSampler, SamplerKind, UniformSampler};

    fn fixed(sample_size: usize, max_iterations: u32) -> FixedConfig {
        FixedConfig {
            sample_size,
            max_iterations,
            bounds: Bounds::MANDELBROT,
        }
    }

    /// Fails every task whose iteration budget is the given value.
    struct FailsAt(u32);

    impl PointClassifier for FailsAt {
        fn classify(&self, c: Complex, max_iterations: u32) -> McResult<Orbit> {
            if max_iterations == self.0 {
                return Err(McError::classifier("unsupported budget"));
            }
            EscapeTime::default().classify(c, max_iterations)
        }
    }

    struct Panics;

    impl PointClassifier for Panics {
        fn classify(&self, _c: Complex, _max_iterations: u32) -> McResult<Orbit> {
            panic!("classifier crashed")
        }
    }

    #[test]
    fn test_two_keys_five_repeats_four_workers() {
        let scheduler = ExperimentScheduler::new(4).unwrap();
        let request = SweepRequest::new(SweepKind::MaxIterations, vec![10, 100], 5);
        let report = scheduler
            .run_sweep(&request, &fixed(256, 1), &OrthogonalSampler, &EscapeTime::default())
            .unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[&10].len(), 5);
        assert_eq!(report.results[&100].len(), 5);
        assert_eq!(report.tasks_processed, 10);
        assert!(report.is_complete());
    }

    #[test]
    fn test_worker_count_does_not_change_results() {
        let request = SweepRequest::new(SweepKind::SampleSize, vec![10, 100], 5);
        let classifier = EscapeTime::default();
        let baseline = ExperimentScheduler::new(1)
            .unwrap()
            .run_sweep(&request, &fixed(1, 64), &UniformSampler, &classifier)
            .unwrap();

        for workers in 2..=8 {
            let report = ExperimentScheduler::new(workers)
                .unwrap()
                .run_sweep(&request, &fixed(1, 64), &UniformSampler, &classifier)
                .unwrap();
            assert_eq!(report.tasks_processed, 10);
            assert_eq!(report.results, baseline.results, "workers = {workers}");
        }
    }

    #[test]
    fn test_seed_changes_results() {
        let request = SweepRequest::new(SweepKind::SampleSize, vec![64], 4);
        let classifier = EscapeTime::default();
        let a = ExperimentScheduler::new(2)
            .unwrap()
            .with_seed(1)
            .run_sweep(&request, &fixed(1, 64), &UniformSampler, &classifier)
            .unwrap();
        let b = ExperimentScheduler::new(2)
            .unwrap()
            .with_seed(2)
            .run_sweep(&request, &fixed(1, 64), &UniformSampler, &classifier)
            .unwrap();
        assert_ne!(a.results, b.results);
    }

    #[test]
    fn test_repeats_use_distinct_streams() {
        let request = SweepRequest::new(SweepKind::SampleSize, vec![256], 3);
        let report = ExperimentScheduler::new(3)
            .unwrap()
            .run_sweep(&request, &fixed(1, 64), &UniformSampler, &EscapeTime::default())
            .unwrap();
        let values = &report.results[&256];
        assert!(values[0] != values[1] || values[1] != values[2]);
    }

    #[test]
    fn test_runs_sweep_groups_by_nominal_count() {
        let request = SweepRequest::new(SweepKind::Runs, vec![1, 3, 5], 0);
        let report = ExperimentScheduler::new(4)
            .unwrap()
            .run_sweep(&request, &fixed(64, 32), &OrthogonalSampler, &EscapeTime::default())
            .unwrap();
        assert_eq!(report.results[&1].len(), 1);
        assert_eq!(report.results[&3].len(), 3);
        assert_eq!(report.results[&5].len(), 5);
        assert_eq!(report.tasks_processed, 9);
    }

    #[test]
    fn test_isolate_records_failure_and_continues() {
        let request = SweepRequest::new(SweepKind::MaxIterations, vec![10, 20], 3);
        let report = ExperimentScheduler::new(2)
            .unwrap()
            .with_failure_policy(FailurePolicy::Isolate)
            .run_sweep(&request, &fixed(16, 1), &UniformSampler, &FailsAt(20))
            .unwrap();

        assert_eq!(report.tasks_processed, 6);
        assert_eq!(report.results[&10].len(), 3);
        assert!(report.results[&20].is_empty());
        assert_eq!(report.failures[&20].len(), 3);
        assert!(report.failures[&20][0].message.contains("unsupported budget"));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_fail_fast_names_parameter() {
        let request = SweepRequest::new(SweepKind::MaxIterations, vec![10, 20], 3);
        let err = ExperimentScheduler::new(2)
            .unwrap()
            .with_failure_policy(FailurePolicy::FailFast)
            .run_sweep(&request, &fixed(16, 1), &UniformSampler, &FailsAt(20))
            .unwrap_err();

        match err {
            McError::TaskFailed { parameter, source } => {
                assert_eq!(parameter, 20);
                assert!(matches!(*source, McError::ClassifierFailure { .. }));
            }
            other => panic!("expected TaskFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_sobol_non_power_of_two_is_isolated() {
        let sobol = SamplerKind::ScrambledSobol.build();
        let request = SweepRequest::new(SweepKind::SampleSize, vec![100, 128], 2);
        let report = ExperimentScheduler::new(2)
            .unwrap()
            .run_sweep(&request, &fixed(1, 16), sobol.as_ref(), &EscapeTime::default())
            .unwrap();
        assert_eq!(report.failures[&100].len(), 2);
        assert_eq!(report.results[&128].len(), 2);
    }

    #[test]
    fn test_raised_shutdown_cancels() {
        let scheduler = ExperimentScheduler::new(2).unwrap();
        scheduler.shutdown_signal().raise();
        let request = SweepRequest::new(SweepKind::SampleSize, vec![16], 4);
        let err = scheduler
            .run_sweep(&request, &fixed(1, 8), &UniformSampler, &EscapeTime::default())
            .unwrap_err();
        assert!(matches!(err, McError::Cancelled));
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let request = SweepRequest::new(SweepKind::SampleSize, vec![4], 1);
        let err = ExperimentScheduler::new(1)
            .unwrap()
            .run_sweep(&request, &fixed(1, 8), &UniformSampler, &Panics)
            .unwrap_err();
        assert!(matches!(err, McError::WorkerPanicked { worker: 0 }));
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(ExperimentScheduler::new(0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_request_validation() {
        let cases = [
            SweepRequest::new(SweepKind::SampleSize, vec![], 1),
            SweepRequest::new(SweepKind::SampleSize, vec![0, 10], 1),
            SweepRequest::new(SweepKind::SampleSize, vec![10, 10], 1),
            SweepRequest::new(SweepKind::SampleSize, vec![10], 0),
        ];
        for request in cases {
            assert!(request.validate().unwrap_err().is_invalid_argument(), "{request:?}");
        }
        assert!(SweepRequest::new(SweepKind::Runs, vec![2], 0).validate().is_ok());
    }

    #[test]
    fn test_task_count_capped() {
        let huge = SweepRequest::new(SweepKind::Runs, vec![4_000_000_000], 1);
        assert_eq!(huge.task_count(), 4_000_000_000);
        assert!(huge.validate().unwrap_err().is_invalid_argument());

        let saturating = SweepRequest::new(SweepKind::Runs, vec![u64::MAX, u64::MAX - 1], 1);
        assert_eq!(saturating.task_count(), u64::MAX);
        assert!(saturating.validate().is_err());

        let repeats = SweepRequest::new(SweepKind::SampleSize, vec![8, 16], u32::MAX);
        assert!(repeats.validate().is_err());

        let at_limit = SweepRequest::new(SweepKind::Runs, vec![MAX_TASKS / 2, MAX_TASKS / 2], 1);
        assert_eq!(at_limit.task_count(), MAX_TASKS);
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_oversized_sweep_rejected_before_enqueue() {
        let request = SweepRequest::new(SweepKind::Runs, vec![MAX_TASKS + 1], 1);
        let err = ExperimentScheduler::new(1)
            .unwrap()
            .run_sweep(&request, &fixed(4, 8), &UniformSampler, &EscapeTime::default())
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_fixed_validation() {
        let scheduler = ExperimentScheduler::new(1).unwrap();
        let request = SweepRequest::new(SweepKind::MaxIterations, vec![10], 1);
        let err = scheduler
            .run_sweep(&request, &fixed(0, 10), &UniformSampler, &EscapeTime::default())
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_task_expansion_order() {
        let request = SweepRequest::new(SweepKind::SampleSize, vec![7, 9], 2);
        let tasks = request.tasks().unwrap();
        let keys: Vec<(u64, u32, u64)> = tasks.iter().map(|t| (t.key, t.repeat, t.stream)).collect();
        assert_eq!(keys, vec![(7, 0, 0), (7, 1, 1), (9, 0, 2), (9, 1, 3)]);
    }

    #[test]
    fn test_configure_substitutes_parameter() {
        let f = fixed(100, 50);
        assert_eq!(SweepKind::MaxIterations.configure(&f, 7).unwrap(), (100, 7));
        assert_eq!(SweepKind::SampleSize.configure(&f, 7).unwrap(), (7, 50));
        assert_eq!(SweepKind::Runs.configure(&f, 7).unwrap(), (100, 50));
        assert!(SweepKind::MaxIterations.configure(&f, u64::MAX).is_err());
    }

    #[test]
    fn test_sweep_kind_serde_names() {
        let kind: SweepKind = serde_yaml::from_str("max-iterations").unwrap();
        assert_eq!(kind, SweepKind::MaxIterations);
        assert_eq!(SweepKind::SampleSize.to_string(), "sample-size");
        let policy: FailurePolicy = serde_yaml::from_str("fail-fast").unwrap();
        assert_eq!(policy, FailurePolicy::FailFast);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::classifier::EscapeTime;
    use crate::sampling::UniformSampler;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_every_task_processed_once(
            values in proptest::collection::btree_set(1u64..64, 1..5),
            repeats in 1u32..5,
            workers in 1usize..6,
        ) {
            let values: Vec<u64> = values.into_iter().collect();
            let request = SweepRequest::new(SweepKind::SampleSize, values.clone(), repeats);
            let fixed = FixedConfig { sample_size: 1, max_iterations: 8, bounds: Bounds::MANDELBROT };
            let report = ExperimentScheduler::new(workers)
                .map_err(|e| TestCaseError::fail(e.to_string()))?
                .run_sweep(&request, &fixed, &UniformSampler, &EscapeTime::default())
                .map_err(|e| TestCaseError::fail(e.to_string()))?;

            prop_assert_eq!(report.tasks_processed, values.len() * repeats as usize);
            prop_assert_eq!(report.results.len(), values.len());
            for v in &values {
                prop_assert_eq!(report.results[v].len(), repeats as usize);
            }
        }
    }
}
