//! Bounded-concurrency task pool with per-task retry and linear backoff
//!
//! This module drives an ordered list of independent asynchronous tasks to
//! completion with a fixed concurrency ceiling. Each task is retried up to a
//! configured attempt budget with a linearly increasing delay between
//! attempts; a task that exhausts its budget degrades to a
//! [`TaskOutcome::Failed`] marker at its index instead of aborting the run.
//!
//! Workers cooperatively pull task indices from a shared atomic cursor, so
//! slow tasks never stall the rest of the batch. The pool returns only after
//! every worker has exited; no work outlives the call.
//!
//! # Example
//!
//! ```no_run
//! use fpl_eo::config::PoolConfig;
//! use fpl_eo::pool::run_pool;
//!
//! # async fn example() -> fpl_eo::Result<()> {
//! let tasks: Vec<_> = (0..4u32)
//!     .map(|i| move || async move { Ok::<_, std::io::Error>(i * 2) })
//!     .collect();
//!
//! let results = run_pool(&tasks, &PoolConfig::default(), None).await?;
//! assert_eq!(results.len(), 4);
//! # Ok(())
//! # }
//! ```

use crate::config::PoolConfig;
use crate::error::{Error, Result};
use rand::Rng;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Terminal state of one task after the pool has driven it to completion
///
/// The failure marker is a distinct variant rather than an `Option`-like
/// null, so a task that legitimately produced an empty value can never be
/// confused with a task that never succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome<T> {
    /// The task succeeded within its attempt budget and produced this value
    Completed(T),
    /// The task failed on every allowed attempt
    Failed,
}

impl<T> TaskOutcome<T> {
    /// Returns true if the task exhausted its attempts without succeeding
    pub fn is_failed(&self) -> bool {
        matches!(self, TaskOutcome::Failed)
    }

    /// Borrow the produced value, if the task succeeded
    pub fn as_completed(&self) -> Option<&T> {
        match self {
            TaskOutcome::Completed(value) => Some(value),
            TaskOutcome::Failed => None,
        }
    }

    /// Consume the outcome, yielding the produced value if the task succeeded
    pub fn into_completed(self) -> Option<T> {
        match self {
            TaskOutcome::Completed(value) => Some(value),
            TaskOutcome::Failed => None,
        }
    }
}

/// Mutable borrow of a progress observer, invoked as `(completed, total)`
/// after each task reaches a terminal state
pub type ProgressObserver<'a> = &'a mut (dyn FnMut(usize, usize) + Send);

/// Shared progress bookkeeping, updated under one lock so observer calls are
/// monotonic and fire exactly once per completed task.
struct ProgressState<'a> {
    completed: usize,
    observer: Option<ProgressObserver<'a>>,
}

/// Drive `tasks` to completion with bounded concurrency and per-task retry
///
/// Spawns `min(config.concurrency, tasks.len())` cooperative workers that
/// claim task indices from a shared cursor in strictly increasing order.
/// Each claimed task is invoked up to `config.max_attempts` times; the delay
/// before retry `k` (1-based) is `config.base_delay * k`, suspending only
/// the worker that owns the task. A task that fails every attempt is
/// recorded as [`TaskOutcome::Failed`] at its index and logged as a warning;
/// it never aborts the rest of the batch.
///
/// # Arguments
///
/// * `tasks` - ordered task functions; each invocation must produce a fresh
///   future, since a task can be invoked once per attempt
/// * `config` - concurrency ceiling and retry policy
/// * `on_progress` - optional observer, called with `(completed, total)`
///   exactly once per task, with `completed` strictly increasing
///
/// # Returns
///
/// A `Vec` of the same length as `tasks`, where index `i` holds the outcome
/// of `tasks[i]` regardless of completion order. An empty task list returns
/// an empty `Vec` immediately without invoking anything.
///
/// # Errors
///
/// Returns [`Error::Config`] for an invalid pool configuration (zero
/// concurrency or a zero attempt budget) before any task is invoked, and
/// [`Error::Internal`] if the pool's own bookkeeping is found inconsistent
/// after the workers join. Task-level errors never escape; they are
/// contained as `Failed` markers.
pub async fn run_pool<T, E, F, Fut>(
    tasks: &[F],
    config: &PoolConfig,
    on_progress: Option<ProgressObserver<'_>>,
) -> Result<Vec<TaskOutcome<T>>>
where
    F: Fn() -> Fut + Sync,
    Fut: Future<Output = std::result::Result<T, E>> + Send,
    T: Send,
    E: std::fmt::Display + Send,
{
    config.validate()?;

    let total = tasks.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let cursor = AtomicUsize::new(0);
    let progress = tokio::sync::Mutex::new(ProgressState {
        completed: 0,
        observer: on_progress,
    });

    // Spawning more workers than tasks would leave some idle forever
    let worker_count = config.concurrency.min(total);
    let workers: Vec<_> = (0..worker_count)
        .map(|_| worker_loop(tasks, config, &cursor, &progress))
        .collect();

    // Structured join: the pool returns only after every worker has exited
    let per_worker = futures::future::join_all(workers).await;

    let mut slots: Vec<Option<TaskOutcome<T>>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);
    for (index, outcome) in per_worker.into_iter().flatten() {
        if slots[index].is_some() {
            return Err(Error::Internal(format!(
                "task {index} was claimed by more than one worker"
            )));
        }
        slots[index] = Some(outcome);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| {
                Error::Internal(format!("task {index} never reached a terminal state"))
            })
        })
        .collect()
}

/// One worker: claim the next unclaimed index, drive that task to a terminal
/// outcome, report progress, repeat until the cursor is exhausted.
async fn worker_loop<'a, T, E, F, Fut>(
    tasks: &'a [F],
    config: &'a PoolConfig,
    cursor: &'a AtomicUsize,
    progress: &'a tokio::sync::Mutex<ProgressState<'_>>,
) -> Vec<(usize, TaskOutcome<T>)>
where
    F: Fn() -> Fut + Sync,
    Fut: Future<Output = std::result::Result<T, E>> + Send,
    T: Send,
    E: std::fmt::Display + Send,
{
    let total = tasks.len();
    let mut claimed = Vec::new();

    loop {
        // Single-claim-per-index: the cursor hands each index to exactly one worker
        let index = cursor.fetch_add(1, Ordering::SeqCst);
        if index >= total {
            break;
        }

        let outcome = run_attempts(&tasks[index], index, config).await;
        claimed.push((index, outcome));

        let mut progress = progress.lock().await;
        progress.completed += 1;
        let completed = progress.completed;
        if let Some(observer) = progress.observer.as_mut() {
            observer(completed, total);
        }
    }

    claimed
}

/// Invoke one task up to the configured attempt budget with backoff between
/// failures, producing its terminal outcome.
async fn run_attempts<T, E, F, Fut>(task: &F, index: usize, config: &PoolConfig) -> TaskOutcome<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match task().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(
                        task_index = index,
                        attempts = attempt,
                        "Task succeeded after retry"
                    );
                }
                return TaskOutcome::Completed(value);
            }
            Err(e) if attempt < config.max_attempts => {
                let delay = backoff_delay(config, attempt);
                tracing::debug!(
                    task_index = index,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    error = %e,
                    "Task attempt failed, retrying"
                );
                // Suspends only this worker; the rest of the pool keeps running
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                tracing::warn!(
                    task_index = index,
                    attempts = attempt,
                    error = %e,
                    "Task failed after all attempts exhausted"
                );
                return TaskOutcome::Failed;
            }
        }
    }
}

/// Delay before the next attempt after `failed_attempts` failures (1-based):
/// linear in the failure count, optionally jittered.
fn backoff_delay(config: &PoolConfig, failed_attempts: u32) -> Duration {
    let delay = config.base_delay * failed_attempts;
    if config.jitter { add_jitter(delay) } else { delay }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Jitter is uniformly distributed between 0% and 100% of the delay, so the
/// actual delay falls between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
