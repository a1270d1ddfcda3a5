//! Task submission and execution
//!
//! Tasks submit follow-up work through the [`ITaskPool`] port. The default
//! adapter is [`TaskQueue`], a cloneable handle over an unbounded channel;
//! its [`TaskRunner`] drains the channel on a `JoinSet`.
//!
//! ## Flow
//!
//! ```text
//! Task::handle ──→ ITaskPool::add_task ──→ mpsc ──→ TaskRunner ──→ JoinSet
//!      ▲                                                              │
//!      └──────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use onesync_core::config::TasksConfig;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::task::{BoxedTask, TaskKind};
use crate::TaskError;

// ============================================================================
// ITaskPool port
// ============================================================================

/// Errors returned when submitting a task
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Nothing will ever run the task
    #[error("Task pool is closed")]
    Closed,
}

/// Port for submitting tasks
///
/// Submission is synchronous and must not block, so a running task can
/// enqueue follow-ups without waiting on the pool.
pub trait ITaskPool: Send + Sync {
    fn add_task(&self, task: BoxedTask) -> Result<(), PoolError>;
}

// ============================================================================
// TaskQueue
// ============================================================================

/// Channel-backed task pool
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<BoxedTask>,
}

impl TaskQueue {
    /// Creates a queue and the runner that executes its tasks
    pub fn new() -> (Self, TaskRunner) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, TaskRunner { rx })
    }

    /// The queue as a shareable port handle
    pub fn into_pool(self) -> Arc<dyn ITaskPool> {
        Arc::new(self)
    }
}

impl ITaskPool for TaskQueue {
    fn add_task(&self, task: BoxedTask) -> Result<(), PoolError> {
        debug!(kind = %task.kind(), path = %task.target(), "Task queued");
        self.tx.send(task).map_err(|_| PoolError::Closed)
    }
}

// ============================================================================
// TaskRunner
// ============================================================================

/// Outcome counts of a [`TaskRunner::run_until_idle`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub unsupported: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.unsupported
    }

    fn record(&mut self, result: &Result<(), TaskError>) {
        match result {
            Ok(()) => self.succeeded += 1,
            Err(TaskError::Unsupported(_)) => self.unsupported += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Executes the tasks submitted to a [`TaskQueue`]
pub struct TaskRunner {
    rx: mpsc::UnboundedReceiver<BoxedTask>,
}

impl TaskRunner {
    /// [`run_until_idle`](Self::run_until_idle) bounded by
    /// `tasks.max_concurrent`
    pub async fn run_with_config(&mut self, config: &TasksConfig) -> RunSummary {
        self.run_until_idle(config.max_concurrent).await
    }

    /// Runs queued tasks, at most `max_concurrent` at a time, until the
    /// queue is empty and no task is in flight
    ///
    /// Tasks submitted by running tasks are picked up in the same call.
    /// Failures are counted, never retried.
    pub async fn run_until_idle(&mut self, max_concurrent: usize) -> RunSummary {
        let max_concurrent = max_concurrent.max(1);
        let mut in_flight: JoinSet<(TaskKind, Result<(), TaskError>)> = JoinSet::new();
        let mut summary = RunSummary::default();

        loop {
            while in_flight.len() < max_concurrent {
                match self.rx.try_recv() {
                    Ok(task) => {
                        in_flight.spawn(async move {
                            let kind = task.kind();
                            (kind, task.handle().await)
                        });
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }

            match in_flight.join_next().await {
                Some(Ok((kind, result))) => {
                    debug!(%kind, ok = result.is_ok(), "Task finished");
                    summary.record(&result);
                }
                Some(Err(e)) => {
                    error!(error = %e, "Task aborted");
                    summary.failed += 1;
                }
                // Nothing running and nothing queued
                None => break,
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            unsupported = summary.unsupported,
            "Task queue idle"
        );
        summary
    }
}
