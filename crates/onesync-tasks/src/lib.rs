//! onesync tasks - Discrete synchronization operations
//!
//! Provides:
//! - A shared [`TaskContext`](context::TaskContext) inherited by every task
//! - Task variants for creating, removing, downloading, uploading and
//!   reconciling items
//! - The [`ITaskPool`](pool::ITaskPool) submission port and a channel-backed
//!   [`TaskQueue`](pool::TaskQueue)
//!
//! ## Modules
//!
//! - [`context`] - Task context and drive layout
//! - [`task`] - The [`Task`](task::Task) trait and task kinds
//! - [`tasks`] - Task variants
//! - [`pool`] - Task submission and execution
//! - [`localfs`] - Local filesystem helpers (temp names, timestamps)

pub mod context;
pub mod localfs;
pub mod pool;
pub mod task;
pub mod tasks;


use std::path::PathBuf;

use onesync_core::domain::DomainError;
use onesync_core::ports::DriveError;
use thiserror::Error;

use crate::pool::PoolError;
use crate::task::TaskKind;

/// Errors that can occur while handling a task
#[derive(Debug, Error)]
pub enum TaskError {
    /// The drive client reported a failure
    #[error("Remote operation failed: {0}")]
    Remote(#[from] DriveError),

    /// A local filesystem operation failed
    #[error("Local operation failed on {}: {source}", .path.display())]
    Local {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The item store reported a failure
    #[error("Item store failed: {0:#}")]
    Store(anyhow::Error),

    /// A path could not be translated or validated
    #[error("Path error: {0}")]
    Path(#[from] DomainError),

    /// A follow-up task could not be submitted
    #[error("Task submission failed: {0}")]
    Pool(#[from] PoolError),

    /// The task kind has no implementation
    #[error("Unsupported task: {0}")]
    Unsupported(TaskKind),
}

impl TaskError {
    /// Wrap an I/O error with the path it happened on
    pub fn local(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TaskError::Local {
            path: path.into(),
            source,
        }
    }

    /// True if the failure came from the drive
    pub fn is_remote(&self) -> bool {
        matches!(self, TaskError::Remote(_))
    }

    /// True if the failure came from the local filesystem
    pub fn is_local(&self) -> bool {
        matches!(self, TaskError::Local { .. })
    }
}
