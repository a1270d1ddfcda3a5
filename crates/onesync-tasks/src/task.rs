//! The task abstraction
//!
//! A task is a single-use unit of work. [`Task::handle`] consumes the boxed
//! task, so a task instance can run at most once.

use std::fmt::{self, Display};

use tracing::{error, info, warn};

use crate::context::TaskContext;
use crate::TaskError;

/// Discriminant of every task variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    CreateDir,
    RemoveItem,
    DownloadFile,
    UploadFile,
    SynchronizeDir,
    MoveItem,
    CopyItem,
    UpdateItemInfo,
}

impl TaskKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::CreateDir => "create_dir",
            TaskKind::RemoveItem => "remove_item",
            TaskKind::DownloadFile => "download_file",
            TaskKind::UploadFile => "upload_file",
            TaskKind::SynchronizeDir => "synchronize_dir",
            TaskKind::MoveItem => "move_item",
            TaskKind::CopyItem => "copy_item",
            TaskKind::UpdateItemInfo => "update_item_info",
        }
    }
}

impl Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work executed by a task pool
#[async_trait::async_trait]
pub trait Task: Send {
    /// Which variant this is
    fn kind(&self) -> TaskKind;

    /// The context shared with the task's parent and children
    fn context(&self) -> &TaskContext;

    /// Human-readable target of the task, usually a local path
    fn target(&self) -> String;

    /// Perform the task
    ///
    /// Failures are logged here, tagged with the task kind and target, and
    /// returned to the caller. Nothing is retried.
    async fn handle(self: Box<Self>) -> Result<(), TaskError>;
}

/// Boxed task as submitted to a pool
pub type BoxedTask = Box<dyn Task>;

/// Log how a task ended
pub(crate) fn log_outcome(kind: TaskKind, target: &str, result: &Result<(), TaskError>) {
    match result {
        Ok(()) => info!(%kind, path = %target, "Task completed"),
        Err(TaskError::Unsupported(_)) => {
            warn!(%kind, path = %target, "Task kind is not supported, skipping")
        }
        Err(e) => error!(%kind, path = %target, error = %e, "Task failed"),
    }
}
