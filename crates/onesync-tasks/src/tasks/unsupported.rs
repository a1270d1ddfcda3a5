//! Move, copy and metadata-update tasks
//!
//! These are declared so callers can construct and submit them like any
//! other task, but handling them only reports
//! [`TaskError::Unsupported`](crate::TaskError::Unsupported).

use onesync_core::domain::SyncPath;

use crate::context::TaskContext;
use crate::task::{log_outcome, Task, TaskKind};
use crate::TaskError;

/// Moves an item within the drive
pub struct MoveItemTask {
    context: TaskContext,
    source: SyncPath,
    destination: SyncPath,
}

impl MoveItemTask {
    pub fn new(context: TaskContext, source: SyncPath, destination: SyncPath) -> Self {
        Self {
            context,
            source,
            destination,
        }
    }

    pub fn destination(&self) -> &SyncPath {
        &self.destination
    }
}

/// Copies an item within the drive
pub struct CopyItemTask {
    context: TaskContext,
    source: SyncPath,
    destination: SyncPath,
}

impl CopyItemTask {
    pub fn new(context: TaskContext, source: SyncPath, destination: SyncPath) -> Self {
        Self {
            context,
            source,
            destination,
        }
    }

    pub fn destination(&self) -> &SyncPath {
        &self.destination
    }
}

/// Pushes local metadata of an item to the drive
pub struct UpdateItemInfoTask {
    context: TaskContext,
    path: SyncPath,
}

impl UpdateItemInfoTask {
    pub fn new(context: TaskContext, path: SyncPath) -> Self {
        Self { context, path }
    }
}

#[async_trait::async_trait]
impl Task for MoveItemTask {
    fn kind(&self) -> TaskKind {
        TaskKind::MoveItem
    }

    fn context(&self) -> &TaskContext {
        &self.context
    }

    fn target(&self) -> String {
        self.source.to_string()
    }

    async fn handle(self: Box<Self>) -> Result<(), TaskError> {
        let result = Err(TaskError::Unsupported(TaskKind::MoveItem));
        log_outcome(TaskKind::MoveItem, &self.target(), &result);
        result
    }
}

#[async_trait::async_trait]
impl Task for CopyItemTask {
    fn kind(&self) -> TaskKind {
        TaskKind::CopyItem
    }

    fn context(&self) -> &TaskContext {
        &self.context
    }

    fn target(&self) -> String {
        self.source.to_string()
    }

    async fn handle(self: Box<Self>) -> Result<(), TaskError> {
        let result = Err(TaskError::Unsupported(TaskKind::CopyItem));
        log_outcome(TaskKind::CopyItem, &self.target(), &result);
        result
    }
}

#[async_trait::async_trait]
impl Task for UpdateItemInfoTask {
    fn kind(&self) -> TaskKind {
        TaskKind::UpdateItemInfo
    }

    fn context(&self) -> &TaskContext {
        &self.context
    }

    fn target(&self) -> String {
        self.path.to_string()
    }

    async fn handle(self: Box<Self>) -> Result<(), TaskError> {
        let result = Err(TaskError::Unsupported(TaskKind::UpdateItemInfo));
        log_outcome(TaskKind::UpdateItemInfo, &self.target(), &result);
        result
    }
}
