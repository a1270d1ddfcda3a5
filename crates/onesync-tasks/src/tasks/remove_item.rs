//! Remote deletion of an item removed locally

use onesync_core::domain::{RemotePath, SyncPath};
use onesync_core::ports::DriveError;
use tracing::{debug, info};

use crate::context::TaskContext;
use crate::task::{log_outcome, Task, TaskKind};
use crate::TaskError;

/// Deletes an item from the drive and forgets its record
///
/// An item that is already gone from the drive counts as deleted, so the
/// task can be run again after a partial failure.
pub struct RemoveItemTask {
    context: TaskContext,
    local_parent: SyncPath,
    name: String,
    is_folder: bool,
    parent_path: RemotePath,
    item_path: RemotePath,
}

impl RemoveItemTask {
    /// # Errors
    /// Fails if `local_parent` is outside the local root or `name` is not a
    /// single path component
    pub fn new(
        context: TaskContext,
        local_parent: SyncPath,
        name: impl Into<String>,
        is_folder: bool,
    ) -> Result<Self, TaskError> {
        let name = name.into();
        let parent_path = context.translator().to_remote(local_parent.as_path())?;
        let item_path = context.translator().child_remote(&parent_path, &name)?;

        Ok(Self {
            context,
            local_parent,
            name,
            is_folder,
            parent_path,
            item_path,
        })
    }

    /// Remote path of the item to delete
    pub fn item_path(&self) -> &RemotePath {
        &self.item_path
    }

    async fn run(self) -> Result<(), TaskError> {
        match self.context.drive().delete_item(&self.item_path).await {
            Ok(()) => info!(path = %self.item_path, "Deleted remote item"),
            Err(DriveError::NotFound(message)) => {
                debug!(path = %self.item_path, %message, "Remote item already gone");
            }
            Err(e) => return Err(e.into()),
        }

        self.context
            .items_store()
            .delete_item(&self.parent_path, &self.name, self.is_folder)
            .await
            .map_err(TaskError::Store)
    }
}

#[async_trait::async_trait]
impl Task for RemoveItemTask {
    fn kind(&self) -> TaskKind {
        TaskKind::RemoveItem
    }

    fn context(&self) -> &TaskContext {
        &self.context
    }

    fn target(&self) -> String {
        self.local_parent.as_path().join(&self.name).display().to_string()
    }

    async fn handle(self: Box<Self>) -> Result<(), TaskError> {
        let target = self.target();
        let result = (*self).run().await;
        log_outcome(TaskKind::RemoveItem, &target, &result);
        result
    }
}
