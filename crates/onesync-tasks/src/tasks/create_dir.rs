//! Remote folder creation for a directory that exists locally

use std::path::PathBuf;

use onesync_core::domain::{ConflictBehavior, ItemStatus, RemotePath, SyncPath};
use tracing::{debug, info};

use crate::context::TaskContext;
use crate::task::{log_outcome, Task, TaskKind};
use crate::tasks::SynchronizeDirTask;
use crate::TaskError;

/// Creates a local directory on the drive
///
/// The drive may pick a different name when `conflict_behavior` is
/// `Rename`, or report a different parent; the local directory is then
/// moved to match before the item is recorded.
pub struct CreateDirTask {
    context: TaskContext,
    local_parent: SyncPath,
    name: String,
    parent_path: RemotePath,
    conflict_behavior: ConflictBehavior,
}

impl CreateDirTask {
    /// # Errors
    /// Fails if `local_parent` is outside the local root or `name` is not a
    /// single path component
    pub fn new(
        context: TaskContext,
        local_parent: SyncPath,
        name: impl Into<String>,
        conflict_behavior: ConflictBehavior,
    ) -> Result<Self, TaskError> {
        let name = name.into();
        let parent_path = context.translator().to_remote(local_parent.as_path())?;
        parent_path.join(&name)?;

        Ok(Self {
            context,
            local_parent,
            name,
            parent_path,
            conflict_behavior,
        })
    }

    /// Remote parent the folder is created under
    pub fn parent_path(&self) -> &RemotePath {
        &self.parent_path
    }

    pub fn conflict_behavior(&self) -> ConflictBehavior {
        self.conflict_behavior
    }

    fn local_path(&self) -> PathBuf {
        self.local_parent.as_path().join(&self.name)
    }

    async fn run(mut self) -> Result<(), TaskError> {
        let item = self
            .context
            .drive()
            .create_dir(&self.name, &self.parent_path, self.conflict_behavior)
            .await?;

        // The drive's answer is authoritative for both parent and name
        self.parent_path = item.parent_reference.path.clone();
        let local_parent = self.context.translator().to_local(&self.parent_path)?;

        if item.name != self.name || local_parent != self.local_parent {
            let from = self.local_path();
            let to = local_parent.as_path().join(&item.name);
            debug!(from = %from.display(), to = %to.display(), "Drive renamed or moved folder, following locally");
            tokio::fs::rename(&from, &to)
                .await
                .map_err(|e| TaskError::local(&from, e))?;
        }

        self.context
            .items_store()
            .update_item(&item, ItemStatus::Ok)
            .await
            .map_err(TaskError::Store)?;

        info!(path = %self.parent_path, name = %item.name, item_id = %item.id, "Created remote folder");

        let local_dir = local_parent.join(&item.name)?;
        let follow_up = SynchronizeDirTask::new(TaskContext::inherit(&self.context), local_dir)?;
        self.context.task_pool().add_task(Box::new(follow_up))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl Task for CreateDirTask {
    fn kind(&self) -> TaskKind {
        TaskKind::CreateDir
    }

    fn context(&self) -> &TaskContext {
        &self.context
    }

    fn target(&self) -> String {
        self.local_path().display().to_string()
    }

    async fn handle(self: Box<Self>) -> Result<(), TaskError> {
        let target = self.target();
        let result = (*self).run().await;
        log_outcome(TaskKind::CreateDir, &target, &result);
        result
    }
}
