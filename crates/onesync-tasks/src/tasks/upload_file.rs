//! File upload followed by a modification time stamp

use std::io;
use std::path::PathBuf;

use onesync_core::domain::{ConflictBehavior, FileSystemInfo, ItemStatus, RemotePath, SyncPath};
use tracing::info;

use crate::context::TaskContext;
use crate::localfs;
use crate::task::{log_outcome, Task, TaskKind};
use crate::TaskError;

/// Uploads a local file and stamps the remote copy with the local mtime
pub struct UploadFileTask {
    context: TaskContext,
    local_parent: SyncPath,
    name: String,
    parent_path: RemotePath,
    conflict_behavior: ConflictBehavior,
}

impl UploadFileTask {
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

    pub fn parent_path(&self) -> &RemotePath {
        &self.parent_path
    }

    pub fn conflict_behavior(&self) -> ConflictBehavior {
        self.conflict_behavior
    }

    fn local_path(&self) -> PathBuf {
        self.local_parent.as_path().join(&self.name)
    }

    async fn run(self) -> Result<(), TaskError> {
        let path = self.local_path();
        let local = |e: io::Error| TaskError::local(&path, e);

        let metadata = tokio::fs::metadata(&path).await.map_err(local)?;
        if !metadata.is_file() {
            return Err(local(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        let size = metadata.len();

        let mut file = tokio::fs::File::open(&path).await.map_err(local)?;
        let uploaded = self
            .context
            .drive()
            .upload_file(
                &self.name,
                &mut file,
                size,
                &self.parent_path,
                self.conflict_behavior,
            )
            .await?;
        drop(file);

        let metadata = tokio::fs::metadata(&path).await.map_err(local)?;
        let modified = localfs::modified_time(&metadata).map_err(local)?;

        let item = self
            .context
            .drive()
            .update_item(&uploaded.id, FileSystemInfo::modified(modified))
            .await?;

        self.context
            .items_store()
            .update_item(&item, ItemStatus::Ok)
            .await
            .map_err(TaskError::Store)?;

        info!(
            path = %path.display(),
            item_id = %item.id,
            bytes = size,
            "Uploaded file"
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl Task for UploadFileTask {
    fn kind(&self) -> TaskKind {
        TaskKind::UploadFile
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
        log_outcome(TaskKind::UploadFile, &target, &result);
        result
    }
}
