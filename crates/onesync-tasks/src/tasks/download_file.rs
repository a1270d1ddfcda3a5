//! File download through a hidden temp file
//!
//! Content is streamed into `.<name>.<hex>.!od_tmp` next to the target and
//! renamed into place only once complete, so a reader never sees a partial
//! file under the final name.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use onesync_core::domain::{DriveItem, ItemStatus, SyncPath};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::context::TaskContext;
use crate::localfs;
use crate::task::{log_outcome, Task, TaskKind};
use crate::TaskError;

/// Fetches a remote file into the local mirror
///
/// Content is streamed into a hidden temp file next to the destination and
/// renamed into place once complete, so the final name never holds a
/// partial file. The temp file is removed if anything fails.
pub struct DownloadFileTask {
    context: TaskContext,
    item: DriveItem,
    local_parent: SyncPath,
}

impl DownloadFileTask {
    /// # Errors
    /// Fails if the item's parent is outside the drive root
    pub fn new(context: TaskContext, item: DriveItem) -> Result<Self, TaskError> {
        let local_parent = context
            .translator()
            .to_local(&item.parent_reference.path)?;
        local_parent.join(&item.name)?;

        Ok(Self {
            context,
            item,
            local_parent,
        })
    }

    pub fn item(&self) -> &DriveItem {
        &self.item
    }

    fn local_path(&self) -> PathBuf {
        self.local_parent.as_path().join(&self.item.name)
    }

    async fn run(self) -> Result<(), TaskError> {
        let temp_path = self
            .local_parent
            .as_path()
            .join(localfs::temp_name(&self.item.name));
        let final_path = self.local_path();

        if let Err(e) = self.fetch(&temp_path, &final_path).await {
            remove_stranded(&temp_path).await;
            return Err(e);
        }

        self.context
            .items_store()
            .update_item(&self.item, ItemStatus::Downloaded)
            .await
            .map_err(TaskError::Store)?;

        info!(
            path = %final_path.display(),
            item_id = %self.item.id,
            bytes = self.item.size,
            "Downloaded file"
        );
        Ok(())
    }

    async fn fetch(&self, temp_path: &Path, final_path: &Path) -> Result<(), TaskError> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp_path)
            .await
            .map_err(|e| TaskError::local(temp_path, e))?;

        debug!(path = %temp_path.display(), "Streaming into temp file");
        self.context
            .drive()
            .download_file(&mut file, self.item.size, &self.item.id)
            .await?;

        file.flush()
            .await
            .map_err(|e| TaskError::local(temp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| TaskError::local(temp_path, e))?;
        drop(file);

        tokio::fs::rename(temp_path, final_path)
            .await
            .map_err(|e| TaskError::local(final_path, e))?;

        localfs::set_times(final_path, self.item.effective_modified_time())
            .await
            .map_err(|e| TaskError::local(final_path, e))
    }
}

/// Best-effort removal of a temp file left by a failed download
async fn remove_stranded(temp_path: &Path) {
    match tokio::fs::remove_file(temp_path).await {
        Ok(()) => debug!(path = %temp_path.display(), "Removed temp file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %temp_path.display(), error = %e, "Failed to remove temp file"),
    }
}

#[async_trait::async_trait]
impl Task for DownloadFileTask {
    fn kind(&self) -> TaskKind {
        TaskKind::DownloadFile
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
        log_outcome(TaskKind::DownloadFile, &target, &result);
        result
    }
}
