//! Directory reconciliation

use std::collections::{BTreeSet, HashMap};
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use onesync_core::domain::{
    ConflictBehavior, DriveItem, ItemRecord, ItemStatus, RemotePath, SyncPath,
};
use tracing::{debug, info, warn};

use crate::context::TaskContext;
use crate::localfs;
use crate::task::{log_outcome, BoxedTask, Task, TaskKind};
use crate::tasks::{CreateDirTask, DownloadFileTask, RemoveItemTask, UploadFileTask};
use crate::TaskError;

/// A directory entry found on disk
#[derive(Debug, Clone, Copy)]
struct LocalEntry {
    is_dir: bool,
    size: u64,
    modified: DateTime<Utc>,
}

/// Reconciles one directory against the drive and the item store
///
/// Each child name is looked up in three places: the drive listing, the
/// local directory and the stored records. The combination decides the
/// follow-up:
///
/// | Remote | Local   | Record | Action                                        |
/// |--------|---------|--------|-----------------------------------------------|
/// | folder | missing | any    | create local dir, record `ok`, recurse        |
/// | folder | present | any    | record `ok` if unknown, recurse               |
/// | file   | missing | yes    | deleted locally: [`RemoveItemTask`]           |
/// | file   | missing | no     | new remotely: [`DownloadFileTask`]            |
/// | file   | present | no     | same size and mtime: record `downloaded`, else keep local as conflict copy and download |
/// | file   | present | yes    | local changed: upload with `replace`; remote changed: download; both: keep local as conflict copy and download |
/// | none   | present | yes    | deleted remotely: delete local entry and record |
/// | none   | present | no     | new locally: [`CreateDirTask`] or [`UploadFileTask`] with the layout's conflict behavior |
///
/// A folder on one side and a file on the other is logged and skipped.
/// Follow-up tasks are submitted, never awaited.
pub struct SynchronizeDirTask {
    context: TaskContext,
    local_dir: SyncPath,
    remote_dir: RemotePath,
}

impl SynchronizeDirTask {
    /// # Errors
    /// Fails if `local_dir` is outside the local root
    pub fn new(context: TaskContext, local_dir: SyncPath) -> Result<Self, TaskError> {
        let remote_dir = context.translator().to_remote(local_dir.as_path())?;
        Ok(Self {
            context,
            local_dir,
            remote_dir,
        })
    }

    pub fn remote_dir(&self) -> &RemotePath {
        &self.remote_dir
    }

    async fn run(self) -> Result<(), TaskError> {
        let remote: HashMap<String, DriveItem> = self
            .context
            .drive()
            .list_children(&self.remote_dir)
            .await?
            .into_iter()
            .filter(|item| !self.is_ignored(&item.name, item.is_folder))
            .map(|item| (item.name.clone(), item))
            .collect();

        let records: HashMap<String, ItemRecord> = self
            .context
            .items_store()
            .get_items(&self.remote_dir)
            .await
            .map_err(TaskError::Store)?
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();

        let local = self.scan_local().await?;

        let names: BTreeSet<&String> = remote
            .keys()
            .chain(local.keys())
            .chain(records.keys())
            .collect();

        debug!(
            path = %self.local_dir,
            remote = remote.len(),
            local = local.len(),
            records = records.len(),
            "Reconciling directory"
        );

        let mut first_error = None;
        for name in names {
            let outcome = self
                .reconcile(
                    name,
                    remote.get(name),
                    local.get(name),
                    records.get(name),
                )
                .await;
            if let Err(e) = outcome {
                warn!(path = %self.local_dir, %name, error = %e, "Failed to reconcile entry");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn reconcile(
        &self,
        name: &str,
        remote: Option<&DriveItem>,
        local: Option<&LocalEntry>,
        record: Option<&ItemRecord>,
    ) -> Result<(), TaskError> {
        match (remote, local) {
            (Some(item), Some(entry)) if item.is_folder != entry.is_dir => {
                warn!(
                    path = %self.local_dir.as_path().join(name).display(),
                    remote_is_folder = item.is_folder,
                    "Folder and file share a name, skipping"
                );
                Ok(())
            }
            (Some(item), None) if item.is_folder => {
                let path = self.child_path(name);
                tokio::fs::create_dir_all(&path)
                    .await
                    .map_err(|e| TaskError::local(&path, e))?;
                self.record(item, ItemStatus::Ok).await?;
                info!(path = %path.display(), "Created local folder");
                self.submit(self.sync_child(name)?)
            }
            (Some(item), Some(_)) if item.is_folder => {
                if record.is_none() {
                    self.record(item, ItemStatus::Ok).await?;
                }
                self.submit(self.sync_child(name)?)
            }
            (Some(item), None) => match record {
                Some(_) => {
                    debug!(%name, "Deleted locally");
                    self.submit(Box::new(RemoveItemTask::new(
                        self.child_context(),
                        self.local_dir.clone(),
                        name,
                        false,
                    )?))
                }
                None => {
                    debug!(%name, "New remote file");
                    self.submit(self.download(item)?)
                }
            },
            (Some(item), Some(entry)) => match record {
                None if same_content(entry, item.size, item.effective_modified_time()) => {
                    debug!(%name, "Local copy matches remote");
                    self.record(item, ItemStatus::Downloaded).await
                }
                None => {
                    self.keep_as_conflict_copy(name).await?;
                    self.submit(self.download(item)?)
                }
                Some(record) => {
                    let local_changed = !same_content(entry, record.size, record.modified_time);
                    let remote_changed = item.size != record.size
                        || !localfs::same_second(
                            item.effective_modified_time(),
                            record.modified_time,
                        );
                    match (local_changed, remote_changed) {
                        (true, true) => {
                            debug!(%name, "Changed on both sides");
                            self.keep_as_conflict_copy(name).await?;
                            self.submit(self.download(item)?)
                        }
                        (true, false) => {
                            debug!(%name, "Changed locally");
                            self.submit(Box::new(UploadFileTask::new(
                                self.child_context(),
                                self.local_dir.clone(),
                                name,
                                ConflictBehavior::Replace,
                            )?))
                        }
                        (false, true) => {
                            debug!(%name, "Changed remotely");
                            self.submit(self.download(item)?)
                        }
                        (false, false) => Ok(()),
                    }
                }
            },
            (None, Some(entry)) => match record {
                Some(record) => self.remove_local(name, entry, record).await,
                None if entry.is_dir => {
                    debug!(%name, "New local folder");
                    self.submit(Box::new(CreateDirTask::new(
                        self.child_context(),
                        self.local_dir.clone(),
                        name,
                        self.context.layout().conflict_behavior(),
                    )?))
                }
                None => {
                    debug!(%name, "New local file");
                    self.submit(Box::new(UploadFileTask::new(
                        self.child_context(),
                        self.local_dir.clone(),
                        name,
                        self.context.layout().conflict_behavior(),
                    )?))
                }
            },
            (None, None) => match record {
                // Gone on both sides
                Some(record) => {
                    self.context
                        .items_store()
                        .delete_item(&self.remote_dir, name, record.is_folder)
                        .await
                        .map_err(TaskError::Store)
                }
                None => Ok(()),
            },
        }
    }

    /// Reads the local directory, skipping ignored entries and temp files
    async fn scan_local(&self) -> Result<HashMap<String, LocalEntry>, TaskError> {
        let dir = self.local_dir.as_path();
        let local_err = |e| TaskError::local(dir, e);

        let mut entries = HashMap::new();
        let mut read_dir = tokio::fs::read_dir(dir).await.map_err(local_err)?;

        while let Some(entry) = read_dir.next_entry().await.map_err(local_err)? {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(path = %entry.path().display(), "Skipping non UTF-8 name");
                continue;
            };
            if localfs::is_temp_name(&name) {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(m) => m,
                // Removed while scanning
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(TaskError::local(entry.path(), e)),
            };
            if !metadata.is_dir() && !metadata.is_file() {
                debug!(path = %entry.path().display(), "Skipping special file");
                continue;
            }
            if self.is_ignored(&name, metadata.is_dir()) {
                debug!(path = %entry.path().display(), "Ignored");
                continue;
            }

            let modified =
                localfs::modified_time(&metadata).map_err(|e| TaskError::local(entry.path(), e))?;
            entries.insert(
                name,
                LocalEntry {
                    is_dir: metadata.is_dir(),
                    size: metadata.len(),
                    modified,
                },
            );
        }

        Ok(entries)
    }

    fn is_ignored(&self, name: &str, is_dir: bool) -> bool {
        let layout = self.context.layout();
        let relative = self
            .local_dir
            .relative_to(layout.translator().local_root())
            .map(|dir| dir.join(name))
            .unwrap_or_else(|_| PathBuf::from(name));
        layout.filter().is_ignored(&relative, is_dir)
    }

    /// Deletes a local entry whose remote counterpart is gone
    async fn remove_local(
        &self,
        name: &str,
        entry: &LocalEntry,
        record: &ItemRecord,
    ) -> Result<(), TaskError> {
        let path = self.child_path(name);
        let removed = if entry.is_dir {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        match removed {
            Ok(()) => info!(path = %path.display(), "Removed local entry deleted remotely"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(TaskError::local(&path, e)),
        }

        self.context
            .items_store()
            .delete_item(&self.remote_dir, name, record.is_folder)
            .await
            .map_err(TaskError::Store)
    }

    /// Moves a colliding local file out of the way of a download
    async fn keep_as_conflict_copy(&self, name: &str) -> Result<(), TaskError> {
        let from = self.child_path(name);
        let to = self
            .local_dir
            .as_path()
            .join(localfs::conflict_copy_name(name, Utc::now()));
        tokio::fs::rename(&from, &to)
            .await
            .map_err(|e| TaskError::local(&from, e))?;
        info!(from = %from.display(), to = %to.display(), "Kept local file as conflict copy");
        Ok(())
    }

    async fn record(&self, item: &DriveItem, status: ItemStatus) -> Result<(), TaskError> {
        self.context
            .items_store()
            .update_item(item, status)
            .await
            .map_err(TaskError::Store)
    }

    fn submit(&self, task: BoxedTask) -> Result<(), TaskError> {
        self.context.task_pool().add_task(task)?;
        Ok(())
    }

    fn download(&self, item: &DriveItem) -> Result<BoxedTask, TaskError> {
        Ok(Box::new(DownloadFileTask::new(
            self.child_context(),
            item.clone(),
        )?))
    }

    fn sync_child(&self, name: &str) -> Result<BoxedTask, TaskError> {
        let dir = self.local_dir.join(name)?;
        Ok(Box::new(SynchronizeDirTask::new(self.child_context(), dir)?))
    }

    fn child_context(&self) -> TaskContext {
        TaskContext::inherit(&self.context)
    }

    fn child_path(&self, name: &str) -> PathBuf {
        self.local_dir.as_path().join(name)
    }
}

fn same_content(entry: &LocalEntry, size: u64, modified: DateTime<Utc>) -> bool {
    entry.size == size && localfs::same_second(entry.modified, modified)
}

#[async_trait::async_trait]
impl Task for SynchronizeDirTask {
    fn kind(&self) -> TaskKind {
        TaskKind::SynchronizeDir
    }

    fn context(&self) -> &TaskContext {
        &self.context
    }

    fn target(&self) -> String {
        self.local_dir.to_string()
    }

    async fn handle(self: Box<Self>) -> Result<(), TaskError> {
        let target = self.target();
        let result = (*self).run().await;
        log_outcome(TaskKind::SynchronizeDir, &target, &result);
        result
    }
}
