//! Task context
//!
//! Every task carries a [`TaskContext`]: handles to the drive client, the
//! item store, the task pool and the drive layout. A root task gets a fresh
//! context from [`TaskContext::new`]; child tasks inherit their parent's,
//! sharing the exact same handles.

use std::fmt;
use std::sync::Arc;

use onesync_core::config::Config;
use onesync_core::domain::{ConflictBehavior, DomainError};
use onesync_core::filter::PathFilter;
use onesync_core::paths::PathTranslator;
use onesync_core::ports::{IDriveClient, IItemStore};

use crate::pool::ITaskPool;

// ============================================================================
// DriveLayout
// ============================================================================

/// Where the drive lives locally, which local entries to skip and how new
/// local entries are created remotely
#[derive(Debug, Clone)]
pub struct DriveLayout {
    translator: PathTranslator,
    filter: PathFilter,
    conflict_behavior: ConflictBehavior,
}

impl DriveLayout {
    /// Layout with the default conflict behavior (`rename`)
    pub fn new(translator: PathTranslator, filter: PathFilter) -> Self {
        Self {
            translator,
            filter,
            conflict_behavior: ConflictBehavior::default(),
        }
    }

    #[must_use]
    pub fn with_conflict_behavior(mut self, conflict_behavior: ConflictBehavior) -> Self {
        self.conflict_behavior = conflict_behavior;
        self
    }

    /// Build the layout from the `drive` and `tasks` configuration sections
    ///
    /// Ignore files that cannot be read are logged and skipped.
    pub fn from_config(config: &Config) -> Result<Self, DomainError> {
        Ok(Self {
            translator: config.drive.translator()?,
            filter: PathFilter::load(&config.drive.ignore_files),
            conflict_behavior: config.tasks.default_conflict_behavior,
        })
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Conflict behavior for uploads and folders created from new local entries
    pub fn conflict_behavior(&self) -> ConflictBehavior {
        self.conflict_behavior
    }
}

// ============================================================================
// TaskContext
// ============================================================================

/// Shared, immutable handles used by every task
#[derive(Clone)]
pub struct TaskContext {
    drive: Arc<dyn IDriveClient>,
    items_store: Arc<dyn IItemStore>,
    task_pool: Arc<dyn ITaskPool>,
    layout: Arc<DriveLayout>,
}

impl TaskContext {
    /// Context for a root task
    pub fn new(
        drive: Arc<dyn IDriveClient>,
        items_store: Arc<dyn IItemStore>,
        task_pool: Arc<dyn ITaskPool>,
        layout: Arc<DriveLayout>,
    ) -> Self {
        Self {
            drive,
            items_store,
            task_pool,
            layout,
        }
    }

    /// Context for a child task: the parent's handles, shared
    pub fn inherit(parent: &TaskContext) -> Self {
        parent.clone()
    }

    pub fn drive(&self) -> &Arc<dyn IDriveClient> {
        &self.drive
    }

    pub fn items_store(&self) -> &Arc<dyn IItemStore> {
        &self.items_store
    }

    pub fn task_pool(&self) -> &Arc<dyn ITaskPool> {
        &self.task_pool
    }

    pub fn layout(&self) -> &Arc<DriveLayout> {
        &self.layout
    }

    pub fn translator(&self) -> &PathTranslator {
        self.layout.translator()
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
