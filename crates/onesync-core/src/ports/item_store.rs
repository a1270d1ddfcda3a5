//! Item store port (driven/secondary port)
//!
//! Persistent record of every item the tasks have reconciled. Records are
//! keyed by `(parent_path, name)` in the drive namespace.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   and don't need domain-level classification.

use crate::domain::{DriveItem, ItemRecord, ItemStatus, RemotePath};

/// Port trait for the item store
#[async_trait::async_trait]
pub trait IItemStore: Send + Sync {
    /// Inserts or replaces the record for `item` with the given status
    async fn update_item(&self, item: &DriveItem, status: ItemStatus) -> anyhow::Result<()>;

    /// Removes the record for `item_name` under `parent_path`
    ///
    /// Removing a folder also removes the records below it.
    async fn delete_item(
        &self,
        parent_path: &RemotePath,
        item_name: &str,
        is_folder: bool,
    ) -> anyhow::Result<()>;

    /// Returns the records of the direct children of `parent_path`
    async fn get_items(&self, parent_path: &RemotePath) -> anyhow::Result<Vec<ItemRecord>>;
}
