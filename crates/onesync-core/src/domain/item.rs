//! Drive item types
//!
//! [`DriveItem`] is the remote view of a file or folder as returned by the
//! drive API. [`ItemRecord`] is what the item store keeps about it, tagged
//! with an [`ItemStatus`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{RemoteId, RemotePath};

// ============================================================================
// Remote items
// ============================================================================

/// Reference to the parent of a drive item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReference {
    /// Parent item ID, absent for some drive roots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteId>,
    /// Parent path, e.g. `/drive/root:/Documents`
    pub path: RemotePath,
}

/// Client-side timestamps of an item
///
/// Sent back to the drive after an upload so the remote copy carries the
/// local modification time instead of the upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemInfo {
    #[serde(
        rename = "createdDateTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(rename = "lastModifiedDateTime")]
    pub modified_time: DateTime<Utc>,
}

impl FileSystemInfo {
    /// Facet carrying only a modification time
    #[must_use]
    pub fn modified(modified_time: DateTime<Utc>) -> Self {
        Self {
            created_time: None,
            modified_time,
        }
    }
}

/// A file or folder on the drive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DriveItemWire", into = "DriveItemWire")]
pub struct DriveItem {
    pub id: RemoteId,
    pub name: String,
    pub size: u64,
    pub parent_reference: ItemReference,
    pub modified_time: DateTime<Utc>,
    pub is_folder: bool,
    pub file_system_info: Option<FileSystemInfo>,
}

impl DriveItem {
    /// Remote path of the item itself (`parent + '/' + name`)
    ///
    /// # Errors
    /// Returns error if the name is not a single path component
    pub fn remote_path(&self) -> Result<RemotePath, DomainError> {
        self.parent_reference.path.join(&self.name)
    }

    /// Modification time to mirror locally
    ///
    /// Prefers the client-side timestamp from the `fileSystemInfo` facet.
    #[must_use]
    pub fn effective_modified_time(&self) -> DateTime<Utc> {
        self.file_system_info
            .map(|info| info.modified_time)
            .unwrap_or(self.modified_time)
    }
}

/// JSON shape used by the drive API
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveItemWire {
    id: RemoteId,
    name: String,
    #[serde(default)]
    size: u64,
    parent_reference: ItemReference,
    last_modified_date_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    folder: Option<FolderFacet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_system_info: Option<FileSystemInfo>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FolderFacet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    child_count: Option<u64>,
}

impl TryFrom<DriveItemWire> for DriveItem {
    type Error = DomainError;

    fn try_from(wire: DriveItemWire) -> Result<Self, Self::Error> {
        if wire.name.is_empty() || wire.name.contains('/') {
            return Err(DomainError::InvalidPath(format!(
                "Invalid item name: {:?}",
                wire.name
            )));
        }

        Ok(Self {
            id: wire.id,
            name: wire.name,
            size: wire.size,
            parent_reference: wire.parent_reference,
            modified_time: wire.last_modified_date_time,
            is_folder: wire.folder.is_some(),
            file_system_info: wire.file_system_info,
        })
    }
}

impl From<DriveItem> for DriveItemWire {
    fn from(item: DriveItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            size: item.size,
            parent_reference: item.parent_reference,
            last_modified_date_time: item.modified_time,
            folder: item.is_folder.then(FolderFacet::default),
            file_system_info: item.file_system_info,
        }
    }
}

// ============================================================================
// Stored records
// ============================================================================

/// Status of an item in the item store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Remote and local agree
    Ok,
    /// Content was fetched from the drive
    Downloaded,
    /// Upload in progress
    Uploading,
    /// Download in progress
    Downloading,
    /// Deletion in progress
    Deleting,
}

impl ItemStatus {
    /// Stable string form used for persistence
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Ok => "ok",
            ItemStatus::Downloaded => "downloaded",
            ItemStatus::Uploading => "uploading",
            ItemStatus::Downloading => "downloading",
            ItemStatus::Deleting => "deleting",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(ItemStatus::Ok),
            "downloaded" => Ok(ItemStatus::Downloaded),
            "uploading" => Ok(ItemStatus::Uploading),
            "downloading" => Ok(ItemStatus::Downloading),
            "deleting" => Ok(ItemStatus::Deleting),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

/// What the item store remembers about one drive item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: RemoteId,
    pub name: String,
    pub parent_path: RemotePath,
    pub is_folder: bool,
    pub size: u64,
    pub modified_time: DateTime<Utc>,
    pub status: ItemStatus,
}

impl ItemRecord {
    /// Build the record for `item` in the given status
    #[must_use]
    pub fn from_item(item: &DriveItem, status: ItemStatus) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            parent_path: item.parent_reference.path.clone(),
            is_folder: item.is_folder,
            size: item.size,
            modified_time: item.effective_modified_time(),
            status,
        }
    }
}

// ============================================================================
// Conflict behavior
// ============================================================================

/// How the drive resolves a name collision on create or upload
///
/// Values match the drive's `@microsoft.graph.conflictBehavior` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictBehavior {
    /// Reject the request
    Fail,
    /// Overwrite the existing item
    Replace,
    /// Keep both, the drive picks a new name
    #[default]
    Rename,
}

impl ConflictBehavior {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictBehavior::Fail => "fail",
            ConflictBehavior::Replace => "replace",
            ConflictBehavior::Rename => "rename",
        }
    }
}

impl fmt::Display for ConflictBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictBehavior {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(ConflictBehavior::Fail),
            "replace" => Ok(ConflictBehavior::Replace),
            "rename" => Ok(ConflictBehavior::Rename),
            other => Err(DomainError::InvalidConflictBehavior(other.to_string())),
        }
    }
}
