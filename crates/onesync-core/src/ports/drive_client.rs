//! Drive client port (driven/secondary port)
//!
//! This module defines the interface tasks use to talk to the remote drive.
//! The transport (HTTP, auth, retries) lives in an adapter; tasks only see
//! the operations below and a classified [`DriveError`].
//!
//! ## Design Notes
//!
//! - Unlike the item store, drive errors are classified: tasks branch on
//!   [`DriveError::NotFound`] and callers pick retry policies per variant.
//! - Content flows through borrowed `AsyncRead` / `AsyncWrite` trait objects
//!   so files are streamed instead of buffered in memory.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::domain::{ConflictBehavior, DriveItem, FileSystemInfo, RemoteId, RemotePath};

// ============================================================================
// DriveError
// ============================================================================

/// Errors reported by a drive client
#[derive(Debug, Error)]
pub enum DriveError {
    /// The item does not exist on the drive
    #[error("Item not found: {0}")]
    NotFound(String),

    /// An item with the same name exists and the conflict behavior is `fail`
    #[error("Name conflict: {0}")]
    NameConflict(String),

    /// Credentials are missing, expired or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The drive asked the client to slow down
    #[error("Throttled, retry after {retry_after_secs:?}s")]
    Throttled {
        /// Seconds from the `Retry-After` header, if any
        retry_after_secs: Option<u64>,
    },

    /// Any other error response from the service
    #[error("Service error {code}: {message}")]
    Service {
        /// HTTP status or service error code
        code: u16,
        /// Message returned by the service
        message: String,
    },

    /// Streaming the request or response body failed
    #[error("Transfer failed: {0}")]
    Transfer(#[from] std::io::Error),
}

impl DriveError {
    /// Classify an HTTP error response
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            401 | 403 => DriveError::Unauthorized(message),
            404 => DriveError::NotFound(message),
            409 => DriveError::NameConflict(message),
            429 | 503 => DriveError::Throttled {
                retry_after_secs: None,
            },
            _ => DriveError::Service { code, message },
        }
    }

    /// True for errors that may succeed if the same request is sent again
    pub fn is_transient(&self) -> bool {
        match self {
            DriveError::Throttled { .. } | DriveError::Transfer(_) => true,
            DriveError::Service { code, .. } => *code >= 500,
            _ => false,
        }
    }
}

// ============================================================================
// IDriveClient trait
// ============================================================================

/// Port trait for remote drive operations
///
/// Implementations must be `Send + Sync` as a single client is shared by
/// every task through the task context.
#[async_trait::async_trait]
pub trait IDriveClient: Send + Sync {
    /// Creates a folder named `name` under `parent_path`
    ///
    /// # Returns
    /// The created folder. With [`ConflictBehavior::Rename`] the server may
    /// pick a different name than requested.
    async fn create_dir(
        &self,
        name: &str,
        parent_path: &RemotePath,
        conflict_behavior: ConflictBehavior,
    ) -> Result<DriveItem, DriveError>;

    /// Deletes the item at `item_path`
    async fn delete_item(&self, item_path: &RemotePath) -> Result<(), DriveError>;

    /// Streams the content of `item_id` (`size` bytes) into `sink`
    async fn download_file(
        &self,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
        size: u64,
        item_id: &RemoteId,
    ) -> Result<(), DriveError>;

    /// Uploads `size` bytes from `data` as `filename` under `parent_path`
    async fn upload_file(
        &self,
        filename: &str,
        data: &mut (dyn AsyncRead + Unpin + Send),
        size: u64,
        parent_path: &RemotePath,
        conflict_behavior: ConflictBehavior,
    ) -> Result<DriveItem, DriveError>;

    /// Replaces the `fileSystemInfo` facet of `item_id`
    async fn update_item(
        &self,
        item_id: &RemoteId,
        file_system_info: FileSystemInfo,
    ) -> Result<DriveItem, DriveError>;

    /// Lists the direct children of the folder at `parent_path`
    async fn list_children(&self, parent_path: &RemotePath) -> Result<Vec<DriveItem>, DriveError>;
}
