//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including path translation failures and identifier validation.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Path is not within the configured local root
    #[error("Path not within sync root: {0}")]
    PathNotInSyncRoot(String),

    /// Remote path does not start with the drive root marker
    #[error("Remote path outside drive root: {0}")]
    OutsideDriveRoot(String),

    /// Invalid remote path format
    #[error("Invalid remote path: {0}")]
    InvalidRemotePath(String),

    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// Unknown item status string
    #[error("Invalid item status: {0}")]
    InvalidStatus(String),

    /// Unknown conflict behavior string
    #[error("Invalid conflict behavior: {0}")]
    InvalidConflictBehavior(String),
}
