//! Domain entities
//!
//! This module contains the core domain types for onesync:
//! - Newtypes for validated paths and identifiers
//! - Drive items, stored item records and their status
//! - Domain-specific error types

pub mod errors;
pub mod item;
pub mod newtypes;

// Re-export commonly used types
pub use errors::DomainError;
pub use item::{ConflictBehavior, DriveItem, FileSystemInfo, ItemRecord, ItemReference, ItemStatus};
pub use newtypes::*;
