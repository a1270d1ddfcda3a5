//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces that tasks depend on, but whose implementations
//! live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IDriveClient`] - Remote drive operations
//! - [`IItemStore`] - Persistent item records

pub mod drive_client;
pub mod item_store;

pub use drive_client::{DriveError, IDriveClient};
pub use item_store::IItemStore;
