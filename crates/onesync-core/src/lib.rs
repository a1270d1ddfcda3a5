//! onesync core - Domain types, ports and configuration
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `DriveItem`, `ItemRecord`, `ItemStatus`, `ConflictBehavior`
//!   and validated path / identifier newtypes
//! - **Path translation** - `PathTranslator` between the drive namespace and
//!   the local mirror
//! - **Ignore rules** - `PathFilter`
//! - **Port definitions** - Traits for adapters: `IDriveClient`, `IItemStore`
//! - **Configuration and logging bootstrap**
//!
//! # Architecture
//!
//! The domain module holds pure data types with no I/O. Ports define trait
//! interfaces that adapter crates implement. The task crate drives both.

pub mod config;
pub mod domain;
pub mod filter;
pub mod logging;
pub mod paths;
pub mod ports;
