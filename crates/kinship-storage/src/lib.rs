//! Kinship Storage - Storage backends for the social graph
//!
//! This crate provides the node store and relationship store the graph
//! engine is built on, together with an atomic write-batch primitive. The
//! backends know nothing about users, posts or comments beyond their labels.

#![allow(clippy::result_large_err)]

pub mod batch;
pub mod error;
pub mod migration;
pub mod traits;

#[cfg(feature = "redb")]
pub mod redb;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod memory;

#[cfg(test)]
pub(crate) mod conformance;

pub use batch::{WriteBatch, WriteOp};
pub use error::{StorageError, StorageResult};
pub use migration::{Migratable, SchemaVersion, CURRENT_VERSION};
pub use traits::StorageBackend;

#[cfg(feature = "redb")]
pub use redb::RedbStorage;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

pub use memory::MemoryStorage;
