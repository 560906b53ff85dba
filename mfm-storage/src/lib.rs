//! Persistence layer for the points manual catalog.
//!
//! The catalog engine keeps every revision in memory; this crate is the
//! durable copy behind it. A store must offer three things:
//!
//! - bulk-write a version's whole subtree in one transaction
//! - read a version's subtree back
//! - move the "latest" marker atomically
//!
//! Two implementations ship here: [`SqliteStore`] for real deployments and
//! [`MemoryStore`] for tests and embedded use.

mod error;
mod memory;
mod sqlite;
mod store;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::ReferenceStore;
