//! Durable key-value storage adapter.
//!
//! # Responsibility
//! - Define the key-value contract the contact store persists through.
//! - Provide SQLite-backed and in-process implementations.
//! - Encode/decode whole collections as JSON text under fixed keys.
//!
//! # Invariants
//! - Every write replaces the full value of one key in a single statement.
//! - A key that was never written reads back as `None`, not as an error.

mod collection;
mod kv;
mod memory;
mod sqlite;

pub use collection::{read_collection, write_collection};
pub use kv::{KeyValueStorage, StorageError, StorageResult};
pub use memory::MemoryKeyValueStorage;
pub use sqlite::SqliteKeyValueStorage;

/// Storage key holding the serialized contacts collection.
pub const CONTACTS_KEY: &str = "contacts";
/// Storage key holding the serialized groups collection.
pub const GROUPS_KEY: &str = "groups";
