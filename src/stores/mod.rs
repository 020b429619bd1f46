//! Record store backends.
//!
//! A record store is a key-value put: the record's id is the key, its JSON
//! encoding the value, and a put with an existing key replaces the old value
//! (last write wins). There is no batching, query, or delete surface.
//!
//! # Backends
//!
//! | Backend | Module | Notes |
//! |---------|--------|-------|
//! | In-memory | [`memory`] | Default; also the test double |
//! | Redis | [`redis`] | `SET <table>:<id> <json>` over one multiplexed connection |
//!
//! Collectors take their store by constructor injection. A shared reference
//! to a store is itself a store, so the caller can keep ownership and read
//! the records back after a run.

pub mod memory;
pub mod redis;

use crate::error::StoreError;
use crate::models::Record;
use clap::ValueEnum;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Trait for durable, idempotent record writes.
pub trait RecordStore {
    /// Write `record` under `record.id()`, replacing any existing value.
    async fn put(&self, record: &Record) -> Result<(), StoreError>;
}

impl<T: RecordStore> RecordStore for &T {
    async fn put(&self, record: &Record) -> Result<(), StoreError> {
        (**self).put(record).await
    }
}

/// Which backend to construct at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Memory,
    Redis,
}

/// The backend chosen by configuration.
#[derive(Debug)]
pub enum StoreBackend {
    Memory(MemoryStore),
    Redis(RedisStore),
}

impl StoreBackend {
    /// The in-memory store, when that is the active backend.
    pub fn as_memory(&self) -> Option<&MemoryStore> {
        match self {
            StoreBackend::Memory(store) => Some(store),
            StoreBackend::Redis(_) => None,
        }
    }
}

impl RecordStore for StoreBackend {
    async fn put(&self, record: &Record) -> Result<(), StoreError> {
        match self {
            StoreBackend::Memory(store) => store.put(record).await,
            StoreBackend::Redis(store) => store.put(record).await,
        }
    }
}
