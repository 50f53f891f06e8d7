//! Persistence of scene snapshots.
//!
//! The scene is loaded once at startup and rewritten after mutations. Every
//! failure here is recoverable: the in-memory store stays authoritative.

mod memory;
mod persister;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStorage;
pub use persister::{PlatformStorage, SnapshotPersister, create_default_storage};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use crate::store::SceneSnapshot;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Snapshot storage backend, keyed by scene name.
///
/// On native platforms implementations must be Send + Sync.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Write a snapshot, replacing any previous one under `key`.
    fn save(&self, key: &str, snapshot: &SceneSnapshot) -> BoxFuture<'_, StorageResult<()>>;

    /// Read the snapshot stored under `key`.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<SceneSnapshot>>;
}

/// Snapshot storage backend (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Write a snapshot, replacing any previous one under `key`.
    fn save(&self, key: &str, snapshot: &SceneSnapshot) -> BoxFuture<'_, StorageResult<()>>;

    /// Read the snapshot stored under `key`.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<SceneSnapshot>>;
}
