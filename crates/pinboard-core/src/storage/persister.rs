//! Snapshot persistence for a single scene.
//!
//! Loads the scene once and coalesces mutations into saves: every mutation
//! marks the persister dirty, and the host takes at most one pending save
//! per turn of its event loop.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::store::SceneSnapshot;
use std::sync::Arc;

/// Tracks unsaved changes and writes snapshots to a storage backend.
pub struct SnapshotPersister<S: Storage> {
    storage: Arc<S>,
    key: String,
    dirty: bool,
    loaded: bool,
}

impl<S: Storage + 'static> SnapshotPersister<S> {
    pub fn new(storage: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            dirty: false,
            loaded: false,
        }
    }

    /// Load the persisted snapshot.
    ///
    /// Only the first call reads storage. A missing or unreadable snapshot
    /// yields an empty one.
    pub async fn load(&mut self) -> SceneSnapshot {
        if self.loaded {
            log::warn!("Snapshot '{}' already loaded; ignoring reload", self.key);
            return SceneSnapshot::default();
        }
        self.loaded = true;

        match self.storage.load(&self.key).await {
            Ok(snapshot) => {
                log::info!("Loaded {} objects from '{}'", snapshot.len(), self.key);
                snapshot
            }
            Err(StorageError::NotFound(_)) => {
                log::info!("No saved scene '{}'; starting empty", self.key);
                SceneSnapshot::default()
            }
            Err(e) => {
                log::error!("Failed to load scene '{}': {}; starting empty", self.key, e);
                SceneSnapshot::default()
            }
        }
    }

    /// Mark the scene as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Take a save of `snapshot` if there are unsaved changes.
    ///
    /// The returned future owns everything it needs, so the scene can keep
    /// mutating while it runs. It resolves to whether the write succeeded;
    /// failures are logged and not retried.
    pub fn take_save(&mut self, snapshot: SceneSnapshot) -> Option<BoxFuture<'static, bool>> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.save_task(snapshot))
    }

    /// Write `snapshot` now, dirty or not.
    pub async fn flush(&mut self, snapshot: SceneSnapshot) -> bool {
        self.dirty = false;
        self.save_task(snapshot).await
    }

    fn save_task(&self, snapshot: SceneSnapshot) -> BoxFuture<'static, bool> {
        let storage = Arc::clone(&self.storage);
        let key = self.key.clone();
        Box::pin(async move {
            match storage.save(&key, &snapshot).await {
                Ok(()) => {
                    log::debug!("Saved {} objects to '{}'", snapshot.len(), key);
                    true
                }
                Err(e) => {
                    log::error!("Failed to save scene '{}': {}", key, e);
                    false
                }
            }
        })
    }
}

/// Create a platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<super::FileStorage>> {
    Ok(Arc::new(super::FileStorage::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<super::LocalStorage>> {
    Ok(Arc::new(super::LocalStorage::new()))
}

/// Convenience type alias for platform-specific storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = super::FileStorage;

#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = super::LocalStorage;

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::objects::{ObjectKind, ObjectRecord};
    use crate::storage::MemoryStorage;
    use pollster::block_on;

    fn snapshot(n: usize) -> SceneSnapshot {
        SceneSnapshot {
            objects: (0..n)
                .map(|i| ObjectRecord {
                    id: uuid::Uuid::new_v4(),
                    kind: ObjectKind::Note,
                    x: 0.0,
                    y: 0.0,
                    width: 100.0,
                    height: 100.0,
                    z_rank: i as i64 + 1,
                    payload: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_clean_persister_has_nothing_to_save() {
        let mut persister = SnapshotPersister::new(Arc::new(MemoryStorage::new()), "scene");
        assert!(!persister.is_dirty());
        assert!(persister.take_save(snapshot(1)).is_none());
    }

    #[test]
    fn test_dirty_saves_once() {
        let storage = Arc::new(MemoryStorage::new());
        let mut persister = SnapshotPersister::new(storage.clone(), "scene");

        persister.mark_dirty();
        persister.mark_dirty();
        let task = persister.take_save(snapshot(2)).unwrap();
        assert!(persister.take_save(snapshot(2)).is_none());
        assert!(block_on(task));

        assert_eq!(storage.write_count(), 1);
        assert_eq!(block_on(storage.load("scene")).unwrap().len(), 2);
    }

    #[test]
    fn test_failed_save_is_absorbed() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_fail_writes(true);
        let mut persister = SnapshotPersister::new(storage.clone(), "scene");

        persister.mark_dirty();
        let task = persister.take_save(snapshot(1)).unwrap();
        assert!(!block_on(task));
        assert!(!persister.is_dirty());
    }

    #[test]
    fn test_load_once() {
        let storage = Arc::new(MemoryStorage::new());
        block_on(storage.save("scene", &snapshot(3))).unwrap();
        let mut persister = SnapshotPersister::new(storage, "scene");

        assert_eq!(block_on(persister.load()).len(), 3);
        assert!(block_on(persister.load()).is_empty());
    }

    #[test]
    fn test_load_failure_yields_empty() {
        let storage = Arc::new(MemoryStorage::new());
        block_on(storage.save("scene", &snapshot(3))).unwrap();
        storage.set_fail_reads(true);

        let mut persister = SnapshotPersister::new(storage, "scene");
        assert!(block_on(persister.load()).is_empty());

        let mut missing = SnapshotPersister::new(Arc::new(MemoryStorage::new()), "other");
        assert!(block_on(missing.load()).is_empty());
    }

    #[test]
    fn test_flush_writes_when_clean() {
        let storage = Arc::new(MemoryStorage::new());
        let mut persister = SnapshotPersister::new(storage.clone(), "scene");
        assert!(block_on(persister.flush(snapshot(1))));
        assert_eq!(storage.write_count(), 1);
    }
}
