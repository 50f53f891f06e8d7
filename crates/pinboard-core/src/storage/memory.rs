//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::store::SceneSnapshot;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory storage for testing and ephemeral use.
///
/// Failures can be switched on to exercise the recovery paths of callers.
#[derive(Default)]
pub struct MemoryStorage {
    snapshots: RwLock<HashMap<String, SceneSnapshot>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `load` fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `save` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, snapshot: &SceneSnapshot) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let snapshot = snapshot.clone();
        Box::pin(async move {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("writes disabled".to_string()));
            }
            let mut snapshots = self
                .snapshots
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            snapshots.insert(key, snapshot);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<SceneSnapshot>> {
        let key = key.to_string();
        Box::pin(async move {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("reads disabled".to_string()));
            }
            let snapshots = self
                .snapshots
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            snapshots.get(&key).cloned().ok_or(StorageError::NotFound(key))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{ObjectKind, ObjectRecord};
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
                    payload: format!("note {}", i),
                })
                .collect(),
        }
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let snap = snapshot(3);

        block_on(storage.save("scene", &snap)).unwrap();
        let loaded = block_on(storage.load("scene")).unwrap();

        assert_eq!(loaded, snap);
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_keys_are_independent() {
        let storage = MemoryStorage::new();
        block_on(storage.save("a", &snapshot(1))).unwrap();
        block_on(storage.save("b", &snapshot(3))).unwrap();
        block_on(storage.save("a", &snapshot(2))).unwrap();

        assert_eq!(block_on(storage.load("a")).unwrap().len(), 2);
        assert_eq!(block_on(storage.load("b")).unwrap().len(), 3);
        assert_eq!(storage.write_count(), 3);
    }

    #[test]
    fn test_injected_failures() {
        let storage = MemoryStorage::new();
        block_on(storage.save("scene", &snapshot(1))).unwrap();

        storage.set_fail_writes(true);
        assert!(matches!(
            block_on(storage.save("scene", &snapshot(2))),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(storage.write_count(), 1);

        storage.set_fail_reads(true);
        assert!(block_on(storage.load("scene")).is_err());
        storage.set_fail_reads(false);
        assert_eq!(block_on(storage.load("scene")).unwrap().len(), 1);
    }
}
