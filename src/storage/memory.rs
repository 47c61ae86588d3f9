//! In-memory storage for tests and ephemeral nodes.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

use crate::observability::metrics;
use crate::storage::{ConfigurationStorage, Listeners, StorageError, StorageEvent, StorageListener, StoredRoot};

#[derive(Default)]
pub struct InMemoryStorage {
    roots: DashMap<String, StoredRoot>,
    listeners: Listeners,
    fail_writes: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail until switched off again.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl ConfigurationStorage for InMemoryStorage {
    fn read(&self, root: &str) -> Result<Option<StoredRoot>, StorageError> {
        Ok(self.roots.get(root).map(|entry| entry.value().clone()))
    }

    fn write(&self, root: &str, data: &str) -> Result<u64, StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            metrics::record_storage_write(root, false);
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }

        let version = {
            let mut entry = self.roots.entry(root.to_string()).or_insert(StoredRoot {
                data: String::new(),
                version: 0,
            });
            entry.version += 1;
            entry.data = data.to_string();
            entry.version
        };

        metrics::record_storage_write(root, true);
        self.listeners.notify(&StorageEvent {
            root: root.to_string(),
            version,
        });
        Ok(version)
    }

    fn listen(&self, listener: StorageListener) {
        self.listeners.add(listener);
    }
}
