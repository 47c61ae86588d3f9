//! File-backed storage for local installations.
//!
//! One `<root>.json` file per root inside the work directory. Writes go to a
//! temporary file first and are renamed into place, so a crash leaves either
//! the old or the new file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::storage::{ConfigurationStorage, Listeners, StorageError, StorageEvent, StorageListener, StoredRoot};

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u64,
    data: String,
}

pub struct FileStorage {
    dir: PathBuf,
    write_lock: Mutex<()>,
    listeners: Listeners,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        tracing::info!(dir = ?dir, "File storage opened");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
            listeners: Listeners::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, root: &str) -> PathBuf {
        self.dir.join(format!("{}.json", root))
    }

    fn load(&self, root: &str) -> Result<Option<Envelope>, StorageError> {
        let path = self.file_for(root);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                root: root.to_string(),
                message: e.to_string(),
            })
    }
}

impl ConfigurationStorage for FileStorage {
    fn read(&self, root: &str) -> Result<Option<StoredRoot>, StorageError> {
        Ok(self.load(root)?.map(|e| StoredRoot {
            data: e.data,
            version: e.version,
        }))
    }

    fn write(&self, root: &str, data: &str) -> Result<u64, StorageError> {
        let result = {
            let _guard = self
                .write_lock
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            self.write_locked(root, data)
        };

        metrics::record_storage_write(root, result.is_ok());
        let version = result?;
        tracing::debug!(root, version, "Configuration root persisted");
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

impl FileStorage {
    fn write_locked(&self, root: &str, data: &str) -> Result<u64, StorageError> {
        let version = self.load(root)?.map(|e| e.version).unwrap_or(0) + 1;
        let envelope = Envelope {
            version,
            data: data.to_string(),
        };
        let encoded = serde_json::to_vec(&envelope).map_err(|e| StorageError::Corrupt {
            root: root.to_string(),
            message: e.to_string(),
        })?;

        let target = self.file_for(root);
        let tmp = target.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&encoded)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &target)?;
        Ok(version)
    }
}
