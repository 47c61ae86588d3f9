//! Durable persistence of serialized configuration roots.
//!
//! # Data Flow
//! ```text
//! Configurator::set
//!     → candidate root serialized (concise JSON)
//!     → ConfigurationStorage::write(root, data)
//!     → version bumped, storage listeners notified
//!     → only then the candidate becomes visible
//! ```
//!
//! # Design Decisions
//! - Only values are stored; the shape comes from the compiled schema
//! - Each root is an independent key with its own version counter
//! - Backends never retry; a failed write is reported to the caller
//! - Distributed backends plug in through the same trait

pub mod file;
pub mod memory;

use std::sync::{Arc, RwLock};

use thiserror::Error;

pub use file::FileStorage;
pub use memory::InMemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt stored data for root '{root}': {message}")]
    Corrupt { root: String, message: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A persisted root value and the version it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRoot {
    pub data: String,
    pub version: u64,
}

/// Emitted after a write has been made durable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub root: String,
    pub version: u64,
}

pub type StorageListener = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

/// Key/value persistence for serialized roots.
pub trait ConfigurationStorage: Send + Sync {
    /// Last value written for `root`, if any.
    fn read(&self, root: &str) -> Result<Option<StoredRoot>, StorageError>;

    /// Durably store `data` for `root`, returning the new version.
    fn write(&self, root: &str, data: &str) -> Result<u64, StorageError>;

    /// Register a callback invoked after every successful write.
    fn listen(&self, listener: StorageListener);
}

/// Listener list shared by the bundled backends.
#[derive(Default)]
pub(crate) struct Listeners {
    inner: RwLock<Vec<StorageListener>>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: StorageListener) {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(listener);
    }

    pub(crate) fn notify(&self, event: &StorageEvent) {
        let listeners = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for listener in listeners {
            listener(event);
        }
    }
}
