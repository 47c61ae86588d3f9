//! Configurators: owners of one named configuration root.
//!
//! # Data Flow
//! ```text
//! set(selector, raw)
//!     → writer lock (one set at a time per root)
//!     → raw value diffed against current root
//!     → candidate root built (copy-on-write)
//!     → validation against (candidate, current)
//!     → storage write (concise JSON)
//!     → atomic swap of current root, listeners notified
//! ```
//!
//! # Design Decisions
//! - Readers load the current root through `ArcSwap` and never block
//! - A second concurrent `set` queues behind the first and builds its
//!   candidate from the root committed by the first
//! - Storage I/O happens under the writer lock only, never under a lock
//!   readers need
//! - Every leaf of the candidate is validated, not only the changed ones,
//!   so a committed root always passes the startup check
//! - Listeners run after the writer lock is released; a listener may call
//!   `set` on the same configurator
//! - Any failure leaves the current root untouched

pub mod registry;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use arc_swap::ArcSwap;
use serde_json::Value as JsonValue;

use crate::error::{ConfigError, ConfigResult};
use crate::observability::metrics;
use crate::presentation::{FormatConverter, JsonConverter};
use crate::storage::ConfigurationStorage;
use crate::tree::node::join_path;
use crate::tree::value::describe;
use crate::tree::{ConfigurationRoot, PropertyNode, Schema, Selectable, Selector, Value};
use crate::validation;

pub use registry::{Registry, RegistryBuilder};

/// One committed leaf change, as seen by listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationChange {
    pub root: String,
    pub path: String,
    pub old: Value,
    pub new: Value,
    /// Storage version the change was persisted with.
    pub version: u64,
}

pub type ChangeListener = Arc<dyn Fn(&ConfigurationChange) + Send + Sync>;

/// A leaf change that has not been committed yet.
struct PendingChange {
    segments: Vec<String>,
    path: String,
    old: Value,
    new: Value,
}

pub struct Configurator {
    name: String,
    schema: Schema,
    current: ArcSwap<ConfigurationRoot>,
    version: AtomicU64,
    write_lock: Mutex<()>,
    storage: Arc<dyn ConfigurationStorage>,
    converter: JsonConverter,
    listeners: RwLock<Vec<ChangeListener>>,
}

impl Configurator {
    /// Build a configurator from its schema and initial data.
    ///
    /// Values previously persisted for this root take precedence over
    /// `initial`. The resulting root must pass every validator.
    pub fn create(
        name: &str,
        schema: Schema,
        initial: &JsonValue,
        storage: Arc<dyn ConfigurationStorage>,
    ) -> ConfigResult<Self> {
        schema.check(name)?;
        let converter = JsonConverter::new();

        let stored = storage
            .read(name)
            .map_err(|e| ConfigError::schema(name, format!("cannot read stored values: {}", e)))?;

        let (root, version) = match stored {
            Some(stored) => {
                let overlay = converter
                    .convert_from(&stored.data)
                    .map_err(|e| ConfigError::schema(name, format!("stored values unreadable: {}", e)))?;
                (schema.build_layered(name, initial, &overlay)?, stored.version)
            }
            None => (schema.build(name, initial)?, 0),
        };

        validation::validate_all(&root).map_err(|e| ConfigError::schema(name, e.to_string()))?;

        tracing::info!(root = name, version, "Configurator created");

        Ok(Self {
            name: name.to_string(),
            schema,
            current: ArcSwap::from_pointee(root),
            version: AtomicU64::new(version),
            write_lock: Mutex::new(()),
            storage,
            converter,
            listeners: RwLock::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Last committed root.
    pub fn root(&self) -> Arc<ConfigurationRoot> {
        self.current.load_full()
    }

    /// Storage version of the last committed root (0 if never persisted).
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn get<T: Selectable>(&self, selector: &Selector<T>) -> ConfigResult<T> {
        selector.extract(&self.current.load())
    }

    /// Read access for other subsystems. Same resolution as [`get`](Self::get).
    pub fn get_public<T: Selectable>(&self, selector: &Selector<T>) -> ConfigResult<T> {
        self.get(selector)
    }

    pub fn listen(&self, listener: ChangeListener) {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(listener);
    }

    /// Set a single leaf from a typed value.
    pub fn set_value<T>(&self, selector: &Selector<T>, value: impl Into<Value>) -> ConfigResult<()> {
        self.set(selector, &value.into().to_json())
    }

    /// Apply `raw` at `selector`.
    ///
    /// For a leaf `raw` is the new value; for a branch it is a partial object
    /// whose keys must all exist below the branch.
    pub fn set<T>(&self, selector: &Selector<T>, raw: &JsonValue) -> ConfigResult<()> {
        let guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let current = self.current.load_full();
        let target = selector.resolve(&current)?;

        let mut pending = Vec::new();
        if let Err(e) = collect_changes(
            target,
            selector.path(),
            selector.relative().to_vec(),
            raw,
            &mut pending,
        ) {
            metrics::record_update(&self.name, "rejected");
            return Err(e);
        }

        if pending.is_empty() {
            tracing::debug!(root = %self.name, path = %selector, "No effective change");
            return Ok(());
        }

        let mut candidate = (*current).clone();
        for change in &pending {
            let node = candidate
                .lookup(&change.segments)
                .ok_or_else(|| ConfigError::not_found(&change.path))?
                .with_value(&change.path, change.new.clone())?;
            candidate = candidate.replace(&change.segments, node)?;
        }

        let paths: Vec<String> = pending.iter().map(|c| c.path.clone()).collect();
        let checked = validation::validate_changes(&paths, &candidate, &current)
            .and_then(|()| validation::validate_root(&candidate, &current));
        if let Err(e) = checked {
            tracing::warn!(root = %self.name, path = %selector, error = %e, "Configuration change rejected");
            metrics::record_update(&self.name, "rejected");
            return Err(e);
        }

        let data = self.converter.convert_root_to(&candidate);
        let version = match self.storage.write(&self.name, &data) {
            Ok(version) => version,
            Err(source) => {
                tracing::error!(root = %self.name, error = %source, "Failed to persist configuration change");
                metrics::record_update(&self.name, "storage_failed");
                return Err(ConfigError::StorageWriteFailed {
                    root: self.name.clone(),
                    source,
                });
            }
        };

        self.current.store(Arc::new(candidate));
        self.version.store(version, Ordering::Release);
        // Listeners may write back into this configurator.
        drop(guard);
        metrics::record_update(&self.name, "committed");
        tracing::info!(
            root = %self.name,
            path = %selector,
            version,
            changed = pending.len(),
            "Configuration change committed"
        );

        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for change in pending {
            let event = ConfigurationChange {
                root: self.name.clone(),
                path: change.path,
                old: change.old,
                new: change.new,
                version,
            };
            for listener in &listeners {
                listener(&event);
            }
        }

        Ok(())
    }
}

/// Diff `raw` against `node`, recording every leaf whose value would change.
fn collect_changes(
    node: &PropertyNode,
    path: &str,
    segments: Vec<String>,
    raw: &JsonValue,
    out: &mut Vec<PendingChange>,
) -> ConfigResult<()> {
    match node {
        PropertyNode::Leaf(leaf) => {
            let new = leaf.kind().coerce(raw).ok_or_else(|| ConfigError::InvalidValue {
                path: path.to_string(),
                expected: leaf.kind().to_string(),
                found: describe(raw).to_string(),
            })?;
            if &new != leaf.value() {
                out.push(PendingChange {
                    segments,
                    path: path.to_string(),
                    old: leaf.value().clone(),
                    new,
                });
            }
            Ok(())
        }
        PropertyNode::Branch(branch) => {
            let JsonValue::Object(map) = raw else {
                return Err(ConfigError::InvalidValue {
                    path: path.to_string(),
                    expected: "object".to_string(),
                    found: describe(raw).to_string(),
                });
            };
            for (name, child_raw) in map {
                let child_path = join_path(path, name);
                let child = branch
                    .children()
                    .get(name)
                    .ok_or_else(|| ConfigError::not_found(&child_path))?;
                let mut child_segments = segments.clone();
                child_segments.push(name.clone());
                collect_changes(child, &child_path, child_segments, child_raw, out)?;
            }
            Ok(())
        }
    }
}
