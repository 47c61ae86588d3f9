//! Bootstrap file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;

use crate::configurator::Registry;
use crate::node::loader::load_bootstrap;

/// Monitors the bootstrap file and emits its parsed content on change.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<JsonValue>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for reloaded content.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<JsonValue>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    tracing::info!(path = ?path, "Bootstrap file change detected, reloading");
                    match load_bootstrap(&path) {
                        Ok(raw) => {
                            let _ = tx.send(raw);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload bootstrap file, keeping current configuration");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Bootstrap watcher started");
        Ok(watcher)
    }
}

/// Apply every reload received on `updates` until the sender goes away.
pub async fn apply_reloads(registry: Arc<Registry>, mut updates: mpsc::UnboundedReceiver<JsonValue>) {
    while let Some(raw) = updates.recv().await {
        let registry = registry.clone();
        let outcome = tokio::task::spawn_blocking(move || registry.apply(&raw)).await;
        match outcome {
            Ok(Ok(())) => tracing::info!("Reloaded configuration applied"),
            Ok(Err(e)) => tracing::error!(code = e.code(), error = %e, "Reloaded configuration rejected"),
            Err(e) => tracing::error!(error = %e, "Reload task failed"),
        }
    }
}
