//! Watching Rust sources for regeneration.
//!
//! Notifications are debounced into batches. Each batch is reduced to the
//! Rust sources it touches, so one burst of saves triggers one
//! regeneration.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};

use crate::error::{CliResult, WatchError};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// One debounced batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Rust sources that were written, created or removed, sorted.
    Changed(Vec<PathBuf>),
    Error(String),
}

/// Watches a source tree for changes to `.rs` files.
pub struct FileWatcher {
    root: PathBuf,
    debounce: Duration,
}

impl FileWatcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching.
    ///
    /// Events stop arriving once the returned debouncer is dropped.
    pub fn watch(&self) -> CliResult<(Debouncer<RecommendedWatcher>, Receiver<WatchEvent>)> {
        let (tx, rx) = channel();

        let mut debouncer = new_debouncer(
            self.debounce,
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| {
                let event = match result {
                    Ok(events) => {
                        let sources = rust_sources(events.into_iter().map(|event| event.path));
                        if sources.is_empty() {
                            return;
                        }
                        WatchEvent::Changed(sources)
                    }
                    Err(e) => WatchEvent::Error(e.to_string()),
                };
                // The receiver is gone once the watch loop ends.
                let _ = tx.send(event);
            },
        )
        .map_err(|e| WatchError::Init(e.to_string()))?;

        debouncer
            .watcher()
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::Init(e.to_string()))?;

        tracing::debug!(
            root = %self.root.display(),
            debounce_ms = self.debounce.as_millis() as u64,
            "watching sources"
        );
        Ok((debouncer, rx))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

/// The distinct `.rs` paths of a batch, sorted.
fn rust_sources(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut sources: Vec<PathBuf> = paths
        .into_iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .collect();
    sources.sort();
    sources.dedup();
    sources
}

impl WatchEvent {
    /// Changed paths; empty for errors.
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            WatchEvent::Changed(paths) => paths,
            WatchEvent::Error(_) => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, WatchEvent::Error(_))
    }
}
