// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::info;

use crate::errors::Result;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and push every created/modified/moved path into
/// `queue_tx`.
///
/// The callback runs on notify's own thread; the channel is the only thing
/// shared with the consumer. Removal events are dropped here so the rest of
/// the pipeline never sees them.
pub fn spawn_watcher(root: &Path, queue_tx: mpsc::UnboundedSender<PathBuf>) -> Result<WatcherHandle> {
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !is_relevant(&event.kind) {
                    return;
                }
                for path in event.paths {
                    if queue_tx.send(path).is_err() {
                        // Consumer is gone; nothing useful left to do here.
                        eprintln!("assetforge: change queue closed, dropping event");
                    }
                }
            }
            Err(err) => {
                eprintln!("assetforge: file watch error: {err}");
            }
        },
        Config::default(),
    )
    .map_err(anyhow::Error::from)?;

    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(anyhow::Error::from)?;

    info!("file watcher started on {:?}", root);

    Ok(WatcherHandle { _inner: watcher })
}

fn is_relevant(kind: &EventKind) -> bool {
    // Moves surface as Modify(Name); Remove and Access are ignored.
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    )
}
