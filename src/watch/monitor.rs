// src/watch/monitor.rs

//! The debounce-and-drain consumer.
//!
//! Filesystem notifications can fire before a writer has finished flushing
//! and tend to arrive in bursts (an editor save alone produces several).
//! Instead of dispatching per event, queued paths are drained wholesale on a
//! fixed interval: duplicates within one drain are processed redundantly but
//! harmlessly, since after the first actionable run the file classifies as
//! unchanged.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::cache::{FileState, IncrementalCache};
use crate::fsutil;
use crate::rules::{self, AssetRule};
use crate::tools::executor::CommandExecutor;
use crate::watch::reload::ReloadNotifier;

pub struct Monitor<'a> {
    rules: &'a [AssetRule],
    executor: &'a CommandExecutor<'a>,
    notifier: Option<&'a ReloadNotifier>,
    destination_root: &'a Path,
    debounce: Duration,
}

impl<'a> Monitor<'a> {
    pub fn new(
        rules: &'a [AssetRule],
        executor: &'a CommandExecutor<'a>,
        notifier: Option<&'a ReloadNotifier>,
        destination_root: &'a Path,
        debounce: Duration,
    ) -> Self {
        Self {
            rules,
            executor,
            notifier,
            destination_root,
            debounce,
        }
    }

    /// Consume queued paths until shutdown is requested.
    ///
    /// Each tick atomically drains everything queued so far and processes
    /// the batch sequentially. An in-flight batch is finished before a
    /// shutdown request takes effect.
    pub async fn run(
        &self,
        cache: &mut IncrementalCache,
        mut queue_rx: mpsc::UnboundedReceiver<PathBuf>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut tick = tokio::time::interval(self.debounce);
        info!(debounce_ms = self.debounce.as_millis() as u64, "monitor running");

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let mut drained = Vec::new();
                    while let Ok(path) = queue_rx.try_recv() {
                        drained.push(path);
                    }
                    if drained.is_empty() {
                        continue;
                    }
                    debug!(count = drained.len(), "draining queued change events");
                    self.process_batch(cache, drained).await;
                }
                _ = shutdown_rx.changed() => {
                    info!("monitor stopping");
                    break;
                }
            }
        }
    }

    /// Dispatch one drained batch of changed paths.
    pub async fn process_batch(&self, cache: &mut IncrementalCache, paths: Vec<PathBuf>) {
        for path in paths {
            let Some(rule) = rules::find_match(&path, self.rules) else {
                continue;
            };

            if path.is_dir() {
                // Directory-valued assets mirror wholesale, unconditionally.
                let rel = match path.strip_prefix(&rule.abs_src_folder) {
                    Ok(rel) => rel.to_path_buf(),
                    Err(_) => path.file_name().map(PathBuf::from).unwrap_or_default(),
                };
                let dst = rule.abs_dst_folder.join(rel);
                info!(src = ?path, dst = ?dst, "mirroring changed directory");
                if let Err(err) = fsutil::copy_tree(&path, &dst) {
                    error!(src = ?path, error = %err, "directory copy failed");
                }
                continue;
            }

            if !path.is_file() {
                // Gone between the event and the drain; the next run will
                // re-observe it if it comes back.
                continue;
            }

            match cache.classify(&path) {
                Ok(FileState::Unchanged) => continue,
                Ok(_) => {}
                Err(err) => {
                    warn!(file = ?path, error = %err, "cannot classify file; skipping");
                    continue;
                }
            }

            if let Err(err) = fsutil::make_dirs(&rule.abs_dst_folder) {
                error!(
                    folder = ?rule.abs_dst_folder,
                    error = %err,
                    "cannot create destination folder; skipping file"
                );
                continue;
            }

            let outputs = self.executor.execute_for_file(rule, &path).await;

            if let Some(notifier) = self.notifier {
                for output in &outputs {
                    let resource = output
                        .strip_prefix(self.destination_root)
                        .unwrap_or(output.as_path());
                    notifier.notify(&resource.to_string_lossy()).await;
                }
            }
        }
    }
}
