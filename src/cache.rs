// src/cache.rs

//! Persistent incremental-change cache.
//!
//! A flat map from absolute file path to the modification time last seen for
//! it, persisted next to the build config (`<config stem>.cache`). Files are
//! classified as `Added`, `Modified` or `Unchanged` against the map;
//! classifying an added or modified file records its current mtime
//! immediately, so a second classification without an intervening change
//! reports `Unchanged`.
//!
//! Change detection is mtime comparison, not content hashing: this is a
//! local, single-filesystem build where mtimes are trusted.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::Context;
use tracing::{debug, info};

use crate::errors::Result;
use crate::fsutil;

/// Extension of the on-disk cache file.
pub const CACHE_EXTENSION: &str = "cache";

/// State of a path relative to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Never seen before.
    Added,
    /// Seen before, mtime moved forward.
    Modified,
    /// Seen before, mtime unchanged (or moved backward).
    Unchanged,
}

impl FileState {
    /// Whether this state should cause the file's tool to run.
    pub fn is_actionable(self) -> bool {
        !matches!(self, FileState::Unchanged)
    }

    fn status_letter(self) -> char {
        match self {
            FileState::Added => 'A',
            FileState::Modified => 'M',
            FileState::Unchanged => 'O',
        }
    }
}

/// Path-to-mtime map with JSON persistence.
#[derive(Debug)]
pub struct IncrementalCache {
    cache_path: PathBuf,
    entries: BTreeMap<String, f64>,
}

impl IncrementalCache {
    /// Create an empty cache scoped to the given build config file.
    ///
    /// The cache path is the config path with its extension replaced by
    /// [`CACHE_EXTENSION`].
    pub fn for_config(config_path: &Path) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let abs = fsutil::absolutize(config_path, &cwd);
        Self {
            cache_path: abs.with_extension(CACHE_EXTENSION),
            entries: BTreeMap::new(),
        }
    }

    /// Location of the on-disk cache file.
    pub fn path(&self) -> &Path {
        &self.cache_path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove the on-disk cache file. Call before [`load`](Self::load) when a
    /// full rebuild was requested.
    pub fn clear(&self) -> Result<()> {
        if self.cache_path.exists() {
            info!(path = ?self.cache_path, "removing incremental cache");
            fs::remove_file(&self.cache_path)
                .with_context(|| format!("removing cache file {:?}", self.cache_path))?;
        }
        Ok(())
    }

    /// Read the cache file if it exists; a missing file is an empty cache.
    pub fn load(&mut self) -> Result<()> {
        if !self.cache_path.exists() {
            debug!(path = ?self.cache_path, "no cache file; starting empty");
            return Ok(());
        }
        info!(path = ?self.cache_path, "reading incremental cache");
        let text = fs::read_to_string(&self.cache_path)
            .with_context(|| format!("reading cache file {:?}", self.cache_path))?;
        self.entries = serde_json::from_str(&text)
            .with_context(|| format!("decoding cache file {:?}", self.cache_path))?;
        Ok(())
    }

    /// Persist the cache as an indented JSON map.
    pub fn save(&self) -> Result<()> {
        info!(path = ?self.cache_path, entries = self.entries.len(), "writing incremental cache");
        let text = serde_json::to_string_pretty(&self.entries)
            .context("encoding incremental cache")?;
        fs::write(&self.cache_path, text)
            .with_context(|| format!("writing cache file {:?}", self.cache_path))?;
        Ok(())
    }

    /// Classify a file against the cache, recording its current mtime as a
    /// side effect when it is added or modified.
    pub fn classify(&mut self, path: &Path) -> Result<FileState> {
        let metadata =
            fs::metadata(path).with_context(|| format!("reading metadata for {:?}", path))?;
        let mtime = metadata
            .modified()
            .with_context(|| format!("reading mtime for {:?}", path))?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Ok(self.classify_at(path, mtime))
    }

    /// Classify a file given an externally observed mtime.
    ///
    /// Split out from [`classify`](Self::classify) so callers (and tests)
    /// can drive the state machine with synthetic timestamps.
    pub fn classify_at(&mut self, path: &Path, mtime: f64) -> FileState {
        let key = path.to_string_lossy().into_owned();

        let state = match self.entries.get(&key) {
            Some(&recorded) if mtime <= recorded => FileState::Unchanged,
            Some(_) => FileState::Modified,
            None => FileState::Added,
        };

        if state.is_actionable() {
            info!("{} -> {}", state.status_letter(), key);
            self.entries.insert(key, mtime);
        }

        state
    }

    /// Recorded mtime for a path, if any.
    pub fn recorded_mtime(&self, path: &Path) -> Option<f64> {
        self.entries.get(path.to_string_lossy().as_ref()).copied()
    }
}
