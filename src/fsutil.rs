// src/fsutil.rs

//! Thin filesystem wrappers used by the batch runner and monitor.
//!
//! Nothing here carries interesting logic; every function is an OS call plus
//! error context.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Create a directory and all of its parents.
pub fn make_dirs(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("creating directory {:?}", path))
}

/// Copy a single file, creating the destination's parent directory if needed.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        make_dirs(parent)?;
    }
    fs::copy(src, dst).with_context(|| format!("copying {:?} -> {:?}", src, dst))?;
    Ok(())
}

/// Recursively copy a directory tree, returning the number of files copied.
///
/// Symlinks are followed; the destination mirrors the source layout.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<u64> {
    let mut copied = 0;
    let mut stack = vec![(src.to_path_buf(), dst.to_path_buf())];

    while let Some((from, to)) = stack.pop() {
        make_dirs(&to)?;
        for entry in
            fs::read_dir(&from).with_context(|| format!("reading directory {:?}", from))?
        {
            let entry = entry?;
            let entry_path = entry.path();
            let target = to.join(entry.file_name());
            if entry_path.is_dir() {
                stack.push((entry_path, target));
            } else {
                fs::copy(&entry_path, &target)
                    .with_context(|| format!("copying {:?} -> {:?}", entry_path, target))?;
                copied += 1;
            }
        }
    }

    debug!(?src, ?dst, copied, "copied directory tree");
    Ok(copied)
}

/// Make a path absolute against `base` without touching the filesystem.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// List a directory's entries sorted by file name.
///
/// Sorting keeps batch processing order deterministic across platforms.
pub fn sorted_dir_entries(path: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path).with_context(|| format!("reading directory {:?}", path))? {
        entries.push(entry?.path());
    }
    entries.sort();
    Ok(entries)
}
