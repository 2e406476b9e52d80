// src/config/paths.rs

//! Conforming of the `[paths]` section.
//!
//! Path values may embed `${host_platform}`, `${target_platform}` and
//! `${source_root}` tokens; tokens are substituted first, then the value is
//! absolutized against the config file's directory and stripped of any
//! trailing separator. `source_root` itself is conformed before everything
//! else so other entries can reference it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::PathValue;
use crate::errors::{Error, Result};
use crate::fsutil;
use crate::tools::params::expand_or_keep;

/// The `[paths]` section after token substitution and absolutization.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    /// Root of the source asset tree. Required (config or CLI override).
    pub source_root: PathBuf,

    /// Root of the build artifact tree.
    pub destination_root: PathBuf,

    /// Directories appended to PATH before tools run.
    pub tool_path: Vec<PathBuf>,

    /// Every single-valued entry as a string, for the parameter set.
    pub globals: BTreeMap<String, String>,
}

/// Conform the raw `[paths]` section.
///
/// `source_root_override` comes from the CLI; when present it wins over the
/// configured value. A missing `source_root` with no override is fatal.
pub fn conform_paths(
    raw: &BTreeMap<String, PathValue>,
    base_dir: &Path,
    host_platform: &str,
    target_platform: &str,
    source_root_override: Option<&str>,
) -> Result<ResolvedPaths> {
    let platform_lookup = |name: &str| -> Option<String> {
        match name {
            "host_platform" => Some(host_platform.to_string()),
            "target_platform" => Some(target_platform.to_string()),
            _ => None,
        }
    };

    let source_root = match source_root_override {
        Some(path) => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            fsutil::absolutize(Path::new(&strip_trailing_separator(path)), &cwd)
        }
        None => match raw.get("source_root") {
            Some(PathValue::Single(value)) => {
                let expanded = expand_or_keep(value, platform_lookup);
                fsutil::absolutize(Path::new(&strip_trailing_separator(&expanded)), base_dir)
            }
            Some(PathValue::Many(_)) => {
                return Err(Error::ConfigType(
                    "`paths.source_root` must be a single path".to_string(),
                ));
            }
            None => {
                return Err(Error::ConfigType(
                    "`paths.source_root` is required (or pass --source-root)".to_string(),
                ));
            }
        },
    };

    let source_root_str = source_root.to_string_lossy().into_owned();
    let lookup = |name: &str| -> Option<String> {
        if name == "source_root" {
            Some(source_root_str.clone())
        } else {
            platform_lookup(name)
        }
    };

    let mut globals = BTreeMap::new();
    let mut tool_path = Vec::new();
    let mut destination_root = None;

    globals.insert("source_root".to_string(), source_root_str.clone());

    for (key, value) in raw {
        if key == "source_root" {
            continue;
        }
        let conformed: Vec<PathBuf> = match value {
            PathValue::Single(v) => vec![conform_one(v, base_dir, &lookup)],
            PathValue::Many(vs) => vs.iter().map(|v| conform_one(v, base_dir, &lookup)).collect(),
        };

        if key == "tool_path" {
            tool_path = conformed.clone();
        }
        if key == "destination_root" {
            if let Some(first) = conformed.first() {
                destination_root = Some(first.clone());
            }
        }
        if let PathValue::Single(_) = value {
            if let Some(first) = conformed.first() {
                globals.insert(key.clone(), first.to_string_lossy().into_owned());
            }
        }
    }

    let destination_root = destination_root.unwrap_or_else(|| base_dir.join("build"));
    globals.insert(
        "destination_root".to_string(),
        destination_root.to_string_lossy().into_owned(),
    );

    debug!(?source_root, ?destination_root, "paths conformed");

    Ok(ResolvedPaths {
        source_root,
        destination_root,
        tool_path,
        globals,
    })
}

fn conform_one(value: &str, base_dir: &Path, lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    let expanded = expand_or_keep(value, lookup);
    fsutil::absolutize(Path::new(&strip_trailing_separator(&expanded)), base_dir)
}

fn strip_trailing_separator(path: &str) -> String {
    path.trim_end_matches(['/', '\\']).to_string()
}
