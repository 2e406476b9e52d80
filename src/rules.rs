// src/rules.rs

//! Compiled asset rules.
//!
//! Each rule binds a `"<subfolder>/<glob>"` key to a destination subfolder,
//! a tool name and static parameter overrides. The subfolder and pattern are
//! split exactly once, at load time; the absolute match pattern used by the
//! monitor is compiled lazily and memoized.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use globset::{Glob, GlobMatcher};
use tracing::error;

use crate::config::model::{AssetEntry, ParamMap};
use crate::config::paths::ResolvedPaths;
use crate::config::validate::split_asset_glob;
use crate::errors::Result;

pub struct AssetRule {
    /// Source subfolder under the source root.
    pub src_folder: String,

    /// Bare glob pattern matched against entry names inside `src_folder`.
    pub pattern: String,

    /// Destination subfolder under the destination root.
    pub dst_folder: String,

    /// Name of the tool to run.
    pub tool: String,

    /// Rule-level static parameter overrides.
    pub params: ParamMap,

    pub abs_src_folder: PathBuf,
    pub abs_dst_folder: PathBuf,

    abs_matcher: OnceLock<Option<GlobMatcher>>,
    name_matcher: OnceLock<Option<GlobMatcher>>,
}

impl fmt::Debug for AssetRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRule")
            .field("src_folder", &self.src_folder)
            .field("pattern", &self.pattern)
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

impl AssetRule {
    /// Compile one configured asset entry against the resolved paths.
    pub fn new(entry: &AssetEntry, paths: &ResolvedPaths) -> Result<Self> {
        let (src_folder, pattern) = split_asset_glob(&entry.glob)?;
        let dst_folder = entry
            .config
            .destination
            .clone()
            .unwrap_or_else(|| src_folder.to_string());

        Ok(Self {
            src_folder: src_folder.to_string(),
            pattern: pattern.to_string(),
            dst_folder: dst_folder.clone(),
            tool: entry.config.tool.clone(),
            params: entry.config.params.clone(),
            abs_src_folder: paths.source_root.join(src_folder),
            abs_dst_folder: paths.destination_root.join(&dst_folder),
            abs_matcher: OnceLock::new(),
            name_matcher: OnceLock::new(),
        })
    }

    /// Whether an absolute path matches this rule's full pattern.
    pub fn matches_path(&self, path: &Path) -> bool {
        let matcher = self.abs_matcher.get_or_init(|| {
            let pattern = format!(
                "{}/{}",
                self.abs_src_folder.to_string_lossy().replace('\\', "/"),
                self.pattern
            );
            compile_glob(&pattern)
        });
        match matcher {
            Some(m) => m.is_match(path),
            None => false,
        }
    }

    /// Whether a bare directory-entry name matches this rule's pattern.
    pub fn name_matches(&self, name: &str) -> bool {
        let matcher = self
            .name_matcher
            .get_or_init(|| compile_glob(&self.pattern));
        match matcher {
            Some(m) => m.is_match(name),
            None => false,
        }
    }
}

fn compile_glob(pattern: &str) -> Option<GlobMatcher> {
    match Glob::new(pattern) {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(err) => {
            error!(pattern, error = %err, "invalid glob pattern; rule will never match");
            None
        }
    }
}

/// Compile every configured asset entry, in file order.
pub fn build_rules(entries: &[AssetEntry], paths: &ResolvedPaths) -> Result<Vec<AssetRule>> {
    entries
        .iter()
        .map(|entry| AssetRule::new(entry, paths))
        .collect()
}

/// Find the first rule whose absolute pattern matches `path`.
///
/// Rules are tried in configured order; a path matching no rule is simply
/// not an asset and is ignored by callers.
pub fn find_match<'r>(path: &Path, rules: &'r [AssetRule]) -> Option<&'r AssetRule> {
    rules.iter().find(|rule| rule.matches_path(path))
}
