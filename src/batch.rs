// src/batch.rs

//! One-shot batch run over every configured asset rule.
//!
//! For each rule the source folder is listed one level deep and entries are
//! filtered by the rule's glob. Matching subdirectories are treated as
//! atomic assets (bundle-style directories) and mirrored wholesale to the
//! destination; matching files go through the incremental cache and, when
//! added or modified, through the command executor.
//!
//! Files are processed strictly sequentially so console output stays ordered
//! and destination folders are created without races.

use tracing::{error, info, warn};

use crate::cache::{FileState, IncrementalCache};
use crate::fsutil;
use crate::rules::AssetRule;
use crate::tools::executor::CommandExecutor;
use crate::tools::registry::ToolRegistry;

/// Counters reported after a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Files matched by any rule.
    pub total: usize,
    /// Files that were added or modified and therefore processed.
    pub modified: usize,
}

pub struct BatchRunner<'a> {
    executor: &'a CommandExecutor<'a>,
    registry: &'a ToolRegistry,
    rules: &'a [AssetRule],
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        executor: &'a CommandExecutor<'a>,
        registry: &'a ToolRegistry,
        rules: &'a [AssetRule],
    ) -> Self {
        Self {
            executor,
            registry,
            rules,
        }
    }

    /// Run every rule once. A rule naming an unknown tool is skipped with a
    /// warning; the rest of the run continues.
    pub async fn run_all(&self, cache: &mut IncrementalCache) -> Stats {
        let mut stats = Stats::default();

        for rule in self.rules {
            if self.registry.get(&rule.tool).is_none() {
                warn!(
                    tool = %rule.tool,
                    folder = %rule.src_folder,
                    "unknown tool for asset rule; skipping rule"
                );
                continue;
            }
            self.run_rule(rule, cache, &mut stats).await;
        }

        info!("Modified / Total - {}/{}", stats.modified, stats.total);
        stats
    }

    async fn run_rule(&self, rule: &AssetRule, cache: &mut IncrementalCache, stats: &mut Stats) {
        let entries = match fsutil::sorted_dir_entries(&rule.abs_src_folder) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    folder = ?rule.abs_src_folder,
                    error = %err,
                    "cannot read rule source folder; skipping rule"
                );
                return;
            }
        };

        let mut dst_created = false;

        for entry in entries {
            let Some(name) = entry.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if !rule.name_matches(&name) {
                continue;
            }

            if entry.is_dir() {
                // Bundle-style directories are one logical asset: mirror the
                // whole tree, no per-file cache bookkeeping.
                let dst = rule.abs_dst_folder.join(&name);
                info!(src = ?entry, dst = ?dst, "copying asset directory");
                if let Err(err) = fsutil::copy_tree(&entry, &dst) {
                    error!(src = ?entry, error = %err, "directory copy failed");
                }
                continue;
            }

            stats.total += 1;

            match cache.classify(&entry) {
                Ok(FileState::Unchanged) => continue,
                Ok(_) => {}
                Err(err) => {
                    warn!(file = ?entry, error = %err, "cannot classify file; skipping");
                    continue;
                }
            }

            stats.modified += 1;

            if !dst_created {
                if let Err(err) = fsutil::make_dirs(&rule.abs_dst_folder) {
                    error!(
                        folder = ?rule.abs_dst_folder,
                        error = %err,
                        "cannot create destination folder; abandoning rule"
                    );
                    return;
                }
                dst_created = true;
            }

            self.executor.execute_for_file(rule, &entry).await;
        }
    }
}
