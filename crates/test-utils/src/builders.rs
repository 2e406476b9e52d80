#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use assetforge::config::model::{
    AssetConfig, AssetEntry, ChainCommand, CommandEntry, ParamMap, ParamValue,
};
use assetforge::config::paths::ResolvedPaths;
use assetforge::rules::AssetRule;
use assetforge::tools::registry::Tool;

/// Builder for [`Tool`] to simplify test setup.
pub struct ToolBuilder {
    name: String,
    output: Option<String>,
    commands: BTreeMap<String, Vec<CommandEntry>>,
}

impl ToolBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            output: None,
            commands: BTreeMap::new(),
        }
    }

    pub fn output(mut self, template: &str) -> Self {
        self.output = Some(template.to_string());
        self
    }

    pub fn command(mut self, platform: &str, template: &str) -> Self {
        self.commands
            .entry(platform.to_string())
            .or_default()
            .push(CommandEntry::Shell(template.to_string()));
        self
    }

    pub fn chain(mut self, platform: &str, tool: &str, params: ParamMap) -> Self {
        self.commands
            .entry(platform.to_string())
            .or_default()
            .push(CommandEntry::Chain(ChainCommand {
                tool: Some(tool.to_string()),
                params,
            }));
        self
    }

    pub fn build(self) -> Tool {
        Tool {
            name: self.name,
            output: self.output,
            commands: self.commands,
        }
    }
}

/// Builder for [`AssetRule`].
pub struct RuleBuilder {
    glob: String,
    config: AssetConfig,
}

impl RuleBuilder {
    pub fn new(glob: &str, tool: &str) -> Self {
        Self {
            glob: glob.to_string(),
            config: AssetConfig {
                destination: None,
                tool: tool.to_string(),
                params: ParamMap::new(),
            },
        }
    }

    pub fn destination(mut self, dst: &str) -> Self {
        self.config.destination = Some(dst.to_string());
        self
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.config
            .params
            .insert(key.to_string(), ParamValue::from(value));
        self
    }

    pub fn build(self, paths: &ResolvedPaths) -> AssetRule {
        let entry = AssetEntry {
            glob: self.glob,
            config: self.config,
        };
        AssetRule::new(&entry, paths).expect("Failed to build valid rule from builder")
    }
}

/// Minimal [`ResolvedPaths`] rooted at the given directories.
pub fn test_paths(source_root: &Path, destination_root: &Path) -> ResolvedPaths {
    let mut globals = BTreeMap::new();
    globals.insert(
        "source_root".to_string(),
        source_root.to_string_lossy().into_owned(),
    );
    globals.insert(
        "destination_root".to_string(),
        destination_root.to_string_lossy().into_owned(),
    );

    ResolvedPaths {
        source_root: source_root.to_path_buf(),
        destination_root: destination_root.to_path_buf(),
        tool_path: Vec::new(),
        globals,
    }
}

/// Write a file under `dir`, creating parent directories as needed.
/// Returns the full path.
pub fn write_file(dir: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    fs::write(&path, contents).expect("Failed to write test file");
    path
}
