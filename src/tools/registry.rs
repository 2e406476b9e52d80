// src/tools/registry.rs

//! Named tools and the registry that resolves them.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::config::loader::Resolver;
use crate::config::model::{CommandEntry, ToolConfig, ToolsSection};
use crate::errors::{Error, Result};
use crate::fsutil;

/// A named tool: ordered command lists keyed by platform name, plus an
/// optional declared output path template.
#[derive(Debug, Clone)]
pub struct Tool {
    pub name: String,
    pub output: Option<String>,
    pub commands: BTreeMap<String, Vec<CommandEntry>>,
}

impl Tool {
    pub fn from_config(name: &str, config: ToolConfig) -> Self {
        Self {
            name: name.to_string(),
            output: config.output,
            commands: config.platforms,
        }
    }

    /// Command list for a platform.
    ///
    /// A tool with no entry for the platform falls back to its own name as a
    /// single implicit command, so a bare `[tools.mytool]` declaration still
    /// runs `mytool`.
    pub fn commands_for(&self, platform: &str) -> Vec<CommandEntry> {
        match self.commands.get(platform) {
            Some(commands) => commands.clone(),
            None => vec![CommandEntry::Shell(self.name.clone())],
        }
    }
}

/// Name-to-tool map. Built once at startup from the merged tool
/// configuration; immutable afterwards.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Tool>,
}

impl ToolRegistry {
    /// Registry pre-populated with the built-in `copy` and `move` tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();
        registry.insert(builtin("copy", "cp", "copy"));
        registry.insert(builtin("move", "mv", "move"));
        registry
    }

    pub fn insert(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Build the registry from the config's `tools` key.
    ///
    /// An external tools document (the bare-string form) is resolved
    /// relative to the config file's directory and read through the same
    /// resolver, so its own includes work and it is only read once. Config
    /// tools override built-ins of the same name.
    pub fn from_section(
        section: Option<&ToolsSection>,
        resolver: &mut Resolver,
        base_dir: &Path,
    ) -> Result<Self> {
        let mut registry = Self::with_builtins();

        match section {
            None => {}
            Some(ToolsSection::Inline(tools)) => {
                for (name, config) in tools {
                    registry.insert(Tool::from_config(name, config.clone()));
                }
            }
            Some(ToolsSection::External(path)) => {
                let abs = fsutil::absolutize(Path::new(path), base_dir);
                let doc = resolver.load(&abs)?;
                for (name, value) in doc {
                    let config: ToolConfig = value
                        .try_into()
                        .map_err(|err| Error::ConfigType(format!("tool `{name}`: {err}")))?;
                    registry.insert(Tool::from_config(&name, config));
                }
            }
        }

        debug!(count = registry.len(), "tool registry built");
        Ok(registry)
    }
}

fn builtin(name: &str, unix_cmd: &str, windows_cmd: &str) -> Tool {
    let unix = vec![CommandEntry::Shell(format!(
        "{unix_cmd} ${{src_file_path}} ${{dst_file_path}}"
    ))];
    let windows = vec![CommandEntry::Shell(format!(
        "{windows_cmd} ${{src_file_path}} ${{dst_file_path}}"
    ))];

    let mut commands = BTreeMap::new();
    commands.insert("linux".to_string(), unix.clone());
    commands.insert("macosx".to_string(), unix);
    commands.insert("windows".to_string(), windows);

    Tool {
        name: name.to_string(),
        output: Some("${dst_file_path}".to_string()),
        commands,
    }
}
