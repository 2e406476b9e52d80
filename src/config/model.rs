// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Fully resolved, typed configuration.
///
/// This is the shape the rest of the application works with. It corresponds
/// to a document like:
///
/// ```toml
/// [paths]
/// source_root = "assets"
/// destination_root = "build/${target_platform}"
/// tool_path = ["bin/tools"]
///
/// [tools.convert]
/// output = "${dst_file_path}"
/// linux = ["convert ${src_file_path} ${dst_file_path}"]
///
/// [assets."textures/*.png"]
/// destination = "tex"
/// tool = "convert"
///
/// [monitor]
/// url = "http://localhost:8010/reload"
/// ```
///
/// All sections are optional at this level; which ones are actually required
/// is decided by the code that consumes them (e.g. `paths.source_root` is
/// checked when paths are conformed).
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    /// Named path values from `[paths]`, still relative and untokenized.
    pub paths: BTreeMap<String, PathValue>,

    /// The `tools` key: an inline tool mapping or a path to an external
    /// tools document.
    pub tools: Option<ToolsSection>,

    /// Asset rules from `[assets]`, in file order. Order matters: the
    /// monitor dispatches a changed path to the first matching rule.
    pub assets: Vec<AssetEntry>,

    /// Live-monitor settings from `[monitor]`.
    pub monitor: Option<MonitorSection>,
}

/// A `[paths]` entry: a single path or a list of paths.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PathValue {
    Single(String),
    Many(Vec<String>),
}

/// The `tools` key accepts two shapes:
///
/// - a bare string: path to an external tools document whose top level is
///   the tool mapping;
/// - an inline mapping of tool name to [`ToolConfig`]. An inline mapping may
///   itself use `include` to pull in an external file, with local keys
///   winning on conflict.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ToolsSection {
    External(String),
    Inline(BTreeMap<String, ToolConfig>),
}

/// One named tool: per-platform command lists plus an optional declared
/// output path template.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
    /// Template for the path each successful command produces, e.g.
    /// `"${dst_file_path}"`. Used to feed reload notifications.
    #[serde(default)]
    pub output: Option<String>,

    /// Remaining keys are platform names (`linux`, `macosx`, `windows`)
    /// mapping to ordered command lists.
    #[serde(flatten)]
    pub platforms: BTreeMap<String, Vec<CommandEntry>>,
}

/// One entry in a tool's command list: either a shell template, or a chained
/// invocation of another tool with parameter overrides.
///
/// ```toml
/// linux = [
///     "convert ${src_file_path} ${dst_file_path}",
///     { tool = "copy", params = { dst_file_path = "${abs_dst_folder}/extra" } },
/// ]
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CommandEntry {
    Shell(String),
    Chain(ChainCommand),
}

/// A chained sub-tool invocation.
///
/// `tool` is optional only so that a malformed entry surfaces as a
/// per-command error at execution time instead of failing the whole config.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChainCommand {
    #[serde(default)]
    pub tool: Option<String>,

    #[serde(default)]
    pub params: ParamMap,
}

/// Parameter overrides: name to value, where a value is a string (possibly
/// containing `${}` tokens) or a nested mapping of the same shape.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// A parameter value. Nested mappings are substituted recursively but only
/// string values can be referenced from `${}` tokens.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            ParamValue::Map(_) => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

/// One `[assets."<subfolder>/<glob>"]` rule, keyed by its glob.
#[derive(Debug, Clone)]
pub struct AssetEntry {
    pub glob: String,
    pub config: AssetConfig,
}

/// Body of an asset rule.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    /// Destination subfolder under the destination root. Defaults to the
    /// rule's source subfolder.
    #[serde(default)]
    pub destination: Option<String>,

    /// Name of the tool to run for each matched file.
    pub tool: String,

    /// Static parameter overrides applied to every file this rule matches.
    #[serde(default)]
    pub params: ParamMap,
}

/// `[monitor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSection {
    /// Reload listener endpoint, e.g. `http://localhost:8010/reload`.
    /// When absent, no notifications are sent.
    #[serde(default)]
    pub url: Option<String>,

    /// Interval between queue drains, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            url: None,
            debounce_ms: default_debounce_ms(),
        }
    }
}
