// src/config/loader.rs

//! Config file loading with `include` resolution.
//!
//! A config document may reference other documents in two ways:
//!
//! ```toml
//! # whole-document include (legacy form): merge the included document
//! # underneath this one
//! include = "base.toml"
//!
//! # per-section include: merge the included document into this section only
//! [tools]
//! include = ["../shared/tools.toml"]
//! ```
//!
//! Include paths are relative to the file that contains the `include`, not to
//! the process working directory. The [`Resolver`] owns the state needed for
//! that: a directory stack tracking which file is currently being parsed, and
//! a per-absolute-path memo cache so every file is read and resolved at most
//! once per run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::debug;

use crate::config::model::ConfigFile;
use crate::config::validate::config_from_table;
use crate::errors::{Error, Result};
use crate::fsutil;

/// Stack of directories used to resolve relative include paths.
///
/// The top of the stack is the directory of the config file currently being
/// parsed. The bottom sentinel is the working directory at construction, so
/// the stack is never empty and the first `load` call resolves against cwd.
#[derive(Debug)]
pub struct PathContext {
    stack: Vec<PathBuf>,
}

impl PathContext {
    pub fn new() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { stack: vec![cwd] }
    }

    /// Directory against which relative paths are currently resolved.
    pub fn current(&self) -> &Path {
        // Invariant: the bottom sentinel is never popped.
        self.stack.last().expect("path context stack is never empty")
    }

    fn push(&mut self, dir: PathBuf) {
        self.stack.push(dir);
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }
}

impl Default for PathContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads config documents, resolving includes and memoizing by absolute path.
#[derive(Debug, Default)]
pub struct Resolver {
    cache: HashMap<PathBuf, Table>,
    context: PathContext,
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            context: PathContext::new(),
        }
    }

    /// Load a document and fold all of its includes into it.
    ///
    /// A path already seen in this run returns the memoized document without
    /// touching the disk. The raw document is memoized *before* its includes
    /// are resolved, so a self-referential include observes the unresolved
    /// document instead of recursing forever.
    pub fn load(&mut self, path: &Path) -> Result<Table> {
        let abs = fsutil::absolutize(path, self.context.current());

        if let Some(doc) = self.cache.get(&abs) {
            debug!(path = ?abs, "config cache hit");
            return Ok(doc.clone());
        }

        if !abs.is_file() {
            return Err(Error::ConfigNotFound(abs));
        }

        debug!(path = ?abs, "reading config");
        let text = fs::read_to_string(&abs)?;
        let raw: Table = toml::from_str(&text)?;

        self.cache.insert(abs.clone(), raw.clone());

        let dir = abs
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        self.context.push(dir);
        let resolved = self.resolve_includes(raw);
        self.context.pop();

        let resolved = resolved?;
        self.cache.insert(abs, resolved.clone());
        Ok(resolved)
    }

    fn resolve_includes(&mut self, mut doc: Table) -> Result<Table> {
        // Whole-document include: the included documents form the base and
        // the local document is merged over them.
        if let Some(marker) = doc.remove("include") {
            let mut base = Table::new();
            for inc_path in include_paths(&marker)? {
                let included = self.load(Path::new(&inc_path))?;
                base = merge_tables(base, included)?;
            }
            doc = merge_tables(base, doc)?;
        }

        // Per-section include: any top-level mapping may pull in documents
        // that are merged into that section only.
        let keys: Vec<String> = doc.keys().cloned().collect();
        for key in keys {
            let Some(Value::Table(section)) = doc.get_mut(&key) else {
                continue;
            };
            let Some(marker) = section.remove("include") else {
                continue;
            };

            let local = std::mem::take(section);
            let mut base = Table::new();
            for inc_path in include_paths(&marker)? {
                let included = self.load(Path::new(&inc_path))?;
                base = merge_tables(base, included)?;
            }
            let merged = merge_tables(base, local)?;
            doc.insert(key, Value::Table(merged));
        }

        Ok(doc)
    }
}

/// Load a config file and decode it into typed sections.
///
/// This is the entry point the rest of the application uses: includes are
/// resolved, the `include` markers are gone, and every recognized top-level
/// key has been shape-checked.
pub fn load_and_validate(resolver: &mut Resolver, path: &Path) -> Result<ConfigFile> {
    let doc = resolver.load(path)?;
    config_from_table(doc)
}

/// Merge two config values, the local value taking precedence.
///
/// - table + table: key-wise union, merged recursively.
/// - array + array: concatenation, included elements first.
/// - scalar + scalar: local wins.
/// - anything else is a shape conflict.
pub fn merge_values(included: Value, local: Value) -> Result<Value> {
    match (included, local) {
        (Value::Table(inc), Value::Table(loc)) => Ok(Value::Table(merge_tables(inc, loc)?)),
        (Value::Array(mut inc), Value::Array(loc)) => {
            inc.extend(loc);
            Ok(Value::Array(inc))
        }
        (inc, loc) if !is_container(&inc) && !is_container(&loc) => Ok(loc),
        (inc, loc) => Err(Error::ConfigMerge(format!(
            "cannot merge {} with {}",
            type_name(&inc),
            type_name(&loc)
        ))),
    }
}

fn merge_tables(included: Table, local: Table) -> Result<Table> {
    let mut out = included;
    for (key, value) in local {
        let merged = match out.remove(&key) {
            Some(existing) => merge_values(existing, value)?,
            None => value,
        };
        out.insert(key, merged);
    }
    Ok(out)
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Table(_) | Value::Array(_))
}

/// Human-readable name of a TOML value's shape, for merge diagnostics.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::Boolean(_) => "boolean",
        Value::Datetime(_) => "datetime",
        Value::Array(_) => "array",
        Value::Table(_) => "table",
    }
}

fn include_paths(marker: &Value) -> Result<Vec<String>> {
    match marker {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(Error::ConfigType(format!(
                    "`include` entries must be strings, got {}",
                    type_name(other)
                ))),
            })
            .collect(),
        other => Err(Error::ConfigType(format!(
            "`include` must be a path or a list of paths, got {}",
            type_name(other)
        ))),
    }
}
