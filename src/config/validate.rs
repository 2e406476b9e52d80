// src/config/validate.rs

//! Shape checks for the resolved raw tree.
//!
//! The loader hands us a fully include-resolved `toml::Table`; here every
//! recognized top-level key is decoded into its typed section. A recognized
//! key holding the wrong shape is a `ConfigType` error, which is fatal at
//! startup. Unrecognized top-level keys are ignored with a log line so a
//! typo'd section name doesn't silently do nothing.

use serde::de::DeserializeOwned;
use toml::{Table, Value};
use tracing::warn;

use crate::config::model::{AssetConfig, AssetEntry, ConfigFile, MonitorSection, ToolsSection};
use crate::errors::{Error, Result};

/// Decode a resolved document into a [`ConfigFile`].
pub fn config_from_table(doc: Table) -> Result<ConfigFile> {
    let mut cfg = ConfigFile::default();

    for (key, value) in doc {
        match key.as_str() {
            "paths" => cfg.paths = decode_section("paths", value)?,
            "tools" => cfg.tools = Some(decode_section::<ToolsSection>("tools", value)?),
            "assets" => cfg.assets = decode_assets(value)?,
            "monitor" => cfg.monitor = Some(decode_section::<MonitorSection>("monitor", value)?),
            other => {
                warn!(key = other, "ignoring unrecognized top-level config key");
            }
        }
    }

    for entry in &cfg.assets {
        let _ = split_asset_glob(&entry.glob)?;
    }

    Ok(cfg)
}

fn decode_section<T: DeserializeOwned>(key: &str, value: Value) -> Result<T> {
    value
        .try_into()
        .map_err(|err| Error::ConfigType(format!("`{key}`: {err}")))
}

/// Assets are decoded by hand so the file order of the rules survives.
fn decode_assets(value: Value) -> Result<Vec<AssetEntry>> {
    let Value::Table(table) = value else {
        return Err(Error::ConfigType(format!(
            "`assets` must be a table of \"<subfolder>/<glob>\" rules, got {}",
            super::loader::type_name(&value)
        )));
    };

    let mut entries = Vec::with_capacity(table.len());
    for (glob, body) in table {
        let config: AssetConfig = body
            .try_into()
            .map_err(|err| Error::ConfigType(format!("`assets.\"{glob}\"`: {err}")))?;
        entries.push(AssetEntry { glob, config });
    }
    Ok(entries)
}

/// Split an asset rule key into its subfolder and glob pattern parts.
///
/// The split happens exactly once, at the first separator; the pattern part
/// may itself contain further separators.
pub fn split_asset_glob(glob: &str) -> Result<(&str, &str)> {
    glob.split_once('/').ok_or_else(|| {
        Error::ConfigType(format!(
            "asset rule \"{glob}\" must be of the form \"<subfolder>/<glob>\""
        ))
    })
}
