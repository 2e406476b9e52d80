// src/errors.rs

//! Crate-wide error type and `Result` alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config file not found: {0:?}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config type error: {0}")]
    ConfigType(String),

    #[error("config merge conflict: {0}")]
    ConfigMerge(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("unresolved placeholder '{name}' in template: {template}")]
    MissingPlaceholder { name: String, template: String },

    #[error("parameter '{0}' cannot be resolved (self-reference or cycle)")]
    CyclicParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
