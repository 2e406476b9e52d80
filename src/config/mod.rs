// src/config/mod.rs

//! Configuration loading and resolution for assetforge.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load config files from disk with `include` resolution and merging
//!   (`loader.rs`).
//! - Turn the resolved raw tree into typed sections with shape checks
//!   (`validate.rs`).
//! - Conform the `paths` section into absolute paths (`paths.rs`).

pub mod loader;
pub mod model;
pub mod paths;
pub mod validate;

pub use loader::{load_and_validate, merge_values, PathContext, Resolver};
pub use model::{
    AssetConfig, AssetEntry, ChainCommand, CommandEntry, ConfigFile, MonitorSection, ParamMap,
    ParamValue, PathValue, ToolConfig, ToolsSection,
};
pub use paths::{conform_paths, ResolvedPaths};
pub use validate::{config_from_table, split_asset_glob};
