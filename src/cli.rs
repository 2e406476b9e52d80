// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `assetforge`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetforge",
    version,
    about = "Run conversion tools over changed source assets.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the build config file (TOML).
    #[arg(short = 'c', long, value_name = "PATH", default_value = "Assetforge.toml")]
    pub config: String,

    /// Target platform override (linux, macosx, windows).
    ///
    /// Defaults to the host platform.
    #[arg(short = 'p', long, value_name = "NAME")]
    pub platform: Option<String>,

    /// Remove the incremental cache before running, forcing a full rebuild.
    #[arg(short = 'y', long)]
    pub clear_cache: bool,

    /// Override the configured `paths.source_root`.
    #[arg(long, value_name = "PATH")]
    pub source_root: Option<String>,

    /// After the batch run, stay resident and re-run tools on file changes.
    #[arg(short = 'm', long)]
    pub monitor: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETFORGE_LOG` or a default level will be used.
    #[arg(short = 'l', long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
