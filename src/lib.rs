// src/lib.rs

pub mod batch;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fsutil;
pub mod logging;
pub mod platform;
pub mod rules;
pub mod tools;
pub mod watch;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::batch::BatchRunner;
use crate::cache::IncrementalCache;
use crate::cli::CliArgs;
use crate::config::loader::{load_and_validate, Resolver};
use crate::errors::Result;
use crate::exec::RealExecBackend;
use crate::tools::executor::CommandExecutor;
use crate::tools::registry::ToolRegistry;
use crate::watch::monitor::Monitor;
use crate::watch::reload::ReloadNotifier;
use crate::watch::watcher::spawn_watcher;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (with include resolution)
/// - tool registry, asset rules and the incremental cache
/// - the one-shot batch run
/// - (optional) the resident monitor with Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let abs_config = fsutil::absolutize(&config_path, &cwd);
    let base_dir = abs_config
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.clone());

    let mut resolver = Resolver::new();
    let cfg = load_and_validate(&mut resolver, &abs_config)?;

    let host = platform::host_platform();
    let target = args.platform.clone().unwrap_or_else(|| host.to_string());
    info!(host, target = %target, "platforms resolved");

    let paths = config::paths::conform_paths(
        &cfg.paths,
        &base_dir,
        host,
        &target,
        args.source_root.as_deref(),
    )?;
    setup_tool_path(&paths.tool_path);

    let registry = ToolRegistry::from_section(cfg.tools.as_ref(), &mut resolver, &base_dir)?;
    info!(count = registry.len(), "loaded tools");

    let rules = rules::build_rules(&cfg.assets, &paths)?;
    info!(count = rules.len(), "loaded asset rules");

    let mut cache = IncrementalCache::for_config(&abs_config);
    if args.clear_cache {
        cache.clear()?;
    }
    cache.load()?;

    let backend = RealExecBackend;
    let executor = CommandExecutor::new(&registry, &backend, &paths, host, &target);

    info!("running tools on assets");
    let runner = BatchRunner::new(&executor, &registry, &rules);
    runner.run_all(&mut cache).await;

    if args.monitor {
        let monitor_cfg = cfg.monitor.clone().unwrap_or_default();

        let notifier = match &monitor_cfg.url {
            Some(url) => Some(ReloadNotifier::new(url.clone())?),
            None => None,
        };

        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let _watcher = spawn_watcher(&paths.source_root, queue_tx)?;

        // Ctrl-C -> graceful shutdown after the in-flight drain.
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                eprintln!("assetforge: failed to listen for Ctrl+C: {err}");
                return;
            }
            let _ = shutdown_tx.send(true);
        });

        let monitor = Monitor::new(
            &rules,
            &executor,
            notifier.as_ref(),
            &paths.destination_root,
            Duration::from_millis(monitor_cfg.debounce_ms),
        );
        monitor.run(&mut cache, queue_rx, shutdown_rx).await;
    }

    cache.save()?;
    info!("complete");
    Ok(())
}

/// Append the configured `tool_path` directories to the process PATH so
/// configured commands resolve without absolute paths.
fn setup_tool_path(tool_paths: &[PathBuf]) {
    if tool_paths.is_empty() {
        return;
    }

    let current = std::env::var_os("PATH").unwrap_or_default();
    let mut entries: Vec<PathBuf> = std::env::split_paths(&current).collect();
    entries.extend(tool_paths.iter().cloned());

    match std::env::join_paths(entries) {
        Ok(joined) => {
            // Startup only: no tool process has been spawned yet and nothing
            // else is reading the environment.
            unsafe { std::env::set_var("PATH", joined) };
        }
        Err(err) => {
            warn!(error = %err, "cannot extend PATH with tool_path entries");
        }
    }
}
