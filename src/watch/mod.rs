// src/watch/mod.rs

//! Live filesystem monitoring.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) that feeds
//!   changed paths into a queue (`watcher.rs`).
//! - Draining that queue on a debounce interval and dispatching each path
//!   through the same rule/cache/executor machinery as a batch run
//!   (`monitor.rs`).
//! - Best-effort reload notifications to a live consumer (`reload.rs`).
//!
//! Deletions are intentionally dropped at the watcher: this pipeline does
//! not propagate deletions downstream.

pub mod monitor;
pub mod reload;
pub mod watcher;

pub use monitor::Monitor;
pub use reload::ReloadNotifier;
pub use watcher::{spawn_watcher, WatcherHandle};
