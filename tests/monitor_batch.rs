use std::error::Error;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use assetforge::cache::IncrementalCache;
use assetforge::tools::executor::CommandExecutor;
use assetforge::tools::registry::ToolRegistry;
use assetforge::watch::monitor::Monitor;
use assetforge::watch::reload::ReloadNotifier;
use assetforge_test_utils::builders::{test_paths, write_file, RuleBuilder, ToolBuilder};
use assetforge_test_utils::fake_exec::FakeExecBackend;
use assetforge_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn duplicate_events_in_one_drain_run_once() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let src_root = dir.path().join("assets");
    let dst_root = dir.path().join("build");
    let png = write_file(&src_root, "textures/a.png", "pixels");

    let paths = test_paths(&src_root, &dst_root);
    let rules = vec![RuleBuilder::new("textures/*.png", "convert").build(&paths)];

    let mut registry = ToolRegistry::with_builtins();
    registry.insert(
        ToolBuilder::new("convert")
            .command("linux", "convert ${src_file_path} ${dst_file_path}")
            .build(),
    );

    let backend = FakeExecBackend::new();
    let executor = CommandExecutor::new(&registry, &backend, &paths, "linux", "linux");
    let monitor = Monitor::new(
        &rules,
        &executor,
        None,
        &paths.destination_root,
        Duration::from_millis(500),
    );

    let mut cache = IncrementalCache::for_config(&dir.path().join("build.toml"));

    // An editor save burst: three events for the same path in one drain.
    monitor
        .process_batch(&mut cache, vec![png.clone(), png.clone(), png.clone()])
        .await;

    // The first occurrence classifies as added and runs; the duplicates see
    // an unchanged mtime and are no-ops.
    assert_eq!(backend.executed().len(), 1);
    Ok(())
}

#[tokio::test]
async fn unmatched_paths_are_ignored() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let src_root = dir.path().join("assets");
    let dst_root = dir.path().join("build");
    let stray = write_file(&src_root, "notes/readme.txt", "hello");

    let paths = test_paths(&src_root, &dst_root);
    let rules = vec![RuleBuilder::new("textures/*.png", "copy").build(&paths)];
    let registry = ToolRegistry::with_builtins();

    let backend = FakeExecBackend::new();
    let executor = CommandExecutor::new(&registry, &backend, &paths, "linux", "linux");
    let monitor = Monitor::new(
        &rules,
        &executor,
        None,
        &paths.destination_root,
        Duration::from_millis(500),
    );

    let mut cache = IncrementalCache::for_config(&dir.path().join("build.toml"));
    monitor.process_batch(&mut cache, vec![stray]).await;

    assert!(backend.executed().is_empty());
    Ok(())
}

#[tokio::test]
async fn changed_directories_are_mirrored_not_executed() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let src_root = dir.path().join("assets");
    let dst_root = dir.path().join("build");
    write_file(&src_root, "fonts/pack.bundle/font.ttf", "glyphs");
    let bundle = src_root.join("fonts/pack.bundle");

    let paths = test_paths(&src_root, &dst_root);
    let rules = vec![RuleBuilder::new("fonts/*.bundle", "copy").build(&paths)];
    let registry = ToolRegistry::with_builtins();

    let backend = FakeExecBackend::new();
    let executor = CommandExecutor::new(&registry, &backend, &paths, "linux", "linux");
    let monitor = Monitor::new(
        &rules,
        &executor,
        None,
        &paths.destination_root,
        Duration::from_millis(500),
    );

    let mut cache = IncrementalCache::for_config(&dir.path().join("build.toml"));
    monitor.process_batch(&mut cache, vec![bundle]).await;

    assert!(dst_root.join("fonts/pack.bundle/font.ttf").is_file());
    assert!(backend.executed().is_empty());
    Ok(())
}

#[test]
fn reload_payload_shape() {
    assert_eq!(
        ReloadNotifier::payload("tex/a.png"),
        json!({
            "type": "file_modified",
            "resource": "tex/a.png",
        })
    );
}
