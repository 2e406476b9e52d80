use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;

use tempfile::TempDir;

use assetforge::config::model::{ChainCommand, CommandEntry, ParamValue};
use assetforge::tools::executor::CommandExecutor;
use assetforge::tools::registry::{Tool, ToolRegistry};
use assetforge_test_utils::builders::{test_paths, write_file, RuleBuilder, ToolBuilder};
use assetforge_test_utils::fake_exec::FakeExecBackend;
use assetforge_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn chain_overrides_beat_the_inherited_derivation() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let src_root = dir.path().join("assets");
    let dst_root = dir.path().join("build");
    let bin = write_file(&src_root, "data/level.bin", "bytes");

    let paths = test_paths(&src_root, &dst_root);
    let rule = RuleBuilder::new("data/*.bin", "package").build(&paths);

    let mut chain_params = BTreeMap::new();
    chain_params.insert(
        "dst_file_path".to_string(),
        ParamValue::from("/override/path"),
    );

    let mut registry = ToolRegistry::with_builtins();
    registry.insert(
        ToolBuilder::new("package")
            .chain("linux", "copy", chain_params)
            .build(),
    );

    let backend = FakeExecBackend::new();
    let executor = CommandExecutor::new(&registry, &backend, &paths, "linux", "linux");

    let outputs = executor.execute_for_file(&rule, &bin).await;

    // The built-in copy ran with the overridden destination, not with its
    // own derived one.
    let executed = backend.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0], format!("cp {} /override/path", bin.display()));

    // copy's declared output reflects the override as well.
    assert_eq!(outputs, vec![Path::new("/override/path").to_path_buf()]);
    Ok(())
}

#[tokio::test]
async fn chain_without_tool_key_skips_only_that_command() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let src_root = dir.path().join("assets");
    let dst_root = dir.path().join("build");
    let bin = write_file(&src_root, "data/level.bin", "bytes");

    let paths = test_paths(&src_root, &dst_root);
    let rule = RuleBuilder::new("data/*.bin", "package").build(&paths);

    let mut commands = BTreeMap::new();
    commands.insert(
        "linux".to_string(),
        vec![
            CommandEntry::Chain(ChainCommand {
                tool: None,
                params: BTreeMap::new(),
            }),
            CommandEntry::Shell("stamp ${src_file_path}".to_string()),
        ],
    );

    let mut registry = ToolRegistry::with_builtins();
    registry.insert(Tool {
        name: "package".to_string(),
        output: None,
        commands,
    });

    let backend = FakeExecBackend::new();
    let executor = CommandExecutor::new(&registry, &backend, &paths, "linux", "linux");
    executor.execute_for_file(&rule, &bin).await;

    // The malformed chain entry was skipped; the following command still ran.
    let executed = backend.executed();
    assert_eq!(executed, vec![format!("stamp {}", bin.display())]);
    Ok(())
}

#[tokio::test]
async fn chain_to_unknown_tool_skips_only_that_command() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let src_root = dir.path().join("assets");
    let dst_root = dir.path().join("build");
    let bin = write_file(&src_root, "data/level.bin", "bytes");

    let paths = test_paths(&src_root, &dst_root);
    let rule = RuleBuilder::new("data/*.bin", "package").build(&paths);

    let mut registry = ToolRegistry::with_builtins();
    registry.insert(
        ToolBuilder::new("package")
            .chain("linux", "does-not-exist", BTreeMap::new())
            .command("linux", "stamp ${src_file_path}")
            .build(),
    );

    let backend = FakeExecBackend::new();
    let executor = CommandExecutor::new(&registry, &backend, &paths, "linux", "linux");
    executor.execute_for_file(&rule, &bin).await;

    assert_eq!(backend.executed(), vec![format!("stamp {}", bin.display())]);
    Ok(())
}

#[tokio::test]
async fn missing_platform_falls_back_to_the_tool_name() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let src_root = dir.path().join("assets");
    let dst_root = dir.path().join("build");
    let bin = write_file(&src_root, "data/level.bin", "bytes");

    let paths = test_paths(&src_root, &dst_root);
    let rule = RuleBuilder::new("data/*.bin", "optimize").build(&paths);

    let mut registry = ToolRegistry::with_builtins();
    // Declared for windows only; running with target "linux" falls back.
    registry.insert(
        ToolBuilder::new("optimize")
            .command("windows", "optimize.exe ${src_file_path}")
            .build(),
    );

    let backend = FakeExecBackend::new();
    let executor = CommandExecutor::new(&registry, &backend, &paths, "linux", "linux");
    executor.execute_for_file(&rule, &bin).await;

    assert_eq!(backend.executed(), vec!["optimize".to_string()]);
    Ok(())
}

#[tokio::test]
async fn failing_command_does_not_stop_the_rest() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let src_root = dir.path().join("assets");
    let dst_root = dir.path().join("build");
    let bin = write_file(&src_root, "data/level.bin", "bytes");

    let paths = test_paths(&src_root, &dst_root);
    let rule = RuleBuilder::new("data/*.bin", "pipeline").build(&paths);

    let mut registry = ToolRegistry::with_builtins();
    registry.insert(
        ToolBuilder::new("pipeline")
            .command("linux", "first ${src_file_path}")
            .command("linux", "second ${src_file_path}")
            .output("${dst_file_path}")
            .build(),
    );

    // Every command fails, yet both are attempted and no outputs are
    // collected.
    let backend = FakeExecBackend::failing(1);
    let executor = CommandExecutor::new(&registry, &backend, &paths, "linux", "linux");
    let outputs = executor.execute_for_file(&rule, &bin).await;

    assert_eq!(backend.executed().len(), 2);
    assert!(outputs.is_empty());
    Ok(())
}
