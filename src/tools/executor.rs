// src/tools/executor.rs

//! Command execution for one (rule, file) pair.
//!
//! The executor walks a tool's command list for the target platform. Shell
//! templates are substituted and handed to the [`ExecBackend`]; chain
//! directives recurse into the named sub-tool with the chain's params
//! overlaid on the caller's resolved set. A failing command never aborts the
//! remaining commands for the file, nor the remaining files of a batch:
//! every failure is logged and the loop moves on.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::{debug, error, warn};

use crate::config::model::{CommandEntry, ParamMap};
use crate::config::paths::ResolvedPaths;
use crate::exec::ExecBackend;
use crate::rules::AssetRule;
use crate::tools::params;
use crate::tools::registry::{Tool, ToolRegistry};

pub struct CommandExecutor<'a> {
    registry: &'a ToolRegistry,
    backend: &'a dyn ExecBackend,
    paths: &'a ResolvedPaths,
    host_platform: &'a str,
    target_platform: &'a str,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(
        registry: &'a ToolRegistry,
        backend: &'a dyn ExecBackend,
        paths: &'a ResolvedPaths,
        host_platform: &'a str,
        target_platform: &'a str,
    ) -> Self {
        Self {
            registry,
            backend,
            paths,
            host_platform,
            target_platform,
        }
    }

    /// Run the rule's tool for one source file, returning the declared
    /// output paths of every command that succeeded.
    pub async fn execute_for_file(&self, rule: &AssetRule, src_file: &Path) -> Vec<PathBuf> {
        let Some(tool) = self.registry.get(&rule.tool) else {
            error!(tool = %rule.tool, file = ?src_file, "unknown tool; skipping file");
            return Vec::new();
        };

        let params = params::file_params(
            self.paths,
            rule,
            src_file,
            self.host_platform,
            self.target_platform,
        );
        self.run_tool(tool, params).await
    }

    /// Run one tool with an already-built parameter set.
    ///
    /// Boxed future because chain directives recurse.
    fn run_tool<'s>(
        &'s self,
        tool: &'s Tool,
        mut param_set: ParamMap,
    ) -> Pin<Box<dyn Future<Output = Vec<PathBuf>> + Send + 's>> {
        Box::pin(async move {
            let mut outputs = Vec::new();

            if let Err(err) = params::resolve(&mut param_set) {
                error!(tool = %tool.name, error = %err, "parameter resolution failed; skipping tool");
                return outputs;
            }

            for entry in tool.commands_for(self.target_platform) {
                match entry {
                    CommandEntry::Shell(template) => {
                        self.run_shell(tool, &template, &param_set, &mut outputs).await;
                    }
                    CommandEntry::Chain(chain) => {
                        let Some(name) = chain.tool.as_deref().filter(|n| !n.is_empty()) else {
                            error!(
                                tool = %tool.name,
                                "chain command is missing its `tool` key; skipping"
                            );
                            continue;
                        };
                        let Some(sub_tool) = self.registry.get(name) else {
                            error!(
                                tool = %tool.name,
                                chained = name,
                                "chain references an unknown tool; skipping"
                            );
                            continue;
                        };

                        let mut sub_params = param_set.clone();
                        params::apply_overrides(&mut sub_params, &chain.params);
                        let mut sub_outputs = self.run_tool(sub_tool, sub_params).await;
                        outputs.append(&mut sub_outputs);
                    }
                }
            }

            outputs
        })
    }

    async fn run_shell(
        &self,
        tool: &Tool,
        template: &str,
        param_set: &ParamMap,
        outputs: &mut Vec<PathBuf>,
    ) {
        let line = match params::expand(template, param_set) {
            Ok(line) => line,
            Err(err) => {
                error!(tool = %tool.name, error = %err, "skipping command");
                return;
            }
        };

        debug!(tool = %tool.name, command = %line, "running command");
        let use_shell = self.host_platform == "windows";

        match self.backend.run(&line, use_shell).await {
            Ok(0) => {
                if let Some(output_template) = &tool.output {
                    match params::expand(output_template, param_set) {
                        Ok(path) => outputs.push(PathBuf::from(path)),
                        Err(err) => {
                            warn!(tool = %tool.name, error = %err, "cannot resolve declared output path");
                        }
                    }
                }
            }
            Ok(code) => {
                error!(tool = %tool.name, exit_code = code, command = %line, "tool command failed");
            }
            Err(err) => {
                error!(tool = %tool.name, command = %line, error = %err, "failed to run tool command");
            }
        }
    }
}
