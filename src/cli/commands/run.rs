//! Run command - Execute a task file
//!
//! A task file is a YAML list of tasks. Each task names exactly one module
//! and its parameters:
//!
//! ```yaml
//! - name: Data disk
//!   azure_rm_manageddisk:
//!     resource_group: rg1
//!     name: data-1
//!     location: westeurope
//!     disk_size_gb: 64
//!   ignore_errors: false
//! ```
//!
//! Tasks run in order against one control-plane client. The run stops at the
//! first failed task that does not set `ignore_errors`.

use super::{params_from_yaml, CommandContext};
use crate::cli::output::{RecapStats, TaskStatus};
use anyhow::{bail, Context, Result};
use clap::Parser;
use indexmap::IndexMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Keys a task may carry besides its module
const TASK_KEYWORDS: &[&str] = &["name", "ignore_errors"];

/// Arguments for the run command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to the task file
    #[arg(required = true)]
    pub tasks: PathBuf,
}

/// One parsed task
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub name: String,
    pub module: String,
    pub args: serde_yaml::Value,
    pub ignore_errors: bool,
}

impl Task {
    /// Parse one entry of a task file
    pub fn parse(index: usize, raw: IndexMap<String, serde_yaml::Value>) -> Result<Self> {
        let mut name = None;
        let mut ignore_errors = false;
        let mut module = None;

        for (key, value) in raw {
            match key.as_str() {
                "name" => {
                    name = Some(
                        value
                            .as_str()
                            .with_context(|| format!("Task {}: 'name' must be a string", index + 1))?
                            .to_string(),
                    );
                }
                "ignore_errors" => {
                    ignore_errors = value.as_bool().with_context(|| {
                        format!("Task {}: 'ignore_errors' must be a boolean", index + 1)
                    })?;
                }
                _ => {
                    if let Some((existing, _)) = &module {
                        bail!(
                            "Task {}: more than one module given ('{}' and '{}')",
                            index + 1,
                            existing,
                            key
                        );
                    }
                    module = Some((key, value));
                }
            }
        }

        let Some((module, args)) = module else {
            bail!(
                "Task {}: no module given (keys other than {} name a module)",
                index + 1,
                TASK_KEYWORDS.join(", ")
            );
        };

        Ok(Self {
            name: name.unwrap_or_else(|| module.clone()),
            module,
            args,
            ignore_errors,
        })
    }
}

/// Parse a whole task file
pub fn parse_tasks(content: &str) -> Result<Vec<Task>> {
    let raw: Vec<IndexMap<String, serde_yaml::Value>> =
        serde_yaml::from_str(content).context("Task file must be a list of tasks")?;
    raw.into_iter()
        .enumerate()
        .map(|(i, task)| Task::parse(i, task))
        .collect()
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let start_time = Instant::now();

        if !self.tasks.exists() {
            ctx.output.error(&format!(
                "Task file not found: {}",
                self.tasks.display()
            ));
            return Ok(1);
        }

        ctx.output.banner(&format!(
            "TASKS: {}",
            self.tasks
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
        ));

        let content = std::fs::read_to_string(&self.tasks)
            .with_context(|| format!("Failed to read task file: {}", self.tasks.display()))?;
        let tasks = parse_tasks(&content)?;

        // Reject unknown modules before touching anything remote
        for task in &tasks {
            if !ctx.registry.contains(&task.module) {
                ctx.output.error(&format!(
                    "Task '{}': unknown module '{}'",
                    task.name, task.module
                ));
                return Ok(4);
            }
        }

        if ctx.check_mode {
            ctx.output
                .warning("Running in CHECK MODE - no changes will be made");
        }

        let module_ctx = ctx.module_context()?;
        let mut stats = RecapStats::new();

        for task in &tasks {
            ctx.output.task_header(&task.name);
            debug!("Running task '{}' with module {}", task.name, task.module);

            let result = params_from_yaml(&task.args).map_err(|e| {
                armctl::modules::ModuleError::InvalidParameter(e.to_string())
            });
            let result =
                result.and_then(|params| ctx.execute_module(&task.module, &params, &module_ctx));

            match result {
                Ok(output) => {
                    let status = TaskStatus::from(&output);
                    stats.record(status);
                    if ctx.verbosity >= 1 || ctx.output.is_json() {
                        ctx.output.module_output(&task.name, &output);
                    } else {
                        ctx.output.task_result(&task.name, status, Some(&output.msg));
                        if let Some(diff) = &output.diff {
                            ctx.output.diff(&diff.before, &diff.after);
                        }
                    }
                }
                Err(e) if task.ignore_errors => {
                    stats.record(TaskStatus::Ignored);
                    ctx.output
                        .task_result(&task.name, TaskStatus::Ignored, Some(&e.to_string()));
                }
                Err(e) => {
                    stats.record(TaskStatus::Failed);
                    ctx.output
                        .task_result(&task.name, TaskStatus::Failed, Some(&e.to_string()));
                    if e.is_transient() {
                        ctx.output.warning(super::TRANSIENT_HINT);
                    }
                    break;
                }
            }
        }

        ctx.output.recap(&stats);
        ctx.output.flush();
        info!(
            "Task file finished in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );

        if stats.has_failures() {
            Ok(2)
        } else {
            Ok(0)
        }
    }
}
