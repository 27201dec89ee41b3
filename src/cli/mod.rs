//! CLI module for armctl
//!
//! This module provides the command-line interface for armctl,
//! including argument parsing and subcommand handling.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// armctl - Desired-state modules for Azure Resource Manager
///
/// Declare Azure resources in a task file (or one at a time) and let armctl
/// create, update or delete them only where ARM disagrees.
#[derive(Parser, Debug, Clone)]
#[command(name = "armctl")]
#[command(author = "armctl Contributors")]
#[command(version)]
#[command(about = "Desired-state modules for Azure Resource Manager", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Run in check mode (dry-run, don't make changes)
    #[arg(long = "check", global = true)]
    pub check_mode: bool,

    /// Run in diff mode (show before/after state of changed resources)
    #[arg(long = "diff", global = true)]
    pub diff_mode: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "ARMCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use an in-process control plane instead of ARM
    #[arg(long, global = true)]
    pub simulate: bool,

    /// Default subscription id for tasks that do not name one
    #[arg(long, global = true)]
    pub subscription: Option<String>,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a task file
    Run(commands::run::RunArgs),

    /// Run a single module ad hoc
    Module(commands::module::ModuleArgs),

    /// List available modules
    #[command(name = "list-modules")]
    ListModules(commands::catalog::ListModulesArgs),

    /// Show a module's parameters
    Describe(commands::catalog::DescribeArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }

    /// Check if JSON output is requested
    pub fn is_json(&self) -> bool {
        matches!(self.output, OutputFormat::Json)
    }
}
