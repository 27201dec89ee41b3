//! Subcommands module for armctl CLI
//!
//! This module contains all the subcommand implementations.

pub mod catalog;
pub mod module;
pub mod run;

use crate::cli::output::OutputFormatter;
use anyhow::{Context, Result};
use armctl::arm::{HttpResourceClient, InMemoryClient, ResourceClient, StatePoller};
use armctl::config::Config;
use armctl::modules::{ModuleContext, ModuleOutput, ModuleParams, ModuleRegistry, ModuleResult};
use std::sync::Arc;
use tracing::debug;

/// Printed after a failure that may clear on its own.
pub const TRANSIENT_HINT: &str = "The failure looks transient; running again may succeed";

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Registered modules
    pub registry: ModuleRegistry,
    /// Verbosity level
    pub verbosity: u8,
    /// Check mode (dry-run)
    pub check_mode: bool,
    /// Diff mode
    pub diff_mode: bool,
    /// Use the in-process control plane
    pub simulate: bool,
    /// Subscription given on the command line
    pub subscription: Option<String>,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, config: Config) -> Result<Self> {
        let output = OutputFormatter::new(!cli.no_color, cli.is_json(), cli.verbosity())
            .with_colors(&config.colors);
        let registry = ModuleRegistry::with_builtins().context("Invalid built-in module catalog")?;

        Ok(Self {
            config,
            output,
            registry,
            verbosity: cli.verbosity(),
            check_mode: cli.check_mode,
            diff_mode: cli.diff_mode,
            simulate: cli.simulate,
            subscription: cli.subscription.clone(),
        })
    }

    /// Build the control-plane client for this run
    fn client(&self) -> Result<Arc<dyn ResourceClient>> {
        if self.simulate {
            debug!("Using the in-memory control plane");
            return Ok(Arc::new(InMemoryClient::new()));
        }

        let azure = &self.config.azure;
        if azure.access_token.is_none() {
            self.output
                .warning("No access token configured (set AZURE_ACCESS_TOKEN or [azure] access_token)");
        }

        let mut builder = HttpResourceClient::builder()
            .endpoint(azure.endpoint.clone())
            .timeout(azure.request_timeout);
        if let Some(token) = &azure.access_token {
            builder = builder.token(token.clone());
        }
        let client = builder
            .build()
            .with_context(|| format!("Failed to create ARM client for {}", azure.endpoint))?;
        Ok(Arc::new(client))
    }

    /// Module context carrying the client, poller and run flags
    pub fn module_context(&self) -> Result<ModuleContext> {
        let polling = &self.config.polling;
        Ok(ModuleContext::new()
            .with_check_mode(self.check_mode)
            .with_diff_mode(self.diff_mode)
            .with_client(self.client()?)
            .with_poller(Arc::new(StatePoller::new(polling.interval, polling.timeout)))
            .with_default_subscription(
                self.subscription
                    .clone()
                    .or_else(|| self.config.azure.subscription_id.clone()),
            )
            .with_max_pages(self.config.listing.max_pages))
    }

    /// Execute one module from async command code.
    ///
    /// Modules block on their own reconcile future, so the call is moved off
    /// the runtime's worker through `block_in_place`.
    pub fn execute_module(
        &self,
        name: &str,
        params: &ModuleParams,
        module_ctx: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        tokio::task::block_in_place(|| self.registry.execute(name, params, module_ctx))
    }
}

/// Convert a YAML parameter mapping into module parameters
pub fn params_from_yaml(value: &serde_yaml::Value) -> Result<ModuleParams> {
    match value {
        serde_yaml::Value::Null => Ok(ModuleParams::new()),
        serde_yaml::Value::Mapping(_) => {
            let json = serde_json::to_value(value).context("Parameters must use string keys")?;
            serde_json::from_value(json).context("Parameters must be a mapping")
        }
        _ => anyhow::bail!("Module parameters must be a mapping"),
    }
}
