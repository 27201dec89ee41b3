//! Module command - Run one module ad hoc

use super::{CommandContext, TRANSIENT_HINT};
use anyhow::{bail, Context, Result};
use armctl::modules::ModuleParams;
use clap::Parser;

/// Arguments for the module command
#[derive(Parser, Debug, Clone)]
pub struct ModuleArgs {
    /// Module name, e.g. azure_rm_manageddisk
    pub name: String,

    /// Module argument as key=value (repeatable); JSON values are accepted
    /// for lists and objects
    #[arg(short = 'a', long = "arg", action = clap::ArgAction::Append)]
    pub args: Vec<String>,

    /// All module arguments as one JSON object, merged under `-a`
    #[arg(long)]
    pub args_json: Option<String>,
}

impl ModuleArgs {
    /// Collect `--args-json` and `-a` pairs into module parameters
    pub fn params(&self) -> Result<ModuleParams> {
        let mut params = match &self.args_json {
            Some(json) => serde_json::from_str::<ModuleParams>(json)
                .context("--args-json must be a JSON object")?,
            None => ModuleParams::new(),
        };

        for arg in &self.args {
            let Some((key, value)) = arg.split_once('=') else {
                bail!("Invalid argument '{}': expected key=value", arg);
            };
            params.insert(key.trim().to_string(), parse_value(value));
        }

        Ok(params)
    }

    /// Execute the module command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        if !ctx.registry.contains(&self.name) {
            ctx.output
                .error(&format!("Unknown module '{}'", self.name));
            return Ok(4);
        }

        let params = match self.params() {
            Ok(params) => params,
            Err(e) => {
                ctx.output.error(&e.to_string());
                return Ok(4);
            }
        };

        let module_ctx = ctx.module_context()?;
        match ctx.execute_module(&self.name, &params, &module_ctx) {
            Ok(output) => {
                ctx.output.module_output(&self.name, &output);
                Ok(0)
            }
            Err(e) => {
                ctx.output.error(&format!("{}: {}", self.name, e));
                if e.is_transient() {
                    ctx.output.warning(TRANSIENT_HINT);
                }
                Ok(e.exit_code())
            }
        }
    }
}

/// Scalars stay strings (the schema coerces them); `[...]` and `{...}` are
/// read as JSON.
fn parse_value(raw: &str) -> serde_json::Value {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str(trimmed) {
            return value;
        }
    }
    serde_json::Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(pairs: &[&str], json: Option<&str>) -> ModuleArgs {
        ModuleArgs {
            name: "azure_rm_manageddisk".to_string(),
            args: pairs.iter().map(|s| s.to_string()).collect(),
            args_json: json.map(String::from),
        }
    }

    #[test]
    fn test_key_value_pairs() {
        let params = args(&["name=007", "zones=[\"1\"]", "tags={\"env\":\"dev\"}"], None)
            .params()
            .unwrap();
        assert_eq!(params["name"], json!("007"));
        assert_eq!(params["zones"], json!(["1"]));
        assert_eq!(params["tags"], json!({"env": "dev"}));
    }

    #[test]
    fn test_pairs_override_json() {
        let params = args(&["disk_size_gb=128"], Some(r#"{"disk_size_gb": 64, "name": "d1"}"#))
            .params()
            .unwrap();
        assert_eq!(params["disk_size_gb"], json!("128"));
        assert_eq!(params["name"], json!("d1"));
    }

    #[test]
    fn test_malformed_arguments() {
        assert!(args(&["novalue"], None).params().is_err());
        assert!(args(&[], Some("[1, 2]")).params().is_err());
    }
}
