//! Catalog commands - list and describe modules

use super::CommandContext;
use anyhow::Result;
use armctl::modules::ParamInfo;
use clap::Parser;

/// Arguments for the list-modules command
#[derive(Parser, Debug, Clone)]
pub struct ListModulesArgs {
    /// Only list modules whose name contains this text
    pub filter: Option<String>,
}

impl ListModulesArgs {
    /// Execute the list-modules command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let rows: Vec<Vec<String>> = ctx
            .registry
            .names()
            .into_iter()
            .filter(|name| self.filter.as_deref().map_or(true, |f| name.contains(f)))
            .filter_map(|name| ctx.registry.get(name))
            .map(|module| vec![module.name().to_string(), module.description().to_string()])
            .collect();

        if rows.is_empty() {
            ctx.output.warning("No modules matched");
            return Ok(0);
        }

        ctx.output.table(&["MODULE", "DESCRIPTION"], &rows);
        Ok(0)
    }
}

/// Arguments for the describe command
#[derive(Parser, Debug, Clone)]
pub struct DescribeArgs {
    /// Module name
    pub module: String,
}

fn param_row(param: &ParamInfo) -> Vec<String> {
    vec![
        param.name.clone(),
        param.type_name.to_string(),
        if param.required { "yes" } else { "" }.to_string(),
        match &param.default {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        },
        param.choices.join(", "),
        param.doc.to_string(),
    ]
}

impl DescribeArgs {
    /// Execute the describe command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let Some(module) = ctx.registry.get(&self.module) else {
            ctx.output
                .error(&format!("Unknown module '{}'", self.module));
            return Ok(4);
        };

        ctx.output.banner(module.name());
        if !ctx.output.is_json() {
            println!("{}\n", module.description());
        }

        let rows: Vec<Vec<String>> = module.parameters().iter().map(param_row).collect();
        ctx.output.table(
            &["PARAMETER", "TYPE", "REQUIRED", "DEFAULT", "CHOICES", "DESCRIPTION"],
            &rows,
        );
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_row() {
        let param = ParamInfo {
            name: "state".to_string(),
            type_name: "str",
            required: false,
            default: Some(json!("present")),
            choices: vec!["present", "absent"],
            doc: "",
        };
        assert_eq!(
            param_row(&param),
            vec!["state", "str", "", "present", "present, absent", ""]
        );
    }
}
