//! Azure Resource Manager modules.
//!
//! Each resource kind in [`catalog`] yields two modules:
//!
//! - `azure_rm_<kind>`: drives one resource to `state: present|absent`
//! - `azure_rm_<kind>_info`: read-only lookup, from a single get up to a
//!   subscription-wide listing depending on which names are given
//!
//! ## Authentication
//!
//! The control-plane client carries a pre-acquired bearer token (see
//! `[azure] access_token` or `AZURE_ACCESS_TOKEN`). The subscription comes from
//! the `subscription_id` parameter, falling back to the configured default.
//!
//! ## Available kinds
//!
//! - [`dns_record_set`]: DNS record sets under a public zone
//! - [`managed_disk`]: managed disks
//! - [`snapshot`]: disk snapshots
//! - [`image`]: virtual machine images
//! - [`firewall`]: Azure Firewall
//! - [`vnet_gateway`]: virtual network (VPN / ExpressRoute) gateways
//! - [`express_route`]: ExpressRoute circuits

pub mod dns_record_set;
pub mod express_route;
pub mod firewall;
pub mod image;
pub mod managed_disk;
pub mod snapshot;
pub mod vnet_gateway;

use crate::modules::{
    block_on, Diff, Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams,
    ModuleResult, ParamExt, ParamInfo,
};
use crate::arm::ResourceIdentity;
use crate::reconcile::{Action, Intent, ListOptions, Lister, ReconcileOutcome, Reconciler};
use crate::schema::{FieldSpec, ResourceSchema, SegmentType};
use serde_json::{Map, Value};

static CATALOG: &[&ResourceSchema] = &[
    &dns_record_set::SCHEMA,
    &managed_disk::SCHEMA,
    &snapshot::SCHEMA,
    &image::SCHEMA,
    &firewall::SCHEMA,
    &vnet_gateway::SCHEMA,
    &express_route::SCHEMA,
];

/// Every built-in resource schema.
pub fn catalog() -> &'static [&'static ResourceSchema] {
    CATALOG
}

/// Reject parameters the module does not know.
fn reject_unknown(module: &str, params: &ModuleParams, accepted: &[&str]) -> ModuleResult<()> {
    let mut unknown: Vec<&str> = params
        .keys()
        .map(String::as_str)
        .filter(|k| !accepted.contains(k))
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    unknown.sort_unstable();
    Err(ModuleError::InvalidParameter(format!(
        "unsupported parameter(s) for {}: {}",
        module,
        unknown.join(", ")
    )))
}

fn param(name: impl Into<String>, type_name: &'static str, required: bool, doc: &'static str) -> ParamInfo {
    ParamInfo {
        name: name.into(),
        type_name,
        required,
        default: None,
        choices: Vec::new(),
        doc,
    }
}

/// Identity parameters in path order. `complete` marks names as required.
fn identity_docs(schema: &ResourceSchema, complete: bool) -> Vec<ParamInfo> {
    let mut docs = vec![
        param(
            "subscription_id",
            "str",
            false,
            "Subscription; defaults to the configured subscription",
        ),
        param("resource_group", "str", complete, "Resource group name"),
    ];
    for segment in schema.segments {
        if let SegmentType::FromParam { param: type_param, .. } = segment.resource_type {
            docs.push(param(type_param, "str", complete, "Resource type segment"));
        }
        docs.push(param(segment.name_param, "str", complete, ""));
    }
    docs
}

fn field_docs(prefix: &str, fields: &[FieldSpec], docs: &mut Vec<ParamInfo>) {
    for field in fields {
        let name = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{}.{}", prefix, field.name)
        };
        let mut info = param(name.clone(), field.kind.type_name(), field.required, field.doc);
        info.default = field.default.map(|d| d.to_json());
        info.choices = field.choices.to_vec();
        docs.push(info);
        field_docs(&name, field.kind.children(), docs);
    }
}

/// Lay `patch` over `base`, merging objects key by key.
fn overlay(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(b), Value::Object(p)) => {
            let mut merged = b.clone();
            for (k, v) in p {
                let value = match b.get(k) {
                    Some(existing) => overlay(existing, v),
                    None => v.clone(),
                };
                merged.insert(k.clone(), value);
            }
            Value::Object(merged)
        }
        _ => patch.clone(),
    }
}

fn pretty(value: Option<&Value>) -> String {
    value
        .map(|v| serde_json::to_string_pretty(v).unwrap_or_default())
        .unwrap_or_default()
}

/// Desired-state module for one resource kind.
pub struct AzureResourceModule {
    schema: &'static ResourceSchema,
    name: String,
    description: String,
    required: Vec<&'static str>,
    accepted: Vec<&'static str>,
}

impl AzureResourceModule {
    pub fn new(schema: &'static ResourceSchema) -> Self {
        let required = schema
            .identity_params()
            .into_iter()
            .filter(|p| *p != "subscription_id")
            .collect();
        Self {
            schema,
            name: schema.module_name(),
            description: format!("Create, update or delete {}s. {}", schema.display_name, schema.description),
            required,
            accepted: schema.accepted_params(),
        }
    }

    pub fn schema(&self) -> &'static ResourceSchema {
        self.schema
    }

    fn render(
        &self,
        identity: &ResourceIdentity,
        intent: Intent,
        desired: &Value,
        outcome: ReconcileOutcome,
        context: &ModuleContext,
    ) -> ModuleOutput {
        let kind = self.schema.display_name;
        let name = identity.name().unwrap_or_default();
        let verb = match (outcome.action, context.check_mode) {
            (Action::Create, false) => "Created",
            (Action::Create, true) => "Would create",
            (Action::Update, false) => "Updated",
            (Action::Update, true) => "Would update",
            (Action::Delete, false) => "Deleted",
            (Action::Delete, true) => "Would delete",
            (Action::NoAction, _) => "",
        };

        let msg = match (outcome.action, intent, &outcome.drift) {
            (Action::NoAction, Intent::Absent, _) => format!("{} '{}' is already absent", kind, name),
            (Action::NoAction, Intent::Present, _) => format!("{} '{}' is up to date", kind, name),
            (_, _, Some(drift)) => format!("{} {} '{}' ({} changed)", verb, kind, name, drift.path),
            _ => format!("{} {} '{}'", verb, kind, name),
        };

        let mut output = if outcome.changed {
            ModuleOutput::changed(msg)
        } else {
            ModuleOutput::ok(msg)
        };

        if context.diff_mode && outcome.changed {
            let after = match outcome.action {
                Action::Delete => None,
                _ => Some(
                    outcome
                        .state
                        .clone()
                        .unwrap_or_else(|| overlay(outcome.before.as_ref().unwrap_or(&Value::Null), desired)),
                ),
            };
            output = output.with_diff(Diff::new(
                pretty(outcome.before.as_ref()),
                pretty(after.as_ref()),
            ));
        }

        if let Some(drift) = &outcome.drift {
            output = output.with_data("drift", serde_json::to_value(drift).unwrap_or_default());
        }
        output
            .with_data("id", Value::String(outcome.resource_id))
            .with_data("action", Value::String(outcome.action.to_string()))
            .with_data("state", outcome.state.unwrap_or(Value::Null))
    }
}

impl Module for AzureResourceModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn required_params(&self) -> &[&'static str] {
        &self.required
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        reject_unknown(&self.name, params, &self.accepted)?;
        if let Some(state) = params.get_string("state")? {
            state.parse::<Intent>()?;
        }
        Ok(())
    }

    fn execute(&self, params: &ModuleParams, context: &ModuleContext) -> ModuleResult<ModuleOutput> {
        let schema = self.schema;
        let intent: Intent = params
            .get_string("state")?
            .as_deref()
            .unwrap_or("present")
            .parse()?;
        let identity =
            schema.build_identity(params, context.default_subscription.as_deref(), false)?;
        let desired = match intent {
            Intent::Present => schema.build_payload(params)?,
            Intent::Absent => Value::Object(Map::new()),
        };

        let client = context.require_client()?;
        let reconciler = Reconciler::new(client.as_ref(), context.poller.as_ref());
        let outcome = block_on(reconciler.reconcile(
            schema,
            &identity,
            &desired,
            intent,
            context.check_mode,
        ))??;

        Ok(self.render(&identity, intent, &desired, outcome, context))
    }

    fn parameters(&self) -> Vec<ParamInfo> {
        let mut docs = identity_docs(self.schema, true);
        let mut state = param("state", "str", false, "Desired state of the resource");
        state.default = Some(Value::from("present"));
        state.choices = vec!["present", "absent"];
        docs.push(state);
        field_docs("", self.schema.fields, &mut docs);
        docs
    }
}

/// Read-only lookup module for one resource kind.
pub struct AzureInfoModule {
    schema: &'static ResourceSchema,
    name: String,
    description: String,
    accepted: Vec<&'static str>,
}

impl AzureInfoModule {
    pub fn new(schema: &'static ResourceSchema) -> Self {
        let mut accepted = schema.identity_params();
        accepted.extend(["tags", "max_pages"]);
        Self {
            schema,
            name: schema.info_module_name(),
            description: format!("Get facts for {}s", schema.display_name),
            accepted,
        }
    }
}

impl Module for AzureInfoModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        reject_unknown(&self.name, params, &self.accepted)
    }

    fn execute(&self, params: &ModuleParams, context: &ModuleContext) -> ModuleResult<ModuleOutput> {
        let schema = self.schema;
        let identity =
            schema.build_identity(params, context.default_subscription.as_deref(), true)?;
        let max_pages = params
            .get_u32("max_pages")?
            .map(|n| n as usize)
            .or(context.max_pages);
        if max_pages == Some(0) {
            return Err(ModuleError::InvalidParameter(
                "max_pages must be at least 1".to_string(),
            ));
        }
        let options = ListOptions {
            max_pages,
            tags: params.get_vec_string("tags")?.unwrap_or_default(),
        };

        let client = context.require_client()?;
        let lister = Lister::new(client.as_ref());
        let outcome = block_on(lister.list(schema, &identity, &options))??;

        let msg = if outcome.scope_found {
            format!("Found {} {}(s)", outcome.items.len(), schema.display_name)
        } else {
            format!("No {} found at '{}'", schema.display_name, outcome.scope.path())
        };

        Ok(ModuleOutput::ok(msg)
            .with_data("scope", serde_json::to_value(&outcome.scope).unwrap_or_default())
            .with_data("scope_found", Value::Bool(outcome.scope_found))
            .with_data(
                "next_link",
                outcome.next_link.map(Value::String).unwrap_or(Value::Null),
            )
            .with_data("items", Value::Array(outcome.items)))
    }

    fn parameters(&self) -> Vec<ParamInfo> {
        let mut docs = identity_docs(self.schema, false);
        docs.push(param(
            "tags",
            "list[str]",
            false,
            "Only return resources carrying these tags (`key` or `key:value`)",
        ));
        docs.push(param(
            "max_pages",
            "int",
            false,
            "Stop after this many pages and return next_link",
        ));
        docs
    }
}
