//! Resource schemas: static tables mapping module parameters onto ARM payloads.
//!
//! Each resource kind is described once, at compile time, by a
//! [`ResourceSchema`]: where the resource lives (provider namespace and
//! `{type}/{name}` segments), which api-version to speak, and for every
//! operator-facing field the JSON path it lands on plus how it is compared
//! against what ARM reports.
//!
//! ```rust,ignore
//! static FIELDS: &[FieldSpec] = &[
//!     FieldSpec::string("location", &["location"])
//!         .compare(Compare::Location)
//!         .not_updatable(),
//!     FieldSpec::int("disk_size_gb", &["properties", "diskSizeGB"]),
//! ];
//! ```
//!
//! Schemas are validated once when the module registry is built; payloads
//! and identities are then produced by [`ResourceSchema::build_payload`] and
//! [`ResourceSchema::build_identity`].

mod payload;

pub use payload::{get_path, set_path};

use std::collections::HashSet;
use thiserror::Error;

/// Parameters every resource module accepts besides its fields.
pub const COMMON_PARAMS: &[&str] = &["subscription_id", "resource_group", "state"];

/// Problems found while validating a schema table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{schema}: field '{field}' is declared more than once")]
    DuplicateField { schema: String, field: String },

    #[error("{schema}: field '{field}' has an empty path")]
    EmptyPath { schema: String, field: String },

    #[error("{schema}: field '{field}' shadows an identity parameter")]
    ReservedName { schema: String, field: String },

    #[error("{schema}: field '{field}' declares a default its kind cannot hold")]
    InvalidDefault { schema: String, field: String },

    #[error("{schema}: field '{field}' declares choices but is not a string")]
    InvalidChoices { schema: String, field: String },

    #[error("{schema}: {message}")]
    Identity { schema: String, message: String },
}

/// Value shape of a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Str,
    Int,
    Bool,
    /// List of strings.
    StrList,
    /// String-to-string map, e.g. `tags` or `metadata`.
    Map,
    /// Nested object with its own sub-fields (paths relative to the object).
    Dict(&'static [FieldSpec]),
    /// List of nested objects.
    DictList(&'static [FieldSpec]),
    /// Passed through verbatim.
    Json,
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Str => "str",
            FieldKind::Int => "int",
            FieldKind::Bool => "bool",
            FieldKind::StrList => "list[str]",
            FieldKind::Map => "dict[str]",
            FieldKind::Dict(_) => "dict",
            FieldKind::DictList(_) => "list[dict]",
            FieldKind::Json => "raw",
        }
    }

    /// Sub-fields of nested kinds.
    pub fn children(&self) -> &'static [FieldSpec] {
        match self {
            FieldKind::Dict(children) | FieldKind::DictList(children) => children,
            _ => &[],
        }
    }
}

/// Comparison modifier applied when diffing desired against observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compare {
    /// Structural equality.
    #[default]
    Default,
    /// Never compared.
    Ignore,
    /// Strings compared ignoring ASCII case.
    CaseInsensitive,
    /// Azure regions: case and spaces ignored (`East US` == `eastus`).
    Location,
    /// ARM resource ids: case ignored, trailing slashes ignored.
    ResourceId,
}

/// Default value for scalar fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Bool(bool),
}

impl DefaultValue {
    pub fn to_json(self) -> serde_json::Value {
        match self {
            DefaultValue::Str(s) => serde_json::Value::from(s),
            DefaultValue::Int(i) => serde_json::Value::from(i),
            DefaultValue::Bool(b) => serde_json::Value::from(b),
        }
    }
}

/// One operator-facing field and where it lands in the ARM payload.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub path: &'static [&'static str],
    pub kind: FieldKind,
    pub compare: Compare,
    /// Non-updatable fields only matter on create; they never trigger an update.
    pub updatable: bool,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub choices: &'static [&'static str],
    pub doc: &'static str,
}

impl FieldSpec {
    pub const fn new(name: &'static str, path: &'static [&'static str], kind: FieldKind) -> Self {
        Self {
            name,
            path,
            kind,
            compare: Compare::Default,
            updatable: true,
            required: false,
            default: None,
            choices: &[],
            doc: "",
        }
    }

    pub const fn string(name: &'static str, path: &'static [&'static str]) -> Self {
        Self::new(name, path, FieldKind::Str)
    }

    pub const fn int(name: &'static str, path: &'static [&'static str]) -> Self {
        Self::new(name, path, FieldKind::Int)
    }

    pub const fn bool(name: &'static str, path: &'static [&'static str]) -> Self {
        Self::new(name, path, FieldKind::Bool)
    }

    pub const fn strings(name: &'static str, path: &'static [&'static str]) -> Self {
        Self::new(name, path, FieldKind::StrList)
    }

    pub const fn map(name: &'static str, path: &'static [&'static str]) -> Self {
        Self::new(name, path, FieldKind::Map)
    }

    pub const fn dict(
        name: &'static str,
        path: &'static [&'static str],
        children: &'static [FieldSpec],
    ) -> Self {
        Self::new(name, path, FieldKind::Dict(children))
    }

    pub const fn dict_list(
        name: &'static str,
        path: &'static [&'static str],
        children: &'static [FieldSpec],
    ) -> Self {
        Self::new(name, path, FieldKind::DictList(children))
    }

    pub const fn json(name: &'static str, path: &'static [&'static str]) -> Self {
        Self::new(name, path, FieldKind::Json)
    }

    pub const fn compare(mut self, compare: Compare) -> Self {
        self.compare = compare;
        self
    }

    pub const fn not_updatable(mut self) -> Self {
        self.updatable = false;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    pub const fn doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    /// Dotted rendering of the path, e.g. `properties.TTL`.
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

/// How the type of one identity segment is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentType {
    /// Fixed ARM type, e.g. `disks`.
    Fixed(&'static str),
    /// Type taken from a parameter, e.g. the DNS record type. `wildcard` is
    /// the collection that spans every type when the parameter is omitted.
    FromParam {
        param: &'static str,
        wildcard: &'static str,
    },
}

/// One `{type}/{name}` step of a resource's identity.
#[derive(Debug, Clone, Copy)]
pub struct SegmentSpec {
    pub resource_type: SegmentType,
    pub name_param: &'static str,
}

impl SegmentSpec {
    pub const fn fixed(resource_type: &'static str, name_param: &'static str) -> Self {
        Self {
            resource_type: SegmentType::Fixed(resource_type),
            name_param,
        }
    }

    pub const fn from_param(
        type_param: &'static str,
        wildcard: &'static str,
        name_param: &'static str,
    ) -> Self {
        Self {
            resource_type: SegmentType::FromParam {
                param: type_param,
                wildcard,
            },
            name_param,
        }
    }
}

/// Full description of one resource kind.
#[derive(Debug)]
pub struct ResourceSchema {
    /// Short kind used in module names, e.g. `manageddisk`.
    pub kind: &'static str,
    /// Human-readable name used in messages, e.g. `managed disk`.
    pub display_name: &'static str,
    pub description: &'static str,
    pub provider: &'static str,
    pub api_version: &'static str,
    pub segments: &'static [SegmentSpec],
    pub fields: &'static [FieldSpec],
}

impl ResourceSchema {
    /// Name of the desired-state module.
    pub fn module_name(&self) -> String {
        format!("azure_rm_{}", self.kind)
    }

    /// Name of the read-only lookup module.
    pub fn info_module_name(&self) -> String {
        format!("azure_rm_{}_info", self.kind)
    }

    /// Top-level field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Parameters that make up the identity, in path order.
    pub fn identity_params(&self) -> Vec<&'static str> {
        let mut params = vec!["subscription_id", "resource_group"];
        for segment in self.segments {
            if let SegmentType::FromParam { param, .. } = segment.resource_type {
                params.push(param);
            }
            params.push(segment.name_param);
        }
        params
    }

    /// Every parameter the desired-state module accepts.
    pub fn accepted_params(&self) -> Vec<&'static str> {
        let mut params = self.identity_params();
        params.push("state");
        params.extend(self.fields.iter().map(|f| f.name));
        params
    }

    /// Check the table for mistakes. Run once per schema at registry build.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.segments.is_empty() {
            return Err(SchemaError::Identity {
                schema: self.kind.to_string(),
                message: "no identity segments".to_string(),
            });
        }

        let identity: HashSet<&str> = self.identity_params().into_iter().collect();
        if identity.len() != self.identity_params().len() {
            return Err(SchemaError::Identity {
                schema: self.kind.to_string(),
                message: "identity parameters are not unique".to_string(),
            });
        }

        for field in self.fields {
            if identity.contains(field.name) || COMMON_PARAMS.contains(&field.name) {
                return Err(SchemaError::ReservedName {
                    schema: self.kind.to_string(),
                    field: field.name.to_string(),
                });
            }
        }
        validate_fields(self.kind, self.fields)
    }
}

fn validate_fields(schema: &str, fields: &[FieldSpec]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in fields {
        let err_field = || field.name.to_string();
        if !seen.insert(field.name) {
            return Err(SchemaError::DuplicateField {
                schema: schema.to_string(),
                field: err_field(),
            });
        }
        if field.path.is_empty() || field.path.iter().any(|p| p.is_empty()) {
            return Err(SchemaError::EmptyPath {
                schema: schema.to_string(),
                field: err_field(),
            });
        }
        let default_fits = match (field.default, field.kind) {
            (None, _) => true,
            (Some(DefaultValue::Str(_)), FieldKind::Str) => true,
            (Some(DefaultValue::Int(_)), FieldKind::Int) => true,
            (Some(DefaultValue::Bool(_)), FieldKind::Bool) => true,
            _ => false,
        };
        if !default_fits {
            return Err(SchemaError::InvalidDefault {
                schema: schema.to_string(),
                field: err_field(),
            });
        }
        if !field.choices.is_empty() && !matches!(field.kind, FieldKind::Str) {
            return Err(SchemaError::InvalidChoices {
                schema: schema.to_string(),
                field: err_field(),
            });
        }
        validate_fields(schema, field.kind.children())?;
    }
    Ok(())
}
