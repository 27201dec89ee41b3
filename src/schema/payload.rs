//! Building identities and desired-state payloads from module parameters.

use super::{FieldKind, FieldSpec, ResourceSchema, SegmentType};
use crate::arm::{IdentitySegment, ResourceIdentity};
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Value at `path` inside `value`, if every step exists.
pub fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Write `new` at `path`, creating intermediate objects as needed.
pub fn set_path(target: &mut Value, path: &[&str], new: Value) {
    let Some((last, parents)) = path.split_last() else {
        *target = new;
        return;
    };
    let mut current = target;
    for key in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(obj) = current else {
            return;
        };
        current = obj
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Some(obj) = current.as_object_mut() {
        obj.insert(last.to_string(), new);
    }
}

fn non_empty_string(params: &HashMap<String, Value>, key: &str) -> Result<Option<String>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Err(Error::InvalidParameter(format!(
            "{} must not be empty",
            key
        ))),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Ok(Some(other.to_string().trim_matches('"').to_string())),
    }
}

impl ResourceSchema {
    /// Build the identity from module parameters.
    ///
    /// With `partial` unset every key field is required. With `partial` set
    /// (list lookups) missing names are left empty and the caller decides
    /// which enumeration applies.
    pub fn build_identity(
        &self,
        params: &HashMap<String, Value>,
        default_subscription: Option<&str>,
        partial: bool,
    ) -> Result<ResourceIdentity> {
        let subscription_id = match non_empty_string(params, "subscription_id")? {
            Some(s) => s,
            None => default_subscription
                .filter(|s| !s.is_empty())
                .map(String::from)
                .ok_or_else(|| Error::MissingParameter("subscription_id".to_string()))?,
        };

        let resource_group = non_empty_string(params, "resource_group")?;
        if resource_group.is_none() && !partial {
            return Err(Error::MissingParameter("resource_group".to_string()));
        }

        let mut segments = Vec::with_capacity(self.segments.len());
        for spec in self.segments {
            let resource_type = match spec.resource_type {
                SegmentType::Fixed(t) => t.to_string(),
                SegmentType::FromParam { param, wildcard } => {
                    match non_empty_string(params, param)? {
                        Some(t) => t,
                        None if partial => wildcard.to_string(),
                        None => return Err(Error::MissingParameter(param.to_string())),
                    }
                }
            };
            let name = non_empty_string(params, spec.name_param)?;
            if name.is_none() && !partial {
                return Err(Error::MissingParameter(spec.name_param.to_string()));
            }
            segments.push(IdentitySegment::new(resource_type, name));
        }

        Ok(ResourceIdentity::new(
            subscription_id,
            resource_group,
            self.provider,
            segments,
        ))
    }

    /// Build the desired ARM payload.
    ///
    /// Only parameters that are present and non-null (or have a default) are
    /// copied; nothing is written as an explicit null.
    pub fn build_payload(&self, params: &HashMap<String, Value>) -> Result<Value> {
        let mut payload = Value::Object(Map::new());
        for field in self.fields {
            if let Some(value) = resolve_field(field, params.get(field.name), field.name)? {
                set_path(&mut payload, field.path, value);
            }
        }
        Ok(payload)
    }
}

/// Coerce one parameter (or its default) into the payload value.
fn resolve_field(field: &FieldSpec, raw: Option<&Value>, label: &str) -> Result<Option<Value>> {
    let raw = match raw {
        None | Some(Value::Null) => match field.default {
            Some(default) => return Ok(Some(default.to_json())),
            None if field.required => {
                return Err(Error::MissingParameter(label.to_string()));
            }
            None => return Ok(None),
        },
        Some(v) => v,
    };
    coerce(field, raw, label).map(Some)
}

fn invalid(label: &str, expected: &str) -> Error {
    Error::InvalidParameter(format!("{} must be {}", label, expected))
}

fn coerce(field: &FieldSpec, raw: &Value, label: &str) -> Result<Value> {
    match field.kind {
        FieldKind::Str => {
            let s = match raw {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(invalid(label, "a string")),
            };
            if field.choices.is_empty() {
                return Ok(Value::String(s));
            }
            field
                .choices
                .iter()
                .find(|c| c.eq_ignore_ascii_case(&s))
                .map(|c| Value::String((*c).to_string()))
                .ok_or_else(|| {
                    Error::InvalidParameter(format!(
                        "{} must be one of: {} (got '{}')",
                        label,
                        field.choices.join(", "),
                        s
                    ))
                })
        }
        FieldKind::Int => match raw {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(raw.clone()),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| invalid(label, "an integer")),
            _ => Err(invalid(label, "an integer")),
        },
        FieldKind::Bool => match raw {
            Value::Bool(_) => Ok(raw.clone()),
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(Value::Bool(true)),
                "false" | "no" | "0" | "off" => Ok(Value::Bool(false)),
                _ => Err(invalid(label, "a boolean")),
            },
            _ => Err(invalid(label, "a boolean")),
        },
        FieldKind::StrList => match raw {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(Value::String(s.clone())),
                    Value::Number(_) | Value::Bool(_) => Ok(Value::String(item.to_string())),
                    _ => Err(invalid(label, "a list of strings")),
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            // Comma-separated shorthand.
            Value::String(s) => Ok(Value::Array(
                s.split(',')
                    .map(|part| Value::String(part.trim().to_string()))
                    .collect(),
            )),
            _ => Err(invalid(label, "a list of strings")),
        },
        FieldKind::Map => match raw {
            Value::Object(obj) => Ok(Value::Object(
                obj.iter()
                    .map(|(k, v)| {
                        let s = match v {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (k.clone(), Value::String(s))
                    })
                    .collect(),
            )),
            _ => Err(invalid(label, "a mapping")),
        },
        FieldKind::Dict(children) => match raw {
            Value::Object(obj) => build_nested(children, obj, label),
            _ => Err(invalid(label, "a mapping")),
        },
        FieldKind::DictList(children) => match raw {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(obj) => build_nested(children, obj, &format!("{}[{}]", label, i)),
                    _ => Err(invalid(label, "a list of mappings")),
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            _ => Err(invalid(label, "a list of mappings")),
        },
        FieldKind::Json => Ok(raw.clone()),
    }
}

fn build_nested(children: &[FieldSpec], obj: &Map<String, Value>, label: &str) -> Result<Value> {
    if let Some(unknown) = obj
        .keys()
        .find(|k| !children.iter().any(|c| c.name == k.as_str()))
    {
        return Err(Error::InvalidParameter(format!(
            "unsupported option '{}' in {}",
            unknown, label
        )));
    }

    let mut nested = Value::Object(Map::new());
    for child in children {
        let child_label = format!("{}.{}", label, child.name);
        if let Some(value) = resolve_field(child, obj.get(child.name), &child_label)? {
            set_path(&mut nested, child.path, value);
        }
    }
    Ok(nested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Compare, DefaultValue, SegmentSpec};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const RECORD: &[FieldSpec] = &[FieldSpec::string("ipv4_address", &["ipv4Address"])];
    const IP_CONFIG: &[FieldSpec] = &[
        FieldSpec::string("name", &["name"]).required(),
        FieldSpec::string("subnet_id", &["properties", "subnet", "id"]),
    ];

    static SCHEMA: ResourceSchema = ResourceSchema {
        kind: "dnsrecordset",
        display_name: "DNS record set",
        description: "",
        provider: "Microsoft.Network",
        api_version: "2018-05-01",
        segments: &[
            SegmentSpec::fixed("dnsZones", "zone_name"),
            SegmentSpec::from_param("record_type", "recordsets", "relative_name"),
        ],
        fields: &[
            FieldSpec::int("ttl", &["properties", "TTL"]).default_value(DefaultValue::Int(3600)),
            FieldSpec::dict_list("a_records", &["properties", "ARecords"], RECORD),
            FieldSpec::dict_list("ip_configurations", &["properties", "ipConfigurations"], IP_CONFIG),
            FieldSpec::string("sku", &["sku", "name"]).choices(&["Standard_LRS", "Premium_LRS"]),
            FieldSpec::map("metadata", &["properties", "metadata"]),
            FieldSpec::strings("zones", &["zones"]),
            FieldSpec::bool("enabled", &["properties", "enabled"]),
            FieldSpec::string("location", &["location"]).compare(Compare::Location),
        ],
    };

    fn params(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_set_and_get_path() {
        let mut v = json!({});
        set_path(&mut v, &["properties", "sku", "name"], json!("x"));
        assert_eq!(v, json!({"properties": {"sku": {"name": "x"}}}));
        assert_eq!(get_path(&v, &["properties", "sku", "name"]), Some(&json!("x")));
        assert_eq!(get_path(&v, &["properties", "missing"]), None);
    }

    #[test]
    fn test_build_payload_maps_paths() {
        let payload = SCHEMA
            .build_payload(&params(json!({
                "ttl": 60,
                "a_records": [{"ipv4_address": "127.0.0.1"}],
                "sku": "premium_lrs",
                "metadata": {"owner": "ops", "n": 1},
                "zones": "1, 2",
                "enabled": "yes",
            })))
            .unwrap();
        assert_eq!(
            payload,
            json!({
                "properties": {
                    "TTL": 60,
                    "ARecords": [{"ipv4Address": "127.0.0.1"}],
                    "metadata": {"owner": "ops", "n": "1"},
                    "enabled": true
                },
                "sku": {"name": "Premium_LRS"},
                "zones": ["1", "2"]
            })
        );
    }

    #[test]
    fn test_build_payload_applies_default_and_skips_null() {
        let payload = SCHEMA
            .build_payload(&params(json!({"location": null})))
            .unwrap();
        assert_eq!(payload, json!({"properties": {"TTL": 3600}}));
    }

    #[test]
    fn test_build_payload_rejects_bad_values() {
        assert!(matches!(
            SCHEMA.build_payload(&params(json!({"ttl": "soon"}))),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            SCHEMA.build_payload(&params(json!({"sku": "Gold"}))),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            SCHEMA.build_payload(&params(json!({"a_records": [{"ipv6_address": "::1"}]}))),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            SCHEMA.build_payload(&params(json!({"ip_configurations": [{"subnet_id": "x"}]}))),
            Err(Error::MissingParameter(p)) if p == "ip_configurations[0].name"
        ));
    }

    #[test]
    fn test_build_identity_complete() {
        let identity = SCHEMA
            .build_identity(
                &params(json!({
                    "resource_group": "rg1",
                    "zone_name": "zoneA",
                    "relative_name": "recordX",
                    "record_type": "A"
                })),
                Some("sub1"),
                false,
            )
            .unwrap();
        assert_eq!(
            identity.resource_id(),
            "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Network/dnsZones/zoneA/A/recordX"
        );
    }

    #[test]
    fn test_build_identity_requires_keys() {
        let missing_rg = SCHEMA.build_identity(
            &params(json!({"zone_name": "z", "relative_name": "r", "record_type": "A"})),
            Some("sub1"),
            false,
        );
        assert!(matches!(missing_rg, Err(Error::MissingParameter(p)) if p == "resource_group"));

        let no_subscription = SCHEMA.build_identity(
            &params(json!({"resource_group": "rg"})),
            None,
            true,
        );
        assert!(matches!(no_subscription, Err(Error::MissingParameter(p)) if p == "subscription_id"));

        let empty_name = SCHEMA.build_identity(
            &params(json!({"resource_group": "rg", "zone_name": "", "relative_name": "r", "record_type": "A"})),
            Some("sub1"),
            false,
        );
        assert!(matches!(empty_name, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_build_identity_partial_uses_wildcard() {
        let identity = SCHEMA
            .build_identity(
                &params(json!({"resource_group": "rg1", "zone_name": "zoneA"})),
                Some("sub1"),
                true,
            )
            .unwrap();
        assert_eq!(identity.segments[1].resource_type, "recordsets");
        assert_eq!(identity.segments[1].name, None);
    }
}
