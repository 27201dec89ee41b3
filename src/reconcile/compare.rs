//! Structural comparison of desired against observed payloads.

use crate::schema::{get_path, Compare, FieldKind, FieldSpec};
use serde::Serialize;
use serde_json::Value;

/// First field found to differ between desired and observed state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDrift {
    /// Parameter path, e.g. `ttl` or `ip_configurations`.
    pub path: String,
    pub desired: Value,
    /// `null` when the field is missing from the observed payload.
    pub observed: Value,
}

/// Walk `fields` present in `desired` and report the first one that does
/// not match `observed`.
///
/// Non-updatable and ignored fields are skipped. Objects are compared on the
/// desired keys only, so server-populated extras never cause drift.
pub fn find_drift(fields: &[FieldSpec], desired: &Value, observed: &Value) -> Option<FieldDrift> {
    drift_in(fields, desired, observed, "")
}

fn drift_in(fields: &[FieldSpec], desired: &Value, observed: &Value, prefix: &str) -> Option<FieldDrift> {
    for field in fields {
        if !field.updatable || field.compare == Compare::Ignore {
            continue;
        }
        let Some(want) = get_path(desired, field.path) else {
            continue;
        };
        let have = get_path(observed, field.path);
        let label = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{}.{}", prefix, field.name)
        };

        let matches = match field.kind {
            FieldKind::Dict(children) => match have {
                Some(h) if h.is_object() => {
                    if let Some(nested) = drift_in(children, want, h, &label) {
                        return Some(nested);
                    }
                    true
                }
                _ => false,
            },
            FieldKind::DictList(children) => dict_lists_match(children, want, have),
            FieldKind::Map => maps_match(want, have),
            _ => have.is_some_and(|h| values_match(field.compare, want, h)),
        };

        if !matches {
            return Some(FieldDrift {
                path: label,
                desired: want.clone(),
                observed: have.cloned().unwrap_or(Value::Null),
            });
        }
    }
    None
}

/// String maps such as `tags` compare exactly; a missing map equals `{}`.
fn maps_match(want: &Value, have: Option<&Value>) -> bool {
    match (want, have) {
        (Value::Object(w), None) | (Value::Object(w), Some(Value::Null)) => w.is_empty(),
        (Value::Object(w), Some(Value::Object(h))) => {
            w.len() == h.len()
                && w.iter().all(|(k, v)| {
                    h.get(k)
                        .is_some_and(|hv| values_match(Compare::Default, v, hv))
                })
        }
        _ => false,
    }
}

/// Key that identifies list elements: `id`, else `name`, when every desired
/// element carries it as a string.
fn match_key(items: &[Value]) -> Option<&'static str> {
    ["id", "name"]
        .into_iter()
        .find(|key| !items.is_empty() && items.iter().all(|i| i.get(*key).is_some_and(Value::is_string)))
}

fn same_key(key: &str, want: &Value, have: &Value) -> bool {
    match (want.get(key).and_then(Value::as_str), have.get(key).and_then(Value::as_str)) {
        (Some(w), Some(h)) => w.eq_ignore_ascii_case(h),
        _ => false,
    }
}

/// Whether every desired element pairs with its own observed element.
///
/// Each observed element is used at most once. Pairing is a bipartite
/// matching (augmenting paths), so the order of either list never matters.
fn pair_all(want: &[Value], have: &[Value], pairs: impl Fn(&Value, &Value) -> bool) -> bool {
    if want.len() != have.len() {
        return false;
    }
    let edges: Vec<Vec<usize>> = want
        .iter()
        .map(|w| (0..have.len()).filter(|&j| pairs(w, &have[j])).collect())
        .collect();

    let mut owner: Vec<Option<usize>> = vec![None; have.len()];
    (0..want.len()).all(|i| {
        let mut seen = vec![false; have.len()];
        augment(i, &edges, &mut owner, &mut seen)
    })
}

fn augment(i: usize, edges: &[Vec<usize>], owner: &mut [Option<usize>], seen: &mut [bool]) -> bool {
    for &j in &edges[i] {
        if seen[j] {
            continue;
        }
        seen[j] = true;
        let free = match owner[j] {
            None => true,
            Some(other) => augment(other, edges, owner, seen),
        };
        if free {
            owner[j] = Some(i);
            return true;
        }
    }
    false
}

fn dict_lists_match(children: &[FieldSpec], want: &Value, have: Option<&Value>) -> bool {
    let (Value::Array(want), Some(Value::Array(have))) = (want, have) else {
        return matches!(want, Value::Array(w) if w.is_empty()) && have.is_none();
    };

    let element_matches = |w: &Value, h: &Value| drift_in(children, w, h, "").is_none();
    match match_key(want) {
        Some(key) => pair_all(want, have, |w, h| same_key(key, w, h) && element_matches(w, h)),
        None => pair_all(want, have, element_matches),
    }
}

fn normalize(compare: Compare, s: &str) -> String {
    match compare {
        Compare::CaseInsensitive => s.to_lowercase(),
        Compare::Location => s.to_lowercase().replace(' ', ""),
        Compare::ResourceId => s.trim_end_matches('/').to_lowercase(),
        Compare::Default | Compare::Ignore => s.to_string(),
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => a.as_f64() == b.as_f64(),
    }
}

/// Compare one desired value against the observed one under `compare`.
pub fn values_match(compare: Compare, want: &Value, have: &Value) -> bool {
    match (want, have) {
        (_, _) if compare == Compare::Ignore => true,
        (Value::String(w), Value::String(h)) => normalize(compare, w) == normalize(compare, h),
        (Value::Number(w), Value::Number(h)) => numbers_equal(w, h),
        // ARM occasionally reports numeric properties as strings.
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .zip(n.as_f64())
            .is_some_and(|(x, y)| x == y),
        (Value::Array(w), Value::Array(h)) => lists_match(compare, w, h),
        (Value::Object(w), Value::Object(h)) => w.iter().all(|(k, v)| {
            h.get(k).is_some_and(|hv| values_match(compare, v, hv))
        }),
        _ => want == have,
    }
}

fn lists_match(compare: Compare, want: &[Value], have: &[Value]) -> bool {
    let element_matches = |w: &Value, h: &Value| values_match(compare, w, h);
    match match_key(want).filter(|_| want.iter().all(Value::is_object)) {
        Some(key) => pair_all(want, have, |w, h| same_key(key, w, h) && element_matches(w, h)),
        // Scalars and unkeyed objects: multiset equality.
        None => pair_all(want, have, element_matches),
    }
}
