//! In-process ARM control plane.
//!
//! Stores payloads keyed by case-insensitive resource id, fills in the
//! server-owned fields (`id`, `name`, `type`, `provisioningState`) the way ARM
//! does, and answers list calls by walking the stored ids. Knobs exist to make
//! mutations answer asynchronously, to page list results, and to inject
//! failures, so the reconciler can be exercised end to end without a network.

use super::{
    ArmError, ArmResult, Page, PageRequest, PendingOperation, Provisioning, ReadOutcome,
    ResourceClient,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

const NEXT_LINK_SCHEME: &str = "memory://";

/// Failure injection switches.
#[derive(Debug, Clone, Default)]
struct Faults {
    read: Option<ArmError>,
    write: Option<ArmError>,
    list: Option<ArmError>,
}

/// In-memory [`ResourceClient`].
#[derive(Debug, Default)]
pub struct InMemoryClient {
    resources: RwLock<BTreeMap<String, serde_json::Value>>,
    faults: RwLock<Faults>,
    page_size: Option<usize>,
    accept_async: bool,
    reads: AtomicUsize,
    mutations: AtomicUsize,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split list results into pages of `size` items.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size.max(1));
        self
    }

    /// Answer mutations with an accepted operation instead of the final state.
    pub fn with_async_operations(mut self, accept_async: bool) -> Self {
        self.accept_async = accept_async;
        self
    }

    /// Store a resource as if it already existed in ARM.
    pub fn seed(&self, resource_id: &str, payload: serde_json::Value) {
        let stored = decorate(resource_id, payload);
        self.resources.write().insert(key(resource_id), stored);
    }

    /// Current payload of a resource, bypassing call counting.
    pub fn snapshot(&self, resource_id: &str) -> Option<serde_json::Value> {
        self.resources.read().get(&key(resource_id)).cloned()
    }

    /// Make every read fail with `error` (or stop failing with `None`).
    pub fn fail_reads(&self, error: Option<ArmError>) {
        self.faults.write().read = error;
    }

    /// Make every create/update/delete fail with `error`.
    pub fn fail_writes(&self, error: Option<ArmError>) {
        self.faults.write().write = error;
    }

    /// Make every list call fail with `error`.
    pub fn fail_lists(&self, error: Option<ArmError>) {
        self.faults.write().list = error;
    }

    /// Number of `get` calls served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `create_or_update` and `delete` calls served.
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn list_scope(&self, scope: &str) -> Vec<serde_json::Value> {
        let scope_key = key(scope);
        let depth = scope_key.split('/').count();
        let resource_group_scope = scope_key.contains("/resourcegroups/");
        let resource_type = scope_key.rsplit('/').next().unwrap_or_default().to_string();
        // `recordsets` lists every record type below a DNS zone.
        let any_type_parent = scope_key
            .strip_suffix("/recordsets")
            .map(|parent| format!("{}/", parent));

        self.resources
            .read()
            .iter()
            .filter(|(id, _)| {
                if let Some(parent) = &any_type_parent {
                    id.starts_with(parent.as_str()) && id.split('/').count() == depth + 1
                } else if resource_group_scope {
                    // `{scope}/{name}` directly below the collection.
                    id.starts_with(&format!("{}/", scope_key)) && id.split('/').count() == depth + 1
                } else {
                    // Subscription-wide: same provider and top-level type in any group.
                    subscription_match(&scope_key, &resource_type, id)
                }
            })
            .map(|(_, v)| v.clone())
            .collect()
    }
}

fn key(resource_id: &str) -> String {
    resource_id.trim_end_matches('/').to_lowercase()
}

fn subscription_match(scope_key: &str, resource_type: &str, id: &str) -> bool {
    // scope: /subscriptions/{s}/providers/{ns}/{type}
    // id:    /subscriptions/{s}/resourcegroups/{rg}/providers/{ns}/{type}/{name}
    let parts: Vec<&str> = scope_key.split('/').collect();
    let id_parts: Vec<&str> = id.split('/').collect();
    if parts.len() != 6 || id_parts.len() != 9 {
        return false;
    }
    id_parts[2] == parts[2] && id_parts[6] == parts[4] && id_parts[7] == resource_type
}

/// Fill in the fields ARM owns.
fn decorate(resource_id: &str, mut payload: serde_json::Value) -> serde_json::Value {
    if !payload.is_object() {
        payload = serde_json::json!({});
    }
    let segments: Vec<&str> = resource_id.trim_end_matches('/').split('/').collect();
    let name = segments.last().copied().unwrap_or_default().to_string();
    let provider_index = segments.iter().position(|s| s.eq_ignore_ascii_case("providers"));
    let resource_type = provider_index
        .map(|i| {
            let namespace = segments.get(i + 1).copied().unwrap_or_default();
            let types: Vec<&str> = segments
                .get(i + 2..)
                .unwrap_or_default()
                .iter()
                .step_by(2)
                .copied()
                .collect();
            format!("{}/{}", namespace, types.join("/"))
        })
        .unwrap_or_default();

    if let Some(obj) = payload.as_object_mut() {
        obj.insert("id".to_string(), serde_json::json!(resource_id));
        obj.insert("name".to_string(), serde_json::json!(name));
        obj.insert("type".to_string(), serde_json::json!(resource_type));
        let properties = obj
            .entry("properties")
            .or_insert_with(|| serde_json::json!({}));
        if let Some(props) = properties.as_object_mut() {
            props.insert(
                "provisioningState".to_string(),
                serde_json::json!("Succeeded"),
            );
        }
    }
    payload
}

fn parse_next_link(link: &str) -> ArmResult<(String, usize)> {
    let rest = link
        .strip_prefix(NEXT_LINK_SCHEME)
        .ok_or_else(|| ArmError::Decode(format!("foreign nextLink '{}'", link)))?;
    let (scope, skip) = rest
        .rsplit_once("?skip=")
        .ok_or_else(|| ArmError::Decode(format!("malformed nextLink '{}'", link)))?;
    let skip = skip
        .parse()
        .map_err(|_| ArmError::Decode(format!("malformed nextLink '{}'", link)))?;
    Ok((scope.to_string(), skip))
}

#[async_trait]
impl ResourceClient for InMemoryClient {
    async fn get(&self, resource_id: &str, _api_version: &str) -> ReadOutcome {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.faults.read().read.clone() {
            return ReadOutcome::Failed(e);
        }
        match self.resources.read().get(&key(resource_id)) {
            Some(value) => ReadOutcome::Found(value.clone()),
            None => ReadOutcome::NotFound,
        }
    }

    async fn create_or_update(
        &self,
        resource_id: &str,
        _api_version: &str,
        payload: &serde_json::Value,
    ) -> ArmResult<Provisioning> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.faults.read().write.clone() {
            return Err(e);
        }
        let stored = decorate(resource_id, payload.clone());
        self.resources
            .write()
            .insert(key(resource_id), stored.clone());

        if self.accept_async {
            Ok(Provisioning::Accepted(PendingOperation::new(resource_id)))
        } else {
            Ok(Provisioning::Completed(stored))
        }
    }

    async fn delete(
        &self,
        resource_id: &str,
        _api_version: &str,
    ) -> ArmResult<Option<PendingOperation>> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.faults.read().write.clone() {
            return Err(e);
        }
        self.resources.write().remove(&key(resource_id));
        if self.accept_async {
            Ok(Some(PendingOperation::new(resource_id)))
        } else {
            Ok(None)
        }
    }

    async fn list_page(&self, request: &PageRequest, _api_version: &str) -> ArmResult<Page> {
        if let Some(e) = self.faults.read().list.clone() {
            return Err(e);
        }
        let (scope, skip) = match request {
            PageRequest::Scope(scope) => (scope.clone(), 0),
            PageRequest::NextLink(link) => parse_next_link(link)?,
        };

        let items = self.list_scope(&scope);
        let take = self.page_size.unwrap_or(items.len().max(1));
        let value: Vec<_> = items.iter().skip(skip).take(take).cloned().collect();
        let next = skip + value.len();
        let next_link = (next < items.len())
            .then(|| format!("{}{}?skip={}", NEXT_LINK_SCHEME, scope, next));

        Ok(Page { value, next_link })
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DISK: &str = "/subscriptions/s1/resourceGroups/rg1/providers/Microsoft.Compute/disks/d1";

    #[tokio::test]
    async fn test_put_fills_server_fields() {
        let client = InMemoryClient::new();
        let result = client
            .create_or_update(DISK, "v", &json!({"location": "eastus"}))
            .await
            .unwrap();
        let Provisioning::Completed(value) = result else {
            panic!("expected a completed operation");
        };
        assert_eq!(value["name"], "d1");
        assert_eq!(value["type"], "Microsoft.Compute/disks");
        assert_eq!(value["properties"]["provisioningState"], "Succeeded");
        assert_eq!(client.mutation_count(), 1);
    }

    #[tokio::test]
    async fn test_get_is_case_insensitive() {
        let client = InMemoryClient::new();
        client.seed(DISK, json!({}));
        let outcome = client.get(&DISK.to_uppercase(), "v").await;
        assert!(matches!(outcome, ReadOutcome::Found(_)));
        assert_eq!(client.read_count(), 1);
    }

    #[tokio::test]
    async fn test_list_pages() {
        let client = InMemoryClient::new().with_page_size(2);
        for i in 0..5 {
            client.seed(
                &format!(
                    "/subscriptions/s1/resourceGroups/rg1/providers/Microsoft.Compute/disks/d{}",
                    i
                ),
                json!({}),
            );
        }
        let scope = "/subscriptions/s1/resourceGroups/rg1/providers/Microsoft.Compute/disks";
        let first = client
            .list_page(&PageRequest::Scope(scope.to_string()), "v")
            .await
            .unwrap();
        assert_eq!(first.value.len(), 2);
        let link = first.next_link.unwrap();
        let second = client
            .list_page(&PageRequest::NextLink(link), "v")
            .await
            .unwrap();
        assert_eq!(second.value.len(), 2);
        assert!(second.next_link.is_some());
    }

    #[tokio::test]
    async fn test_list_subscription_scope_spans_groups() {
        let client = InMemoryClient::new();
        client.seed(DISK, json!({}));
        client.seed(
            "/subscriptions/s1/resourceGroups/rg2/providers/Microsoft.Compute/disks/d2",
            json!({}),
        );
        client.seed(
            "/subscriptions/s1/resourceGroups/rg2/providers/Microsoft.Compute/snapshots/x",
            json!({}),
        );
        let page = client
            .list_page(
                &PageRequest::Scope(
                    "/subscriptions/s1/providers/Microsoft.Compute/disks".to_string(),
                ),
                "v",
            )
            .await
            .unwrap();
        assert_eq!(page.value.len(), 2);
        assert!(page.next_link.is_none());
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let client = InMemoryClient::new();
        client.fail_reads(Some(ArmError::status(503, "unavailable")));
        assert!(matches!(
            client.get(DISK, "v").await,
            ReadOutcome::Failed(ArmError::Status { status: 503, .. })
        ));

        client.fail_writes(Some(ArmError::Transport("reset".into())));
        assert!(client.delete(DISK, "v").await.is_err());
    }
}
