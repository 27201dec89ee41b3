//! Read-only enumeration from a partial identity.

use crate::arm::{ArmError, PageRequest, ReadOutcome, ResourceClient, ResourceIdentity};
use crate::error::{Error, Result};
use crate::schema::{ResourceSchema, SegmentType};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Which enumeration call a partial identity maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ListScope {
    /// Every name is known: read the one resource.
    Single(String),
    /// Child collection under fully named parents.
    ByParent(String),
    /// Top-level collection in one resource group.
    ByResourceGroup(String),
    /// Top-level collection across the subscription.
    All(String),
}

impl ListScope {
    pub fn path(&self) -> &str {
        match self {
            ListScope::Single(p)
            | ListScope::ByParent(p)
            | ListScope::ByResourceGroup(p)
            | ListScope::All(p) => p,
        }
    }
}

/// Pick the enumeration call for `identity`.
///
/// A child resource whose parent is not named cannot be enumerated; the
/// error names the missing parameter.
pub fn select_scope(schema: &ResourceSchema, identity: &ResourceIdentity) -> Result<ListScope> {
    let wildcarded = schema
        .segments
        .iter()
        .zip(&identity.segments)
        .any(|(spec, segment)| {
            matches!(spec.resource_type, SegmentType::FromParam { wildcard, .. } if segment.resource_type == wildcard)
        });

    if identity.is_complete() && !wildcarded {
        return Ok(ListScope::Single(identity.resource_id()));
    }

    if identity.segments.len() > 1 {
        let parents = &identity.segments[..identity.segments.len() - 1];
        for (spec, segment) in schema.segments.iter().zip(parents) {
            if segment.name.as_deref().map_or(true, str::is_empty) {
                return Err(Error::MissingParameter(spec.name_param.to_string()));
            }
        }
        if identity.resource_group.is_none() {
            return Err(Error::MissingParameter("resource_group".to_string()));
        }
        return Ok(ListScope::ByParent(identity.child_collection_path()));
    }

    Ok(match identity.resource_group {
        Some(_) => ListScope::ByResourceGroup(identity.resource_group_collection_path()),
        None => ListScope::All(identity.subscription_collection_path()),
    })
}

/// Knobs for one list call.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Stop after this many pages and hand back the continuation link.
    pub max_pages: Option<usize>,
    /// `key` or `key:value` filters; every one must match.
    pub tags: Vec<String>,
}

/// Result of a list call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListOutcome {
    pub scope: ListScope,
    pub items: Vec<Value>,
    /// Continuation link when `max_pages` cut the listing short.
    pub next_link: Option<String>,
    /// `false` when the scope itself (e.g. the parent zone) does not exist.
    pub scope_found: bool,
}

impl ListOutcome {
    fn missing(scope: ListScope) -> Self {
        Self {
            scope,
            items: Vec::new(),
            next_link: None,
            scope_found: false,
        }
    }
}

/// Enumerates resources through a [`ResourceClient`].
pub struct Lister<'a> {
    client: &'a dyn ResourceClient,
}

impl<'a> Lister<'a> {
    pub fn new(client: &'a dyn ResourceClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        schema: &ResourceSchema,
        identity: &ResourceIdentity,
        options: &ListOptions,
    ) -> Result<ListOutcome> {
        let scope = select_scope(schema, identity)?;
        debug!("Listing {} via {:?}", schema.display_name, scope);

        let mut outcome = match &scope {
            ListScope::Single(id) => match self.client.get(id, schema.api_version).await {
                ReadOutcome::Found(value) => ListOutcome {
                    scope: scope.clone(),
                    items: vec![value],
                    next_link: None,
                    scope_found: true,
                },
                ReadOutcome::NotFound => {
                    debug!("{} {} not found", schema.display_name, id);
                    ListOutcome::missing(scope.clone())
                }
                ReadOutcome::Failed(e) => {
                    return Err(Error::enumeration(schema.display_name, id.as_str(), e));
                }
            },
            _ => self.drain(schema, &scope, options.max_pages).await?,
        };

        // A name that could not be read directly (no resource group, or no
        // record type) narrows the collection listing instead.
        let narrow_by_name = !matches!(outcome.scope, ListScope::Single(_));
        if let (true, Some(name)) = (narrow_by_name, identity.name()) {
            outcome.items.retain(|item| {
                item.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            });
        }
        if !options.tags.is_empty() {
            outcome.items.retain(|item| has_tags(item, &options.tags));
        }
        Ok(outcome)
    }

    async fn drain(
        &self,
        schema: &ResourceSchema,
        scope: &ListScope,
        max_pages: Option<usize>,
    ) -> Result<ListOutcome> {
        let mut request = PageRequest::Scope(scope.path().to_string());
        let mut items = Vec::new();
        let mut pages = 0usize;

        loop {
            let page = match self.client.list_page(&request, schema.api_version).await {
                Ok(page) => page,
                Err(e) if pages == 0 && e.is_not_found() => {
                    warn!("{} scope {} does not exist", schema.display_name, scope.path());
                    return Ok(ListOutcome::missing(scope.clone()));
                }
                Err(e) => return Err(enumeration_error(schema, scope, e)),
            };
            pages += 1;
            items.extend(page.value);

            match page.next_link {
                None => break,
                Some(link) if max_pages.is_some_and(|max| pages >= max) => {
                    debug!("Stopping after {} page(s) of {}", pages, scope.path());
                    return Ok(ListOutcome {
                        scope: scope.clone(),
                        items,
                        next_link: Some(link),
                        scope_found: true,
                    });
                }
                Some(link) => request = PageRequest::NextLink(link),
            }
        }

        Ok(ListOutcome {
            scope: scope.clone(),
            items,
            next_link: None,
            scope_found: true,
        })
    }
}

fn enumeration_error(schema: &ResourceSchema, scope: &ListScope, e: ArmError) -> Error {
    Error::enumeration(schema.display_name, scope.path(), e)
}

fn has_tags(item: &Value, filters: &[String]) -> bool {
    let tags = item.get("tags").and_then(Value::as_object);
    filters.iter().all(|filter| {
        let Some(tags) = tags else {
            return false;
        };
        match filter.split_once(':') {
            Some((key, value)) => tags.get(key).and_then(Value::as_str) == Some(value),
            None => tags.contains_key(filter.as_str()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::{IdentitySegment, InMemoryClient, MockResourceClient, Page};
    use crate::schema::SegmentSpec;
    use serde_json::json;

    static DISKS: ResourceSchema = ResourceSchema {
        kind: "manageddisk",
        display_name: "managed disk",
        description: "",
        provider: "Microsoft.Compute",
        api_version: "2023-04-02",
        segments: &[SegmentSpec::fixed("disks", "name")],
        fields: &[],
    };

    static RECORD_SETS: ResourceSchema = ResourceSchema {
        kind: "dnsrecordset",
        display_name: "DNS record set",
        description: "",
        provider: "Microsoft.Network",
        api_version: "2018-05-01",
        segments: &[
            SegmentSpec::fixed("dnsZones", "zone_name"),
            SegmentSpec::from_param("record_type", "recordsets", "relative_name"),
        ],
        fields: &[],
    };

    fn disk_identity(rg: Option<&str>, name: Option<&str>) -> ResourceIdentity {
        ResourceIdentity::new(
            "s1",
            rg.map(String::from),
            "Microsoft.Compute",
            vec![IdentitySegment::new("disks", name.map(String::from))],
        )
    }

    fn disk_id(rg: &str, name: &str) -> String {
        format!(
            "/subscriptions/s1/resourceGroups/{}/providers/Microsoft.Compute/disks/{}",
            rg, name
        )
    }

    #[test]
    fn test_scope_selection() {
        assert_eq!(
            select_scope(&DISKS, &disk_identity(Some("rg1"), Some("d1"))).unwrap(),
            ListScope::Single(disk_id("rg1", "d1"))
        );
        assert_eq!(
            select_scope(&DISKS, &disk_identity(Some("rg1"), None)).unwrap(),
            ListScope::ByResourceGroup(
                "/subscriptions/s1/resourceGroups/rg1/providers/Microsoft.Compute/disks".into()
            )
        );
        assert_eq!(
            select_scope(&DISKS, &disk_identity(None, None)).unwrap(),
            ListScope::All("/subscriptions/s1/providers/Microsoft.Compute/disks".into())
        );
    }

    #[test]
    fn test_child_scope_requires_parent_name() {
        let identity = ResourceIdentity::new(
            "s1",
            Some("rg1".to_string()),
            "Microsoft.Network",
            vec![
                IdentitySegment::new("dnsZones", None),
                IdentitySegment::new("recordsets", None),
            ],
        );
        let err = select_scope(&RECORD_SETS, &identity).unwrap_err();
        assert!(matches!(err, Error::MissingParameter(p) if p == "zone_name"));
    }

    #[test]
    fn test_child_scope_by_parent() {
        let identity = ResourceIdentity::new(
            "s1",
            Some("rg1".to_string()),
            "Microsoft.Network",
            vec![
                IdentitySegment::new("dnsZones", Some("zoneA".to_string())),
                IdentitySegment::new("recordsets", Some("www".to_string())),
            ],
        );
        // Name without a record type still lists under the zone.
        assert_eq!(
            select_scope(&RECORD_SETS, &identity).unwrap(),
            ListScope::ByParent(
                "/subscriptions/s1/resourceGroups/rg1/providers/Microsoft.Network/dnsZones/zoneA/recordsets".into()
            )
        );
    }

    #[tokio::test]
    async fn test_list_drains_pages_and_filters_tags() {
        let client = InMemoryClient::new().with_page_size(2);
        for i in 0..5 {
            let tags = if i % 2 == 0 { json!({"env": "prod"}) } else { json!({"env": "dev"}) };
            client.seed(&disk_id("rg1", &format!("d{}", i)), json!({"tags": tags}));
        }

        let lister = Lister::new(&client);
        let all = lister
            .list(&DISKS, &disk_identity(Some("rg1"), None), &ListOptions::default())
            .await
            .unwrap();
        assert_eq!(all.items.len(), 5);
        assert!(all.scope_found);
        assert_eq!(all.next_link, None);

        let prod = lister
            .list(
                &DISKS,
                &disk_identity(Some("rg1"), None),
                &ListOptions {
                    tags: vec!["env:prod".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(prod.items.len(), 3);
    }

    #[tokio::test]
    async fn test_max_pages_returns_continuation() {
        let client = InMemoryClient::new().with_page_size(2);
        for i in 0..5 {
            client.seed(&disk_id("rg1", &format!("d{}", i)), json!({}));
        }
        let outcome = Lister::new(&client)
            .list(
                &DISKS,
                &disk_identity(Some("rg1"), None),
                &ListOptions {
                    max_pages: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.items.len(), 2);
        assert!(outcome.next_link.is_some());
    }

    #[tokio::test]
    async fn test_subscription_listing_narrowed_by_name() {
        let client = InMemoryClient::new();
        client.seed(&disk_id("rg1", "d1"), json!({}));
        client.seed(&disk_id("rg2", "d2"), json!({}));
        let outcome = Lister::new(&client)
            .list(&DISKS, &disk_identity(None, Some("d2")), &ListOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0]["name"], "d2");
    }

    #[tokio::test]
    async fn test_missing_scope_is_empty_not_error() {
        let mut client = MockResourceClient::new();
        client
            .expect_list_page()
            .times(1)
            .returning(|_, _| Err(ArmError::status(404, "ResourceGroupNotFound")));
        let outcome = Lister::new(&client)
            .list(&DISKS, &disk_identity(Some("gone"), None), &ListOptions::default())
            .await
            .unwrap();
        assert!(outcome.items.is_empty());
        assert!(!outcome.scope_found);
    }

    #[tokio::test]
    async fn test_other_list_failures_surface() {
        let mut client = MockResourceClient::new();
        let mut calls = 0;
        client.expect_list_page().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Ok(Page {
                    value: vec![json!({"name": "d1"})],
                    next_link: Some("https://next".to_string()),
                })
            } else {
                Err(ArmError::status(500, "boom"))
            }
        });
        let err = Lister::new(&client)
            .list(&DISKS, &disk_identity(Some("rg1"), None), &ListOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Enumeration { .. }));
    }

    #[tokio::test]
    async fn test_single_get_not_found() {
        let client = InMemoryClient::new();
        let outcome = Lister::new(&client)
            .list(&DISKS, &disk_identity(Some("rg1"), Some("nope")), &ListOptions::default())
            .await
            .unwrap();
        assert!(outcome.items.is_empty());
        assert!(!outcome.scope_found);
        assert!(matches!(outcome.scope, ListScope::Single(_)));
    }
}
