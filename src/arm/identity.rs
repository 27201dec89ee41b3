//! Resource identities and ARM resource ids.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One `{type}/{name}` step below the provider namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySegment {
    /// Resource type segment, e.g. `dnsZones` or `A`.
    pub resource_type: String,
    /// Resource name; `None` when the identity is partial (list lookups).
    pub name: Option<String>,
}

impl IdentitySegment {
    pub fn new(resource_type: impl Into<String>, name: Option<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name,
        }
    }
}

/// Address of one ARM resource, or of a collection when partially filled.
///
/// ```text
/// /subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/{type}/{name}[/{type}/{name}...]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentity {
    pub subscription_id: String,
    pub resource_group: Option<String>,
    pub provider: String,
    pub segments: Vec<IdentitySegment>,
}

impl ResourceIdentity {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: Option<String>,
        provider: impl Into<String>,
        segments: Vec<IdentitySegment>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group,
            provider: provider.into(),
            segments,
        }
    }

    /// Whether every key field needed to address a single resource is set
    /// and non-empty.
    pub fn is_complete(&self) -> bool {
        !self.subscription_id.is_empty()
            && self.resource_group.as_deref().is_some_and(|rg| !rg.is_empty())
            && !self.segments.is_empty()
            && self
                .segments
                .iter()
                .all(|s| s.name.as_deref().is_some_and(|n| !n.is_empty()))
    }

    /// Name of the last segment.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().and_then(|s| s.name.as_deref())
    }

    /// Full ARM id. Only meaningful when [`is_complete`](Self::is_complete).
    pub fn resource_id(&self) -> String {
        let mut id = self.provider_prefix();
        for segment in &self.segments {
            id.push('/');
            id.push_str(&segment.resource_type);
            id.push('/');
            id.push_str(segment.name.as_deref().unwrap_or_default());
        }
        id
    }

    /// Collection path for the last segment under its named parents.
    pub fn child_collection_path(&self) -> String {
        let mut path = self.provider_prefix();
        let (last, parents) = match self.segments.split_last() {
            Some(split) => split,
            None => return path,
        };
        for segment in parents {
            path.push('/');
            path.push_str(&segment.resource_type);
            path.push('/');
            path.push_str(segment.name.as_deref().unwrap_or_default());
        }
        path.push('/');
        path.push_str(&last.resource_type);
        path
    }

    /// Collection path scoped to the resource group.
    pub fn resource_group_collection_path(&self) -> String {
        format!(
            "{}/{}",
            self.provider_prefix(),
            self.top_level_type().unwrap_or_default()
        )
    }

    /// Collection path scoped to the whole subscription.
    pub fn subscription_collection_path(&self) -> String {
        format!(
            "/subscriptions/{}/providers/{}/{}",
            self.subscription_id,
            self.provider,
            self.top_level_type().unwrap_or_default()
        )
    }

    fn top_level_type(&self) -> Option<&str> {
        self.segments.first().map(|s| s.resource_type.as_str())
    }

    fn provider_prefix(&self) -> String {
        match &self.resource_group {
            Some(rg) => format!(
                "/subscriptions/{}/resourceGroups/{}/providers/{}",
                self.subscription_id, rg, self.provider
            ),
            None => format!(
                "/subscriptions/{}/providers/{}",
                self.subscription_id, self.provider
            ),
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_set() -> ResourceIdentity {
        ResourceIdentity::new(
            "sub1",
            Some("rg1".to_string()),
            "Microsoft.Network",
            vec![
                IdentitySegment::new("dnsZones", Some("zoneA".to_string())),
                IdentitySegment::new("A", Some("recordX".to_string())),
            ],
        )
    }

    #[test]
    fn test_resource_id() {
        assert_eq!(
            record_set().resource_id(),
            "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Network/dnsZones/zoneA/A/recordX"
        );
        assert_eq!(record_set().name(), Some("recordX"));
        assert!(record_set().is_complete());
    }

    #[test]
    fn test_collection_paths() {
        let id = record_set();
        assert_eq!(
            id.child_collection_path(),
            "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Network/dnsZones/zoneA/A"
        );

        let disk = ResourceIdentity::new(
            "sub1",
            None,
            "Microsoft.Compute",
            vec![IdentitySegment::new("disks", None)],
        );
        assert_eq!(
            disk.subscription_collection_path(),
            "/subscriptions/sub1/providers/Microsoft.Compute/disks"
        );
        assert!(!disk.is_complete());
    }

    #[test]
    fn test_empty_name_is_incomplete() {
        let mut id = record_set();
        id.segments[1].name = Some(String::new());
        assert!(!id.is_complete());
    }
}
