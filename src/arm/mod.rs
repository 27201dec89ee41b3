//! Azure Resource Manager control-plane contract.
//!
//! Modules never talk to ARM directly. They go through the [`ResourceClient`]
//! trait, which exposes the four calls every resource kind supports:
//!
//! - `get` a single resource by id
//! - `create_or_update` (idempotent upsert, possibly accepted asynchronously)
//! - `delete` by id
//! - `list_page` over a collection scope, following `nextLink`
//!
//! Two implementations ship with the crate:
//!
//! - [`HttpResourceClient`](http::HttpResourceClient): the ARM REST API over reqwest
//! - [`InMemoryClient`](memory::InMemoryClient): an in-process control plane
//!   used by tests and by `armctl --simulate`
//!
//! Long-running operations are awaited through a [`Poller`](poller::Poller).

pub mod http;
pub mod identity;
pub mod memory;
pub mod poller;

pub use http::{HttpResourceClient, HttpResourceClientBuilder};
pub use identity::{IdentitySegment, ResourceIdentity};
pub use memory::InMemoryClient;
pub use poller::{Poller, StatePoller};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default ARM endpoint for the public Azure cloud.
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Errors reported by a control-plane client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArmError {
    /// ARM answered with a non-success status.
    #[error("ARM returned HTTP {status}{}: {message}", code.as_ref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// A long-running operation finished in a failed state.
    #[error("provisioning finished in state '{state}'")]
    ProvisioningFailed { state: String },

    /// A long-running operation did not finish in time.
    #[error("operation did not complete within {0:?}")]
    Timeout(Duration),
}

impl ArmError {
    /// Build a status error without an ARM error code.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Whether this error means the addressed object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Result type for control-plane calls.
pub type ArmResult<T> = std::result::Result<T, ArmError>;

/// Outcome of a single-resource read.
///
/// Absence and failure are separate variants so that callers decide how to
/// treat each one instead of folding every error into "does not exist".
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// The resource exists; its current payload.
    Found(serde_json::Value),
    /// The resource does not exist.
    NotFound,
    /// The read failed for any other reason (auth, network, throttling...).
    Failed(ArmError),
}

impl ReadOutcome {
    /// Classify a client result, mapping a 404 to [`ReadOutcome::NotFound`].
    pub fn from_result(result: ArmResult<serde_json::Value>) -> Self {
        match result {
            Ok(value) => Self::Found(value),
            Err(e) if e.is_not_found() => Self::NotFound,
            Err(e) => Self::Failed(e),
        }
    }
}

/// Handle to an operation ARM accepted but has not finished.
///
/// Pollers watch the resource itself; the `Azure-AsyncOperation` and
/// `Location` headers are not followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Resource id the operation acts on.
    pub resource_id: String,
}

impl PendingOperation {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
        }
    }
}

/// Result of a `create_or_update` call.
#[derive(Debug, Clone, PartialEq)]
pub enum Provisioning {
    /// The resource reached its final state synchronously.
    Completed(serde_json::Value),
    /// ARM accepted the request; poll until it settles.
    Accepted(PendingOperation),
}

/// What to fetch for one page of a list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// First page of a collection, addressed by its ARM path.
    Scope(String),
    /// A follow-up page, addressed by the `nextLink` ARM returned.
    NextLink(String),
}

/// One page of a list call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub value: Vec<serde_json::Value>,
    #[serde(rename = "nextLink", default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

/// Control-plane client for one ARM endpoint.
///
/// Resource ids are full ARM ids (`/subscriptions/.../providers/...`). The
/// api-version travels with every call because it is a property of the
/// resource kind, not of the client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Read one resource.
    async fn get(&self, resource_id: &str, api_version: &str) -> ReadOutcome;

    /// Create or replace one resource with `payload`.
    async fn create_or_update(
        &self,
        resource_id: &str,
        api_version: &str,
        payload: &serde_json::Value,
    ) -> ArmResult<Provisioning>;

    /// Delete one resource. Returns a pending operation when ARM answers
    /// asynchronously.
    async fn delete(&self, resource_id: &str, api_version: &str)
        -> ArmResult<Option<PendingOperation>>;

    /// Fetch one page of a collection.
    async fn list_page(&self, request: &PageRequest, api_version: &str) -> ArmResult<Page>;

    /// Short identifier used in logs.
    fn describe(&self) -> String {
        "arm".to_string()
    }
}
