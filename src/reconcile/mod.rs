//! Generic get / compare / create-update-delete cycle.
//!
//! One [`Reconciler::reconcile`] call drives one remote resource toward the
//! requested [`Intent`]:
//!
//! 1. the current state is read exactly once
//! 2. an [`Action`] is derived from the read and the desired payload
//! 3. at most one mutating call is issued (none in check mode)
//!
//! A failed read aborts the invocation; only a definite "not found" is
//! treated as absence.

mod compare;
pub mod lister;

pub use compare::{find_drift, values_match, FieldDrift};
pub use lister::{ListOptions, ListOutcome, ListScope, Lister};

use crate::arm::{Poller, Provisioning, ReadOutcome, ResourceClient, ResourceIdentity};
use crate::error::{Error, Result};
use crate::schema::ResourceSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Requested end state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    #[default]
    Present,
    Absent,
}

impl FromStr for Intent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "present" => Ok(Intent::Present),
            "absent" => Ok(Intent::Absent),
            other => Err(Error::InvalidParameter(format!(
                "state must be 'present' or 'absent' (got '{}')",
                other
            ))),
        }
    }
}

/// What a reconcile pass decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    NoAction,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::NoAction => "no_action",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Whether the action modifies the remote resource.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::NoAction)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive the action from the observed state and the intent.
///
/// | observed | intent  | action                        |
/// |----------|---------|-------------------------------|
/// | absent   | present | Create                        |
/// | present  | absent  | Delete                        |
/// | present  | present | Update on drift, else NoAction|
/// | absent   | absent  | NoAction                      |
pub fn decide(
    schema: &ResourceSchema,
    desired: &Value,
    observed: Option<&Value>,
    intent: Intent,
) -> (Action, Option<FieldDrift>) {
    match (observed, intent) {
        (None, Intent::Present) => (Action::Create, None),
        (Some(_), Intent::Absent) => (Action::Delete, None),
        (None, Intent::Absent) => (Action::NoAction, None),
        (Some(current), Intent::Present) => match find_drift(schema.fields, desired, current) {
            Some(drift) => (Action::Update, Some(drift)),
            None => (Action::NoAction, None),
        },
    }
}

/// Result of one reconcile pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileOutcome {
    pub resource_id: String,
    pub action: Action,
    pub changed: bool,
    /// Resulting payload after Create/Update, observed payload on NoAction;
    /// `None` after Delete and for any mutation skipped in check mode.
    pub state: Option<Value>,
    /// Observed payload before the pass, if the resource existed.
    pub before: Option<Value>,
    /// Field that triggered an Update.
    pub drift: Option<FieldDrift>,
}

/// Drives single resources through the reconcile cycle.
pub struct Reconciler<'a> {
    client: &'a dyn ResourceClient,
    poller: &'a dyn Poller,
}

impl<'a> Reconciler<'a> {
    pub fn new(client: &'a dyn ResourceClient, poller: &'a dyn Poller) -> Self {
        Self { client, poller }
    }

    /// Reconcile the resource at `identity` against `desired`.
    pub async fn reconcile(
        &self,
        schema: &ResourceSchema,
        identity: &ResourceIdentity,
        desired: &Value,
        intent: Intent,
        check_mode: bool,
    ) -> Result<ReconcileOutcome> {
        if !identity.is_complete() {
            return Err(Error::InvalidParameter(format!(
                "{} identity '{}' is incomplete",
                schema.display_name, identity
            )));
        }
        let resource_id = identity.resource_id();

        debug!("Fetching {} {}", schema.display_name, resource_id);
        let observed = match self.client.get(&resource_id, schema.api_version).await {
            ReadOutcome::Found(value) => Some(value),
            ReadOutcome::NotFound => None,
            ReadOutcome::Failed(e) => {
                return Err(Error::read(schema.display_name, resource_id, e));
            }
        };

        let (action, drift) = decide(schema, desired, observed.as_ref(), intent);
        match &drift {
            Some(d) => debug!(
                "{} {}: {} (drift in '{}')",
                schema.display_name, resource_id, action, d.path
            ),
            None => debug!("{} {}: {}", schema.display_name, resource_id, action),
        }

        let changed = action.is_mutation();
        if !changed {
            return Ok(ReconcileOutcome {
                resource_id,
                action,
                changed,
                state: observed.clone(),
                before: observed,
                drift,
            });
        }

        if check_mode {
            info!("Check mode: would {} {} {}", action, schema.display_name, resource_id);
            return Ok(ReconcileOutcome {
                resource_id,
                action,
                changed,
                state: None,
                before: observed,
                drift,
            });
        }

        let state = self
            .apply(schema, &resource_id, desired, action)
            .await
            .map_err(|e| Error::mutation(action, schema.display_name, resource_id.as_str(), e))?;

        Ok(ReconcileOutcome {
            resource_id,
            action,
            changed,
            state,
            before: observed,
            drift,
        })
    }

    async fn apply(
        &self,
        schema: &ResourceSchema,
        resource_id: &str,
        desired: &Value,
        action: Action,
    ) -> crate::arm::ArmResult<Option<Value>> {
        let api_version = schema.api_version;
        match action {
            Action::Create | Action::Update => {
                info!("{} {} {}", action, schema.display_name, resource_id);
                let state = match self
                    .client
                    .create_or_update(resource_id, api_version, desired)
                    .await?
                {
                    Provisioning::Completed(state) => state,
                    Provisioning::Accepted(pending) => {
                        debug!("{} accepted, waiting for provisioning", resource_id);
                        self.poller
                            .wait_for_state(self.client, &pending, api_version)
                            .await?
                    }
                };
                Ok(Some(state))
            }
            Action::Delete => {
                info!("delete {} {}", schema.display_name, resource_id);
                if let Some(pending) = self.client.delete(resource_id, api_version).await? {
                    debug!("{} delete accepted, waiting for removal", resource_id);
                    self.poller
                        .wait_for_deletion(self.client, &pending, api_version)
                        .await?;
                }
                Ok(None)
            }
            Action::NoAction => Ok(None),
        }
    }
}
