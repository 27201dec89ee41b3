//! Waiting for long-running ARM operations.

use super::{ArmError, ArmResult, PendingOperation, ReadOutcome, ResourceClient};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Blocks (asynchronously) until an accepted operation settles.
#[async_trait]
pub trait Poller: Send + Sync {
    /// Wait for an accepted create/update; returns the final payload.
    async fn wait_for_state(
        &self,
        client: &dyn ResourceClient,
        operation: &PendingOperation,
        api_version: &str,
    ) -> ArmResult<serde_json::Value>;

    /// Wait for an accepted delete to remove the resource.
    async fn wait_for_deletion(
        &self,
        client: &dyn ResourceClient,
        operation: &PendingOperation,
        api_version: &str,
    ) -> ArmResult<()>;
}

/// Polls the resource itself and reads `properties.provisioningState`.
#[derive(Debug, Clone)]
pub struct StatePoller {
    interval: Duration,
    timeout: Duration,
}

impl StatePoller {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl Default for StatePoller {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(1800))
    }
}

/// Terminal classification of a provisioning state string.
fn classify(state: Option<&str>) -> Option<Result<(), String>> {
    match state {
        // Resources without a provisioning state are settled as soon as they exist.
        None => Some(Ok(())),
        Some(s) if s.eq_ignore_ascii_case("succeeded") => Some(Ok(())),
        Some(s) if s.eq_ignore_ascii_case("failed") || s.eq_ignore_ascii_case("canceled") => {
            Some(Err(s.to_string()))
        }
        Some(_) => None,
    }
}

/// `properties.provisioningState` of a payload.
pub fn provisioning_state(value: &serde_json::Value) -> Option<&str> {
    value
        .pointer("/properties/provisioningState")
        .and_then(|v| v.as_str())
}

#[async_trait]
impl Poller for StatePoller {
    async fn wait_for_state(
        &self,
        client: &dyn ResourceClient,
        operation: &PendingOperation,
        api_version: &str,
    ) -> ArmResult<serde_json::Value> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match client.get(&operation.resource_id, api_version).await {
                ReadOutcome::Found(value) => match classify(provisioning_state(&value)) {
                    Some(Ok(())) => return Ok(value),
                    Some(Err(state)) => return Err(ArmError::ProvisioningFailed { state }),
                    None => debug!(
                        "{} still provisioning ({})",
                        operation.resource_id,
                        provisioning_state(&value).unwrap_or_default()
                    ),
                },
                ReadOutcome::NotFound => debug!("{} not visible yet", operation.resource_id),
                ReadOutcome::Failed(e) => return Err(e),
            }

            if Instant::now() >= deadline {
                return Err(ArmError::Timeout(self.timeout));
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    async fn wait_for_deletion(
        &self,
        client: &dyn ResourceClient,
        operation: &PendingOperation,
        api_version: &str,
    ) -> ArmResult<()> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match client.get(&operation.resource_id, api_version).await {
                ReadOutcome::NotFound => return Ok(()),
                ReadOutcome::Found(value) => {
                    if let Some(Err(state)) = classify(provisioning_state(&value)) {
                        return Err(ArmError::ProvisioningFailed { state });
                    }
                    debug!("{} still deleting", operation.resource_id);
                }
                ReadOutcome::Failed(e) => return Err(e),
            }

            if Instant::now() >= deadline {
                return Err(ArmError::Timeout(self.timeout));
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::{MockResourceClient, ReadOutcome};
    use serde_json::json;

    fn fast() -> StatePoller {
        StatePoller::new(Duration::from_millis(1), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_wait_for_state_until_succeeded() {
        let mut client = MockResourceClient::new();
        let mut calls = 0;
        client.expect_get().times(3).returning(move |_, _| {
            calls += 1;
            let state = if calls < 3 { "Updating" } else { "Succeeded" };
            ReadOutcome::Found(json!({"properties": {"provisioningState": state}}))
        });

        let op = PendingOperation::new("/subscriptions/s/resourceGroups/r/providers/P/t/n");
        let value = fast().wait_for_state(&client, &op, "2023-01-01").await.unwrap();
        assert_eq!(provisioning_state(&value), Some("Succeeded"));
    }

    #[tokio::test]
    async fn test_wait_for_state_reports_failure() {
        let mut client = MockResourceClient::new();
        client.expect_get().returning(|_, _| {
            ReadOutcome::Found(json!({"properties": {"provisioningState": "Failed"}}))
        });

        let op = PendingOperation::new("/id");
        let err = fast().wait_for_state(&client, &op, "v").await.unwrap_err();
        assert_eq!(
            err,
            ArmError::ProvisioningFailed {
                state: "Failed".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_wait_for_state_times_out() {
        let mut client = MockResourceClient::new();
        client.expect_get().returning(|_, _| {
            ReadOutcome::Found(json!({"properties": {"provisioningState": "Creating"}}))
        });

        let poller = StatePoller::new(Duration::from_millis(1), Duration::from_millis(5));
        let err = poller
            .wait_for_state(&client, &PendingOperation::new("/id"), "v")
            .await
            .unwrap_err();
        assert!(matches!(err, ArmError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_wait_for_deletion() {
        let mut client = MockResourceClient::new();
        let mut calls = 0;
        client.expect_get().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                ReadOutcome::Found(json!({"properties": {"provisioningState": "Deleting"}}))
            } else {
                ReadOutcome::NotFound
            }
        });

        fast()
            .wait_for_deletion(&client, &PendingOperation::new("/id"), "v")
            .await
            .unwrap();
    }
}
