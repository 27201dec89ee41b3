//! Shared test utilities and fixtures for the armctl test suite.
//!
//! This module provides:
//! - Parameter map builders
//! - Module contexts wired to an in-memory control plane
//! - A fast poller for accepted operations
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use armctl::arm::{InMemoryClient, StatePoller};
use armctl::modules::{ModuleContext, ModuleOutput, ModuleParams, ModuleRegistry};
use serde_json::{json, Value};

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";

/// Build module parameters from a JSON object literal.
pub fn params(value: Value) -> ModuleParams {
    serde_json::from_value(value).expect("parameters must be a JSON object")
}

/// Poller that settles quickly enough for tests.
pub fn fast_poller() -> Arc<StatePoller> {
    Arc::new(StatePoller::new(
        Duration::from_millis(5),
        Duration::from_secs(2),
    ))
}

/// Module context bound to `client` with a default subscription.
pub fn context(client: Arc<InMemoryClient>) -> ModuleContext {
    ModuleContext::new()
        .with_client(client)
        .with_poller(fast_poller())
        .with_default_subscription(Some(SUBSCRIPTION.to_string()))
}

/// Registry with every built-in module.
pub fn registry() -> ModuleRegistry {
    ModuleRegistry::with_builtins().expect("built-in catalog must validate")
}

/// Full ARM id under the shared test subscription.
pub fn arm_id(resource_group: &str, provider_path: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/{}",
        SUBSCRIPTION, resource_group, provider_path
    )
}

/// Parameters for the A record used across the reconcile tests.
pub fn a_record(ttl: i64) -> ModuleParams {
    params(json!({
        "resource_group": "rg1",
        "zone_name": "zoneA",
        "record_type": "A",
        "relative_name": "recordX",
        "ttl": ttl,
        "a_records": [{"ipv4_address": "127.0.0.1"}]
    }))
}

/// Parameters for a small managed disk.
pub fn disk(name: &str, size_gb: i64) -> ModuleParams {
    params(json!({
        "resource_group": "rg1",
        "name": name,
        "location": "West Europe",
        "sku": "Premium_LRS",
        "disk_size_gb": size_gb
    }))
}

/// Items of an info module's output.
pub fn items(output: &ModuleOutput) -> Vec<Value> {
    output.data["items"].as_array().cloned().unwrap_or_default()
}
