//! # armctl - Desired-state modules for Azure Resource Manager
//!
//! armctl declares Azure resources and converges them: each module reads the
//! resource's current state from ARM, compares it with the desired
//! parameters, and creates, updates or deletes it only when needed. Every
//! resource kind also gets an `_info` module that lists matching resources.
//!
//! ## Core Concepts
//!
//! - **Schemas**: static per-kind tables mapping module parameters to ARM
//!   payload paths, with defaults, choices and comparison rules
//! - **Reconciler**: read, decide, apply; one read and at most one write
//! - **Lister**: picks the narrowest list scope for a partial identity and
//!   drains `nextLink` pages
//! - **Modules**: the synchronous entry points (`azure_rm_<kind>` and
//!   `azure_rm_<kind>_info`) registered in a [`ModuleRegistry`]
//! - **Resource clients**: the ARM REST API, or an in-memory control plane
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           CLI Interface                              │
//! │             (run tasks.yml, module, list-modules, describe)          │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Module Registry                             │
//! │           (azure_rm_<kind> and azure_rm_<kind>_info modules)         │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!          ┌─────────────────────────┼─────────────────────────┐
//!          ▼                         ▼                         ▼
//! ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────────┐
//! │  Resource       │   │     Reconciler      │   │       Lister        │
//! │  Schemas        │   │  (read, compare,    │   │  (scope selection,  │
//! │  (static)       │   │   apply, poll)      │   │   pagination)       │
//! └─────────────────┘   └─────────────────────┘   └─────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          ResourceClient                              │
//! │              (ARM REST over reqwest, or in-memory)                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use armctl::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = ModuleRegistry::with_builtins()?;
//! let context = ModuleContext::new()
//!     .with_client(Arc::new(InMemoryClient::new()))
//!     .with_default_subscription(Some("00000000-0000-0000-0000-000000000000".into()));
//!
//! let params: ModuleParams = serde_json::from_value(serde_json::json!({
//!     "resource_group": "rg1",
//!     "zone_name": "example.com",
//!     "record_type": "A",
//!     "relative_name": "www",
//!     "a_records": [{"ipv4_address": "10.0.0.4"}]
//! }))?;
//!
//! let output = registry.execute("azure_rm_dnsrecordset", &params, &context)?;
//! assert!(output.changed);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Control plane
    pub use crate::arm::{
        ArmError, HttpResourceClient, InMemoryClient, Poller, ReadOutcome, ResourceClient,
        ResourceIdentity, StatePoller,
    };

    // Configuration
    pub use crate::config::Config;

    // Error handling
    pub use crate::error::{Error, Result};

    // Module system
    pub use crate::modules::{
        Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleRegistry,
        ModuleResult,
    };

    // Reconcile core
    pub use crate::reconcile::{Action, Intent, Lister, ListOptions, Reconciler};
    pub use crate::schema::ResourceSchema;
}

pub mod arm;
pub mod config;
pub mod error;
pub mod modules;
pub mod reconcile;
pub mod schema;

pub use error::{Error, Result};

/// Version of the armctl library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
