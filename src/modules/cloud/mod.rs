//! Cloud provider modules.
//!
//! Only Azure Resource Manager is supported. Every module is generated from
//! a declarative [`ResourceSchema`](crate::schema::ResourceSchema) and runs
//! through the shared reconciler.
//!
//! ```yaml
//! - name: Point www at the web tier
//!   azure_rm_dnsrecordset:
//!     resource_group: rg1
//!     zone_name: example.com
//!     relative_name: www
//!     record_type: A
//!     ttl: 300
//!     a_records:
//!       - ipv4_address: 10.0.0.4
//! ```

pub mod azure;

pub use azure::{AzureInfoModule, AzureResourceModule};
