//! Error types for armctl.
//!
//! Control-plane failures ([`ArmError`]) are wrapped with the resource kind
//! and id they happened on so a single message tells the operator what was
//! being attempted.

use crate::arm::ArmError;
use crate::reconcile::Action;
use crate::schema::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for armctl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for armctl.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Parameter Errors
    // ========================================================================
    /// A required parameter was not supplied.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// A parameter was supplied with an unusable value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A resource schema table is malformed.
    #[error("Invalid resource schema: {0}")]
    Schema(#[from] SchemaError),

    // ========================================================================
    // Control-plane Errors
    // ========================================================================
    /// Reading the current state failed for a reason other than absence.
    #[error("Failed to read {kind} '{resource_id}': {source}")]
    Read {
        /// Resource kind
        kind: String,
        /// Full ARM id
        resource_id: String,
        /// Client error
        #[source]
        source: ArmError,
    },

    /// A create, update or delete was rejected or did not settle.
    #[error("Failed to {operation} {kind} '{resource_id}': {source}")]
    Mutation {
        /// What was attempted
        operation: Action,
        /// Resource kind
        kind: String,
        /// Full ARM id
        resource_id: String,
        /// Client error
        #[source]
        source: ArmError,
    },

    /// Listing a collection failed.
    #[error("Failed to list {kind} at '{scope}': {source}")]
    Enumeration {
        /// Resource kind
        kind: String,
        /// Collection path
        scope: String,
        /// Client error
        #[source]
        source: ArmError,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration file could not be loaded.
    #[error("Failed to load configuration '{path}': {message}")]
    ConfigLoad {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Configuration is loaded but unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a new read error.
    pub fn read(kind: impl Into<String>, resource_id: impl Into<String>, source: ArmError) -> Self {
        Self::Read {
            kind: kind.into(),
            resource_id: resource_id.into(),
            source,
        }
    }

    /// Creates a new mutation error.
    pub fn mutation(
        operation: Action,
        kind: impl Into<String>,
        resource_id: impl Into<String>,
        source: ArmError,
    ) -> Self {
        Self::Mutation {
            operation,
            kind: kind.into(),
            resource_id: resource_id.into(),
            source,
        }
    }

    /// Creates a new enumeration error.
    pub fn enumeration(kind: impl Into<String>, scope: impl Into<String>, source: ArmError) -> Self {
        Self::Enumeration {
            kind: kind.into(),
            scope: scope.into(),
            source,
        }
    }

    /// The control-plane error underneath, if any.
    pub fn arm_error(&self) -> Option<&ArmError> {
        match self {
            Error::Read { source, .. }
            | Error::Mutation { source, .. }
            | Error::Enumeration { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns true if retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        match self.arm_error() {
            Some(ArmError::Transport(_)) | Some(ArmError::Timeout(_)) => true,
            Some(ArmError::Status { status, .. }) => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Read { .. } | Error::Mutation { .. } | Error::Enumeration { .. } => 2,
            Error::MissingParameter(_) | Error::InvalidParameter(_) => 4,
            Error::ConfigLoad { .. } | Error::Config(_) => 5,
            _ => 1,
        }
    }
}
