//! # Error Types
//!
//! Structured error types for contract_core. Every variant carries enough
//! context for a front-end to report the problem, and the enum serializes to
//! JSON so callers can forward it verbatim.
//!
//! The pricing and rollup calculators never return these: missing inputs
//! degrade to `None` or zero. Errors come from boundary validation, offer
//! workflow transitions, and the workspace store.
//!
//! ## Example
//!
//! ```rust
//! use contract_core::errors::{ContractError, ContractResult};
//!
//! fn validate_quantity(quantity: u32) -> ContractResult<()> {
//!     if quantity == 0 {
//!         return Err(ContractError::InvalidInput {
//!             field: "quantity".to_string(),
//!             value: quantity.to_string(),
//!             reason: "Quantity must be at least 1".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for contract_core operations
pub type ContractResult<T> = Result<T, ContractError>;

/// Structured error type for offer, plan and store operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ContractError {
    /// An input value is invalid (out of range, wrong sign, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A record was not found in the store
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Offer workflow transition that is not allowed from the current status
    #[error("Cannot move {entity} from '{from}' to '{to}'")]
    InvalidTransition {
        entity: String,
        from: String,
        to: String,
    },

    /// The session role may not perform this action
    #[error("Permission denied: role '{role}' cannot {action}")]
    PermissionDenied { role: String, action: String },

    /// Remote rate table could not be fetched
    #[error("Fetch failed: {reason}")]
    FetchFailed { reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl ContractError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        ContractError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        ContractError::MissingField {
            field: field.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(kind: impl Into<String>, id: impl ToString) -> Self {
        ContractError::NotFound {
            kind: kind.into(),
            id: id.to_string(),
        }
    }

    /// Create an InvalidTransition error
    pub fn invalid_transition(entity: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        ContractError::InvalidTransition {
            entity: entity.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a PermissionDenied error
    pub fn permission_denied(role: impl Into<String>, action: impl Into<String>) -> Self {
        ContractError::PermissionDenied {
            role: role.into(),
            action: action.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        ContractError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ContractError::FetchFailed { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ContractError::InvalidInput { .. } => "INVALID_INPUT",
            ContractError::MissingField { .. } => "MISSING_FIELD",
            ContractError::NotFound { .. } => "NOT_FOUND",
            ContractError::InvalidTransition { .. } => "INVALID_TRANSITION",
            ContractError::PermissionDenied { .. } => "PERMISSION_DENIED",
            ContractError::FetchFailed { .. } => "FETCH_FAILED",
            ContractError::FileError { .. } => "FILE_ERROR",
            ContractError::SerializationError { .. } => "SERIALIZATION_ERROR",
            ContractError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(e: serde_json::Error) -> Self {
        ContractError::SerializationError {
            reason: e.to_string(),
        }
    }
}
