//! # Error Types
//!
//! Structured error types for joinery_core. Every variant carries enough
//! context for a UI or a script to point at the offending field without
//! parsing the message text.
//!
//! Missing catalog references are *not* errors: rule evaluation and pricing
//! treat them as a no-op / zero contribution. Errors are reserved for input
//! that is genuinely invalid (negative dimensions, out-of-range discounts,
//! malformed catalog files) and for I/O.
//!
//! ## Example
//!
//! ```rust
//! use joinery_core::errors::{JoineryError, JoineryResult};
//!
//! fn validate_width(width_mm: f64) -> JoineryResult<()> {
//!     if width_mm <= 0.0 {
//!         return Err(JoineryError::InvalidInput {
//!             field: "width_mm".to_string(),
//!             value: width_mm.to_string(),
//!             reason: "Width must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for joinery_core operations
pub type JoineryResult<T> = Result<T, JoineryError>;

/// Structured error type for configurator operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum JoineryError {
    /// An input value is invalid (out of range, not finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Material id not present in the catalog
    #[error("Material not found: {material_id}")]
    MaterialNotFound { material_id: String },

    /// Accessory id not present in the catalog
    #[error("Accessory not found: {accessory_id}")]
    AccessoryNotFound { accessory_id: String },

    /// Module id not present in the project
    #[error("Module not found: {module_id}")]
    ModuleNotFound { module_id: String },

    /// Project id not present in the store
    #[error("Project not found: {project_id}")]
    ProjectNotFound { project_id: String },

    /// Quote status change that the lifecycle does not allow
    #[error("Invalid quote transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON/CSV serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl JoineryError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        JoineryError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        JoineryError::MissingField { field: field.into() }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_id: impl Into<String>) -> Self {
        JoineryError::MaterialNotFound {
            material_id: material_id.into(),
        }
    }

    /// Create an AccessoryNotFound error
    pub fn accessory_not_found(accessory_id: impl Into<String>) -> Self {
        JoineryError::AccessoryNotFound {
            accessory_id: accessory_id.into(),
        }
    }

    /// Create a ModuleNotFound error
    pub fn module_not_found(module_id: impl ToString) -> Self {
        JoineryError::ModuleNotFound {
            module_id: module_id.to_string(),
        }
    }

    /// Create a ProjectNotFound error
    pub fn project_not_found(project_id: impl ToString) -> Self {
        JoineryError::ProjectNotFound {
            project_id: project_id.to_string(),
        }
    }

    /// Create an InvalidTransition error
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        JoineryError::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        JoineryError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        JoineryError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError from any displayable error
    pub fn serialization(reason: impl std::fmt::Display) -> Self {
        JoineryError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, JoineryError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            JoineryError::InvalidInput { .. } => "INVALID_INPUT",
            JoineryError::MissingField { .. } => "MISSING_FIELD",
            JoineryError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            JoineryError::AccessoryNotFound { .. } => "ACCESSORY_NOT_FOUND",
            JoineryError::ModuleNotFound { .. } => "MODULE_NOT_FOUND",
            JoineryError::ProjectNotFound { .. } => "PROJECT_NOT_FOUND",
            JoineryError::InvalidTransition { .. } => "INVALID_TRANSITION",
            JoineryError::FileError { .. } => "FILE_ERROR",
            JoineryError::FileLocked { .. } => "FILE_LOCKED",
            JoineryError::SerializationError { .. } => "SERIALIZATION_ERROR",
            JoineryError::VersionMismatch { .. } => "VERSION_MISMATCH",
            JoineryError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for JoineryError {
    fn from(err: serde_json::Error) -> Self {
        JoineryError::serialization(err)
    }
}

impl From<csv::Error> for JoineryError {
    fn from(err: csv::Error) -> Self {
        JoineryError::serialization(err)
    }
}
