//! Error types for dyntable
//!
//! Provides a unified error type for all table operations.

use thiserror::Error;

/// Result type alias using TableError
pub type Result<T> = std::result::Result<T, TableError>;

/// Unified error type for table operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    // -------------------------------------------------------------------------
    // Conditional Write Errors
    // -------------------------------------------------------------------------
    /// An existence or version precondition failed on insert/update/delete
    #[error("Conditional check failed for ({partition_key}, {sort_key}): {message}")]
    ConditionalCheckFailed {
        partition_key: String,
        sort_key: String,
        message: String,
    },

    /// Reserved for races that span more than one conditional check
    #[error("Concurrency error for ({partition_key}, {sort_key}): {message}")]
    ConcurrencyError {
        partition_key: String,
        sort_key: String,
        message: String,
    },

    /// A retry loop was given no attempts to work with
    #[error("Unable to update: {0}")]
    UnableToUpdate(String),

    // -------------------------------------------------------------------------
    // Type Errors
    // -------------------------------------------------------------------------
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// The stored payload is not one of the expected polymorphic variants
    #[error("Unexpected type: {provided}")]
    UnexpectedType { provided: String },

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // -------------------------------------------------------------------------
    // Catch-all
    // -------------------------------------------------------------------------
    #[error("Unrecognized error {kind}: {detail}")]
    Unrecognized { kind: String, detail: String },
}

impl TableError {
    /// Build a `ConditionalCheckFailed` for the given key
    pub fn conditional_check_failed(
        partition_key: impl Into<String>,
        sort_key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        TableError::ConditionalCheckFailed {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
            message: message.into(),
        }
    }

    /// Wrap an arbitrary error, keeping its type name and description
    pub fn unrecognized<E: std::error::Error>(error: &E) -> Self {
        TableError::Unrecognized {
            kind: std::any::type_name::<E>().to_string(),
            detail: error.to_string(),
        }
    }

    pub fn is_conditional_check_failed(&self) -> bool {
        matches!(self, TableError::ConditionalCheckFailed { .. })
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            TableError::TypeMismatch { .. } | TableError::UnexpectedType { .. }
        )
    }
}
