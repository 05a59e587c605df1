//! Error types for the reconciliation core.
//!
//! Only fatal conditions live here. A locked conflict or an ambiguous
//! override grouping is reported as data on the plan, never as an error.

use thiserror::Error;

/// Errors that abort a reconciliation pass.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Missing or contradictory identity fields, or an identity hash that
    /// does not match the fields it claims to fingerprint.
    #[error("Identity invariant violated: {0}")]
    IdentityInvariantViolation(String),

    /// Structural violation: zero sub-events, duplicate identity hash in one
    /// set, conflicting authority metadata, or a schema version mismatch.
    #[error("Manifest invariant violated: {0}")]
    ManifestInvariantViolation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SyncError {
    pub(crate) fn identity(msg: impl Into<String>) -> Self {
        SyncError::IdentityInvariantViolation(msg.into())
    }

    pub(crate) fn manifest(msg: impl Into<String>) -> Self {
        SyncError::ManifestInvariantViolation(msg.into())
    }

    /// Whether this error came from an invariant check rather than I/O or config.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            SyncError::IdentityInvariantViolation(_) | SyncError::ManifestInvariantViolation(_)
        )
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Serialization(e.to_string())
    }
}

/// Result type alias for reconciliation operations.
pub type SyncResult<T> = Result<T, SyncError>;
