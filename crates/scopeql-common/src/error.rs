//! Error types for scopeql

use thiserror::Error;

/// Result type alias for scopeql operations
pub type Result<T> = std::result::Result<T, ScopeQlError>;

/// Unified error type for all scopeql operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeQlError {
    /// A statement could not be rendered from the given predicates/columns.
    ///
    /// This always indicates a programming bug in the caller (bad table
    /// descriptor, conflicting predicate values), never bad user data.
    #[error("Query construction error: {0}")]
    QueryConstruction(String),

    /// An identifier or value failed validation before rendering.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ScopeQlError {
    /// Returns true if this error is potentially retryable.
    ///
    /// Query construction is a pure function of its input, so nothing
    /// produced by this workspace is worth retrying.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Returns true if this error came out of statement rendering
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            ScopeQlError::QueryConstruction(_) | ScopeQlError::Validation(_)
        )
    }

    /// Folds rendering failures into `QueryConstruction`, keeping the
    /// message. Other kinds are returned unchanged.
    pub fn into_construction_error(self) -> Self {
        match self {
            ScopeQlError::Validation(message) => ScopeQlError::QueryConstruction(message),
            other => other,
        }
    }
}

impl From<serde_json::Error> for ScopeQlError {
    fn from(err: serde_json::Error) -> Self {
        ScopeQlError::Serialization(err.to_string())
    }
}
