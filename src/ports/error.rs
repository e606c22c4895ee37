//! Errors shared by every storage-facing port.

use thiserror::Error;

/// Failure reported by a repository, data reader or document store.
///
/// Propagated unchanged to callers; ports never retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored document carries a schema version this build cannot read.
    #[error("schema mismatch: expected version {expected}, found {found}")]
    SchemaMismatch { expected: u32, found: u32 },

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn io(e: impl std::fmt::Display) -> Self {
        Self::Io(e.to_string())
    }

    pub fn serialization(e: impl std::fmt::Display) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        Self::serialization(e)
    }
}
