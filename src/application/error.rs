use thiserror::Error;

use crate::domain::foundation::{SessionId, ValidationError};
use crate::domain::migration::MigrationError;
use crate::ports::RepositoryError;

/// Errors surfaced by the persona service and the integration layer.
#[derive(Debug, Error)]
pub enum PersonaError {
    /// Malformed update request. Nothing was written.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("mood history migration failed: {0}")]
    Migration(#[from] MigrationError),

    /// Aggregate data could not be turned into a persona. Nothing was written.
    #[error("persona computation failed: {0}")]
    Compute(ValidationError),

    #[error("no active session {0}")]
    SessionNotFound(SessionId),
}
