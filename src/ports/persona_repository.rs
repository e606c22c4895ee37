//! PersonaRepository port for persona persistence.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::domain::persona::Persona;

use super::RepositoryError;

/// One persona document per user.
#[async_trait]
pub trait PersonaRepository: Send + Sync {
    /// Find the stored persona for a user, if any.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Persona>, RepositoryError>;

    /// Insert or replace the user's persona.
    async fn save(&self, persona: &Persona) -> Result<(), RepositoryError>;
}
