//! IdentityProvider port for raw identity traits.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::domain::persona::RawIdentityTraits;

use super::RepositoryError;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Raw trait scores on the 0–100 scale; `None` when the user has no identity profile.
    async fn get_identity_traits(
        &self,
        user_id: &UserId,
    ) -> Result<Option<RawIdentityTraits>, RepositoryError>;
}
