//! Identity provider backed by a fixed map.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::domain::persona::RawIdentityTraits;
use crate::ports::{IdentityProvider, RepositoryError};

#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    traits: Arc<RwLock<HashMap<UserId, RawIdentityTraits>>>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_traits(&self, user_id: &UserId, traits: RawIdentityTraits) {
        self.traits.write().await.insert(user_id.clone(), traits);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn get_identity_traits(
        &self,
        user_id: &UserId,
    ) -> Result<Option<RawIdentityTraits>, RepositoryError> {
        Ok(self.traits.read().await.get(user_id).cloned())
    }
}
