//! In-memory persona repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::domain::persona::Persona;
use crate::ports::{PersonaRepository, RepositoryError};

/// Stores personas in a shared map. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersonaRepository {
    personas: Arc<RwLock<HashMap<UserId, Persona>>>,
    fail_writes: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryPersonaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` fail with `Unavailable` (useful for tests).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.personas.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.personas.read().await.is_empty()
    }
}

#[async_trait]
impl PersonaRepository for InMemoryPersonaRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Persona>, RepositoryError> {
        Ok(self.personas.read().await.get(user_id).cloned())
    }

    async fn save(&self, persona: &Persona) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "persona store rejected write".to_string(),
            ));
        }
        self.personas
            .write()
            .await
            .insert(persona.user_id().clone(), persona.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("player-1").unwrap()
    }

    #[tokio::test]
    async fn save_then_find() {
        let repo = InMemoryPersonaRepository::new();
        assert!(repo.find_by_user(&user()).await.unwrap().is_none());

        let persona = Persona::new_default(user());
        repo.save(&persona).await.unwrap();

        assert_eq!(repo.find_by_user(&user()).await.unwrap(), Some(persona));
        assert_eq!(repo.save_count(), 1);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn failing_writes_leave_store_untouched() {
        let repo = InMemoryPersonaRepository::new();
        repo.fail_writes(true);
        let result = repo.save(&Persona::new_default(user())).await;
        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
        assert!(repo.is_empty().await);
    }
}
