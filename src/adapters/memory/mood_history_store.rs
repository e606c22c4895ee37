//! In-memory mood-history document store.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::ports::{MoodHistoryStore, RepositoryError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryMoodHistoryStore {
    documents: Arc<RwLock<HashMap<UserId, JsonValue>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryMoodHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw document, bypassing validation.
    pub async fn insert_raw(&self, user_id: &UserId, document: JsonValue) {
        self.documents.write().await.insert(user_id.clone(), document);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MoodHistoryStore for InMemoryMoodHistoryStore {
    async fn load(&self, user_id: &UserId) -> Result<Option<JsonValue>, RepositoryError> {
        Ok(self.documents.read().await.get(user_id).cloned())
    }

    async fn save(&self, user_id: &UserId, document: &JsonValue) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "mood history store rejected write".to_string(),
            ));
        }
        self.documents
            .write()
            .await
            .insert(user_id.clone(), document.clone());
        Ok(())
    }
}
