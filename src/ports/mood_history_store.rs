//! MoodHistoryStore port - raw mood-history documents.
//!
//! Documents are stored as JSON with their `schema_version` tag intact so
//! the migration subsystem decides how to read them.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::foundation::UserId;

use super::RepositoryError;

#[async_trait]
pub trait MoodHistoryStore: Send + Sync {
    async fn load(&self, user_id: &UserId) -> Result<Option<JsonValue>, RepositoryError>;

    async fn save(&self, user_id: &UserId, document: &JsonValue) -> Result<(), RepositoryError>;
}
