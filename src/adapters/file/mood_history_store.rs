//! Mood-history documents on the filesystem, stored verbatim.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use crate::domain::foundation::UserId;
use crate::ports::{MoodHistoryStore, RepositoryError};

use super::{document_path, read_document, write_document};

const COLLECTION: &str = "mood_history";

pub struct FileMoodHistoryStore {
    base_dir: PathBuf,
}

impl FileMoodHistoryStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl MoodHistoryStore for FileMoodHistoryStore {
    async fn load(&self, user_id: &UserId) -> Result<Option<JsonValue>, RepositoryError> {
        read_document(&document_path(&self.base_dir, COLLECTION, user_id)).await
    }

    async fn save(&self, user_id: &UserId, document: &JsonValue) -> Result<(), RepositoryError> {
        write_document(&document_path(&self.base_dir, COLLECTION, user_id), document).await
    }
}
