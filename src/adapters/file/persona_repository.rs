//! Persona documents on the filesystem.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::foundation::UserId;
use crate::domain::persona::{Persona, PERSONA_SCHEMA_VERSION};
use crate::ports::{PersonaRepository, RepositoryError};

use super::{document_path, read_document, write_document};

const COLLECTION: &str = "personas";

pub struct FilePersonaRepository {
    base_dir: PathBuf,
}

impl FilePersonaRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl PersonaRepository for FilePersonaRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Persona>, RepositoryError> {
        let path = document_path(&self.base_dir, COLLECTION, user_id);
        let Some(document) = read_document(&path).await? else {
            return Ok(None);
        };

        let found = document
            .get("schema_version")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        if found != u64::from(PERSONA_SCHEMA_VERSION) {
            tracing::warn!(user_id = %user_id, found, "Persona document has unexpected schema version");
            return Err(RepositoryError::SchemaMismatch {
                expected: PERSONA_SCHEMA_VERSION,
                found: u32::try_from(found).unwrap_or(u32::MAX),
            });
        }

        Ok(Some(serde_json::from_value(document)?))
    }

    async fn save(&self, persona: &Persona) -> Result<(), RepositoryError> {
        let path = document_path(&self.base_dir, COLLECTION, persona.user_id());
        write_document(&path, &serde_json::to_value(persona)?).await?;
        tracing::debug!(user_id = %persona.user_id(), path = %path.display(), "Persona written");
        Ok(())
    }
}
