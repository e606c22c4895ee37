//! File-backed adapters: one JSON document per user under a base directory.
//!
//! Layout: `{base_dir}/{collection}/{user}.json`. Writes go to a temporary
//! file first and are renamed into place.

mod mood_history_store;
mod persona_repository;

pub use mood_history_store::FileMoodHistoryStore;
pub use persona_repository::FilePersonaRepository;

use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::UserId;
use crate::ports::RepositoryError;

/// File name for a user; anything outside `[A-Za-z0-9_-]` is `%XX`-escaped.
fn document_file_name(user_id: &UserId) -> String {
    let mut name = String::with_capacity(user_id.as_str().len() + 5);
    for byte in user_id.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            name.push(byte as char);
        } else {
            name.push_str(&format!("%{byte:02X}"));
        }
    }
    name.push_str(".json");
    name
}

fn document_path(base_dir: &Path, collection: &str, user_id: &UserId) -> PathBuf {
    base_dir.join(collection).join(document_file_name(user_id))
}

async fn read_document(path: &Path) -> Result<Option<JsonValue>, RepositoryError> {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(RepositoryError::io(format!("failed to read {}: {e}", path.display()))),
    };
    Ok(Some(serde_json::from_slice(&raw)?))
}

async fn write_document(path: &Path, document: &JsonValue) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| RepositoryError::io(format!("failed to create directory: {e}")))?;
    }
    let bytes = serde_json::to_vec_pretty(document)?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, bytes)
        .await
        .map_err(|e| RepositoryError::io(format!("failed to write temporary file: {e}")))?;
    fs::rename(&temp_path, path)
        .await
        .map_err(|e| RepositoryError::io(format!("failed to rename file: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_escape_path_characters() {
        let user = UserId::new("../etc/passwd").unwrap();
        let name = document_file_name(&user);
        assert!(!name.contains('/'));
        assert_eq!(name, "%2E%2E%2Fetc%2Fpasswd.json");
    }

    #[test]
    fn plain_ids_are_kept() {
        let user = UserId::new("player_1-a").unwrap();
        assert_eq!(document_file_name(&user), "player_1-a.json");
    }
}
