//! Migration module - Mood-history schema upgrade and rollback.
//!
//! Upgrades are one-way and idempotent: the `schema_version` tag tells an
//! already-migrated document apart, and re-applying the upgrade to it is a
//! no-op. Rollback drops only the fields the enhanced schema introduced.

mod errors;
mod schema;
mod upcaster;

pub use errors::MigrationError;
pub use schema::{
    EnhancedMoodEntry, EnhancedMoodHistory, LegacyMoodEntry, LegacyMoodHistory,
    MoodHistoryDocument, ENHANCED_SCHEMA_VERSION, LEGACY_SCHEMA_VERSION, SCHEMA_VERSION_FIELD,
};
pub use upcaster::{resolve_legacy_label, MoodHistoryV1ToV2, Upcaster};

use serde_json::Value as JsonValue;

use crate::domain::foundation::Timestamp;

/// Upgrades a raw mood-history document to the enhanced schema.
///
/// Documents already tagged v2 are validated and returned unchanged.
pub fn migrate_legacy_mood_data(
    document: &JsonValue,
    migrated_at: Timestamp,
) -> Result<JsonValue, MigrationError> {
    match MoodHistoryDocument::from_json(document)? {
        MoodHistoryDocument::Enhanced(_) => Ok(document.clone()),
        MoodHistoryDocument::Legacy(legacy) => {
            Ok(serde_json::to_value(migrate_mood_history(&legacy, migrated_at)?)?)
        }
    }
}

/// Typed v1 → v2 upgrade.
pub fn migrate_mood_history(
    legacy: &LegacyMoodHistory,
    migrated_at: Timestamp,
) -> Result<EnhancedMoodHistory, MigrationError> {
    MoodHistoryV1ToV2::new(migrated_at).upgrade(legacy)
}

/// Typed v2 → v1 rollback.
pub fn demigrate_mood_history(enhanced: &EnhancedMoodHistory) -> LegacyMoodHistory {
    // The stamp is irrelevant on the way down.
    MoodHistoryV1ToV2::new(Timestamp::epoch()).downgrade(enhanced)
}

/// Rolls a raw document back to v1; v1 documents are returned unchanged.
pub fn demigrate_mood_data(document: &JsonValue) -> Result<JsonValue, MigrationError> {
    match MoodHistoryDocument::from_json(document)? {
        MoodHistoryDocument::Legacy(_) => Ok(document.clone()),
        MoodHistoryDocument::Enhanced(enhanced) => {
            Ok(serde_json::to_value(demigrate_mood_history(&enhanced))?)
        }
    }
}
