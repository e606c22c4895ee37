//! Single-step schema converters for mood-history documents.

use serde_json::Value as JsonValue;

use crate::domain::foundation::Timestamp;
use crate::domain::persona::{Mood, MoodSource, MAX_MOOD_INTENSITY};

use super::schema::check_legacy_intensity;
use super::{
    EnhancedMoodEntry, EnhancedMoodHistory, LegacyMoodEntry, LegacyMoodHistory, MigrationError,
    MoodHistoryDocument, ENHANCED_SCHEMA_VERSION, LEGACY_SCHEMA_VERSION,
};

/// Converts a mood-history document one schema version up, and back.
///
/// Implementations must be deterministic for a given input and never mutate
/// the stored document themselves.
pub trait Upcaster: Send + Sync {
    fn source_version(&self) -> u32;

    fn target_version(&self) -> u32;

    fn upcast(&self, document: JsonValue) -> Result<JsonValue, MigrationError>;

    /// Inverse of [`Upcaster::upcast`], dropping fields the source schema lacks.
    fn downcast(&self, document: JsonValue) -> Result<JsonValue, MigrationError>;
}

/// Labels written by older clients that predate the current mood set.
const LEGACY_MOOD_ALIASES: &[(&str, Mood)] = &[
    ("relaxed", Mood::Chill),
    ("calm", Mood::Chill),
    ("hyped", Mood::Competitive),
    ("energetic", Mood::Adventurous),
    ("curious", Mood::Adventurous),
    ("happy", Mood::Social),
    ("bored", Mood::Tired),
    ("sleepy", Mood::Tired),
    ("angry", Mood::Frustrated),
    ("stressed", Mood::Frustrated),
];

/// Resolves a v1 label to a mood: exact mood names first, then aliases.
pub fn resolve_legacy_label(label: &str) -> Result<Mood, MigrationError> {
    if let Ok(mood) = label.parse::<Mood>() {
        return Ok(mood);
    }
    let needle = label.trim().to_ascii_lowercase();
    LEGACY_MOOD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == needle)
        .map(|(_, mood)| *mood)
        .ok_or_else(|| MigrationError::UnknownMood {
            label: label.to_string(),
        })
}

/// v1 → v2. Synthesizes `source = legacy` and stamps `migrated_at`.
#[derive(Debug, Clone, Copy)]
pub struct MoodHistoryV1ToV2 {
    pub migrated_at: Timestamp,
}

impl MoodHistoryV1ToV2 {
    pub fn new(migrated_at: Timestamp) -> Self {
        Self { migrated_at }
    }

    pub fn upgrade(&self, legacy: &LegacyMoodHistory) -> Result<EnhancedMoodHistory, MigrationError> {
        let entries = legacy
            .entries
            .iter()
            .map(|entry| {
                check_legacy_intensity(entry.intensity)?;
                Ok(EnhancedMoodEntry {
                    mood: resolve_legacy_label(&entry.mood)?,
                    intensity: f64::from(entry.intensity),
                    timestamp: entry.timestamp,
                    source: MoodSource::Legacy,
                    session_id: None,
                    secondary_mood: None,
                    original_label: Some(entry.mood.clone()),
                    note: entry.note.clone(),
                })
            })
            .collect::<Result<Vec<_>, MigrationError>>()?;

        Ok(EnhancedMoodHistory {
            schema_version: ENHANCED_SCHEMA_VERSION,
            user_id: legacy.user_id.clone(),
            entries,
            migrated_at: Some(self.migrated_at),
        })
    }

    /// Drops `source`, `session_id`, `secondary_mood` and `migrated_at`.
    ///
    /// Intensity is rounded to the legacy integer scale. The original label
    /// is restored when the entry came from v1.
    pub fn downgrade(&self, enhanced: &EnhancedMoodHistory) -> LegacyMoodHistory {
        let entries = enhanced
            .entries
            .iter()
            .map(|entry| LegacyMoodEntry {
                mood: entry
                    .original_label
                    .clone()
                    .unwrap_or_else(|| entry.mood.as_str().to_string()),
                intensity: entry.intensity.round().clamp(0.0, MAX_MOOD_INTENSITY) as u8,
                timestamp: entry.timestamp,
                note: entry.note.clone(),
            })
            .collect();

        LegacyMoodHistory {
            schema_version: LEGACY_SCHEMA_VERSION,
            user_id: enhanced.user_id.clone(),
            entries,
        }
    }
}

impl Upcaster for MoodHistoryV1ToV2 {
    fn source_version(&self) -> u32 {
        LEGACY_SCHEMA_VERSION
    }

    fn target_version(&self) -> u32 {
        ENHANCED_SCHEMA_VERSION
    }

    fn upcast(&self, document: JsonValue) -> Result<JsonValue, MigrationError> {
        match MoodHistoryDocument::from_json(&document)? {
            MoodHistoryDocument::Legacy(legacy) => Ok(serde_json::to_value(self.upgrade(&legacy)?)?),
            other => Err(MigrationError::IncompatibleVersions {
                from: other.schema_version(),
                to: self.target_version(),
            }),
        }
    }

    fn downcast(&self, document: JsonValue) -> Result<JsonValue, MigrationError> {
        match MoodHistoryDocument::from_json(&document)? {
            MoodHistoryDocument::Enhanced(enhanced) => Ok(serde_json::to_value(self.downgrade(&enhanced))?),
            other => Err(MigrationError::IncompatibleVersions {
                from: other.schema_version(),
                to: self.source_version(),
            }),
        }
    }
}
