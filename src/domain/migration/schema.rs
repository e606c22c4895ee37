//! Mood-history document schemas.
//!
//! - v1 (legacy): free-text mood labels, integer intensity, no provenance.
//! - v2 (enhanced): typed moods, fractional intensity, source and session
//!   links, optional secondary mood, and the migration stamp.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{SessionId, Timestamp, UserId};
use crate::domain::persona::{Mood, MoodEvent, MoodSource, MAX_MOOD_INTENSITY};

use super::MigrationError;

pub const LEGACY_SCHEMA_VERSION: u32 = 1;
pub const ENHANCED_SCHEMA_VERSION: u32 = 2;

/// Field carrying the schema tag in every persisted mood-history document.
pub const SCHEMA_VERSION_FIELD: &str = "schema_version";

fn legacy_version() -> u32 {
    LEGACY_SCHEMA_VERSION
}

/// One v1 entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyMoodEntry {
    pub mood: String,
    /// 0–10.
    pub intensity: u8,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// v1 document. Documents written before versioning carry no tag and are v1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyMoodHistory {
    #[serde(default = "legacy_version")]
    pub schema_version: u32,
    pub user_id: UserId,
    #[serde(default)]
    pub entries: Vec<LegacyMoodEntry>,
}

impl LegacyMoodHistory {
    pub fn new(user_id: UserId) -> Self {
        Self {
            schema_version: LEGACY_SCHEMA_VERSION,
            user_id,
            entries: Vec::new(),
        }
    }
}

/// One v2 entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedMoodEntry {
    pub mood: Mood,
    pub intensity: f64,
    pub timestamp: Timestamp,
    #[serde(default = "legacy_source")]
    pub source: MoodSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_mood: Option<Mood>,
    /// The v1 label this entry was upgraded from, verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn legacy_source() -> MoodSource {
    MoodSource::Legacy
}

impl EnhancedMoodEntry {
    /// A fresh v2 entry with no links.
    pub fn new(event: &MoodEvent) -> Self {
        Self {
            mood: event.mood(),
            intensity: event.intensity(),
            timestamp: event.timestamp(),
            source: event.source(),
            session_id: None,
            secondary_mood: None,
            original_label: None,
            note: None,
        }
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn to_mood_event(&self) -> Result<MoodEvent, MigrationError> {
        MoodEvent::new(self.mood, self.intensity, self.source, self.timestamp)
            .map_err(|_| MigrationError::InvalidIntensity { value: self.intensity })
    }
}

/// v2 document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedMoodHistory {
    pub schema_version: u32,
    pub user_id: UserId,
    #[serde(default)]
    pub entries: Vec<EnhancedMoodEntry>,
    /// When the document was upgraded from v1; absent for documents born as v2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_at: Option<Timestamp>,
}

impl EnhancedMoodHistory {
    pub fn new(user_id: UserId) -> Self {
        Self {
            schema_version: ENHANCED_SCHEMA_VERSION,
            user_id,
            entries: Vec::new(),
            migrated_at: None,
        }
    }

    /// Latest entry linked to `session_id`, if any.
    pub fn latest_for_session(&self, session_id: SessionId) -> Option<&EnhancedMoodEntry> {
        self.entries
            .iter()
            .filter(|e| e.session_id == Some(session_id))
            .max_by_key(|e| e.timestamp)
    }
}

/// A stored mood-history document in whichever schema it was written.
#[derive(Debug, Clone, PartialEq)]
pub enum MoodHistoryDocument {
    Legacy(LegacyMoodHistory),
    Enhanced(EnhancedMoodHistory),
}

impl MoodHistoryDocument {
    /// Reads the schema tag of a raw document; untagged documents are v1.
    pub fn schema_version_of(document: &JsonValue) -> Result<u32, MigrationError> {
        match document.get(SCHEMA_VERSION_FIELD) {
            None | Some(JsonValue::Null) => Ok(LEGACY_SCHEMA_VERSION),
            Some(tag) => tag
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| MigrationError::InvalidSchemaTag(tag.to_string())),
        }
    }

    pub fn from_json(document: &JsonValue) -> Result<Self, MigrationError> {
        match Self::schema_version_of(document)? {
            LEGACY_SCHEMA_VERSION => {
                let legacy: LegacyMoodHistory = serde_json::from_value(document.clone())?;
                for entry in &legacy.entries {
                    check_legacy_intensity(entry.intensity)?;
                }
                Ok(Self::Legacy(legacy))
            }
            ENHANCED_SCHEMA_VERSION => {
                let enhanced: EnhancedMoodHistory = serde_json::from_value(document.clone())?;
                for entry in &enhanced.entries {
                    entry.to_mood_event()?;
                }
                Ok(Self::Enhanced(enhanced))
            }
            found => Err(MigrationError::UnsupportedVersion { found }),
        }
    }

    pub fn schema_version(&self) -> u32 {
        match self {
            Self::Legacy(_) => LEGACY_SCHEMA_VERSION,
            Self::Enhanced(_) => ENHANCED_SCHEMA_VERSION,
        }
    }

    pub fn user_id(&self) -> &UserId {
        match self {
            Self::Legacy(legacy) => &legacy.user_id,
            Self::Enhanced(enhanced) => &enhanced.user_id,
        }
    }
}

pub(super) fn check_legacy_intensity(intensity: u8) -> Result<(), MigrationError> {
    if f64::from(intensity) > MAX_MOOD_INTENSITY {
        return Err(MigrationError::InvalidIntensity {
            value: f64::from(intensity),
        });
    }
    Ok(())
}
