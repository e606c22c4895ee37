//! Mode-specific persona engines behind the integration façade.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

use crate::application::{Clock, PersonaError, UserLocks};
use crate::config::EngineMode;
use crate::domain::foundation::{SessionId, Timestamp, UserId};
use crate::domain::migration::{
    demigrate_mood_history, migrate_mood_history, EnhancedMoodEntry, EnhancedMoodHistory,
    LegacyMoodEntry, LegacyMoodHistory, MoodHistoryDocument, ENHANCED_SCHEMA_VERSION,
    LEGACY_SCHEMA_VERSION,
};
use crate::domain::persona::{
    get_session_mood_delta, DeltaConfidence, MoodDelta, MoodEvent, MoodReading, MAX_MOOD_INTENSITY,
};
use crate::ports::{MoodHistoryStore, RepositoryError};

/// A mood signal headed for the user's mood history.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodHistoryInput {
    pub event: MoodEvent,
    pub session_id: Option<SessionId>,
}

/// One persona engine generation.
///
/// Both implementations answer every call with the same shapes so the
/// façade stays mode-agnostic.
#[async_trait]
pub trait PersonaEngineBackend: Send + Sync {
    fn mode(&self) -> EngineMode;

    /// Schema version this engine writes mood histories in.
    fn schema_version(&self) -> u32;

    /// When this engine last upgraded a stored document, if ever.
    fn last_migration_at(&self) -> Option<Timestamp>;

    /// Appends to the user's mood history; returns the new entry count.
    ///
    /// Session readings are idempotent: appending a reading identical to a
    /// stored one for the same session leaves the history unchanged.
    async fn append_mood(&self, user_id: &UserId, input: &MoodHistoryInput) -> Result<usize, PersonaError>;

    fn session_delta(&self, before: Option<MoodReading>, after: Option<MoodReading>) -> MoodDelta;
}

/// v1 engine: label + integer intensity histories, raw intensity deltas.
pub struct LegacyEngine {
    store: Arc<dyn MoodHistoryStore>,
    locks: UserLocks,
}

impl LegacyEngine {
    /// `locks` guards mood-history documents and must be shared with every
    /// other writer of the same store.
    pub fn new(store: Arc<dyn MoodHistoryStore>, locks: UserLocks) -> Self {
        Self { store, locks }
    }

    async fn load(&self, user_id: &UserId) -> Result<LegacyMoodHistory, PersonaError> {
        let Some(document) = self.store.load(user_id).await? else {
            return Ok(LegacyMoodHistory::new(user_id.clone()));
        };
        Ok(match MoodHistoryDocument::from_json(&document)? {
            MoodHistoryDocument::Legacy(legacy) => legacy,
            // Written by the enhanced engine before a rollback.
            MoodHistoryDocument::Enhanced(enhanced) => demigrate_mood_history(&enhanced),
        })
    }
}

#[async_trait]
impl PersonaEngineBackend for LegacyEngine {
    fn mode(&self) -> EngineMode {
        EngineMode::Legacy
    }

    fn schema_version(&self) -> u32 {
        LEGACY_SCHEMA_VERSION
    }

    fn last_migration_at(&self) -> Option<Timestamp> {
        None
    }

    async fn append_mood(&self, user_id: &UserId, input: &MoodHistoryInput) -> Result<usize, PersonaError> {
        let _guard = self.locks.lock(user_id).await;
        let mut history = self.load(user_id).await?;
        let entry = LegacyMoodEntry {
            mood: input.event.mood().as_str().to_string(),
            intensity: input.event.intensity().round().clamp(0.0, MAX_MOOD_INTENSITY) as u8,
            timestamp: input.event.timestamp(),
            note: None,
        };
        // v1 entries carry no session link; match on the reading itself.
        if input.session_id.is_some() && history.entries.contains(&entry) {
            return Ok(history.entries.len());
        }
        history.entries.push(entry);
        self.store
            .save(user_id, &serde_json::to_value(&history).map_err(RepositoryError::from)?)
            .await?;
        Ok(history.entries.len())
    }

    /// Plain intensity difference; mood labels are ignored.
    fn session_delta(&self, before: Option<MoodReading>, after: Option<MoodReading>) -> MoodDelta {
        match (before, after) {
            (Some(before), Some(after)) => MoodDelta {
                delta: after.intensity - before.intensity,
                confidence: DeltaConfidence::Normal,
            },
            _ => MoodDelta::unknown(),
        }
    }
}

/// v2 engine: typed, provenance-carrying histories and valence-weighted deltas.
///
/// Legacy documents are upgraded the first time they are touched.
pub struct EnhancedEngine {
    store: Arc<dyn MoodHistoryStore>,
    locks: UserLocks,
    clock: Clock,
    last_migration_at: Mutex<Option<Timestamp>>,
}

impl EnhancedEngine {
    pub fn new(store: Arc<dyn MoodHistoryStore>, locks: UserLocks, clock: Clock) -> Self {
        Self {
            store,
            locks,
            clock,
            last_migration_at: Mutex::new(None),
        }
    }

    /// Loads the history, upgrading a v1 document in memory. The returned
    /// stamp is set when an upgrade happened and has not been persisted yet.
    async fn load(&self, user_id: &UserId) -> Result<(EnhancedMoodHistory, Option<Timestamp>), PersonaError> {
        let Some(document) = self.store.load(user_id).await? else {
            return Ok((EnhancedMoodHistory::new(user_id.clone()), None));
        };
        match MoodHistoryDocument::from_json(&document)? {
            MoodHistoryDocument::Enhanced(enhanced) => Ok((enhanced, None)),
            MoodHistoryDocument::Legacy(legacy) => {
                let now = (self.clock)();
                Ok((migrate_mood_history(&legacy, now)?, Some(now)))
            }
        }
    }

    fn note_migration(&self, at: Timestamp) {
        let mut last = self
            .last_migration_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *last = Some(last.map_or(at, |prev| prev.max(at)));
    }
}

#[async_trait]
impl PersonaEngineBackend for EnhancedEngine {
    fn mode(&self) -> EngineMode {
        EngineMode::Enhanced
    }

    fn schema_version(&self) -> u32 {
        ENHANCED_SCHEMA_VERSION
    }

    fn last_migration_at(&self) -> Option<Timestamp> {
        *self
            .last_migration_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn append_mood(&self, user_id: &UserId, input: &MoodHistoryInput) -> Result<usize, PersonaError> {
        let _guard = self.locks.lock(user_id).await;
        let (mut history, migrated_at) = self.load(user_id).await?;
        let mut entry = EnhancedMoodEntry::new(&input.event);
        if let Some(session_id) = input.session_id {
            entry = entry.with_session(session_id);
        }
        if input.session_id.is_some() && history.entries.contains(&entry) {
            return Ok(history.entries.len());
        }
        history.entries.push(entry);
        self.store
            .save(user_id, &serde_json::to_value(&history).map_err(RepositoryError::from)?)
            .await?;

        if let Some(at) = migrated_at {
            self.note_migration(at);
            info!(
                user_id = %user_id,
                entries = history.entries.len(),
                "Upgraded legacy mood history"
            );
        }
        Ok(history.entries.len())
    }

    fn session_delta(&self, before: Option<MoodReading>, after: Option<MoodReading>) -> MoodDelta {
        get_session_mood_delta(before, after)
    }
}
