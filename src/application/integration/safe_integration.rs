//! SafePersonaIntegration - mode-agnostic façade over the persona service.

use chrono::Duration;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use crate::application::{PersonaError, PersonaService, UserLocks};
use crate::config::{EngineMode, FeatureFlags};
use crate::domain::foundation::{GameId, SessionId, Timestamp, UserId};
use crate::domain::migration::{
    demigrate_mood_data, migrate_legacy_mood_data, MoodHistoryDocument,
};
use crate::domain::persona::{
    FeedbackEvent, Intent, Mood, MoodDelta, MoodEvent, MoodReading, MoodSource,
    PersonaUpdateRequest, SessionRecord,
};
use crate::ports::MoodHistoryStore;

use super::{EnhancedEngine, LegacyEngine, MoodHistoryInput, PersonaEngineBackend};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodRecordResult {
    pub mode: EngineMode,
    pub current_mood: Mood,
    pub mood_intensity: f64,
    pub history_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStartResult {
    pub mode: EngineMode,
    pub session_id: SessionId,
    pub started_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEndResult {
    pub mode: EngineMode,
    pub session_id: SessionId,
    pub duration_minutes: f64,
    pub mood_delta: MoodDelta,
    pub current_mood: Mood,
    pub current_intent: Intent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackResult {
    pub mode: EngineMode,
    pub current_mood: Mood,
    pub confidence: f64,
}

/// Read-only diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub mode: EngineMode,
    pub schema_version: u32,
    pub last_migration_at: Option<Timestamp>,
}

/// Sessions left open longer than this are treated as abandoned.
const ACTIVE_SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
struct ActiveSession {
    user_id: UserId,
    game_id: GameId,
    genre: Option<String>,
    started_at: Timestamp,
    mood_before: Option<MoodReading>,
    /// Pinned by the first end attempt so retries replay the same end.
    ended_at: Option<Timestamp>,
}

/// Dispatches gaming events to the engine selected at construction.
///
/// The mode never changes for the lifetime of the value. Every operation
/// returns the same result shape in both modes; the `mode` field only
/// reports which engine produced it.
pub struct SafePersonaIntegration {
    backend: Arc<dyn PersonaEngineBackend>,
    service: Arc<PersonaService>,
    store: Arc<dyn MoodHistoryStore>,
    history_locks: UserLocks,
    active_sessions: Mutex<HashMap<SessionId, ActiveSession>>,
    last_manual_migration: Mutex<Option<Timestamp>>,
}

impl SafePersonaIntegration {
    /// Builds the backend named by `flags.persona_engine_mode`.
    pub fn from_flags(
        flags: &FeatureFlags,
        service: Arc<PersonaService>,
        store: Arc<dyn MoodHistoryStore>,
    ) -> Self {
        let history_locks = UserLocks::new();
        let backend: Arc<dyn PersonaEngineBackend> = match flags.persona_engine_mode {
            EngineMode::Legacy => Arc::new(LegacyEngine::new(store.clone(), history_locks.clone())),
            EngineMode::Enhanced => {
                let clock = {
                    let service = service.clone();
                    Arc::new(move || service.now())
                };
                Arc::new(EnhancedEngine::new(store.clone(), history_locks.clone(), clock))
            }
        };
        info!(mode = %backend.mode(), "Persona engine selected");

        Self {
            backend,
            service,
            store,
            history_locks,
            active_sessions: Mutex::new(HashMap::new()),
            last_manual_migration: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> EngineMode {
        self.backend.mode()
    }

    pub fn service(&self) -> &PersonaService {
        &self.service
    }

    pub async fn record_mood_event_safe(
        &self,
        user_id: &UserId,
        mood: Mood,
        intensity: f64,
    ) -> Result<MoodRecordResult, PersonaError> {
        let event = MoodEvent::new(mood, intensity, MoodSource::Manual, self.service.now())?;
        // History is written only once the persona has accepted the event.
        let persona = self
            .service
            .update_persona(user_id, &PersonaUpdateRequest::MoodEvent(event.clone()))
            .await?;
        let history_entries = self
            .backend
            .append_mood(
                user_id,
                &MoodHistoryInput {
                    event,
                    session_id: None,
                },
            )
            .await?;

        Ok(MoodRecordResult {
            mode: self.mode(),
            current_mood: persona.current_mood(),
            mood_intensity: persona.mood_intensity(),
            history_entries,
        })
    }

    /// Opens a session; an optional pre-session mood reading is logged against it.
    pub async fn start_session_safe(
        &self,
        user_id: &UserId,
        game_id: GameId,
        genre: Option<String>,
        mood_before: Option<MoodReading>,
    ) -> Result<SessionStartResult, PersonaError> {
        let session_id = SessionId::new();
        let started_at = self.service.now();
        self.evict_abandoned_sessions(started_at);

        if let Some(reading) = mood_before {
            self.log_reading(user_id, session_id, reading, started_at).await?;
        }

        self.sessions().insert(
            session_id,
            ActiveSession {
                user_id: user_id.clone(),
                game_id,
                genre,
                started_at,
                mood_before,
                ended_at: None,
            },
        );
        debug!(user_id = %user_id, session_id = %session_id, "Session started");

        Ok(SessionStartResult {
            mode: self.mode(),
            session_id,
            started_at,
        })
    }

    /// Closes a session and folds it into the persona.
    ///
    /// On failure the session stays open so the call can be retried; the
    /// retry reuses the first attempt's end time, and a reading already
    /// logged by the failed attempt is not logged again.
    pub async fn end_session_safe(
        &self,
        user_id: &UserId,
        session_id: SessionId,
        mood_after: Option<MoodReading>,
    ) -> Result<SessionEndResult, PersonaError> {
        self.evict_abandoned_sessions(self.service.now());
        let session = {
            let mut sessions = self.sessions();
            let owned = sessions
                .get(&session_id)
                .map_or(false, |s| s.user_id == *user_id);
            if owned {
                sessions.remove(&session_id)
            } else {
                None
            }
        }
        .ok_or(PersonaError::SessionNotFound(session_id))?;

        let ended_at = session
            .ended_at
            .unwrap_or_else(|| self.service.now())
            .max(session.started_at);
        match self.finish_session(session_id, &session, ended_at, mood_after).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(user_id = %user_id, session_id = %session_id, error = %e, "Session end failed; session kept open");
                self.sessions().insert(
                    session_id,
                    ActiveSession {
                        ended_at: Some(ended_at),
                        ..session
                    },
                );
                Err(e)
            }
        }
    }

    pub async fn record_feedback_safe(
        &self,
        user_id: &UserId,
        game_id: GameId,
        rating: u8,
        mood: Option<Mood>,
    ) -> Result<FeedbackResult, PersonaError> {
        let feedback = FeedbackEvent {
            game_id,
            rating,
            mood,
            timestamp: self.service.now(),
        };
        feedback.validate()?;
        let timestamp = feedback.timestamp;

        let persona = self
            .service
            .update_persona(user_id, &PersonaUpdateRequest::FeedbackEvent(feedback))
            .await?;

        if let Some(mood) = mood {
            let event = MoodEvent::new(mood, f64::from(rating) * 2.0, MoodSource::Feedback, timestamp)?;
            self.backend
                .append_mood(
                    user_id,
                    &MoodHistoryInput {
                        event,
                        session_id: None,
                    },
                )
                .await?;
        }

        Ok(FeedbackResult {
            mode: self.mode(),
            current_mood: persona.current_mood(),
            confidence: persona.confidence(),
        })
    }

    pub fn get_persona_engine_status(&self) -> EngineStatus {
        let manual = *self
            .last_manual_migration
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        EngineStatus {
            mode: self.mode(),
            schema_version: self.backend.schema_version(),
            last_migration_at: manual.max(self.backend.last_migration_at()),
        }
    }

    /// Upgrades the user's stored mood history to v2.
    ///
    /// Returns `false` when there is nothing to do. On error the stored
    /// document is left as it was.
    pub async fn migrate_user_history(&self, user_id: &UserId) -> Result<bool, PersonaError> {
        let _guard = self.history_locks.lock(user_id).await;
        let Some(document) = self.store.load(user_id).await? else {
            return Ok(false);
        };
        let now = self.service.now();
        let migrated = migrate_legacy_mood_data(&document, now)?;
        if migrated == document {
            return Ok(false);
        }
        self.store.save(user_id, &migrated).await?;
        self.note_manual_migration(now);
        info!(user_id = %user_id, "Mood history migrated to enhanced schema");
        Ok(true)
    }

    /// Rolls the user's stored mood history back to v1.
    pub async fn rollback_user_history(&self, user_id: &UserId) -> Result<bool, PersonaError> {
        let _guard = self.history_locks.lock(user_id).await;
        let Some(document) = self.store.load(user_id).await? else {
            return Ok(false);
        };
        let rolled_back = demigrate_mood_data(&document)?;
        if rolled_back == document {
            return Ok(false);
        }
        self.store.save(user_id, &rolled_back).await?;
        info!(user_id = %user_id, "Mood history rolled back to legacy schema");
        Ok(true)
    }

    /// Parsed view of the user's stored mood history.
    pub async fn mood_history(&self, user_id: &UserId) -> Result<Option<MoodHistoryDocument>, PersonaError> {
        match self.store.load(user_id).await? {
            Some(document) => Ok(Some(MoodHistoryDocument::from_json(&document)?)),
            None => Ok(None),
        }
    }

    async fn finish_session(
        &self,
        session_id: SessionId,
        session: &ActiveSession,
        ended_at: Timestamp,
        mood_after: Option<MoodReading>,
    ) -> Result<SessionEndResult, PersonaError> {
        if let Some(reading) = mood_after {
            self.log_reading(&session.user_id, session_id, reading, ended_at)
                .await?;
        }

        let moods = session
            .mood_before
            .iter()
            .chain(mood_after.iter())
            .map(|r| r.mood)
            .collect();
        let mut record = SessionRecord::new(session.game_id.clone(), session.started_at, ended_at, moods)?;
        if let Some(genre) = &session.genre {
            record = record.with_genre(genre.clone());
        }
        let duration_minutes = record.duration_minutes;

        let persona = self
            .service
            .update_persona(&session.user_id, &PersonaUpdateRequest::SessionEvent(record))
            .await?;

        Ok(SessionEndResult {
            mode: self.mode(),
            session_id,
            duration_minutes,
            mood_delta: self.backend.session_delta(session.mood_before, mood_after),
            current_mood: persona.current_mood(),
            current_intent: persona.current_intent(),
        })
    }

    async fn log_reading(
        &self,
        user_id: &UserId,
        session_id: SessionId,
        reading: MoodReading,
        at: Timestamp,
    ) -> Result<usize, PersonaError> {
        let event = MoodEvent::new(reading.mood, reading.intensity, MoodSource::Session, at)?;
        self.backend
            .append_mood(
                user_id,
                &MoodHistoryInput {
                    event,
                    session_id: Some(session_id),
                },
            )
            .await
    }

    fn sessions(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, ActiveSession>> {
        self.active_sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn evict_abandoned_sessions(&self, now: Timestamp) {
        let ttl = Duration::hours(ACTIVE_SESSION_TTL_HOURS);
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, s| now.duration_since(&s.started_at) <= ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, "Evicted abandoned sessions");
        }
    }

    fn note_manual_migration(&self, at: Timestamp) {
        let mut last = self
            .last_manual_migration
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *last = Some(last.map_or(at, |prev| prev.max(at)));
    }
}
