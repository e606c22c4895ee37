//! Update requests and the pure `(persona, event) -> persona` transition.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{GameId, Timestamp, ValidationError};

use super::aggregate::truncate_front;
use super::{
    calculate_confidence, calculate_mood_intensity, calculate_playstyle_scores,
    extract_behavioral_patterns, infer_current_intent, infer_current_mood, Mood, MoodEvent,
    MoodSource, Persona, PersonaParams, SessionRecord, SnapshotCause,
};

/// Intensity assigned to moods tagged on a session, which carry no intensity of their own.
pub const SESSION_MOOD_INTENSITY: f64 = 5.0;

/// Feedback ratings use a 1–5 scale.
pub const MIN_FEEDBACK_RATING: u8 = 1;
pub const MAX_FEEDBACK_RATING: u8 = 5;

/// User feedback on a recommended game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub game_id: GameId,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    pub timestamp: Timestamp,
}

impl FeedbackEvent {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_FEEDBACK_RATING..=MAX_FEEDBACK_RATING).contains(&self.rating) {
            return Err(ValidationError::out_of_range(
                "rating",
                MIN_FEEDBACK_RATING as f64,
                MAX_FEEDBACK_RATING as f64,
                self.rating as f64,
            ));
        }
        Ok(())
    }

    /// Mood signal implied by the feedback, if a mood was attached.
    ///
    /// Ratings map linearly onto the intensity scale (1 → 2, 5 → 10).
    fn mood_signal(&self) -> Option<MoodEvent> {
        let mood = self.mood?;
        MoodEvent::new(
            mood,
            self.rating as f64 * 2.0,
            MoodSource::Feedback,
            self.timestamp,
        )
        .ok()
    }
}

/// Incremental persona update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PersonaUpdateRequest {
    MoodEvent(MoodEvent),
    SessionEvent(SessionRecord),
    FeedbackEvent(FeedbackEvent),
}

impl PersonaUpdateRequest {
    /// Parses a request from JSON; unknown or malformed tags are validation errors.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        let request: Self = serde_json::from_value(value)
            .map_err(|e| ValidationError::invalid_format("request", e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::MoodEvent(event) => event.validate(),
            Self::SessionEvent(session) => session.validate(),
            Self::FeedbackEvent(feedback) => feedback.validate(),
        }
    }

    /// When the underlying event happened.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::MoodEvent(event) => event.timestamp(),
            Self::SessionEvent(session) => session.end,
            Self::FeedbackEvent(feedback) => feedback.timestamp,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MoodEvent(_) => "mood_event",
            Self::SessionEvent(_) => "session_event",
            Self::FeedbackEvent(_) => "feedback_event",
        }
    }

    fn snapshot_cause(&self) -> SnapshotCause {
        match self {
            Self::MoodEvent(_) => SnapshotCause::MoodEvent,
            Self::SessionEvent(_) => SnapshotCause::SessionEvent,
            Self::FeedbackEvent(_) => SnapshotCause::FeedbackEvent,
        }
    }
}

/// Mood signals derived from a session's tagged moods, stamped at session end.
pub(super) fn session_mood_signals(session: &SessionRecord) -> Vec<MoodEvent> {
    session
        .moods
        .iter()
        .filter_map(|mood| {
            MoodEvent::new(*mood, SESSION_MOOD_INTENSITY, MoodSource::Session, session.end).ok()
        })
        .collect()
}

/// Signals inside the recency window as seen from `now`.
pub(super) fn signals_in_window(signals: &[MoodEvent], now: Timestamp, params: &PersonaParams) -> Vec<MoodEvent> {
    signals
        .iter()
        .filter(|s| now.duration_since(&s.timestamp()) <= params.inference.recency_window)
        .cloned()
        .collect()
}

/// Applies one event to a persona. Pure: no I/O, no clock.
///
/// Mood inference is evaluated at the latest point the persona has seen:
/// the newest of the event, the previous latest event and the newest
/// retained signal. A backfilled event therefore never rewinds the clock.
/// The input persona is untouched; a validation failure returns the error
/// and no new state.
pub fn process_persona_event(
    persona: &Persona,
    request: &PersonaUpdateRequest,
    params: &PersonaParams,
) -> Result<Persona, ValidationError> {
    request.validate()?;

    let mut next = persona.clone();
    let at = request.timestamp();

    match request {
        PersonaUpdateRequest::MoodEvent(event) => {
            next.recent_moods.push(event.clone());
        }
        PersonaUpdateRequest::SessionEvent(session) => {
            next.recent_moods.extend(session_mood_signals(session));
            next.recent_sessions.push(session.clone());
            next.recent_sessions.sort_by_key(|s| s.start);
            truncate_front(&mut next.recent_sessions, params.session_cap);

            next.behavioral_patterns = extract_behavioral_patterns(&next.recent_sessions);
            next.current_intent = infer_current_intent(&next.behavioral_patterns);
            next.playstyle = calculate_playstyle_scores(&next.behavioral_patterns, &next.traits);
        }
        PersonaUpdateRequest::FeedbackEvent(feedback) => {
            next.recent_moods.extend(feedback.mood_signal());
            next.feedback.push(feedback.clone());
            truncate_front(&mut next.feedback, params.feedback_cap);
        }
    }

    next.recent_moods.sort_by_key(MoodEvent::timestamp);
    truncate_front(&mut next.recent_moods, params.mood_signal_cap);

    let reference = next
        .recent_moods
        .iter()
        .map(MoodEvent::timestamp)
        .chain(persona.last_event_at)
        .fold(at, Timestamp::max);

    next.current_mood = infer_current_mood(&next.recent_moods, reference, &params.inference);
    next.mood_intensity =
        calculate_mood_intensity(&signals_in_window(&next.recent_moods, reference, params));
    next.confidence = calculate_confidence(
        next.recent_sessions.len(),
        next.recent_moods.len(),
        next.games_observed as usize,
        next.feedback.len(),
    );
    next.pending_data_points = next.pending_data_points.saturating_add(1);
    next.last_event_at = Some(next.last_event_at.map_or(at, |prev| prev.max(at)));
    next.record_snapshot(at, request.snapshot_cause(), params.history_cap);

    Ok(next)
}
