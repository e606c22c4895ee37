//! Persona aggregate root, its bounded history and the refresh policy knobs.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::domain::foundation::{Timestamp, UserId};

use super::{
    BehavioralPatterns, FeedbackEvent, InferenceParams, Intent, Mood, MoodEvent, PersonaTraits,
    PlaystyleScores, SessionRecord,
};

/// Schema version written into every persisted persona document.
pub const PERSONA_SCHEMA_VERSION: u32 = 2;

/// Policy knobs shared by event application and refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonaParams {
    pub inference: InferenceParams,
    /// A persona older than this is stale.
    pub refresh_interval: Duration,
    /// More data points than this since the last refresh makes a persona stale.
    pub new_data_threshold: u32,
    pub history_cap: usize,
    pub mood_signal_cap: usize,
    pub session_cap: usize,
    pub feedback_cap: usize,
}

impl Default for PersonaParams {
    fn default() -> Self {
        Self {
            inference: InferenceParams::default(),
            refresh_interval: Duration::hours(6),
            new_data_threshold: 20,
            history_cap: 50,
            mood_signal_cap: 200,
            session_cap: 100,
            feedback_cap: 50,
        }
    }
}

/// What caused a history snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotCause {
    MoodEvent,
    SessionEvent,
    FeedbackEvent,
    Refresh,
}

/// A past persona state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaSnapshot {
    pub at: Timestamp,
    pub cause: SnapshotCause,
    pub mood: Mood,
    pub intent: Intent,
    pub mood_intensity: f64,
    pub confidence: f64,
}

/// Append-only, insertion-ordered, capped list of snapshots. Oldest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaHistory {
    entries: VecDeque<PersonaSnapshot>,
}

impl PersonaHistory {
    /// Appends a snapshot, dropping the oldest entries beyond `cap`.
    pub fn push(&mut self, snapshot: PersonaSnapshot, cap: usize) {
        self.entries.push_back(snapshot);
        while self.entries.len() > cap {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersonaSnapshot> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&PersonaSnapshot> {
        self.entries.back()
    }
}

/// Per-user synthesized profile.
///
/// Fields are only writable from within the persona module; callers obtain
/// new states through [`super::process_persona_event`] and
/// [`super::recompute_persona`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub(super) schema_version: u32,
    pub(super) user_id: UserId,
    #[serde(default)]
    pub(super) traits: PersonaTraits,
    pub(super) current_mood: Mood,
    pub(super) current_intent: Intent,
    pub(super) mood_intensity: f64,
    pub(super) behavioral_patterns: BehavioralPatterns,
    #[serde(default)]
    pub(super) playstyle: PlaystyleScores,
    pub(super) last_updated: Timestamp,
    pub(super) confidence: f64,
    #[serde(default)]
    pub(super) recent_moods: Vec<MoodEvent>,
    #[serde(default)]
    pub(super) recent_sessions: Vec<SessionRecord>,
    #[serde(default)]
    pub(super) feedback: Vec<FeedbackEvent>,
    #[serde(default)]
    pub(super) games_observed: u32,
    #[serde(default)]
    pub(super) pending_data_points: u32,
    #[serde(default)]
    pub(super) last_event_at: Option<Timestamp>,
    #[serde(default)]
    pub(super) history: PersonaHistory,
}

impl Persona {
    /// The neutral starting state: no traits, neutral mood, zero confidence.
    ///
    /// `last_updated` is the epoch, so a new persona is immediately due for refresh.
    pub fn new_default(user_id: UserId) -> Self {
        Self {
            schema_version: PERSONA_SCHEMA_VERSION,
            user_id,
            traits: PersonaTraits::new(),
            current_mood: Mood::Neutral,
            current_intent: Intent::Casual,
            mood_intensity: 0.0,
            behavioral_patterns: BehavioralPatterns::default(),
            playstyle: PlaystyleScores::default(),
            last_updated: Timestamp::epoch(),
            confidence: 0.0,
            recent_moods: Vec::new(),
            recent_sessions: Vec::new(),
            feedback: Vec::new(),
            games_observed: 0,
            pending_data_points: 0,
            last_event_at: None,
            history: PersonaHistory::default(),
        }
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn traits(&self) -> &PersonaTraits {
        &self.traits
    }

    pub fn current_mood(&self) -> Mood {
        self.current_mood
    }

    pub fn current_intent(&self) -> Intent {
        self.current_intent
    }

    pub fn mood_intensity(&self) -> f64 {
        self.mood_intensity
    }

    pub fn behavioral_patterns(&self) -> &BehavioralPatterns {
        &self.behavioral_patterns
    }

    pub fn playstyle(&self) -> &PlaystyleScores {
        &self.playstyle
    }

    /// Time of the last full refresh.
    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn recent_moods(&self) -> &[MoodEvent] {
        &self.recent_moods
    }

    pub fn recent_sessions(&self) -> &[SessionRecord] {
        &self.recent_sessions
    }

    pub fn feedback(&self) -> &[FeedbackEvent] {
        &self.feedback
    }

    pub fn games_observed(&self) -> u32 {
        self.games_observed
    }

    /// Data points applied since the last refresh.
    pub fn pending_data_points(&self) -> u32 {
        self.pending_data_points
    }

    pub fn last_event_at(&self) -> Option<Timestamp> {
        self.last_event_at
    }

    pub fn history(&self) -> &PersonaHistory {
        &self.history
    }

    /// Most recent timestamp among the data the persona was built from.
    pub fn latest_data_point(&self) -> Option<Timestamp> {
        let moods = self.recent_moods.iter().map(MoodEvent::timestamp);
        let sessions = self.recent_sessions.iter().map(|s| s.end);
        let feedback = self.feedback.iter().map(|f| f.timestamp);
        moods.chain(sessions).chain(feedback).max()
    }

    /// True when the persona holds session data of its own.
    pub fn has_session_data(&self) -> bool {
        !self.recent_sessions.is_empty()
    }

    pub(super) fn snapshot(&self, at: Timestamp, cause: SnapshotCause) -> PersonaSnapshot {
        PersonaSnapshot {
            at,
            cause,
            mood: self.current_mood,
            intent: self.current_intent,
            mood_intensity: self.mood_intensity,
            confidence: self.confidence,
        }
    }

    pub(super) fn record_snapshot(&mut self, at: Timestamp, cause: SnapshotCause, cap: usize) {
        let snapshot = self.snapshot(at, cause);
        self.history.push(snapshot, cap);
    }
}

/// Staleness check: too old, or too much unprocessed data.
pub fn should_refresh_persona(persona: &Persona, now: Timestamp, params: &PersonaParams) -> bool {
    now.duration_since(&persona.last_updated) > params.refresh_interval
        || persona.pending_data_points > params.new_data_threshold
}

/// Saturating data-volume confidence in `[0, 1]`; zero data yields zero.
pub fn calculate_confidence(sessions: usize, mood_signals: usize, games: usize, feedback: usize) -> f64 {
    let volume =
        sessions as f64 + 0.5 * mood_signals as f64 + 0.5 * games as f64 + 0.25 * feedback as f64;
    (1.0 - (-volume / 10.0).exp()).clamp(0.0, 1.0)
}

/// Drops the oldest items beyond `cap`.
pub(super) fn truncate_front<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        let excess = items.len() - cap;
        items.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("player-1").unwrap()
    }

    fn snapshot(secs: i64) -> PersonaSnapshot {
        PersonaSnapshot {
            at: Timestamp::from_unix_secs(secs),
            cause: SnapshotCause::MoodEvent,
            mood: Mood::Chill,
            intent: Intent::Casual,
            mood_intensity: 1.0,
            confidence: 0.1,
        }
    }

    #[test]
    fn default_persona_is_neutral_and_unconfident() {
        let persona = Persona::new_default(user());
        assert_eq!(persona.current_mood(), Mood::Neutral);
        assert_eq!(persona.current_intent(), Intent::Casual);
        assert_eq!(persona.confidence(), 0.0);
        assert_eq!(persona.schema_version(), PERSONA_SCHEMA_VERSION);
        assert!(persona.latest_data_point().is_none());
    }

    #[test]
    fn default_persona_is_immediately_stale() {
        let persona = Persona::new_default(user());
        assert!(should_refresh_persona(&persona, Timestamp::now(), &PersonaParams::default()));
    }

    #[test]
    fn persona_becomes_stale_past_interval() {
        let params = PersonaParams::default();
        let mut persona = Persona::new_default(user());
        let refreshed_at = Timestamp::from_unix_secs(1_700_000_000);
        persona.last_updated = refreshed_at;

        assert!(!should_refresh_persona(&persona, refreshed_at, &params));
        assert!(!should_refresh_persona(&persona, refreshed_at.plus(params.refresh_interval), &params));
        assert!(should_refresh_persona(
            &persona,
            refreshed_at.plus(params.refresh_interval).plus_secs(1),
            &params
        ));
    }

    #[test]
    fn persona_becomes_stale_past_data_threshold() {
        let params = PersonaParams::default();
        let mut persona = Persona::new_default(user());
        let now = Timestamp::from_unix_secs(1_700_000_000);
        persona.last_updated = now;

        persona.pending_data_points = params.new_data_threshold;
        assert!(!should_refresh_persona(&persona, now, &params));
        persona.pending_data_points = params.new_data_threshold + 1;
        assert!(should_refresh_persona(&persona, now, &params));
    }

    #[test]
    fn history_prunes_oldest_first() {
        let mut history = PersonaHistory::default();
        for i in 0..5 {
            history.push(snapshot(i), 3);
        }
        assert_eq!(history.len(), 3);
        let times: Vec<i64> = history.iter().map(|s| s.at.as_unix_secs()).collect();
        assert_eq!(times, vec![2, 3, 4]);
        assert_eq!(history.latest().unwrap().at.as_unix_secs(), 4);
    }

    #[test]
    fn confidence_is_bounded_and_monotonic() {
        assert_eq!(calculate_confidence(0, 0, 0, 0), 0.0);
        let small = calculate_confidence(1, 2, 0, 0);
        let large = calculate_confidence(50, 100, 20, 10);
        assert!(small > 0.0 && small < large);
        assert!(large <= 1.0);
    }

    #[test]
    fn persona_roundtrips_through_json() {
        let persona = Persona::new_default(user());
        let json = serde_json::to_value(&persona).unwrap();
        assert_eq!(json["schema_version"], PERSONA_SCHEMA_VERSION);
        let back: Persona = serde_json::from_value(json).unwrap();
        assert_eq!(back, persona);
    }

    #[test]
    fn truncate_front_keeps_newest() {
        let mut items = vec![1, 2, 3, 4];
        truncate_front(&mut items, 2);
        assert_eq!(items, vec![3, 4]);
    }
}
