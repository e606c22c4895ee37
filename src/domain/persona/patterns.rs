//! Session records and their aggregation into behavioral patterns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{GameId, Timestamp, ValidationError};

use super::Mood;

const SECONDS_PER_WEEK: f64 = 7.0 * 24.0 * 3600.0;

/// One completed play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub start: Timestamp,
    pub end: Timestamp,
    pub duration_minutes: f64,
    pub game_id: GameId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default)]
    pub moods: Vec<Mood>,
}

impl SessionRecord {
    /// Builds a record from start/end; the duration is derived.
    pub fn new(
        game_id: GameId,
        start: Timestamp,
        end: Timestamp,
        moods: Vec<Mood>,
    ) -> Result<Self, ValidationError> {
        if end.is_before(&start) {
            return Err(ValidationError::invalid_format(
                "end",
                "session cannot end before it starts",
            ));
        }
        let duration_minutes = end.duration_since(&start).num_seconds() as f64 / 60.0;
        Ok(Self {
            start,
            end,
            duration_minutes,
            game_id,
            genre: None,
            moods,
        })
    }

    /// Builds a record from a start time and a duration; the end is derived.
    pub fn from_duration(
        game_id: GameId,
        start: Timestamp,
        duration_minutes: f64,
        moods: Vec<Mood>,
    ) -> Result<Self, ValidationError> {
        if !duration_minutes.is_finite() || duration_minutes < 0.0 {
            return Err(ValidationError::out_of_range(
                "duration_minutes",
                0.0,
                f64::MAX,
                duration_minutes,
            ));
        }
        let end = start.plus_minutes(duration_minutes).ok_or_else(|| {
            ValidationError::invalid_format("duration_minutes", "session end is out of range")
        })?;
        Ok(Self {
            start,
            end,
            duration_minutes,
            game_id,
            genre: None,
            moods,
        })
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Re-checks invariants on a deserialized record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.duration_minutes.is_finite() || self.duration_minutes < 0.0 {
            return Err(ValidationError::out_of_range(
                "duration_minutes",
                0.0,
                f64::MAX,
                self.duration_minutes,
            ));
        }
        if self.end.is_before(&self.start) {
            return Err(ValidationError::invalid_format(
                "end",
                "session cannot end before it starts",
            ));
        }
        Ok(())
    }

    /// Key used for diversity: the genre when known, the game otherwise.
    fn diversity_key(&self) -> String {
        match &self.genre {
            Some(genre) if !genre.trim().is_empty() => format!("genre:{}", genre.trim().to_lowercase()),
            _ => format!("game:{}", self.game_id),
        }
    }
}

/// Fixed-shape behavioral aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BehavioralPatterns {
    /// Sessions per week over the observed span (minimum span one week).
    pub session_frequency: f64,
    /// Mean session length in minutes.
    pub average_session_minutes: f64,
    /// 0 = always the same genre/game, 1 = every session different.
    pub genre_diversity: f64,
    /// 0 = solo, 1 = strongly social.
    pub social_preference: f64,
    /// 0 = relaxed, 1 = seeks challenge.
    pub difficulty_preference: f64,
}

impl BehavioralPatterns {
    /// True when the patterns were built from no sessions at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Aggregates sessions into [`BehavioralPatterns`].
///
/// Only order-independent reducers are used and floating-point inputs are
/// sorted before summation, so any permutation of `sessions` yields a
/// bit-identical result. Empty input yields the zero vector.
pub fn extract_behavioral_patterns(sessions: &[SessionRecord]) -> BehavioralPatterns {
    if sessions.is_empty() {
        return BehavioralPatterns::default();
    }

    let count = sessions.len() as f64;

    let first_start = sessions.iter().map(|s| s.start).min().unwrap_or_else(Timestamp::epoch);
    let last_end = sessions.iter().map(|s| s.end).max().unwrap_or_else(Timestamp::epoch);
    let span_weeks = last_end.duration_since(&first_start).num_seconds() as f64 / SECONDS_PER_WEEK;
    let session_frequency = count / span_weeks.max(1.0);

    let durations: Vec<f64> = sessions.iter().map(|s| s.duration_minutes.max(0.0)).collect();
    let average_session_minutes = sorted_sum(durations) / count;

    let distinct: BTreeSet<String> = sessions.iter().map(SessionRecord::diversity_key).collect();
    let genre_diversity = if sessions.len() > 1 {
        (distinct.len() as f64 - 1.0) / (count - 1.0)
    } else {
        0.0
    };

    let moods: Vec<Mood> = sessions.iter().flat_map(|s| s.moods.iter().copied()).collect();
    let social_preference = mean_weight(&moods, Mood::social_weight);
    let difficulty_preference = mean_weight(&moods, Mood::challenge_weight);

    BehavioralPatterns {
        session_frequency,
        average_session_minutes,
        genre_diversity: genre_diversity.clamp(0.0, 1.0),
        social_preference,
        difficulty_preference,
    }
}

fn sorted_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.iter().sum()
}

fn mean_weight(moods: &[Mood], weight: fn(&Mood) -> f64) -> f64 {
    if moods.is_empty() {
        return 0.0;
    }
    let weights: Vec<f64> = moods.iter().map(weight).collect();
    (sorted_sum(weights) / moods.len() as f64).clamp(0.0, 1.0)
}
