//! Aggregate gaming data as delivered by the repository collaborator.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::{GameId, Timestamp, ValidationError};

use super::{BehavioralPatterns, Mood, SessionRecord};

/// A game in the user's library with lifetime play totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub title: String,
    pub hours_played: f64,
    #[serde(default)]
    pub moods: Vec<Mood>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

impl Game {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.hours_played.is_finite() || self.hours_played < 0.0 {
            return Err(ValidationError::out_of_range(
                "hours_played",
                0.0,
                f64::MAX,
                self.hours_played,
            ));
        }
        Ok(())
    }
}

/// A historical session row, keyed by its start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub game_id: GameId,
    pub duration_minutes: f64,
    #[serde(default)]
    pub moods: Vec<Mood>,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

impl GameSession {
    /// Converts the row into a [`SessionRecord`], validating the duration.
    pub fn to_record(&self) -> Result<SessionRecord, ValidationError> {
        let record = SessionRecord::from_duration(
            self.game_id.clone(),
            self.timestamp,
            self.duration_minutes,
            self.moods.clone(),
        )?;
        Ok(match &self.genre {
            Some(genre) => record.with_genre(genre.clone()),
            None => record,
        })
    }
}

/// Optional narrowing of a session-history query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
    pub game_id: Option<GameId>,
    pub since: Option<Timestamp>,
}

impl SessionFilter {
    pub fn matches(&self, session: &GameSession) -> bool {
        let game_ok = self.game_id.as_ref().map_or(true, |id| *id == session.game_id);
        let since_ok = self.since.map_or(true, |since| !session.timestamp.is_before(&since));
        game_ok && since_ok
    }
}

/// Hours-weighted vote over the library's mood tags.
///
/// Each tag on a game votes with that game's hours played. Returns the
/// winning mood and its share of all weighted votes, or `None` when no
/// played game carries a tag. Ties go to the later mood in declaration order.
pub fn library_mood(games: &[Game]) -> Option<(Mood, f64)> {
    let mut votes: BTreeMap<Mood, Vec<f64>> = BTreeMap::new();
    for game in games.iter().filter(|g| g.hours_played > 0.0) {
        for mood in &game.moods {
            votes.entry(*mood).or_default().push(game.hours_played);
        }
    }

    let tallies: Vec<(Mood, f64)> = votes
        .into_iter()
        .map(|(mood, hours)| (mood, sorted_sum(hours)))
        .collect();
    let total = sorted_sum(tallies.iter().map(|(_, w)| *w).collect());
    if total <= 0.0 {
        return None;
    }
    tallies
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(mood, weight)| (mood, weight / total))
}

/// Behavioral patterns from the library alone, for users without sessions.
///
/// Social and difficulty preferences are hours-weighted means of the mood
/// tag weights; diversity counts distinct genres (titles when untagged)
/// across played games. Frequency and session length are unknown and stay 0.
pub fn extract_library_patterns(games: &[Game]) -> BehavioralPatterns {
    let played: Vec<&Game> = games.iter().filter(|g| g.hours_played > 0.0).collect();
    if played.is_empty() {
        return BehavioralPatterns::default();
    }

    let distinct: BTreeSet<String> = played.iter().map(|g| library_key(g)).collect();
    let genre_diversity = if played.len() > 1 {
        (distinct.len() as f64 - 1.0) / (played.len() as f64 - 1.0)
    } else {
        0.0
    };

    BehavioralPatterns {
        session_frequency: 0.0,
        average_session_minutes: 0.0,
        genre_diversity: genre_diversity.clamp(0.0, 1.0),
        social_preference: hours_weighted(&played, Mood::social_weight),
        difficulty_preference: hours_weighted(&played, Mood::challenge_weight),
    }
}

fn library_key(game: &Game) -> String {
    match &game.genre {
        Some(genre) if !genre.trim().is_empty() => format!("genre:{}", genre.trim().to_lowercase()),
        _ => format!("title:{}", game.title.trim().to_lowercase()),
    }
}

fn hours_weighted(games: &[&Game], weight: fn(&Mood) -> f64) -> f64 {
    let mut weighted = Vec::new();
    let mut hours = Vec::new();
    for game in games {
        for mood in &game.moods {
            weighted.push(weight(mood) * game.hours_played);
            hours.push(game.hours_played);
        }
    }
    let total = sorted_sum(hours);
    if total <= 0.0 {
        return 0.0;
    }
    (sorted_sum(weighted) / total).clamp(0.0, 1.0)
}

fn sorted_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.iter().sum()
}
