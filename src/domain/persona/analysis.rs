//! Persona analysis output: confidence, readable insights and data freshness.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::{suggest_compound_moods, CompoundMoodParams, Game, Persona, PlaystyleArchetype};

/// Bucketed age of the newest data point behind a persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFreshness {
    /// Under 24 hours.
    Fresh,
    /// Under 7 days.
    Recent,
    /// Under 30 days.
    Stale,
    /// 30 days or older, or only undated library data.
    Outdated,
    /// No data at all.
    None,
}

impl DataFreshness {
    pub fn from_latest(latest: Option<Timestamp>, now: Timestamp) -> Self {
        let Some(latest) = latest else {
            return Self::None;
        };
        let age = now.duration_since(&latest);
        if age < Duration::hours(24) {
            Self::Fresh
        } else if age < Duration::days(7) {
            Self::Recent
        } else if age < Duration::days(30) {
            Self::Stale
        } else {
            Self::Outdated
        }
    }

    /// Freshness of the data behind `persona`.
    ///
    /// Library totals carry no timestamp, so a persona built from games
    /// alone is reported as outdated rather than as having no data.
    pub fn of_persona(persona: &Persona, now: Timestamp) -> Self {
        match persona.latest_data_point() {
            Some(latest) => Self::from_latest(Some(latest), now),
            None if persona.games_observed() > 0 => Self::Outdated,
            None => Self::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaAnalysis {
    pub confidence: f64,
    pub insights: Vec<String>,
    pub data_freshness: DataFreshness,
}

const LOW_CONFIDENCE: f64 = 0.3;
const WIDE_GENRE_RANGE: f64 = 0.6;

/// Human-readable observations about a persona, in a stable order.
pub fn build_insights(
    persona: &Persona,
    games: &[Game],
    now: Timestamp,
    compound: &CompoundMoodParams,
) -> Vec<String> {
    let mut insights = Vec::new();

    if persona.confidence() < LOW_CONFIDENCE {
        insights.push("Limited data: persona confidence is low".to_string());
    }

    insights.push(format!(
        "Current mood is {} at intensity {:.1}",
        persona.current_mood(),
        persona.mood_intensity()
    ));
    insights.push(format!("Current intent is {}", persona.current_intent()));

    let archetype = persona.playstyle().archetype();
    if archetype != PlaystyleArchetype::Undefined {
        insights.push(format!("Dominant playstyle is {archetype}"));
    }

    if persona.behavioral_patterns().genre_diversity >= WIDE_GENRE_RANGE {
        insights.push("Plays across a wide range of genres".to_string());
    }

    if let Some(top) = games
        .iter()
        .max_by(|a, b| a.hours_played.total_cmp(&b.hours_played))
    {
        insights.push(format!(
            "Most played game is {} ({:.0} hours)",
            top.title, top.hours_played
        ));
    }

    for pair in suggest_compound_moods(persona.recent_moods(), now, compound) {
        insights.push(format!(
            "Often feels {} and {} together",
            pair.primary, pair.secondary
        ));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::persona::{recompute_persona, PersonaParams, RefreshInputs};

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    #[test]
    fn freshness_buckets() {
        let n = now();
        assert_eq!(DataFreshness::from_latest(None, n), DataFreshness::None);
        assert_eq!(DataFreshness::from_latest(Some(n.plus_secs(-3600)), n), DataFreshness::Fresh);
        assert_eq!(
            DataFreshness::from_latest(Some(n.minus(Duration::days(2))), n),
            DataFreshness::Recent
        );
        assert_eq!(
            DataFreshness::from_latest(Some(n.minus(Duration::days(10))), n),
            DataFreshness::Stale
        );
        assert_eq!(
            DataFreshness::from_latest(Some(n.minus(Duration::days(30))), n),
            DataFreshness::Outdated
        );
    }

    #[test]
    fn library_only_persona_is_outdated_not_empty() {
        let persona = Persona::new_default(UserId::new("player-1").unwrap());
        assert_eq!(DataFreshness::of_persona(&persona, now()), DataFreshness::None);

        let inputs = RefreshInputs {
            games: vec![Game {
                title: "Factorio".into(),
                hours_played: 300.0,
                moods: vec![],
                genre: None,
            }],
            ..RefreshInputs::default()
        };
        let refreshed = recompute_persona(&persona, &inputs, now(), &PersonaParams::default()).unwrap();
        assert!(refreshed.confidence() > 0.0);
        assert_eq!(DataFreshness::of_persona(&refreshed, now()), DataFreshness::Outdated);
    }

    #[test]
    fn default_persona_insights_flag_low_confidence() {
        let persona = Persona::new_default(UserId::new("player-1").unwrap());
        let insights = build_insights(&persona, &[], now(), &CompoundMoodParams::default());
        assert_eq!(insights[0], "Limited data: persona confidence is low");
        assert!(insights.iter().any(|i| i == "Current intent is casual"));
        assert!(!insights.iter().any(|i| i.starts_with("Most played")));
    }

    #[test]
    fn most_played_game_is_reported() {
        let persona = Persona::new_default(UserId::new("player-1").unwrap());
        let games = vec![
            Game {
                title: "Hades".into(),
                hours_played: 40.0,
                moods: vec![],
                genre: None,
            },
            Game {
                title: "Factorio".into(),
                hours_played: 300.0,
                moods: vec![],
                genre: None,
            },
        ];
        let insights = build_insights(&persona, &games, now(), &CompoundMoodParams::default());
        assert!(insights.contains(&"Most played game is Factorio (300 hours)".to_string()));
    }
}
