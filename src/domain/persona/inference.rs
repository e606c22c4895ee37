//! Mood and intent inference.
//!
//! Every function here is pure and total: empty or missing input yields a
//! documented default instead of an error.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::foundation::Timestamp;

use super::{BehavioralPatterns, Mood, MoodEvent, MAX_MOOD_INTENSITY};

/// Inferred short-term behavioral goal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    #[default]
    Casual,
    QuickSession,
    Immersive,
    Socialize,
    Challenge,
    Discover,
    Unwind,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::QuickSession => "quick_session",
            Self::Immersive => "immersive",
            Self::Socialize => "socialize",
            Self::Challenge => "challenge",
            Self::Discover => "discover",
            Self::Unwind => "unwind",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuning for mood inference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceParams {
    /// Signals older than this are ignored.
    pub recency_window: Duration,
    /// Age at which a signal's weight has halved.
    pub decay_half_life: Duration,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            recency_window: Duration::hours(72),
            decay_half_life: Duration::hours(12),
        }
    }
}

/// Picks the current mood by decay-weighted vote.
///
/// Each signal inside the recency window votes for its mood with
/// `intensity * 2^(-age / half_life)`. Signals from the future count as age
/// zero. The mood with the highest total wins; ties go to the mood whose
/// latest signal is most recent. No usable signals yields [`Mood::Neutral`].
pub fn infer_current_mood(signals: &[MoodEvent], now: Timestamp, params: &InferenceParams) -> Mood {
    let half_life_secs = params.decay_half_life.num_seconds().max(1) as f64;
    let mut tally: BTreeMap<Mood, (Vec<f64>, Timestamp)> = BTreeMap::new();

    for signal in signals {
        let age = now.duration_since(&signal.timestamp());
        if age > params.recency_window {
            continue;
        }
        let age_secs = age.num_seconds().max(0) as f64;
        let weight = signal.intensity() * (-age_secs / half_life_secs).exp2();

        let entry = tally
            .entry(signal.mood())
            .or_insert_with(|| (Vec::new(), signal.timestamp()));
        entry.0.push(weight);
        if signal.timestamp() > entry.1 {
            entry.1 = signal.timestamp();
        }
    }

    tally
        .into_iter()
        .map(|(mood, (mut weights, latest))| {
            weights.sort_by(f64::total_cmp);
            (mood, weights.iter().sum::<f64>(), latest)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)))
        .map(|(mood, _, _)| mood)
        .unwrap_or_default()
}

/// Mean reported intensity, clipped to `[0, 10]`. Empty input yields 0.
pub fn calculate_mood_intensity(signals: &[MoodEvent]) -> f64 {
    if signals.is_empty() {
        return 0.0;
    }
    let mut values: Vec<f64> = signals.iter().map(MoodEvent::intensity).collect();
    values.sort_by(f64::total_cmp);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    mean.clamp(0.0, MAX_MOOD_INTENSITY)
}

struct IntentRule {
    intent: Intent,
    matches: fn(&BehavioralPatterns) -> bool,
}

/// Ordered rule table; the first matching rule wins.
const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::QuickSession,
        matches: |p: &BehavioralPatterns| p.session_frequency >= 5.0 && p.average_session_minutes <= 30.0,
    },
    IntentRule {
        intent: Intent::Immersive,
        matches: |p: &BehavioralPatterns| p.average_session_minutes >= 90.0 && p.genre_diversity <= 0.25,
    },
    IntentRule {
        intent: Intent::Socialize,
        matches: |p: &BehavioralPatterns| p.social_preference >= 0.6,
    },
    IntentRule {
        intent: Intent::Challenge,
        matches: |p: &BehavioralPatterns| p.difficulty_preference >= 0.7,
    },
    IntentRule {
        intent: Intent::Discover,
        matches: |p: &BehavioralPatterns| p.genre_diversity >= 0.6,
    },
    IntentRule {
        intent: Intent::Unwind,
        matches: |p: &BehavioralPatterns| {
            p.session_frequency > 0.0
                && p.average_session_minutes <= 45.0
                && p.difficulty_preference <= 0.3
        },
    },
];

/// Maps behavioral patterns to an intent; unmatched patterns yield [`Intent::Casual`].
pub fn infer_current_intent(patterns: &BehavioralPatterns) -> Intent {
    INTENT_RULES
        .iter()
        .find(|rule| (rule.matches)(patterns))
        .map(|rule| rule.intent)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::persona::MoodSource;

    fn event(mood: Mood, intensity: f64, at: Timestamp) -> MoodEvent {
        MoodEvent::new(mood, intensity, MoodSource::Manual, at).unwrap()
    }

    fn base() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    #[test]
    fn empty_signals_default_to_neutral() {
        assert_eq!(infer_current_mood(&[], base(), &InferenceParams::default()), Mood::Neutral);
    }

    #[test]
    fn single_signal_wins() {
        let signals = vec![event(Mood::Chill, 5.0, base())];
        assert_eq!(infer_current_mood(&signals, base(), &InferenceParams::default()), Mood::Chill);
        assert_eq!(calculate_mood_intensity(&signals), 5.0);
    }

    #[test]
    fn heavier_mood_wins_over_more_frequent_one() {
        let t0 = base();
        let signals = vec![
            event(Mood::Chill, 3.0, t0),
            event(Mood::Competitive, 9.0, t0.plus_secs(60)),
            event(Mood::Competitive, 8.0, t0.plus_secs(120)),
        ];
        let now = t0.plus_secs(180);
        assert_eq!(
            infer_current_mood(&signals, now, &InferenceParams::default()),
            Mood::Competitive
        );
    }

    #[test]
    fn aggregate_weight_beats_single_strong_signal() {
        let t0 = base();
        let signals = vec![
            event(Mood::Social, 4.0, t0),
            event(Mood::Social, 4.0, t0),
            event(Mood::Focused, 7.0, t0),
        ];
        assert_eq!(infer_current_mood(&signals, t0, &InferenceParams::default()), Mood::Social);
    }

    #[test]
    fn exact_weight_tie_prefers_later_timestamp() {
        let t0 = base();
        // Both signals are in the future relative to `now`, so both count as age zero.
        let now = t0.plus_secs(-10);
        let signals = vec![event(Mood::Creative, 6.0, t0), event(Mood::Chill, 6.0, t0.plus_secs(5))];
        assert_eq!(infer_current_mood(&signals, now, &InferenceParams::default()), Mood::Chill);
    }

    #[test]
    fn signals_outside_window_are_ignored() {
        let t0 = base();
        let params = InferenceParams::default();
        let signals = vec![event(Mood::Frustrated, 10.0, t0)];
        let later = t0.plus(params.recency_window + Duration::seconds(1));
        assert_eq!(infer_current_mood(&signals, later, &params), Mood::Neutral);
    }

    #[test]
    fn decay_lets_recent_signal_beat_stronger_old_one() {
        let t0 = base();
        let params = InferenceParams::default();
        let signals = vec![
            event(Mood::Competitive, 9.0, t0),
            event(Mood::Chill, 4.0, t0.plus(Duration::hours(36))),
        ];
        // After 36h the old signal has decayed by 2^-3 → 1.125
        assert_eq!(
            infer_current_mood(&signals, t0.plus(Duration::hours(36)), &params),
            Mood::Chill
        );
    }

    #[test]
    fn intensity_is_mean_of_reports() {
        let signals = vec![event(Mood::Chill, 2.0, base()), event(Mood::Chill, 6.0, base())];
        assert_eq!(calculate_mood_intensity(&signals), 4.0);
        assert_eq!(calculate_mood_intensity(&[]), 0.0);
    }

    #[test]
    fn intent_rules_apply_in_order() {
        let quick = BehavioralPatterns {
            session_frequency: 7.0,
            average_session_minutes: 20.0,
            ..Default::default()
        };
        assert_eq!(infer_current_intent(&quick), Intent::QuickSession);

        let immersive = BehavioralPatterns {
            session_frequency: 2.0,
            average_session_minutes: 150.0,
            genre_diversity: 0.0,
            ..Default::default()
        };
        assert_eq!(infer_current_intent(&immersive), Intent::Immersive);

        let social = BehavioralPatterns {
            session_frequency: 2.0,
            average_session_minutes: 60.0,
            social_preference: 0.9,
            difficulty_preference: 0.9,
            ..Default::default()
        };
        assert_eq!(infer_current_intent(&social), Intent::Socialize);

        let unwind = BehavioralPatterns {
            session_frequency: 2.0,
            average_session_minutes: 40.0,
            genre_diversity: 0.5,
            difficulty_preference: 0.1,
            ..Default::default()
        };
        assert_eq!(infer_current_intent(&unwind), Intent::Unwind);
    }

    #[test]
    fn unmatched_patterns_fall_back_to_casual() {
        assert_eq!(infer_current_intent(&BehavioralPatterns::default()), Intent::Casual);
        let middling = BehavioralPatterns {
            session_frequency: 2.0,
            average_session_minutes: 60.0,
            genre_diversity: 0.4,
            social_preference: 0.3,
            difficulty_preference: 0.5,
        };
        assert_eq!(infer_current_intent(&middling), Intent::Casual);
    }
}
