//! Temporal mood analysis: time-of-day buckets, compound moods, session
//! deltas and short-range forecasts.

use chrono::{Datelike, Duration, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::Timestamp;

use super::{Mood, MoodEvent, MoodReading, MAX_MOOD_INTENSITY};

/// Part of the day, by UTC hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    /// 05:00–11:59
    Morning,
    /// 12:00–16:59
    Afternoon,
    /// 17:00–21:59
    Evening,
    /// 22:00–04:59
    Night,
}

impl DayPeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=21 => Self::Evening,
            _ => Self::Night,
        }
    }
}

/// Day-of-week × day-period bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeBucket {
    /// 0 = Monday … 6 = Sunday.
    pub weekday: u8,
    pub period: DayPeriod,
}

impl TimeBucket {
    pub fn of(at: Timestamp) -> Self {
        let dt = at.as_datetime();
        Self {
            weekday: dt.weekday().num_days_from_monday() as u8,
            period: DayPeriod::from_hour(dt.hour()),
        }
    }
}

/// Mood mix observed in one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketDistribution {
    pub bucket: TimeBucket,
    pub samples: usize,
    /// Share of samples per mood; sums to 1.
    pub distribution: BTreeMap<Mood, f64>,
    pub dominant: Mood,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemporalMoodPatterns {
    /// Only buckets with samples, ordered by bucket.
    pub buckets: Vec<BucketDistribution>,
}

impl TemporalMoodPatterns {
    pub fn bucket(&self, bucket: TimeBucket) -> Option<&BucketDistribution> {
        self.buckets.iter().find(|b| b.bucket == bucket)
    }
}

/// Buckets mood events by weekday and day period.
pub fn get_temporal_mood_patterns(history: &[MoodEvent]) -> TemporalMoodPatterns {
    let mut counts: BTreeMap<TimeBucket, BTreeMap<Mood, usize>> = BTreeMap::new();
    for event in history {
        *counts
            .entry(TimeBucket::of(event.timestamp()))
            .or_default()
            .entry(event.mood())
            .or_default() += 1;
    }

    let buckets = counts
        .into_iter()
        .map(|(bucket, per_mood)| {
            let samples: usize = per_mood.values().sum();
            let dominant = per_mood
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
                .map(|(mood, _)| *mood)
                .unwrap_or_default();
            let distribution = per_mood
                .into_iter()
                .map(|(mood, n)| (mood, n as f64 / samples as f64))
                .collect();
            BucketDistribution {
                bucket,
                samples,
                distribution,
                dominant,
            }
        })
        .collect();

    TemporalMoodPatterns { buckets }
}

/// Tuning for compound-mood detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundMoodParams {
    pub lookback: Duration,
    /// Minimum share of active slots in which both moods appear.
    pub min_support: f64,
    pub min_co_occurrences: usize,
}

impl Default for CompoundMoodParams {
    fn default() -> Self {
        Self {
            lookback: Duration::days(14),
            min_support: 0.3,
            min_co_occurrences: 2,
        }
    }
}

/// Two moods that tend to show up together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundMoodSuggestion {
    pub primary: Mood,
    pub secondary: Mood,
    pub support: f64,
    pub co_occurrences: usize,
}

/// Finds mood pairs that co-occur within the same day-period slot.
///
/// A slot is one calendar day × [`DayPeriod`]. Support is the fraction of
/// slots with any mood in the lookback window that contain both moods.
/// Results are ordered by support, then by mood pair.
pub fn suggest_compound_moods(
    history: &[MoodEvent],
    now: Timestamp,
    params: &CompoundMoodParams,
) -> Vec<CompoundMoodSuggestion> {
    let mut slots: BTreeMap<(NaiveDate, DayPeriod), BTreeSet<Mood>> = BTreeMap::new();
    for event in history {
        let age = now.duration_since(&event.timestamp());
        if age < Duration::zero() || age > params.lookback {
            continue;
        }
        let dt = event.timestamp().as_datetime().to_owned();
        slots
            .entry((dt.date_naive(), DayPeriod::from_hour(dt.hour())))
            .or_default()
            .insert(event.mood());
    }
    if slots.is_empty() {
        return Vec::new();
    }

    let mut pairs: BTreeMap<(Mood, Mood), usize> = BTreeMap::new();
    for moods in slots.values() {
        let moods: Vec<Mood> = moods.iter().copied().collect();
        for (i, a) in moods.iter().enumerate() {
            for b in &moods[i + 1..] {
                *pairs.entry((*a, *b)).or_default() += 1;
            }
        }
    }

    let total = slots.len() as f64;
    let mut suggestions: Vec<CompoundMoodSuggestion> = pairs
        .into_iter()
        .filter(|(_, n)| *n >= params.min_co_occurrences)
        .map(|((primary, secondary), n)| CompoundMoodSuggestion {
            primary,
            secondary,
            support: n as f64 / total,
            co_occurrences: n,
        })
        .filter(|s| s.support >= params.min_support)
        .collect();
    suggestions.sort_by(|a, b| {
        b.support
            .total_cmp(&a.support)
            .then(a.primary.cmp(&b.primary))
            .then(a.secondary.cmp(&b.secondary))
    });
    suggestions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaConfidence {
    Normal,
    /// A reading was missing; the delta is a placeholder zero.
    Low,
}

/// Change in mood across a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodDelta {
    pub delta: f64,
    pub confidence: DeltaConfidence,
}

impl MoodDelta {
    pub fn unknown() -> Self {
        Self {
            delta: 0.0,
            confidence: DeltaConfidence::Low,
        }
    }
}

/// Signed difference of `valence × intensity` between two readings.
///
/// A missing reading yields a zero delta flagged [`DeltaConfidence::Low`].
pub fn get_session_mood_delta(before: Option<MoodReading>, after: Option<MoodReading>) -> MoodDelta {
    match (before, after) {
        (Some(before), Some(after)) => MoodDelta {
            delta: after.scalar() - before.scalar(),
            confidence: DeltaConfidence::Normal,
        },
        _ => MoodDelta::unknown(),
    }
}

/// Forecast resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastParams {
    /// Number of future buckets.
    pub horizon: usize,
    /// Width of one bucket.
    pub step: Duration,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            horizon: 4,
            step: Duration::hours(6),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub at: Timestamp,
    pub mood: Mood,
    pub intensity: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MoodForecast {
    /// Samples the forecast was built from (≤ k).
    pub basis_samples: usize,
    pub points: Vec<ForecastPoint>,
}

/// Per-bucket confidence decay.
const FORECAST_DECAY: f64 = 0.85;

/// Extrapolates the next `params.horizon` buckets from the `k` most recent samples.
///
/// Samples are weighted linearly by recency (oldest 1, newest n). The mood is
/// the weighted vote winner; intensity is the weighted mean plus the
/// per-sample trend between the oldest and newest sample, clamped to
/// `[0, 10]`. Deterministic for identical `(history, k)`.
pub fn calculate_mood_forecast(history: &[MoodEvent], k: usize, params: &ForecastParams) -> MoodForecast {
    if history.is_empty() || k == 0 {
        return MoodForecast::default();
    }

    let mut ordered: Vec<&MoodEvent> = history.iter().collect();
    ordered.sort_by_key(|e| e.timestamp());
    let samples = &ordered[ordered.len().saturating_sub(k)..];
    let n = samples.len();

    let mut votes: BTreeMap<Mood, (f64, usize)> = BTreeMap::new();
    let mut weight_total = 0.0;
    let mut weighted_intensity = 0.0;
    for (i, sample) in samples.iter().enumerate() {
        let weight = (i + 1) as f64;
        weight_total += weight;
        weighted_intensity += weight * sample.intensity();
        let entry = votes.entry(sample.mood()).or_insert((0.0, i));
        entry.0 += weight;
        entry.1 = i;
    }
    let mood = votes
        .into_iter()
        .max_by(|a, b| a.1 .0.total_cmp(&b.1 .0).then(a.1 .1.cmp(&b.1 .1)))
        .map(|(mood, _)| mood)
        .unwrap_or_default();

    let mean = weighted_intensity / weight_total;
    let trend = if n > 1 {
        (samples[n - 1].intensity() - samples[0].intensity()) / (n - 1) as f64
    } else {
        0.0
    };
    let coverage = n as f64 / k as f64;
    let last = samples[n - 1].timestamp();

    // Buckets past the representable time range are dropped.
    let points = (1..=params.horizon)
        .scan(last, |at, step| {
            *at = at.checked_plus(params.step)?;
            Some(ForecastPoint {
                at: *at,
                mood,
                intensity: (mean + trend * step as f64).clamp(0.0, MAX_MOOD_INTENSITY),
                confidence: coverage * FORECAST_DECAY.powi(step as i32),
            })
        })
        .collect();

    MoodForecast {
        basis_samples: n,
        points,
    }
}
