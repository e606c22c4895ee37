//! Mood vocabulary, mood signals and the static per-mood lookup tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{ensure_in_range, Timestamp, ValidationError};

/// Upper bound of the mood intensity scale.
pub const MAX_MOOD_INTENSITY: f64 = 10.0;

/// Short-horizon emotional/activity label.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Neutral,
    Chill,
    Competitive,
    Social,
    Creative,
    Adventurous,
    Focused,
    Frustrated,
    Tired,
}

impl Mood {
    /// Every mood, in declaration order.
    pub const ALL: [Mood; 9] = [
        Mood::Neutral,
        Mood::Chill,
        Mood::Competitive,
        Mood::Social,
        Mood::Creative,
        Mood::Adventurous,
        Mood::Focused,
        Mood::Frustrated,
        Mood::Tired,
    ];

    /// Canonical lowercase label, as stored in both mood-history schemas.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Chill => "chill",
            Self::Competitive => "competitive",
            Self::Social => "social",
            Self::Creative => "creative",
            Self::Adventurous => "adventurous",
            Self::Focused => "focused",
            Self::Frustrated => "frustrated",
            Self::Tired => "tired",
        }
    }

    /// Signed pleasantness of the mood in [-1, 1].
    ///
    /// | mood        | valence |
    /// |-------------|---------|
    /// | social      |  0.8    |
    /// | creative    |  0.7    |
    /// | adventurous |  0.7    |
    /// | chill       |  0.6    |
    /// | competitive |  0.5    |
    /// | focused     |  0.4    |
    /// | neutral     |  0.0    |
    /// | tired       | -0.4    |
    /// | frustrated  | -0.8    |
    pub fn valence(&self) -> f64 {
        match self {
            Self::Social => 0.8,
            Self::Creative | Self::Adventurous => 0.7,
            Self::Chill => 0.6,
            Self::Competitive => 0.5,
            Self::Focused => 0.4,
            Self::Neutral => 0.0,
            Self::Tired => -0.4,
            Self::Frustrated => -0.8,
        }
    }

    /// How strongly the mood signals a preference for playing with others, in [0, 1].
    pub fn social_weight(&self) -> f64 {
        match self {
            Self::Social => 1.0,
            Self::Competitive => 0.6,
            Self::Adventurous => 0.3,
            Self::Chill | Self::Creative => 0.2,
            Self::Frustrated => 0.1,
            Self::Neutral | Self::Focused | Self::Tired => 0.0,
        }
    }

    /// How strongly the mood signals appetite for difficulty, in [0, 1].
    pub fn challenge_weight(&self) -> f64 {
        match self {
            Self::Competitive => 1.0,
            Self::Focused => 0.8,
            Self::Frustrated => 0.7,
            Self::Adventurous => 0.6,
            Self::Creative | Self::Social => 0.3,
            Self::Chill | Self::Tired => 0.1,
            Self::Neutral => 0.0,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ValidationError;

    /// Parses a label case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Mood::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| ValidationError::unknown_variant("mood", s))
    }
}

/// Where a mood signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodSource {
    /// Reported directly by the user.
    #[default]
    Manual,
    /// Attached to a completed play session.
    Session,
    /// Given alongside recommendation feedback.
    Feedback,
    /// Derived by the engine.
    Inferred,
    /// Upgraded from a legacy mood-history entry that carried no source.
    Legacy,
}

/// A single recorded mood signal. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEvent {
    timestamp: Timestamp,
    mood: Mood,
    intensity: f64,
    source: MoodSource,
}

impl MoodEvent {
    /// Creates a mood event, rejecting intensities outside `[0, 10]`.
    pub fn new(
        mood: Mood,
        intensity: f64,
        source: MoodSource,
        timestamp: Timestamp,
    ) -> Result<Self, ValidationError> {
        ensure_in_range("intensity", intensity, 0.0, MAX_MOOD_INTENSITY)?;
        Ok(Self {
            timestamp,
            mood,
            intensity,
            source,
        })
    }

    /// Re-checks invariants on a deserialized event.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_in_range("intensity", self.intensity, 0.0, MAX_MOOD_INTENSITY)
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn source(&self) -> MoodSource {
        self.source
    }
}

/// A point-in-time mood reading, e.g. taken before and after a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodReading {
    pub mood: Mood,
    pub intensity: f64,
}

impl MoodReading {
    pub fn new(mood: Mood, intensity: f64) -> Result<Self, ValidationError> {
        ensure_in_range("intensity", intensity, 0.0, MAX_MOOD_INTENSITY)?;
        Ok(Self { mood, intensity })
    }

    /// Signed mood scalar used for before/after comparisons.
    pub fn scalar(&self) -> f64 {
        self.mood.valence() * self.intensity.clamp(0.0, MAX_MOOD_INTENSITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_parses_case_insensitively() {
        assert_eq!("Chill".parse::<Mood>().unwrap(), Mood::Chill);
        assert_eq!(" COMPETITIVE ".parse::<Mood>().unwrap(), Mood::Competitive);
        assert!("grumpy".parse::<Mood>().is_err());
    }

    #[test]
    fn mood_labels_roundtrip_through_display() {
        for mood in Mood::ALL {
            assert_eq!(mood.to_string().parse::<Mood>().unwrap(), mood);
        }
    }

    #[test]
    fn mood_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Mood::Adventurous).unwrap(), "\"adventurous\"");
    }

    #[test]
    fn lookup_tables_stay_in_range() {
        for mood in Mood::ALL {
            assert!((-1.0..=1.0).contains(&mood.valence()));
            assert!((0.0..=1.0).contains(&mood.social_weight()));
            assert!((0.0..=1.0).contains(&mood.challenge_weight()));
        }
    }

    #[test]
    fn mood_event_rejects_out_of_range_intensity() {
        let now = Timestamp::now();
        assert!(MoodEvent::new(Mood::Chill, 5.0, MoodSource::Manual, now).is_ok());
        assert!(MoodEvent::new(Mood::Chill, 10.1, MoodSource::Manual, now).is_err());
        assert!(MoodEvent::new(Mood::Chill, -1.0, MoodSource::Manual, now).is_err());
        assert!(MoodEvent::new(Mood::Chill, f64::NAN, MoodSource::Manual, now).is_err());
    }

    #[test]
    fn reading_scalar_is_signed_by_valence() {
        let happy = MoodReading::new(Mood::Social, 5.0).unwrap();
        let sad = MoodReading::new(Mood::Frustrated, 5.0).unwrap();
        assert!(happy.scalar() > 0.0);
        assert!(sad.scalar() < 0.0);
    }
}
