//! Persona engine tuning

use chrono::Duration;
use serde::Deserialize;

use crate::application::PersonaServiceSettings;
use crate::domain::persona::{CompoundMoodParams, InferenceParams, PersonaParams};

use super::error::ValidationError;

/// Refresh policy, retention caps and inference windows
#[derive(Debug, Clone, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Data points since the last refresh that make a persona stale
    #[serde(default = "default_new_data_threshold")]
    pub new_data_threshold: u32,

    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    #[serde(default = "default_mood_signal_cap")]
    pub mood_signal_cap: usize,

    #[serde(default = "default_session_cap")]
    pub session_cap: usize,

    #[serde(default = "default_feedback_cap")]
    pub feedback_cap: usize,

    #[serde(default = "default_recency_window_secs")]
    pub recency_window_secs: u64,

    #[serde(default = "default_decay_half_life_secs")]
    pub decay_half_life_secs: u64,

    #[serde(default = "default_session_history_limit")]
    pub session_history_limit: usize,

    #[serde(default = "default_compound_min_support")]
    pub compound_min_support: f64,

    #[serde(default = "default_compound_lookback_secs")]
    pub compound_lookback_secs: u64,
}

fn default_refresh_interval_secs() -> u64 {
    6 * 3600
}

fn default_new_data_threshold() -> u32 {
    20
}

fn default_history_cap() -> usize {
    50
}

fn default_mood_signal_cap() -> usize {
    200
}

fn default_session_cap() -> usize {
    100
}

fn default_feedback_cap() -> usize {
    50
}

fn default_recency_window_secs() -> u64 {
    72 * 3600
}

fn default_decay_half_life_secs() -> u64 {
    12 * 3600
}

fn default_session_history_limit() -> usize {
    100
}

fn default_compound_min_support() -> f64 {
    0.3
}

fn default_compound_lookback_secs() -> u64 {
    14 * 24 * 3600
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
}

impl PersonaConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("persona.refresh_interval_secs", self.refresh_interval_secs),
            ("persona.recency_window_secs", self.recency_window_secs),
            ("persona.decay_half_life_secs", self.decay_half_life_secs),
            ("persona.compound_lookback_secs", self.compound_lookback_secs),
        ] {
            if value == 0 {
                return Err(ValidationError::ZeroInterval(name));
            }
        }
        for (name, value) in [
            ("persona.history_cap", self.history_cap),
            ("persona.mood_signal_cap", self.mood_signal_cap),
            ("persona.session_cap", self.session_cap),
            ("persona.feedback_cap", self.feedback_cap),
            ("persona.session_history_limit", self.session_history_limit),
        ] {
            if value == 0 {
                return Err(ValidationError::ZeroCapacity(name));
            }
        }
        if !(self.compound_min_support > 0.0 && self.compound_min_support <= 1.0) {
            return Err(ValidationError::InvalidSupport);
        }
        Ok(())
    }

    pub fn params(&self) -> PersonaParams {
        PersonaParams {
            inference: InferenceParams {
                recency_window: seconds(self.recency_window_secs),
                decay_half_life: seconds(self.decay_half_life_secs),
            },
            refresh_interval: seconds(self.refresh_interval_secs),
            new_data_threshold: self.new_data_threshold,
            history_cap: self.history_cap,
            mood_signal_cap: self.mood_signal_cap,
            session_cap: self.session_cap,
            feedback_cap: self.feedback_cap,
        }
    }

    pub fn service_settings(&self) -> PersonaServiceSettings {
        PersonaServiceSettings {
            params: self.params(),
            compound_moods: CompoundMoodParams {
                lookback: seconds(self.compound_lookback_secs),
                min_support: self.compound_min_support,
                ..CompoundMoodParams::default()
            },
            session_history_limit: self.session_history_limit,
        }
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            new_data_threshold: default_new_data_threshold(),
            history_cap: default_history_cap(),
            mood_signal_cap: default_mood_signal_cap(),
            session_cap: default_session_cap(),
            feedback_cap: default_feedback_cap(),
            recency_window_secs: default_recency_window_secs(),
            decay_half_life_secs: default_decay_half_life_secs(),
            session_history_limit: default_session_history_limit(),
            compound_min_support: default_compound_min_support(),
            compound_lookback_secs: default_compound_lookback_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_domain_defaults() {
        let config = PersonaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.params(), PersonaParams::default());
        assert_eq!(config.service_settings(), PersonaServiceSettings::default());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = PersonaConfig {
            refresh_interval_secs: 0,
            ..PersonaConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::ZeroInterval("persona.refresh_interval_secs"))
        );
    }

    #[test]
    fn zero_cap_is_rejected() {
        let config = PersonaConfig {
            history_cap: 0,
            ..PersonaConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::ZeroCapacity(_))));
    }

    #[test]
    fn support_outside_unit_interval_is_rejected() {
        let config = PersonaConfig {
            compound_min_support: 1.5,
            ..PersonaConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidSupport));
    }
}
