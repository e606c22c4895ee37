//! Feature flags configuration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which persona engine backs the integration layer.
///
/// Read once at startup; switching requires a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// v1 mood history, raw intensity deltas.
    Legacy,
    /// v2 mood history with provenance and valence-weighted deltas.
    #[default]
    Enhanced,
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Enhanced => write!(f, "enhanced"),
        }
    }
}

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FeatureFlags {
    /// Persona engine generation behind the integration layer
    #[serde(default)]
    pub persona_engine_mode: EngineMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_flags_defaults() {
        let flags = FeatureFlags::default();
        assert_eq!(flags.persona_engine_mode, EngineMode::Enhanced);
    }

    #[test]
    fn test_feature_flags_deserialization() {
        let json = r#"{ "persona_engine_mode": "legacy" }"#;

        let flags: FeatureFlags = serde_json::from_str(json).unwrap();
        assert_eq!(flags.persona_engine_mode, EngineMode::Legacy);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let json = r#"{ "persona_engine_mode": "experimental" }"#;
        assert!(serde_json::from_str::<FeatureFlags>(json).is_err());
    }
}
