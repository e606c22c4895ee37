//! Identity traits and playstyle scoring.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::BehavioralPatterns;

/// Upper bound of the identity provider's raw trait scale.
pub const RAW_TRAIT_MAX: f64 = 100.0;

/// Persona traits live on `[-1, 1]`.
pub const PERSONA_TRAIT_MIN: f64 = -1.0;
pub const PERSONA_TRAIT_MAX: f64 = 1.0;

/// Named identity trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitName {
    Competitiveness,
    Sociability,
    Curiosity,
    Patience,
    Creativity,
    RiskTaking,
}

impl fmt::Display for TraitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Competitiveness => "competitiveness",
            Self::Sociability => "sociability",
            Self::Curiosity => "curiosity",
            Self::Patience => "patience",
            Self::Creativity => "creativity",
            Self::RiskTaking => "risk_taking",
        };
        f.write_str(s)
    }
}

/// Raw trait scores from the identity provider, on `[0, 100]`.
pub type RawIdentityTraits = BTreeMap<TraitName, f64>;

/// Rescaled traits, on `[-1, 1]`.
pub type PersonaTraits = BTreeMap<TraitName, f64>;

/// Linear rescale of raw `[0, 100]` scores onto `[-1, 1]`.
///
/// `0 → -1`, `50 → 0`, `100 → 1`; values outside the input scale are clamped
/// and non-finite values map to the midpoint.
pub fn map_identity_traits_to_persona_traits(raw: &RawIdentityTraits) -> PersonaTraits {
    raw.iter()
        .map(|(name, value)| (*name, rescale(*value)))
        .collect()
}

fn rescale(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    let scaled = raw / (RAW_TRAIT_MAX / 2.0) - 1.0;
    scaled.clamp(PERSONA_TRAIT_MIN, PERSONA_TRAIT_MAX)
}

/// Longer-horizon categorical behavior profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaystyleArchetype {
    #[default]
    Undefined,
    Achiever,
    Explorer,
    Socializer,
    Competitor,
}

impl fmt::Display for PlaystyleArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Undefined => "undefined",
            Self::Achiever => "achiever",
            Self::Explorer => "explorer",
            Self::Socializer => "socializer",
            Self::Competitor => "competitor",
        };
        f.write_str(s)
    }
}

/// Per-archetype affinity, each on `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaystyleScores {
    pub achiever: f64,
    pub explorer: f64,
    pub socializer: f64,
    pub competitor: f64,
}

/// Scores below this are treated as "no signal".
const ARCHETYPE_FLOOR: f64 = 0.05;

impl PlaystyleScores {
    /// Dominant archetype. Ties resolve in declaration order
    /// (achiever, explorer, socializer, competitor).
    pub fn archetype(&self) -> PlaystyleArchetype {
        let ranked = [
            (PlaystyleArchetype::Achiever, self.achiever),
            (PlaystyleArchetype::Explorer, self.explorer),
            (PlaystyleArchetype::Socializer, self.socializer),
            (PlaystyleArchetype::Competitor, self.competitor),
        ];
        let mut best = (PlaystyleArchetype::Undefined, ARCHETYPE_FLOOR);
        for (archetype, score) in ranked {
            if score > best.1 {
                best = (archetype, score);
            }
        }
        best.0
    }
}

/// Maps a persona trait onto `[0, 1]`; an absent trait contributes nothing.
fn trait_unit(traits: &PersonaTraits, name: TraitName) -> f64 {
    traits
        .get(&name)
        .map(|v| (v.clamp(PERSONA_TRAIT_MIN, PERSONA_TRAIT_MAX) + 1.0) / 2.0)
        .unwrap_or(0.0)
}

/// Combines patterns and traits into playstyle scores.
pub fn calculate_playstyle_scores(
    patterns: &BehavioralPatterns,
    traits: &PersonaTraits,
) -> PlaystyleScores {
    let frequency = (patterns.session_frequency / 7.0).clamp(0.0, 1.0);
    let difficulty = patterns.difficulty_preference.clamp(0.0, 1.0);

    PlaystyleScores {
        achiever: 0.5 * difficulty
            + 0.3 * frequency
            + 0.2 * trait_unit(traits, TraitName::Patience),
        explorer: 0.6 * patterns.genre_diversity.clamp(0.0, 1.0)
            + 0.4 * trait_unit(traits, TraitName::Curiosity),
        socializer: 0.7 * patterns.social_preference.clamp(0.0, 1.0)
            + 0.3 * trait_unit(traits, TraitName::Sociability),
        competitor: 0.6 * difficulty + 0.4 * trait_unit(traits, TraitName::Competitiveness),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rescale_maps_anchor_points() {
        let raw: RawIdentityTraits = [
            (TraitName::Competitiveness, 0.0),
            (TraitName::Sociability, 50.0),
            (TraitName::Curiosity, 100.0),
            (TraitName::Patience, 75.0),
        ]
        .into_iter()
        .collect();
        let traits = map_identity_traits_to_persona_traits(&raw);
        assert_eq!(traits[&TraitName::Competitiveness], -1.0);
        assert_eq!(traits[&TraitName::Sociability], 0.0);
        assert_eq!(traits[&TraitName::Curiosity], 1.0);
        assert_eq!(traits[&TraitName::Patience], 0.5);
    }

    #[test]
    fn rescale_clamps_edges_and_non_finite() {
        let raw: RawIdentityTraits = [
            (TraitName::Competitiveness, -20.0),
            (TraitName::Sociability, 180.0),
            (TraitName::Curiosity, f64::NAN),
        ]
        .into_iter()
        .collect();
        let traits = map_identity_traits_to_persona_traits(&raw);
        assert_eq!(traits[&TraitName::Competitiveness], -1.0);
        assert_eq!(traits[&TraitName::Sociability], 1.0);
        assert_eq!(traits[&TraitName::Curiosity], 0.0);
    }

    #[test]
    fn empty_inputs_have_no_archetype() {
        let scores = calculate_playstyle_scores(&BehavioralPatterns::default(), &PersonaTraits::new());
        assert_eq!(scores, PlaystyleScores::default());
        assert_eq!(scores.archetype(), PlaystyleArchetype::Undefined);
    }

    #[test]
    fn social_patterns_produce_socializer() {
        let patterns = BehavioralPatterns {
            session_frequency: 2.0,
            average_session_minutes: 60.0,
            genre_diversity: 0.2,
            social_preference: 0.9,
            difficulty_preference: 0.2,
        };
        let scores = calculate_playstyle_scores(&patterns, &PersonaTraits::new());
        assert_eq!(scores.archetype(), PlaystyleArchetype::Socializer);
    }

    #[test]
    fn archetype_ties_resolve_in_declaration_order() {
        let scores = PlaystyleScores {
            achiever: 0.4,
            explorer: 0.4,
            socializer: 0.1,
            competitor: 0.4,
        };
        assert_eq!(scores.archetype(), PlaystyleArchetype::Achiever);
    }

    proptest! {
        #[test]
        fn rescaled_traits_stay_bounded(values in prop::collection::vec(-1000.0f64..1000.0, 6)) {
            let names = [
                TraitName::Competitiveness,
                TraitName::Sociability,
                TraitName::Curiosity,
                TraitName::Patience,
                TraitName::Creativity,
                TraitName::RiskTaking,
            ];
            let raw: RawIdentityTraits = names.iter().copied().zip(values).collect();
            for value in map_identity_traits_to_persona_traits(&raw).values() {
                prop_assert!((PERSONA_TRAIT_MIN..=PERSONA_TRAIT_MAX).contains(value));
            }
        }
    }
}
