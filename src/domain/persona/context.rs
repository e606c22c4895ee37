//! Recommendation context: the scoring input handed to the recommendation engine.
//!
//! Both builders emit the same [`RecommendationContext`] shape, so the
//! downstream engine never needs to know which data path produced it.
//! Categorical fields are read from the threshold tables below.

use serde::{Deserialize, Serialize};

use super::{
    calculate_playstyle_scores, infer_current_intent, BehavioralPatterns, Intent, Mood, Persona,
    PersonaTraits, PlaystyleArchetype, TraitName,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionLength {
    Short,
    Medium,
    Long,
    Marathon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyPreference {
    Relaxed,
    Balanced,
    Challenging,
    Hardcore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialPreference {
    Solo,
    SmallGroup,
    Social,
    Multiplayer,
}

/// Which data path built the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    Persona,
    Patterns,
}

/// `(exclusive upper bound of difficulty_preference, category)`; anything above → `Hardcore`.
pub const DIFFICULTY_TABLE: &[(f64, DifficultyPreference)] = &[
    (0.25, DifficultyPreference::Relaxed),
    (0.50, DifficultyPreference::Balanced),
    (0.75, DifficultyPreference::Challenging),
];

/// `(exclusive upper bound of social_preference, category)`; anything above → `Multiplayer`.
pub const SOCIAL_TABLE: &[(f64, SocialPreference)] = &[
    (0.20, SocialPreference::Solo),
    (0.45, SocialPreference::SmallGroup),
    (0.70, SocialPreference::Social),
];

/// `(inclusive upper bound of average_session_minutes, category)`; anything above → `Marathon`.
pub const SESSION_LENGTH_TABLE: &[(f64, SessionLength)] = &[
    (30.0, SessionLength::Short),
    (75.0, SessionLength::Medium),
    (150.0, SessionLength::Long),
];

fn lookup_exclusive<T: Copy>(table: &[(f64, T)], fallback: T, value: f64) -> T {
    let value = if value.is_finite() { value } else { 0.0 };
    table
        .iter()
        .find(|(bound, _)| value < *bound)
        .map(|(_, category)| *category)
        .unwrap_or(fallback)
}

fn lookup_inclusive<T: Copy>(table: &[(f64, T)], fallback: T, value: f64) -> T {
    let value = if value.is_finite() { value } else { 0.0 };
    table
        .iter()
        .find(|(bound, _)| value <= *bound)
        .map(|(_, category)| *category)
        .unwrap_or(fallback)
}

/// Genres that suit a mood. Neutral has no mood-specific genres.
pub fn mood_genres(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Neutral => &[],
        Mood::Chill => &["simulation", "puzzle", "cozy"],
        Mood::Competitive => &["fighting", "sports", "shooter"],
        Mood::Social => &["party", "mmo", "co-op"],
        Mood::Creative => &["sandbox", "building", "rhythm"],
        Mood::Adventurous => &["open-world", "action-adventure", "rpg"],
        Mood::Focused => &["strategy", "roguelike", "tactics"],
        Mood::Frustrated => &["casual", "puzzle", "platformer"],
        Mood::Tired => &["cozy", "visual-novel", "idle"],
    }
}

/// Genres that suit an intent.
pub fn intent_genres(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Casual => &["casual", "indie"],
        Intent::QuickSession => &["arcade", "roguelike", "puzzle"],
        Intent::Immersive => &["rpg", "open-world", "narrative"],
        Intent::Socialize => &["co-op", "party", "mmo"],
        Intent::Challenge => &["soulslike", "competitive", "strategy"],
        Intent::Discover => &["indie", "experimental", "adventure"],
        Intent::Unwind => &["cozy", "simulation", "puzzle"],
    }
}

/// Scoring context consumed by the recommendation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationContext {
    pub mood: Mood,
    pub intent: Intent,
    pub mood_intensity: f64,
    pub session_length: SessionLength,
    pub difficulty: DifficultyPreference,
    pub social: SocialPreference,
    /// Willingness to try new genres, on `[0, 1]`.
    pub genre_openness: f64,
    pub preferred_genres: Vec<String>,
    pub playstyle: PlaystyleArchetype,
    pub source: ContextSource,
}

fn pattern_fields(
    patterns: &BehavioralPatterns,
) -> (SessionLength, DifficultyPreference, SocialPreference, f64) {
    (
        lookup_inclusive(SESSION_LENGTH_TABLE, SessionLength::Marathon, patterns.average_session_minutes),
        lookup_exclusive(DIFFICULTY_TABLE, DifficultyPreference::Hardcore, patterns.difficulty_preference),
        lookup_exclusive(SOCIAL_TABLE, SocialPreference::Multiplayer, patterns.social_preference),
        patterns.genre_diversity.clamp(0.0, 1.0),
    )
}

fn genres_for(mood: Mood, intent: Intent) -> Vec<String> {
    let genres = match mood_genres(mood) {
        [] => intent_genres(intent),
        by_mood => by_mood,
    };
    genres.iter().map(|g| g.to_string()).collect()
}

/// Builds the context from a full persona.
pub fn build_recommendation_context(persona: &Persona) -> RecommendationContext {
    let (session_length, difficulty, social, genre_openness) =
        pattern_fields(persona.behavioral_patterns());
    RecommendationContext {
        mood: persona.current_mood(),
        intent: persona.current_intent(),
        mood_intensity: persona.mood_intensity(),
        session_length,
        difficulty,
        social,
        genre_openness,
        preferred_genres: genres_for(persona.current_mood(), persona.current_intent()),
        playstyle: persona.playstyle().archetype(),
        source: ContextSource::Persona,
    }
}

/// Builds the context from behavioral patterns alone, when no persona is available.
///
/// Mood is unknown on this path, so it is reported as neutral with zero intensity.
pub fn build_recommendation_context_from_patterns(
    patterns: &BehavioralPatterns,
) -> RecommendationContext {
    let (session_length, difficulty, social, genre_openness) = pattern_fields(patterns);
    let intent = infer_current_intent(patterns);
    RecommendationContext {
        mood: Mood::Neutral,
        intent,
        mood_intensity: 0.0,
        session_length,
        difficulty,
        social,
        genre_openness,
        preferred_genres: genres_for(Mood::Neutral, intent),
        playstyle: calculate_playstyle_scores(patterns, &PersonaTraits::new()).archetype(),
        source: ContextSource::Patterns,
    }
}

/// Traits forwarded to the recommendation engine.
pub const CONTEXT_TRAITS: [TraitName; 3] = [
    TraitName::Competitiveness,
    TraitName::Sociability,
    TraitName::Curiosity,
];

/// Read-only view of a persona for recommendation scoring. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaState {
    pub mood: Mood,
    pub intent: Intent,
    pub mood_intensity: f64,
    pub traits: PersonaTraits,
    pub recommendation_context: RecommendationContext,
}

impl PersonaState {
    pub fn from_persona(persona: &Persona) -> Self {
        let traits = persona
            .traits()
            .iter()
            .filter(|(name, _)| CONTEXT_TRAITS.contains(name))
            .map(|(name, value)| (*name, *value))
            .collect();
        Self {
            mood: persona.current_mood(),
            intent: persona.current_intent(),
            mood_intensity: persona.mood_intensity(),
            traits,
            recommendation_context: build_recommendation_context(persona),
        }
    }
}
