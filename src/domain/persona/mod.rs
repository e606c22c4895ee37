//! Persona module - Per-user gaming persona and the pure functions behind it.
//!
//! Everything here is deterministic and free of I/O. State transitions are
//! `(persona, input) -> persona` functions:
//!
//! - [`process_persona_event`] applies one incremental update.
//! - [`recompute_persona`] rebuilds a persona from aggregate repository data.
//!
//! Inference, pattern extraction, the recommendation context and the
//! temporal analyses are total: empty input yields a documented default.

mod aggregate;
mod analysis;
mod context;
mod inference;
mod library;
mod mood;
mod patterns;
mod refresh;
mod request;
mod temporal;
mod traits;

pub use aggregate::{
    calculate_confidence, should_refresh_persona, Persona, PersonaHistory, PersonaParams,
    PersonaSnapshot, SnapshotCause, PERSONA_SCHEMA_VERSION,
};
pub use analysis::{build_insights, DataFreshness, PersonaAnalysis};
pub use context::{
    build_recommendation_context, build_recommendation_context_from_patterns, intent_genres,
    mood_genres, ContextSource, DifficultyPreference, PersonaState, RecommendationContext,
    SessionLength, SocialPreference, CONTEXT_TRAITS, DIFFICULTY_TABLE, SESSION_LENGTH_TABLE,
    SOCIAL_TABLE,
};
pub use inference::{
    calculate_mood_intensity, infer_current_intent, infer_current_mood, InferenceParams, Intent,
};
pub use library::{extract_library_patterns, library_mood, Game, GameSession, SessionFilter};
pub use mood::{Mood, MoodEvent, MoodReading, MoodSource, MAX_MOOD_INTENSITY};
pub use patterns::{extract_behavioral_patterns, BehavioralPatterns, SessionRecord};
pub use refresh::{recompute_persona, RefreshInputs};
pub use request::{
    process_persona_event, FeedbackEvent, PersonaUpdateRequest, MAX_FEEDBACK_RATING,
    MIN_FEEDBACK_RATING, SESSION_MOOD_INTENSITY,
};
pub use temporal::{
    calculate_mood_forecast, get_session_mood_delta, get_temporal_mood_patterns,
    suggest_compound_moods, BucketDistribution, CompoundMoodParams, CompoundMoodSuggestion,
    DayPeriod, DeltaConfidence, ForecastParams, ForecastPoint, MoodDelta, MoodForecast,
    TemporalMoodPatterns, TimeBucket,
};
pub use traits::{
    calculate_playstyle_scores, map_identity_traits_to_persona_traits, PersonaTraits,
    PlaystyleArchetype, PlaystyleScores, RawIdentityTraits, TraitName, PERSONA_TRAIT_MAX,
    PERSONA_TRAIT_MIN, RAW_TRAIT_MAX,
};
