//! Safe integration layer - legacy/enhanced dual-path façade.
//!
//! The engine generation is picked once from [`crate::config::FeatureFlags`]
//! when [`SafePersonaIntegration`] is built and is never re-read.

mod backend;
mod safe_integration;

pub use backend::{EnhancedEngine, LegacyEngine, MoodHistoryInput, PersonaEngineBackend};
pub use safe_integration::{
    EngineStatus, FeedbackResult, MoodRecordResult, SafePersonaIntegration, SessionEndResult,
    SessionStartResult,
};
