//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, validation errors)
//! - `persona` - Persona aggregate, inference, context building and temporal analysis
//! - `migration` - Mood-history schema upgrade and rollback

pub mod foundation;
pub mod migration;
pub mod persona;
