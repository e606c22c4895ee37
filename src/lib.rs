//! Persona Engine - per-user gaming personas for recommendation scoring.
//!
//! Maintains a synthesized profile (mood, intent, traits, behavioral
//! patterns) from gaming activity and mood signals, and exposes it as
//! context for a downstream recommendation engine.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

pub use bootstrap::PersonaEngine;
