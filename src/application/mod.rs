//! Application layer - Orchestration over domain functions and ports.
//!
//! - `persona_service` - Persona reads, updates, refresh and analysis
//! - `integration` - Mode-selected façade with mood-history migration
//! - `user_locks` - Per-user serialization of read-compute-write sequences

mod error;
pub mod integration;
mod persona_service;
mod user_locks;

pub use error::PersonaError;
pub use persona_service::{system_clock, Clock, PersonaService, PersonaServiceSettings};
pub use user_locks::UserLocks;
