//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-memory implementations for tests and development
//! - `file` - JSON document per user on the local filesystem

pub mod file;
pub mod memory;

pub use file::{FileMoodHistoryStore, FilePersonaRepository};
pub use memory::{
    InMemoryGamingData, InMemoryMoodHistoryStore, InMemoryPersonaRepository,
    StaticIdentityProvider,
};
