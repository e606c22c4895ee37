//! In-memory adapters for every port. Used by tests and local development.

mod gaming_data;
mod identity_provider;
mod mood_history_store;
mod persona_repository;

pub use gaming_data::InMemoryGamingData;
pub use identity_provider::StaticIdentityProvider;
pub use mood_history_store::InMemoryMoodHistoryStore;
pub use persona_repository::InMemoryPersonaRepository;
