//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PersonaRepository` - Persona document per user
//! - `GamingDataReader` - Game library and session history
//! - `IdentityProvider` - Raw identity trait scores
//! - `MoodHistoryStore` - Versioned mood-history documents

mod error;
mod gaming_data_reader;
mod identity_provider;
mod mood_history_store;
mod persona_repository;

pub use error::RepositoryError;
pub use gaming_data_reader::GamingDataReader;
pub use identity_provider::IdentityProvider;
pub use mood_history_store::MoodHistoryStore;
pub use persona_repository::PersonaRepository;
