//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the persona domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{ensure_in_range, ValidationError};
pub use ids::{GameId, SessionId, UserId};
pub use timestamp::Timestamp;
