//! GamingDataReader port - read-only access to a user's library and play history.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::domain::persona::{Game, GameSession, SessionFilter};

use super::RepositoryError;

/// Aggregate gaming data owned by the surrounding application.
#[async_trait]
pub trait GamingDataReader: Send + Sync {
    /// Games in the user's library.
    async fn get_user_games(&self, user_id: &UserId) -> Result<Vec<Game>, RepositoryError>;

    /// Most recent sessions first, at most `limit`.
    async fn get_game_session_history(
        &self,
        user_id: &UserId,
        filter: Option<SessionFilter>,
        limit: usize,
    ) -> Result<Vec<GameSession>, RepositoryError>;
}
