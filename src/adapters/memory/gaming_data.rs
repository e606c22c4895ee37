//! In-memory game library and session history.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::domain::persona::{Game, GameSession, SessionFilter};
use crate::ports::{GamingDataReader, RepositoryError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryGamingData {
    games: Arc<RwLock<HashMap<UserId, Vec<Game>>>>,
    sessions: Arc<RwLock<HashMap<UserId, Vec<GameSession>>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryGamingData {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_game(&self, user_id: &UserId, game: Game) {
        self.games
            .write()
            .await
            .entry(user_id.clone())
            .or_default()
            .push(game);
    }

    pub async fn add_session(&self, user_id: &UserId, session: GameSession) {
        self.sessions
            .write()
            .await
            .entry(user_id.clone())
            .or_default()
            .push(session);
    }

    /// Makes every read fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "gaming data backend offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl GamingDataReader for InMemoryGamingData {
    async fn get_user_games(&self, user_id: &UserId) -> Result<Vec<Game>, RepositoryError> {
        self.check_available()?;
        Ok(self
            .games
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_game_session_history(
        &self,
        user_id: &UserId,
        filter: Option<SessionFilter>,
        limit: usize,
    ) -> Result<Vec<GameSession>, RepositoryError> {
        self.check_available()?;
        let sessions = self.sessions.read().await;
        let mut matching: Vec<GameSession> = sessions
            .get(user_id)
            .map(|all| {
                all.iter()
                    .filter(|s| filter.as_ref().map_or(true, |f| f.matches(s)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(limit);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{GameId, Timestamp};

    fn user() -> UserId {
        UserId::new("player-1").unwrap()
    }

    fn session(game: &str, secs: i64) -> GameSession {
        GameSession {
            game_id: GameId::new(game).unwrap(),
            duration_minutes: 30.0,
            moods: vec![],
            timestamp: Timestamp::from_unix_secs(secs),
            genre: None,
        }
    }

    #[tokio::test]
    async fn history_is_newest_first_and_limited() {
        let data = InMemoryGamingData::new();
        for secs in [100, 300, 200] {
            data.add_session(&user(), session("celeste", secs)).await;
        }
        let history = data.get_game_session_history(&user(), None, 2).await.unwrap();
        let times: Vec<i64> = history.iter().map(|s| s.timestamp.as_unix_secs()).collect();
        assert_eq!(times, vec![300, 200]);
    }

    #[tokio::test]
    async fn history_applies_filter() {
        let data = InMemoryGamingData::new();
        data.add_session(&user(), session("celeste", 100)).await;
        data.add_session(&user(), session("hades", 200)).await;
        let filter = SessionFilter {
            game_id: Some(GameId::new("hades").unwrap()),
            since: None,
        };
        let history = data
            .get_game_session_history(&user(), Some(filter), 10)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].game_id.as_str(), "hades");
    }

    #[tokio::test]
    async fn unknown_user_has_no_data() {
        let data = InMemoryGamingData::new();
        assert!(data.get_user_games(&user()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unavailable_backend_errors() {
        let data = InMemoryGamingData::new();
        data.set_unavailable(true);
        assert!(data.get_user_games(&user()).await.is_err());
    }
}
