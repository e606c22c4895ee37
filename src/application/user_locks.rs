//! Per-user mutation locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::UserId;

/// Hands out one async mutex per user so read-compute-write sequences for
/// the same user run one at a time. Different users never contend.
///
/// Idle entries are pruned whenever a lock is handed out.
#[derive(Debug, Clone, Default)]
pub struct UserLocks {
    inner: Arc<Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `user_id`. Released when the guard drops.
    pub async fn lock(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // An entry referenced only by the map is neither held nor awaited.
            locks.retain(|id, lock| id == user_id || Arc::strong_count(lock) > 1);
            locks.entry(user_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of users with a live lock entry.
    pub fn tracked_users(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn same_user_is_serialized() {
        let locks = UserLocks::new();
        let guard = locks.lock(&user("a")).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(&user("a")).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_users_do_not_contend() {
        let locks = UserLocks::new();
        let _a = locks.lock(&user("a")).await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.lock(&user("b")))
            .await
            .expect("lock for another user should be immediate");
    }

    #[tokio::test]
    async fn idle_entries_are_pruned() {
        let locks = UserLocks::new();
        drop(locks.lock(&user("a")).await);
        drop(locks.lock(&user("b")).await);
        let _c = locks.lock(&user("c")).await;
        assert_eq!(locks.tracked_users(), 1);
    }
}
