//! Per-session mutual exclusion.
//!
//! State-changing requests for one session run one at a time inside this
//! process. Locks live in a bounded moka cache keyed by session cookie and
//! expire after a few idle minutes.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Maximum number of sessions with a live lock entry.
const MAX_ENTRIES: u64 = 10_000;

/// Idle time after which an unused lock is dropped.
const IDLE_TTL: Duration = Duration::from_secs(300);

/// Registry of per-session async mutexes.
#[derive(Clone)]
pub struct SessionLocks {
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    /// Create an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_idle(IDLE_TTL)
                .build(),
        }
    }

    /// Wait for exclusive access to a session.
    ///
    /// The returned guard releases the lock when dropped.
    pub async fn acquire(&self, session_key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .get_with(session_key.to_owned(), async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }

    /// Lock a session if it has a key. Requests without one start a new
    /// session that nothing else can reach.
    pub async fn acquire_optional(&self, session_key: Option<&str>) -> Option<OwnedMutexGuard<()>> {
        match session_key {
            Some(key) => Some(self.acquire(key).await),
            None => None,
        }
    }
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_session_serializes() {
        let locks = SessionLocks::new();
        let guard = locks.acquire("abc").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("abc").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("contender acquires after release")
            .expect("task completes");
    }

    #[tokio::test]
    async fn test_different_sessions_do_not_block() {
        let locks = SessionLocks::new();
        let _a = locks.acquire("a").await;

        let b = tokio::time::timeout(Duration::from_secs(1), locks.acquire("b")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_anonymous_session_is_not_locked() {
        let locks = SessionLocks::new();
        assert!(locks.acquire_optional(None).await.is_none());
        assert!(locks.acquire_optional(Some("k")).await.is_some());
    }
}
