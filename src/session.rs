use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use metrics::gauge;
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

/// Explicit seller identity passed to every wallet operation.
///
/// A session starts live and ends exactly once, on logout. Work bound to a
/// session watches [`Session::ended`] and stops when it fires.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    id: Uuid,
    token: String,
    live: watch::Sender<bool>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        let (live, _) = watch::channel(true);
        Self {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4(),
                token: token.into(),
                live,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Bearer token forwarded to the Bookify backend.
    pub fn token(&self) -> &str {
        &self.inner.token
    }

    pub fn is_active(&self) -> bool {
        *self.inner.live.borrow()
    }

    /// Tear the session down. Idempotent.
    pub fn end(&self) {
        if self.inner.live.send_replace(false) {
            tracing::info!(seller_session = %self.id(), "Seller session ended");
        }
    }

    #[cfg(test)]
    pub(crate) fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Resolves once the session has ended (immediately if it already has).
    pub async fn ended(&self) {
        let mut rx = self.inner.live.subscribe();
        let _ = rx.wait_for(|live| !*live).await;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

/// Live sessions keyed by bearer token.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live session for `token`, creating it on first use.
    pub async fn open(&self, token: &str) -> Session {
        let mut sessions = self.sessions.lock().await;
        if let Some(existing) = sessions.get(token) {
            if existing.is_active() {
                return existing.clone();
            }
        }

        let session = Session::new(token);
        tracing::debug!(seller_session = %session.id(), "Seller session opened");
        sessions.insert(token.to_string(), session.clone());
        record_active(sessions.len());
        session
    }

    /// End and forget the session for `token`. Returns false if none was open.
    pub async fn close(&self, token: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        let removed = sessions.remove(token);
        record_active(sessions.len());
        drop(sessions);

        match removed {
            Some(session) => {
                session.end();
                true
            }
            None => false,
        }
    }

    /// Drop a session the backend refused. Only `session` itself is removed;
    /// a newer session opened for the same token is left alone.
    pub async fn evict(&self, session: &Session) -> bool {
        let mut sessions = self.sessions.lock().await;
        let evicted = sessions
            .get(session.token())
            .is_some_and(|current| current.id() == session.id());
        if evicted {
            sessions.remove(session.token());
        }
        record_active(sessions.len());
        drop(sessions);

        session.end();
        if evicted {
            tracing::debug!(seller_session = %session.id(), "Rejected seller session evicted");
        }
        evicted
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

fn record_active(count: usize) {
    gauge!("wallet_active_sessions").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn open_reuses_live_session_for_same_token() {
        let registry = SessionRegistry::new();
        let a = registry.open("tok_1").await;
        let b = registry.open("tok_1").await;
        let c = registry.open("tok_2").await;

        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(registry.active_count().await, 2);
    }

    #[tokio::test]
    async fn close_ends_session_and_wakes_waiters() {
        let registry = SessionRegistry::new();
        let session = registry.open("tok_1").await;

        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.ended().await })
        };

        assert!(registry.close("tok_1").await);
        assert!(!session.is_active());
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();

        assert!(!registry.close("tok_1").await);

        // A fresh login gets a new session.
        let again = registry.open("tok_1").await;
        assert_ne!(again.id(), session.id());
        assert!(again.is_active());
    }

    #[tokio::test]
    async fn evict_leaves_a_newer_session_for_the_same_token() {
        let registry = SessionRegistry::new();
        let rejected = registry.open("tok_1").await;

        assert!(registry.evict(&rejected).await);
        assert!(!rejected.is_active());
        assert_eq!(registry.active_count().await, 0);

        let fresh = registry.open("tok_1").await;
        assert!(!registry.evict(&rejected).await);
        assert!(fresh.is_active());
        assert_eq!(registry.active_count().await, 1);
    }

    #[test]
    fn debug_output_hides_token() {
        let session = Session::new("super-secret");
        let printed = format!("{session:?}");
        assert!(!printed.contains("super-secret"));
    }
}
