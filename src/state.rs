//! Application State
//!
//! Shared state handed to every handler: the connection pool, the live
//! session table and the resolved configuration.

use crate::{auth::models::Principal, config::AppConfig};
use dashmap::DashMap;
use sqlx::SqlitePool;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// A signed-in principal and when its token was issued
#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub issued_at: Instant,
}

pub struct AppState {
    pub db: SqlitePool,

    /// Signed-in sessions keyed by bearer token.
    /// DashMap allows concurrent access without external Mutexes.
    pub sessions: DashMap<String, Session>,

    /// Lifetime of a session token
    pub session_ttl: Duration,

    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        tracing::info!(
            event = "state.initialized",
            upload_dir = %config.upload_dir.display(),
            image_base_url = %config.image_base_url,
            session_ttl_secs = config.session_ttl_secs,
        );

        Self {
            db,
            sessions: DashMap::new(),
            session_ttl: Duration::from_secs(config.session_ttl_secs),
            config,
        }
    }

    /// Overrides the session lifetime taken from the configuration.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }

    /// Registers a new session, dropping any that have expired.
    pub fn start_session(&self, token: String, principal: Principal) {
        self.sweep_expired_sessions();
        self.sessions.insert(
            token,
            Session {
                principal,
                issued_at: Instant::now(),
            },
        );
    }

    /// Removes a session, returning its principal when it was still live
    pub fn end_session(&self, token: &str) -> Option<Principal> {
        self.sessions
            .remove(token)
            .filter(|(_, session)| !self.is_expired(session))
            .map(|(_, session)| session.principal)
    }

    /// Looks up the principal behind a session token.
    /// Expired tokens are evicted and resolve to `None`.
    pub fn principal_for(&self, token: &str) -> Option<Principal> {
        let session = self.sessions.get(token)?.value().clone();
        if self.is_expired(&session) {
            self.sessions.remove(token);
            tracing::debug!(event = "auth.session_expired", user_id = session.principal.user_id);
            return None;
        }
        Some(session.principal)
    }

    /// Drops every expired session; returns how many were removed.
    pub fn sweep_expired_sessions(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !self.is_expired(session));
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::debug!(event = "auth.sessions_swept", removed);
        }
        removed
    }

    fn is_expired(&self, session: &Session) -> bool {
        session.issued_at.elapsed() >= self.session_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    fn principal(user_id: i64) -> Principal {
        Principal {
            user_id,
            username: format!("user{}", user_id),
            email: format!("user{}@shop.io", user_id),
            roles: vec![Role::User],
        }
    }

    fn state_with_ttl(ttl: Duration) -> AppState {
        let pool = SqlitePool::connect_lazy("sqlite::memory:").unwrap();
        AppState::new(pool, AppConfig::default()).with_session_ttl(ttl)
    }

    #[tokio::test]
    async fn test_live_session_resolves() {
        let state = state_with_ttl(Duration::from_secs(60));
        state.start_session("tok".into(), principal(1));

        assert_eq!(state.principal_for("tok").map(|p| p.user_id), Some(1));
        assert_eq!(state.principal_for("other"), None);
        assert_eq!(state.end_session("tok").map(|p| p.user_id), Some(1));
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_evicted() {
        let state = state_with_ttl(Duration::from_millis(20));
        state.start_session("old".into(), principal(1));
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(state.principal_for("old"), None);
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_sweeps_expired_sessions() {
        let state = state_with_ttl(Duration::from_millis(20));
        state.start_session("a".into(), principal(1));
        state.start_session("b".into(), principal(2));
        tokio::time::sleep(Duration::from_millis(40)).await;

        state.start_session("c".into(), principal(3));
        assert_eq!(state.sessions.len(), 1);
        assert!(state.sessions.contains_key("c"));
        assert_eq!(state.end_session("a"), None);
    }
}
