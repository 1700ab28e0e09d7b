//! Sessions live in memory, keyed by a random v4 UUID carried in the `cedica_session` cookie.
//! Registration step tokens and pending Google sign-in states are kept here too.
//! A session idle for longer than the store's TTL is gone: lookups refuse it and every new
//! login sweeps the expired ones out.

use super::google::OAuthFlow;
use crate::config::settings::DEFAULT_SESSION_TTL_MINUTES;
use crate::config::ADMIN_ROLE;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "cedica_session";

/// How long a Google `state` stays valid.
const OAUTH_STATE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
    pub alias: String,
    pub system_admin: bool,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    #[serde(skip)]
    step_tokens: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new(
        user_id: i64,
        email: String,
        alias: String,
        system_admin: bool,
        roles: Vec<String>,
        permissions: Vec<String>,
    ) -> Self {
        Session {
            user_id,
            email,
            alias,
            system_admin,
            roles,
            permissions,
            step_tokens: HashMap::new(),
            created_at: Utc::now(),
            last_seen: Utc::now(),
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.system_admin || self.permissions.iter().any(|p| p == permission)
    }

    pub fn is_admin(&self) -> bool {
        self.system_admin || self.roles.iter().any(|r| r == ADMIN_ROLE)
    }
}

struct PendingState {
    flow: OAuthFlow,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    oauth_states: Arc<RwLock<HashMap<String, PendingState>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }
}

pub fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn step_key(step: &str, rider_id: i64) -> String {
    format!("{}:{}", step, rider_id)
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        SessionStore {
            sessions: Arc::default(),
            oauth_states: Arc::default(),
            ttl,
        }
    }

    fn expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        session.last_seen + self.ttl <= now
    }

    pub async fn create(&self, mut session: Session) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        session.last_seen = now;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !self.expired(s, now));
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "expired sessions dropped");
        }
        tracing::info!(user_id = session.user_id, "session created");
        sessions.insert(id, session);
        id
    }

    /// The live session for `id`, refreshing its idle clock. An expired one is dropped.
    pub async fn get(&self, id: &Uuid) -> Option<Session> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        if self.expired(session, now) {
            tracing::info!(user_id = session.user_id, "session expired");
            sessions.remove(id);
            return None;
        }
        session.last_seen = now;
        Some(session.clone())
    }

    /// Sessions currently held, expired ones not yet swept included.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn remove(&self, id: &Uuid) -> Option<Session> {
        self.sessions.write().await.remove(id)
    }

    /// Drops every session of `user_id`, e.g. after the account is blocked.
    pub async fn remove_user(&self, user_id: i64) {
        self.sessions.write().await.retain(|_, s| s.user_id != user_id);
    }

    /// Issues the one-time token that unlocks `step` of the registration of `rider_id`.
    pub async fn issue_step_token(&self, id: &Uuid, step: &str, rider_id: i64) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        let token = random_token();
        session.step_tokens.insert(step_key(step, rider_id), token.clone());
        Some(token)
    }

    /// True when `token` matches the stored one. The stored token is consumed on a match.
    pub async fn consume_step_token(&self, id: &Uuid, step: &str, rider_id: i64, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(id) else {
            return false;
        };
        let key = step_key(step, rider_id);
        match session.step_tokens.get(&key) {
            Some(stored) if !token.is_empty() && stored == token => {
                session.step_tokens.remove(&key);
                true
            }
            _ => false,
        }
    }

    pub async fn remember_state(&self, state: String, flow: OAuthFlow) {
        let mut states = self.oauth_states.write().await;
        let cutoff = Utc::now() - Duration::minutes(OAUTH_STATE_TTL_MINUTES);
        states.retain(|_, p| p.created_at > cutoff);
        states.insert(
            state,
            PendingState {
                flow,
                created_at: Utc::now(),
            },
        );
    }

    /// The flow a `state` was issued for, once. Expired states are not returned.
    pub async fn take_state(&self, state: &str) -> Option<OAuthFlow> {
        let pending = self.oauth_states.write().await.remove(state)?;
        let cutoff = Utc::now() - Duration::minutes(OAUTH_STATE_TTL_MINUTES);
        (pending.created_at > cutoff).then_some(pending.flow)
    }
}

/// Session id from the request's `Cookie` headers.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: &Uuid, secure: bool, max_age_secs: i64) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, id, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn session(roles: &[&str], permissions: &[&str]) -> Session {
        Session::new(
            1,
            "ana@mail.com".into(),
            "ana".into(),
            false,
            roles.iter().map(|r| r.to_string()).collect(),
            permissions.iter().map(|p| p.to_string()).collect(),
        )
    }

    #[test]
    fn permissions_and_admin_role() {
        let s = session(&["Tecnica"], &["rider_index"]);
        assert!(s.has_permission("rider_index"));
        assert!(!s.has_permission("rider_destroy"));
        assert!(!s.is_admin());
        assert!(session(&["Administracion"], &[]).is_admin());
        let mut sys = session(&[], &[]);
        sys.system_admin = true;
        assert!(sys.has_permission("anything"));
        assert!(sys.is_admin());
    }

    #[tokio::test]
    async fn step_tokens_are_single_use() {
        let store = SessionStore::new();
        let id = store.create(session(&[], &[])).await;
        let token = store.issue_step_token(&id, "disability", 7).await.unwrap();
        assert!(!store.consume_step_token(&id, "disability", 8, &token).await);
        assert!(!store.consume_step_token(&id, "tutors", 7, &token).await);
        assert!(store.consume_step_token(&id, "disability", 7, &token).await);
        assert!(!store.consume_step_token(&id, "disability", 7, &token).await);
    }

    #[tokio::test]
    async fn oauth_states_are_taken_once() {
        let store = SessionStore::new();
        store.remember_state("abc".into(), OAuthFlow::Register).await;
        assert_eq!(store.take_state("abc").await, Some(OAuthFlow::Register));
        assert_eq!(store.take_state("abc").await, None);
    }

    #[test]
    fn reads_cookie_among_others() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}", SESSION_COOKIE, id)).unwrap(),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));
        let cookie = session_cookie(&id, true, 3600);
        assert!(cookie.contains("; Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::with_ttl(Duration::minutes(30));
        let id = store.create(session(&[], &[])).await;
        assert!(store.get(&id).await.is_some());
        if let Some(s) = store.sessions.write().await.get_mut(&id) {
            s.last_seen = Utc::now() - Duration::minutes(31);
        }
        assert!(store.get(&id).await.is_none());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn new_logins_sweep_expired_sessions() {
        let store = SessionStore::with_ttl(Duration::minutes(30));
        let stale = store.create(session(&[], &[])).await;
        let fresh = store.create(session(&[], &[])).await;
        if let Some(s) = store.sessions.write().await.get_mut(&stale) {
            s.last_seen = Utc::now() - Duration::hours(2);
        }
        store.create(session(&[], &[])).await;
        assert_eq!(store.count().await, 2);
        assert!(store.get(&fresh).await.is_some());
    }

    #[tokio::test]
    async fn lookups_keep_a_session_alive() {
        let store = SessionStore::with_ttl(Duration::minutes(30));
        let id = store.create(session(&[], &[])).await;
        if let Some(s) = store.sessions.write().await.get_mut(&id) {
            s.last_seen = Utc::now() - Duration::minutes(29);
        }
        assert!(store.get(&id).await.is_some());
        let seen = store.sessions.read().await.get(&id).map(|s| s.last_seen);
        assert!(seen.is_some_and(|t| t > Utc::now() - Duration::minutes(1)));
    }
}
