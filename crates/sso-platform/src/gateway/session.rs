//! Server-side sessions
//!
//! A session binds an opaque cookie value to the principal established at
//! login. Sessions have an absolute expiry and are never extended.

use std::sync::Arc;

use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use sso_common::Principal;

use super::pkce::generate_random_string;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub principal: Arc<Principal>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Session storage seam
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session for the principal and return it.
    async fn create(&self, principal: Principal) -> Session;

    /// Look up a live session. Expired sessions are removed and not returned.
    async fn get(&self, id: &str) -> Option<Session>;

    /// Remove the session, returning it if it existed.
    async fn invalidate(&self, id: &str) -> Option<Session>;

    /// Drop expired sessions; returns how many were removed.
    async fn purge_expired(&self) -> usize;
}

/// DashMap-backed session store
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, principal: Principal) -> Session {
        let now = Utc::now();
        let session = Session {
            id: generate_random_string(32),
            principal: Arc::new(principal),
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions.insert(session.id.clone(), session.clone());
        session
    }

    async fn get(&self, id: &str) -> Option<Session> {
        let session = self.sessions.get(id).map(|s| s.value().clone())?;
        if session.is_expired() {
            self.sessions.remove(id);
            return None;
        }
        Some(session)
    }

    async fn invalidate(&self, id: &str) -> Option<Session> {
        self.sessions.remove(id).map(|(_, s)| s)
    }

    async fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired());
        before.saturating_sub(self.sessions.len())
    }
}

/// Session cookie settings
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub secure: bool,
    pub same_site: SameSite,
    pub timeout_secs: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "SSO_SESSION".to_string(),
            secure: false,
            same_site: SameSite::Lax,
            timeout_secs: 1800,
        }
    }
}

impl SessionSettings {
    pub fn new(cookie_name: impl Into<String>, secure: bool, same_site: &str, timeout_secs: i64) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            secure,
            same_site: parse_same_site(same_site),
            timeout_secs,
        }
    }

    pub fn session_cookie(&self, session_id: &str) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), session_id.to_string()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(time::Duration::seconds(self.timeout_secs))
            .build()
    }

    /// Cookie that clears the session cookie in the browser.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(time::Duration::ZERO)
            .build()
    }
}

pub fn parse_same_site(value: &str) -> SameSite {
    match value.to_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}
