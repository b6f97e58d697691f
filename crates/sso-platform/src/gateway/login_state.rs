//! OIDC Login State
//!
//! Pending authorization requests, keyed by the `state` parameter sent to
//! the identity provider. Used to correlate the callback with the original
//! login request: the state value doubles as the CSRF token, the nonce is
//! checked against the ID token and the PKCE verifier is kept here while
//! only the challenge goes to the provider.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::shared::error::{Result, SsoError};

/// Default lifetime of a pending login: 10 minutes
pub const DEFAULT_STATE_TTL_SECONDS: i64 = 600;

/// Default cap on pending logins held at once
pub const DEFAULT_MAX_PENDING_LOGINS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct OidcLoginState {
    pub state: String,
    pub nonce: String,
    pub code_verifier: String,
    /// Client registration the login was started for
    pub registration_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OidcLoginState {
    pub fn new(
        state: impl Into<String>,
        nonce: impl Into<String>,
        code_verifier: impl Into<String>,
        registration_id: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            state: state.into(),
            nonce: nonce.into(),
            code_verifier: code_verifier.into(),
            registration_id: registration_id.into(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// In-memory store of pending logins. States are single use.
///
/// Bounded: once full, expired entries are purged, then the oldest pending
/// login is evicted.
pub struct LoginStateStore {
    states: DashMap<String, OidcLoginState>,
    max_pending: usize,
}

impl Default for LoginStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginStateStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_PENDING_LOGINS)
    }

    pub fn with_capacity(max_pending: usize) -> Self {
        Self {
            states: DashMap::new(),
            max_pending: max_pending.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_pending
    }

    pub fn insert(&self, login_state: OidcLoginState) {
        if self.states.len() >= self.max_pending {
            self.purge_expired();
        }
        while self.states.len() >= self.max_pending {
            let Some(oldest) = self.oldest_state() else {
                break;
            };
            if self.states.remove(&oldest).is_some() {
                warn!(max_pending = self.max_pending, "Pending login limit reached, evicted oldest");
            }
        }
        self.states.insert(login_state.state.clone(), login_state);
    }

    fn oldest_state(&self) -> Option<String> {
        self.states
            .iter()
            .min_by_key(|entry| entry.created_at)
            .map(|entry| entry.key().clone())
    }

    /// Remove and return the state if it exists and has not expired.
    ///
    /// The entry is consumed either way, so a replayed callback fails.
    pub fn take_valid(&self, state: &str) -> Result<OidcLoginState> {
        let (_, login_state) = self
            .states
            .remove(state)
            .ok_or_else(|| SsoError::invalid_state("Unknown or already used state"))?;
        if login_state.is_expired() {
            debug!(state = %state, "Login state expired");
            return Err(SsoError::invalid_state("Login state expired"));
        }
        Ok(login_state)
    }

    /// Drop expired entries; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.states.len();
        self.states.retain(|_, s| !s.is_expired());
        before.saturating_sub(self.states.len())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
