//! Gateway
//!
//! OIDC relying party in front of the application: login redirect, callback,
//! ID token validation, server-side sessions, logout and route policy
//! enforcement. Handlers see the outcome only as a session in the request
//! extensions.

pub mod id_token;
pub mod login_state;
pub mod logout_api;
pub mod middleware;
pub mod oidc_login_api;
pub mod pkce;
pub mod provider;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::policy::RoutePolicy;

pub use login_state::{LoginStateStore, OidcLoginState};
pub use middleware::{enforce_route_policy, CurrentSession, OptionalPrincipal, SessionContext};
pub use provider::{GatewayConfig, IdentityProviderClient, ProviderMetadata, TokenResponse};
pub use session::{InMemorySessionStore, Session, SessionSettings, SessionStore};

/// Gateway state shared by the login, callback and logout handlers
#[derive(Clone)]
pub struct GatewayState {
    pub provider: Arc<IdentityProviderClient>,
    pub login_states: Arc<LoginStateStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub settings: SessionSettings,
    pub policy: Arc<RoutePolicy>,
}

impl GatewayState {
    pub fn new(
        provider: Arc<IdentityProviderClient>,
        sessions: Arc<dyn SessionStore>,
        settings: SessionSettings,
        policy: Arc<RoutePolicy>,
    ) -> Self {
        let login_states = LoginStateStore::with_capacity(provider.config().max_pending_logins);
        Self {
            provider,
            login_states: Arc::new(login_states),
            sessions,
            settings,
            policy,
        }
    }

    pub fn session_context(&self) -> SessionContext {
        SessionContext {
            sessions: self.sessions.clone(),
            settings: self.settings.clone(),
            policy: self.policy.clone(),
        }
    }

    /// Periodically drop expired sessions and login states.
    pub fn spawn_cleanup(&self, interval: Duration) -> JoinHandle<()> {
        let sessions = self.sessions.clone();
        let login_states = self.login_states.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let expired_sessions = sessions.purge_expired().await;
                let expired_states = login_states.purge_expired();
                if expired_sessions > 0 || expired_states > 0 {
                    debug!(
                        sessions = expired_sessions,
                        login_states = expired_states,
                        "Purged expired entries"
                    );
                }
            }
        })
    }
}

/// Create the gateway router
pub fn gateway_router(state: GatewayState) -> Router {
    Router::new()
        .route("/oauth2/authorization/{registration_id}", get(oidc_login_api::oidc_login))
        .route("/login/oauth2/code/{registration_id}", get(oidc_login_api::oidc_callback))
        .route("/logout", get(logout_api::logout).post(logout_api::logout))
        .with_state(state)
}
