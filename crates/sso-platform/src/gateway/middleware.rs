//! Authentication Middleware
//!
//! Resolves the session cookie to a session, exposes it to handlers through
//! request extensions and enforces the route policy for unauthenticated
//! requests.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use sso_common::Principal;
use tracing::debug;

use super::session::{Session, SessionSettings, SessionStore};
use crate::policy::{RoutePolicy, UnauthenticatedAction};

/// State for the policy enforcement layer
#[derive(Clone)]
pub struct SessionContext {
    pub sessions: Arc<dyn SessionStore>,
    pub settings: SessionSettings,
    pub policy: Arc<RoutePolicy>,
}

pub async fn enforce_route_policy(
    State(ctx): State<SessionContext>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match jar.get(&ctx.settings.cookie_name) {
        Some(cookie) => ctx.sessions.get(cookie.value()).await,
        None => None,
    };

    if let Some(session) = session {
        request.extensions_mut().insert(session);
        return next.run(request).await;
    }

    let path = request.uri().path();
    if !ctx.policy.is_public(path) {
        match ctx.policy.unauthenticated_action(path) {
            UnauthenticatedAction::RedirectToLogin => {
                debug!(path = %path, "Unauthenticated request to protected path, redirecting to login");
                return (
                    StatusCode::FOUND,
                    [(header::LOCATION, ctx.policy.login_page().to_string())],
                )
                    .into_response();
            }
            UnauthenticatedAction::Continue => {}
        }
    }

    next.run(request).await
}

/// Current session, if the request carries a live session cookie
pub struct CurrentSession(pub Option<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(parts.extensions.get::<Session>().cloned()))
    }
}

/// Authenticated principal, or `None` for anonymous requests
pub struct OptionalPrincipal(pub Option<Arc<Principal>>);

impl std::ops::Deref for OptionalPrincipal {
    type Target = Option<Arc<Principal>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for OptionalPrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalPrincipal(
            parts.extensions.get::<Session>().map(|s| s.principal.clone()),
        ))
    }
}
