//! Logout Endpoint
//!
//! - GET|POST /logout - Ends the session and returns to the landing page

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use super::middleware::CurrentSession;
use super::GatewayState;

pub async fn logout(
    State(state): State<GatewayState>,
    CurrentSession(session): CurrentSession,
    jar: CookieJar,
) -> Response {
    if let Some(session) = session {
        // Authentication name as established at login, not re-resolved
        info!("User {} logged out successfully", session.principal.name());
        state.sessions.invalidate(&session.id).await;
    }

    let jar = jar.add(state.settings.removal_cookie());

    (
        jar,
        (
            StatusCode::SEE_OTHER,
            [(header::LOCATION, state.policy.logout_success_url().to_string())],
        ),
    )
        .into_response()
}
