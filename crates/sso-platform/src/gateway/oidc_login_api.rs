//! OIDC Login Endpoints
//!
//! Flow:
//! 1. GET /oauth2/authorization/{registration_id} - Redirects to the identity provider
//! 2. User authenticates at the identity provider
//! 3. GET /login/oauth2/code/{registration_id}?code=...&state=... - Handles callback, creates session

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::login_state::OidcLoginState;
use super::pkce::{generate_code_challenge, generate_code_verifier, generate_random_string};
use super::GatewayState;
use crate::claims::{resolve, AUDIT_USERNAME_CLAIMS};
use crate::shared::error::{Result, SsoError};

/// Callback query parameters
#[derive(Debug, Deserialize)]
pub struct OidcCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Start the authorization code flow
pub async fn oidc_login(
    State(state): State<GatewayState>,
    Path(registration_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let config = state.provider.config();
    if registration_id != config.registration_id {
        warn!(registration_id = %registration_id, "Unknown client registration");
        return failure_redirect(&state);
    }

    let oidc_state = generate_random_string(32);
    let nonce = generate_random_string(32);
    let code_verifier = generate_code_verifier();
    let code_challenge = generate_code_challenge(&code_verifier);

    let callback_url = get_callback_url(&state, &headers);
    let auth_url = match state
        .provider
        .authorization_url(&oidc_state, &nonce, &code_challenge, &callback_url)
        .await
    {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "Failed to build authorization URL");
            return failure_redirect(&state);
        }
    };

    state.login_states.insert(OidcLoginState::new(
        oidc_state,
        nonce,
        code_verifier,
        registration_id,
        config.login_state_ttl,
    ));

    info!(issuer = %config.issuer_url, "Redirecting to OIDC provider");

    (StatusCode::SEE_OTHER, [(header::LOCATION, auth_url)]).into_response()
}

/// Handle the callback from the identity provider
pub async fn oidc_callback(
    State(state): State<GatewayState>,
    Path(registration_id): Path<String>,
    Query(params): Query<OidcCallbackParams>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    if let Some(error) = &params.error {
        warn!(
            error = %error,
            description = params.error_description.as_deref().unwrap_or(""),
            "OIDC callback error"
        );
        return failure_redirect(&state);
    }

    let code = match params.code.as_deref() {
        Some(c) if !c.is_empty() => c,
        _ => {
            warn!("No authorization code received");
            return failure_redirect(&state);
        }
    };

    let oidc_state = match params.state.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => {
            warn!("No state parameter received");
            return failure_redirect(&state);
        }
    };

    let login_state = match state
        .login_states
        .take_valid(oidc_state)
        .and_then(|s| check_registration(s, &registration_id))
    {
        Ok(s) => s,
        Err(e) => {
            warn!(state = %oidc_state, error = %e, "Rejected OIDC callback");
            return failure_redirect(&state);
        }
    };

    let callback_url = get_callback_url(&state, &headers);
    let principal = match state
        .provider
        .authenticate(code, &login_state.code_verifier, &callback_url, &login_state.nonce)
        .await
    {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "OIDC login failed");
            return failure_redirect(&state);
        }
    };

    let username = resolve(&principal, AUDIT_USERNAME_CLAIMS, "unknown");
    let session = state.sessions.create(principal).await;
    let jar = jar.add(state.settings.session_cookie(&session.id));

    info!(username = %username, "OIDC login successful");

    (
        jar,
        (
            StatusCode::SEE_OTHER,
            [(header::LOCATION, state.policy.success_url().to_string())],
        ),
    )
        .into_response()
}

fn check_registration(login_state: OidcLoginState, registration_id: &str) -> Result<OidcLoginState> {
    if login_state.registration_id != registration_id {
        return Err(SsoError::invalid_state(format!(
            "State issued for registration {}, callback for {}",
            login_state.registration_id, registration_id
        )));
    }
    Ok(login_state)
}

fn get_external_base_url(state: &GatewayState, headers: &HeaderMap) -> String {
    state
        .provider
        .config()
        .external_base_url
        .clone()
        .unwrap_or_else(|| {
            // Fall back to request host
            let host = headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("localhost");
            let scheme = if state.settings.secure { "https" } else { "http" };
            format!("{}://{}", scheme, host)
        })
}

fn get_callback_url(state: &GatewayState, headers: &HeaderMap) -> String {
    format!(
        "{}{}",
        get_external_base_url(state, headers),
        state.provider.config().callback_path()
    )
}

fn failure_redirect(state: &GatewayState) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, state.policy.failure_url().to_string())],
    )
        .into_response()
}
