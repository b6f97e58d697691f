//! User API
//!
//! - GET /api/user/me - Resolved identity of the caller
//! - GET /api/user/attributes - Raw claims of the caller
//!
//! Both answer anonymous callers instead of redirecting them.

use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::claims::{resolve, UserView, AUDIT_USERNAME_CLAIMS};
use crate::gateway::OptionalPrincipal;

/// Current user response
///
/// Anonymous callers get exactly `{"authenticated": false}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub authenticated: bool,
}

impl CurrentUserResponse {
    pub fn anonymous() -> Self {
        Self {
            username: None,
            name: None,
            email: None,
            authenticated: false,
        }
    }
}

impl From<UserView> for CurrentUserResponse {
    fn from(view: UserView) -> Self {
        Self {
            username: Some(view.username),
            name: Some(view.name),
            email: Some(view.email),
            authenticated: true,
        }
    }
}

/// Get the current user
#[utoipa::path(
    get,
    path = "/me",
    tag = "user",
    responses(
        (status = 200, description = "Current user, or {\"authenticated\": false}", body = CurrentUserResponse)
    )
)]
pub async fn get_current_user(principal: OptionalPrincipal) -> Json<CurrentUserResponse> {
    let Some(principal) = principal.0 else {
        warn!("Unauthenticated request to /api/user/me");
        return Json(CurrentUserResponse::anonymous());
    };

    let view = UserView::resolve(principal.as_ref());
    info!("User {} requested their profile information", view.username);

    Json(view.into())
}

/// Get all claims of the current user
#[utoipa::path(
    get,
    path = "/attributes",
    tag = "user",
    responses(
        (status = 200, description = "Raw claims, or {} when unauthenticated", body = Object)
    )
)]
pub async fn get_user_attributes(principal: OptionalPrincipal) -> Json<Map<String, Value>> {
    let Some(principal) = principal.0 else {
        warn!("Unauthenticated request to /api/user/attributes");
        return Json(Map::new());
    };

    let username = resolve(principal.as_ref(), AUDIT_USERNAME_CLAIMS, "unknown");
    info!("User {} requested all their attributes", username);

    Json(principal.claims().as_map().clone())
}

/// Create the user API router
pub fn user_router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_current_user))
        .routes(routes!(get_user_attributes))
}
