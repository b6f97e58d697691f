//! Page Handlers
//!
//! - GET / - Landing page
//! - GET /login - Login page with error/logout notices
//! - GET /home - Resolved identity and claims of the signed-in user
//! - GET /error - Error page
//! - fallback - Error page with 404

use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use sso_common::value_to_text;
use tracing::{debug, info};

use super::templates::View;
use super::WebState;
use crate::claims::UserView;
use crate::gateway::OptionalPrincipal;
use crate::shared::error::Result;

#[derive(Debug, Serialize)]
struct IndexModel {
    authenticated: bool,
    username: Option<String>,
    login_url: String,
}

/// Presence of `error` or `logout` switches the matching notice on,
/// whatever the value.
#[derive(Debug, Default, Deserialize)]
pub struct LoginParams {
    pub error: Option<String>,
    pub logout: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginModel {
    error: bool,
    logout: bool,
    login_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimRow {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
struct HomeModel {
    authenticated: bool,
    login_url: String,
    #[serde(flatten)]
    user: Option<UserView>,
    attributes: Vec<ClaimRow>,
}

#[derive(Debug, Serialize)]
struct ErrorModel {
    status: u16,
    error: String,
    message: String,
    path: Option<String>,
}

pub async fn index(State(web): State<WebState>, principal: OptionalPrincipal) -> Result<Html<String>> {
    debug!("Landing page accessed");

    let model = IndexModel {
        authenticated: principal.is_some(),
        username: principal.as_deref().map(|p| UserView::resolve(p).username),
        login_url: web.login_url.clone(),
    };
    web.views.render(View::Index, &model)
}

pub async fn login(State(web): State<WebState>, Query(params): Query<LoginParams>) -> Result<Html<String>> {
    debug!("Login page accessed");

    let model = LoginModel {
        error: params.error.is_some(),
        logout: params.logout.is_some(),
        login_url: web.login_url.clone(),
    };
    web.views.render(View::Login, &model)
}

pub async fn home(State(web): State<WebState>, principal: OptionalPrincipal) -> Result<Html<String>> {
    let model = match principal.as_deref() {
        Some(principal) => {
            let view = UserView::resolve(principal);
            info!("User {} accessed home page", view.username);
            HomeModel {
                authenticated: true,
                login_url: web.login_url.clone(),
                user: Some(view),
                attributes: claim_rows(principal.claims().iter()),
            }
        }
        None => HomeModel {
            authenticated: false,
            login_url: web.login_url.clone(),
            user: None,
            attributes: Vec::new(),
        },
    };
    web.views.render(View::Home, &model)
}

pub async fn error_page(State(web): State<WebState>) -> Result<Html<String>> {
    let model = ErrorModel {
        status: 500,
        error: "Error".to_string(),
        message: "Something went wrong. Please try again.".to_string(),
        path: None,
    };
    web.views.render(View::Error, &model)
}

pub async fn not_found(State(web): State<WebState>, uri: Uri) -> Result<Response> {
    let model = ErrorModel {
        status: 404,
        error: "Not Found".to_string(),
        message: "The requested page does not exist.".to_string(),
        path: Some(uri.path().to_string()),
    };
    let page = web.views.render(View::Error, &model)?;
    Ok((StatusCode::NOT_FOUND, page).into_response())
}

/// Claims as display rows, sorted by claim name.
pub fn claim_rows<'a, I>(claims: I) -> Vec<ClaimRow>
where
    I: Iterator<Item = (&'a String, &'a serde_json::Value)>,
{
    let mut rows: Vec<ClaimRow> = claims
        .map(|(name, value)| ClaimRow {
            name: name.clone(),
            value: value_to_text(value).unwrap_or_else(|| "null".to_string()),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

/// Create the pages router; unknown paths fall back to the 404 page.
pub fn pages_router(state: WebState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/home", get(home))
        .route("/error", get(error_page))
        .fallback(not_found)
        .with_state(state)
}
