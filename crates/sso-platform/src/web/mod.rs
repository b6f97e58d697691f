//! Presentation Layer
//!
//! HTML pages, the user JSON API, templates and static assets.

pub mod pages_api;
pub mod static_assets;
pub mod templates;
pub mod user_api;

use std::sync::Arc;

pub use pages_api::pages_router;
pub use static_assets::static_router;
pub use templates::{View, Views};
pub use user_api::{user_router, CurrentUserResponse};

/// State for the page handlers
#[derive(Clone)]
pub struct WebState {
    pub views: Arc<Views>,
    /// Entry point of the login flow, linked from the landing and login pages
    pub login_url: String,
}

impl WebState {
    pub fn new(views: Arc<Views>, registration_id: &str) -> Self {
        Self {
            views,
            login_url: format!("/oauth2/authorization/{}", registration_id),
        }
    }
}
