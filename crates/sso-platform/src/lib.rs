//! SSO Demo Platform
//!
//! Browser single sign-on against an external OIDC identity provider:
//! - Claims resolution with ordered fallback chains
//! - Static route authorization policy (public vs. protected)
//! - Gateway: authorization-code login, ID token validation, sessions, logout
//! - Presentation: landing/login/home pages and the user JSON API
//!
//! ## Module Organization
//!
//! - `claims` - Claims resolver and the resolved user view
//! - `policy` - Route authorization policy table
//! - `gateway` - OIDC login flow, sessions and policy enforcement middleware
//! - `web` - Page handlers, user API, templates and static assets
//! - `shared` - Errors and health endpoint

pub mod app;
pub mod claims;
pub mod gateway;
pub mod policy;
pub mod shared;
pub mod web;

// Re-export common types from shared
pub use shared::error::{SsoError, Result};

pub use sso_common::{ClaimSet, ClaimSource, Principal};

pub use app::app_router;
pub use claims::{resolve, UserView};
pub use gateway::{
    GatewayConfig, GatewayState, IdentityProviderClient, InMemorySessionStore, LoginStateStore,
    OptionalPrincipal, Session, SessionSettings, SessionStore,
};
pub use policy::{Access, RoutePolicy, UnauthenticatedAction};
pub use web::{Views, WebState};
