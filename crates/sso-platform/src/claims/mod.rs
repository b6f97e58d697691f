//! Claims
//!
//! Fallback lookup of claims on the authenticated principal.

pub mod resolver;
pub mod user_view;

pub use resolver::{
    first_present, resolve, AUDIT_USERNAME_CLAIMS, EMAIL_CLAIMS, NAME_CLAIMS, USERNAME_CLAIMS,
};
pub use user_view::{UserView, NO_EMAIL, UNKNOWN_NAME, UNKNOWN_USERNAME};
