//! Resolved user view: the per-request projection of a principal.

use serde::Serialize;
use sso_common::ClaimSource;
use utoipa::ToSchema;

use super::resolver::{resolve, EMAIL_CLAIMS, NAME_CLAIMS, USERNAME_CLAIMS};

pub const UNKNOWN_USERNAME: &str = "Unknown";
pub const UNKNOWN_NAME: &str = "Unknown User";
pub const NO_EMAIL: &str = "No email";

/// Username, display name and email resolved from the principal's claims.
///
/// Never cached; recomputed from the principal on every request. Fields with
/// no matching claim carry the sentinel values above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserView {
    pub username: String,
    pub name: String,
    pub email: String,
}

impl UserView {
    pub fn resolve<C>(source: &C) -> Self
    where
        C: ClaimSource + ?Sized,
    {
        Self {
            username: resolve(source, USERNAME_CLAIMS, UNKNOWN_USERNAME),
            name: resolve(source, NAME_CLAIMS, UNKNOWN_NAME),
            email: resolve(source, EMAIL_CLAIMS, NO_EMAIL),
        }
    }
}
