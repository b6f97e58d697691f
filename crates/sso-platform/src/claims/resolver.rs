//! Claims Resolver
//!
//! Identity providers disagree on which claim carries which piece of the
//! user's identity (Azure AD alone may send `preferred_username`, `upn` or
//! `unique_name`). Lookups therefore walk an ordered chain of candidate names.

use sso_common::ClaimSource;

/// Username: Azure AD may use any of these depending on token version.
pub const USERNAME_CLAIMS: &[&str] = &["preferred_username", "email", "upn", "unique_name"];

/// Display name.
pub const NAME_CLAIMS: &[&str] = &["name", "given_name"];

/// Email address.
pub const EMAIL_CLAIMS: &[&str] = &["email", "preferred_username", "upn"];

/// Username for log lines, ending with the always-present subject.
pub const AUDIT_USERNAME_CLAIMS: &[&str] = &["preferred_username", "email", "upn", "unique_name", "sub"];

/// First candidate that is present and non-null, converted to text.
pub fn first_present<C>(source: &C, candidates: &[&str]) -> Option<String>
where
    C: ClaimSource + ?Sized,
{
    candidates.iter().find_map(|name| source.claim_text(name))
}

/// Resolve the first present candidate claim, or `default` when none is.
///
/// An empty string is a present value and is returned as-is.
pub fn resolve<C>(source: &C, candidates: &[&str], default: &str) -> String
where
    C: ClaimSource + ?Sized,
{
    first_present(source, candidates).unwrap_or_else(|| default.to_string())
}
