//! Route authorization policy.

pub mod route_policy;

pub use route_policy::{
    Access, PathPattern, RoutePolicy, RouteRule, UnauthenticatedAction, PUBLIC_PATTERNS,
};
