//! Shared Module
//!
//! Cross-cutting concerns and shared utilities.

pub mod error;
pub mod health_api;

pub use error::{SsoError, Result};
pub use health_api::health_router;
