//! Platform Error Types

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum SsoError {
    #[error("Identity provider error: {message}")]
    Provider { message: String },

    #[error("Invalid login state: {message}")]
    InvalidState { message: String },

    #[error("Token exchange failed: {message}")]
    TokenExchange { message: String },

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SsoError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider { message: message.into() }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState { message: message.into() }
    }

    pub fn token_exchange(message: impl Into<String>) -> Self {
        Self::TokenExchange { message: message.into() }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Machine readable error code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            SsoError::Provider { .. } | SsoError::Http(_) => "PROVIDER_ERROR",
            SsoError::InvalidState { .. } => "INVALID_STATE",
            SsoError::TokenExchange { .. } => "TOKEN_EXCHANGE_FAILED",
            SsoError::InvalidToken { .. } => "INVALID_TOKEN",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SsoError::InvalidState { .. } => StatusCode::BAD_REQUEST,
            SsoError::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            SsoError::Provider { .. } | SsoError::Http(_) | SsoError::TokenExchange { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, SsoError>;

/// Error response body
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for SsoError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}
