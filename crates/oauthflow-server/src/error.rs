//! Server error types.
//!
//! Every handler returns [`AppResult`]. Errors are logged once, when they are
//! turned into a response, and the browser only ever sees a short message:
//! the reason for 4xx, a generic line for 5xx.

use std::io;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use oauthflow_core::WindowError;
use oauthflow_providers::ProviderError;

/// Result type for server operations.
pub type AppResult<T> = Result<T, AppError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Startup configuration is missing or invalid.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Token exchange, resource request or token storage failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The request itself is malformed.
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// The callback `state` was never issued, already used, or expired.
    #[error("State mismatch: {message}")]
    StateMismatch { message: String },

    /// The user declined consent or the provider reported an error.
    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    /// The events page failed to render.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// IO error (listener, file, etc.).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Unexpected internal state.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a state mismatch error.
    pub fn state_mismatch(message: impl Into<String>) -> Self {
        Self::StateMismatch {
            message: message.into(),
        }
    }

    /// Creates an authorization denied error.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            reason: reason.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status sent to the browser.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. }
            | Self::StateMismatch { .. }
            | Self::AuthorizationDenied { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True when the failure came from a Google endpoint rather than from
    /// this process (storage, config, templates).
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Provider(err) if err.code().is_upstream())
    }
}

impl From<WindowError> for AppError {
    fn from(err: WindowError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_client_error() {
            warn!(status = status.as_u16(), error = %self, "rejecting request");
            return (status, self.to_string()).into_response();
        }

        match &self {
            Self::Provider(err) if self.is_upstream() => warn!(
                code = %err.code(),
                upstream_status = ?err.status(),
                error = %err,
                "upstream call failed"
            ),
            Self::Provider(err) => error!(
                code = %err.code(),
                upstream_status = ?err.status(),
                error = %err,
                "provider call failed"
            ),
            Self::Template(err) => error!(error = ?err, "error rendering template"),
            other => error!(error = %other, "request failed"),
        }
        (status, "Internal server error").into_response()
    }
}
