//! Error types for OAuth and Google API operations.
//!
//! Every fallible call in this crate returns a [`ProviderError`] carrying a
//! [`ProviderErrorCode`]; the server maps the code onto an HTTP status.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Client-secret descriptor or settings are missing or invalid.
    ConfigurationError,
    /// The token endpoint rejected the authorization code.
    TokenExchangeFailed,
    /// A protected resource request returned a non-success status.
    ResourceRequestFailed,
    /// The provider answered with a body we could not decode.
    InvalidResponse,
    /// Connection failed, timed out, or the body could not be read.
    NetworkError,
    /// Reading or writing the local token file failed.
    StorageError,
    /// Unexpected internal state.
    InternalError,
}

impl ProviderErrorCode {
    /// Returns a stable snake_case name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigurationError => "configuration_error",
            Self::TokenExchangeFailed => "token_exchange_failed",
            Self::ResourceRequestFailed => "resource_request_failed",
            Self::InvalidResponse => "invalid_response",
            Self::NetworkError => "network_error",
            Self::StorageError => "storage_error",
            Self::InternalError => "internal_error",
        }
    }

    /// Returns true when the failure came from talking to the provider
    /// rather than from local setup.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::TokenExchangeFailed
                | Self::ResourceRequestFailed
                | Self::InvalidResponse
                | Self::NetworkError
        )
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while running an OAuth flow or calling an API.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// HTTP status returned by the provider, when there was one.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Creates a token exchange error.
    pub fn token_exchange(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::TokenExchangeFailed, message)
    }

    /// Creates a resource request error.
    pub fn resource_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ResourceRequestFailed, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates a token storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::StorageError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// Records the HTTP status the provider answered with.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the upstream HTTP status, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }
        Ok(())
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
