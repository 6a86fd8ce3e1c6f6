//! Google OAuth2 flows and the API clients they unlock.
//!
//! This crate holds everything that talks to Google:
//!
//! - [`google::ClientCredentials`] - client-secret descriptor loading
//! - [`google::PkceChallenge`] - RFC 7636 verifier/challenge pairs
//! - [`google::OAuthClient`] - authorization URLs and code exchange
//! - [`google::TokenStore`] - the local `token.json`
//! - [`google::CalendarClient`] / [`google::PhotosClient`] - bearer-token resource calls
//! - [`ProviderError`] - error type shared by all of the above
//!
//! ```text
//! client_secret.json ──► ClientCredentials ──► OAuthClient
//!                                                 │
//!        browser ◄── authorization_url ◄──────────┤
//!        callback ──► exchange_code ──────────────┘
//!                          │
//!                          ▼
//!                  CalendarClient / PhotosClient
//! ```

pub mod error;
pub mod google;

use std::time::Duration;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};

/// Builds the HTTP client shared by every outbound call.
pub fn http_client(timeout: Duration) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(format!("oauthflow/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::configuration(format!("failed to create HTTP client: {}", e)))
}
