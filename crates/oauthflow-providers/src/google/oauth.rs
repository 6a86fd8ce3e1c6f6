//! OAuth 2.0 authorization-code flow for Google APIs.
//!
//! # Flow Overview
//!
//! 1. Build the authorization URL (with a PKCE challenge for the photos flow)
//! 2. The browser grants consent and Google redirects back with `code`
//! 3. Exchange the code (with the verifier, if PKCE) for tokens
//!
//! The redirect step is driven by the HTTP server; this module only builds
//! URLs and talks to the token endpoint.

use serde::Deserialize;
use tracing::{debug, error, info};
use url::Url;

use crate::error::{ProviderError, ProviderResult};

use super::config::ClientCredentials;
use super::pkce::CODE_CHALLENGE_METHOD;

/// Parameters of a single authorization redirect.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Must match the URI later sent to the token endpoint byte for byte.
    pub redirect_uri: String,
    /// Scopes joined with spaces in the URL.
    pub scopes: Vec<String>,
    /// Per-flow CSRF token, echoed back on the callback.
    pub state: String,
    /// S256 challenge for PKCE flows.
    pub code_challenge: Option<String>,
    /// Ask for a refresh token (`access_type=offline`).
    pub offline_access: bool,
}

impl AuthorizationRequest {
    /// Creates a plain authorization request.
    pub fn new(redirect_uri: impl Into<String>, scopes: Vec<String>, state: impl Into<String>) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
            scopes,
            state: state.into(),
            code_challenge: None,
            offline_access: false,
        }
    }

    /// Attaches a PKCE challenge.
    pub fn with_code_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.code_challenge = Some(challenge.into());
        self
    }

    /// Requests offline access.
    pub fn with_offline_access(mut self, offline: bool) -> Self {
        self.offline_access = offline;
        self
    }
}

/// Response from the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// The bearer token for API requests.
    pub access_token: String,
    /// Usually `Bearer`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime of `access_token` in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Only present when offline access was granted.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Space separated scopes actually granted.
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// OAuth client bound to one set of client credentials.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    credentials: ClientCredentials,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a new OAuth client sharing the given HTTP client.
    pub fn new(credentials: ClientCredentials, http_client: reqwest::Client) -> Self {
        Self {
            credentials,
            http_client,
        }
    }

    /// Returns the credentials this client was built with.
    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Builds the provider authorization URL.
    ///
    /// Each parameter is appended exactly once, on top of whatever query the
    /// configured endpoint already carries.
    pub fn authorization_url(&self, request: &AuthorizationRequest) -> ProviderResult<Url> {
        let mut url = Url::parse(&self.credentials.auth_endpoint).map_err(|e| {
            ProviderError::configuration(format!(
                "invalid authorization endpoint {:?}: {}",
                self.credentials.auth_endpoint, e
            ))
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.credentials.client_id)
                .append_pair("redirect_uri", &request.redirect_uri)
                .append_pair("scope", &request.scopes.join(" "))
                .append_pair("state", &request.state);
            if request.offline_access {
                query.append_pair("access_type", "offline");
            }
            if let Some(ref challenge) = request.code_challenge {
                query
                    .append_pair("code_challenge", challenge)
                    .append_pair("code_challenge_method", CODE_CHALLENGE_METHOD);
            }
        }

        debug!(url = %url, "built authorization URL");
        Ok(url)
    }

    /// Exchanges an authorization code for tokens.
    ///
    /// `code_verifier` must be the verifier whose challenge went out on the
    /// authorization redirect that produced `code`.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: Option<&str>,
    ) -> ProviderResult<TokenResponse> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];
        if let Some(verifier) = code_verifier {
            params.push(("code_verifier", verifier));
        }

        debug!(
            endpoint = %self.credentials.token_endpoint,
            pkce = code_verifier.is_some(),
            "exchanging authorization code"
        );

        let response = self
            .http_client
            .post(&self.credentials.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::network(format!("token exchange request failed: {}", e))
                    .with_source(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read token response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, body = %body, "token endpoint rejected authorization code");
            return Err(ProviderError::token_exchange(format!(
                "token exchange failed ({}): {}",
                status, body
            ))
            .with_status(status.as_u16()));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            error!(body = %body, "token endpoint returned malformed JSON");
            ProviderError::invalid_response(format!("invalid token response: {}", e))
        })?;

        info!(
            token_type = %token.token_type,
            expires_in = ?token.expires_in,
            has_refresh_token = token.refresh_token.is_some(),
            "obtained access token"
        );
        Ok(token)
    }
}
