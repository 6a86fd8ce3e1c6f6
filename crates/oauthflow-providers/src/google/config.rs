//! Client-secret descriptor loading.
//!
//! Google Cloud Console exports OAuth clients as a JSON file with either an
//! `installed` or a `web` section. `gcloud` and a few other tools write the
//! same fields flat at the root. All three shapes decode into
//! [`ClientCredentials`].

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};

/// Google's OAuth 2.0 authorization endpoint.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google's OAuth 2.0 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth client identity and provider endpoints.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// The OAuth 2.0 client ID.
    pub client_id: String,
    /// The OAuth 2.0 client secret.
    pub client_secret: String,
    /// Where the browser is sent to grant consent.
    pub auth_endpoint: String,
    /// Where authorization codes are exchanged for tokens.
    pub token_endpoint: String,
    /// Redirect URIs registered for the client, in file order.
    pub redirect_uris: Vec<String>,
}

/// On-disk shape of the client-secret file.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

/// The `installed` / `web` section of the client-secret file.
#[derive(Debug, Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    auth_uri: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl ClientCredentials {
    /// Creates credentials pointing at Google's default endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_endpoint: GOOGLE_AUTH_URL.to_string(),
            token_endpoint: GOOGLE_TOKEN_URL.to_string(),
            redirect_uris: Vec::new(),
        }
    }

    /// Loads and validates credentials from a client-secret JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read client secret file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;
        let credentials = Self::from_json(&content)?;
        debug!(path = %path.display(), client_id = %credentials.client_id, "loaded client credentials");
        Ok(credentials)
    }

    /// Parses and validates credentials from a client-secret JSON string.
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!("failed to parse client secret JSON: {}", e))
        })?;

        let credentials = if let Some(section) = file.web.or(file.installed) {
            let mut creds = Self::new(section.client_id, section.client_secret);
            if let Some(auth_uri) = section.auth_uri {
                creds.auth_endpoint = auth_uri;
            }
            if let Some(token_uri) = section.token_uri {
                creds.token_endpoint = token_uri;
            }
            creds.redirect_uris = section.redirect_uris;
            creds
        } else if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret)
        {
            Self::new(client_id, client_secret)
        } else {
            return Err(ProviderError::configuration(
                "client secret file must contain a 'web'/'installed' section or root-level 'client_id'/'client_secret'",
            ));
        };

        credentials.validate()?;
        Ok(credentials)
    }

    /// Overrides the authorization endpoint.
    pub fn with_auth_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.auth_endpoint = endpoint.into();
        self
    }

    /// Overrides the token endpoint.
    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = endpoint.into();
        self
    }

    /// Adds a registered redirect URI.
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uris.push(uri.into());
        self
    }

    /// First registered redirect URI, used when none is configured explicitly.
    pub fn default_redirect_uri(&self) -> Option<&str> {
        self.redirect_uris.first().map(String::as_str)
    }

    /// Checks that required fields are present and endpoints are URLs.
    ///
    /// A client ID outside `.apps.googleusercontent.com` is only warned about
    /// so that test doubles and other providers keep working.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(ProviderError::configuration("client_id is required"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(ProviderError::configuration("client_secret is required"));
        }
        for (name, endpoint) in [
            ("auth_uri", &self.auth_endpoint),
            ("token_uri", &self.token_endpoint),
        ] {
            url::Url::parse(endpoint).map_err(|e| {
                ProviderError::configuration(format!("invalid {} {:?}: {}", name, endpoint, e))
            })?;
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            warn!(client_id = %self.client_id, "client_id does not look like a Google OAuth client");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    #[test]
    fn from_json_web_section() {
        let json = r#"{
            "web": {
                "client_id": "web-id.apps.googleusercontent.com",
                "client_secret": "web-secret",
                "project_id": "demo",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": ["http://localhost:8080/callback"]
            }
        }"#;

        let creds = ClientCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "web-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "web-secret");
        assert_eq!(creds.auth_endpoint, "https://accounts.google.com/o/oauth2/auth");
        assert_eq!(creds.token_endpoint, GOOGLE_TOKEN_URL);
        assert_eq!(
            creds.default_redirect_uri(),
            Some("http://localhost:8080/callback")
        );
    }

    #[test]
    fn from_json_installed_section_defaults_endpoints() {
        let json = r#"{
            "installed": {
                "client_id": "desk-id.apps.googleusercontent.com",
                "client_secret": "desk-secret"
            }
        }"#;

        let creds = ClientCredentials::from_json(json).unwrap();
        assert_eq!(creds.auth_endpoint, GOOGLE_AUTH_URL);
        assert_eq!(creds.token_endpoint, GOOGLE_TOKEN_URL);
        assert!(creds.default_redirect_uri().is_none());
    }

    #[test]
    fn from_json_flat() {
        let json = r#"{
            "client_id": "flat-id.apps.googleusercontent.com",
            "client_secret": "flat-secret",
            "refresh_token": "ignored"
        }"#;

        let creds = ClientCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "flat-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "flat-secret");
    }

    #[test]
    fn from_json_missing_secret_in_section() {
        let json = r#"{ "web": { "client_id": "only-id.apps.googleusercontent.com" } }"#;
        let err = ClientCredentials::from_json(json).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(err.message().contains("client_secret"));
    }

    #[test]
    fn from_json_no_known_shape() {
        let err = ClientCredentials::from_json(r#"{ "other": {} }"#).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(err.message().contains("client_id"));
    }

    #[test]
    fn from_json_malformed() {
        let err = ClientCredentials::from_json("not json").unwrap_err();
        assert!(err.message().contains("parse"));
    }

    #[test]
    fn from_json_empty_values_rejected() {
        let json = r#"{ "web": { "client_id": "", "client_secret": "s" } }"#;
        let err = ClientCredentials::from_json(json).unwrap_err();
        assert_eq!(err.message(), "client_id is required");
    }

    #[test]
    fn from_json_bad_endpoint_rejected() {
        let json = r#"{ "web": { "client_id": "id", "client_secret": "s", "token_uri": "not a url" } }"#;
        let err = ClientCredentials::from_json(json).unwrap_err();
        assert!(err.message().contains("token_uri"));
    }

    #[test]
    fn from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientCredentials::from_file(dir.path().join("client_secret.json")).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(err.message().contains("failed to read client secret file"));
    }

    #[test]
    fn from_file_reads_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client_secret.json");
        std::fs::write(
            &path,
            r#"{"web":{"client_id":"f.apps.googleusercontent.com","client_secret":"x"}}"#,
        )
        .unwrap();
        let creds = ClientCredentials::from_file(&path).unwrap();
        assert_eq!(creds.client_id, "f.apps.googleusercontent.com");
    }

    #[test]
    fn builder_overrides() {
        let creds = ClientCredentials::new("id", "secret")
            .with_auth_endpoint("http://127.0.0.1:9/auth")
            .with_token_endpoint("http://127.0.0.1:9/token")
            .with_redirect_uri("http://localhost/callback");
        assert_eq!(creds.auth_endpoint, "http://127.0.0.1:9/auth");
        assert_eq!(creds.token_endpoint, "http://127.0.0.1:9/token");
        assert!(creds.validate().is_ok());
    }
}
