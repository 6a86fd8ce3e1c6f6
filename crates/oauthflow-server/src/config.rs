//! Server configuration.
//!
//! Settings come from an optional `config.toml` (by default
//! `~/.config/oauthflow/config.toml`) and are then overridden by command-line
//! flags. Every field has a default, so an empty file or no file at all
//! gives a working calendar server on `127.0.0.1:8080`.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use oauthflow_providers::google::{
    CALENDAR_API_BASE, CALENDAR_READONLY_SCOPE, ClientCredentials, PHOTOS_API_BASE,
    PHOTOS_READONLY_SCOPE, validate_verifier,
};

use crate::error::{AppError, AppResult};

/// Which of the two demo flows the server runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Standard authorization code flow, token saved to disk, HTML event list.
    #[default]
    Calendar,
    /// PKCE flow, token kept in memory, raw media item JSON.
    Photos,
}

impl Variant {
    /// Path that starts the authorization redirect.
    pub fn entry_path(&self) -> &'static str {
        match self {
            Self::Calendar => "/",
            Self::Photos => "/start",
        }
    }
}

/// Configuration for the oauthflow server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Flow to serve.
    pub variant: Variant,

    /// Address the HTTP server binds to.
    pub listen: SocketAddr,

    /// Path to the Cloud Console client-secret JSON.
    pub credentials_file: PathBuf,

    /// Where the calendar flow stores its token.
    pub token_path: PathBuf,

    /// Redirect URI sent to Google.
    ///
    /// Falls back to the first `redirect_uris` entry of the credentials file,
    /// then to `http://localhost:{port}/callback`.
    pub redirect_uri: Option<String>,

    /// Scopes requested by the calendar flow.
    pub calendar_scopes: Vec<String>,

    /// Scopes requested by the photos flow.
    pub photos_scopes: Vec<String>,

    /// Fixed PKCE verifier. A fresh one is generated per flow when unset.
    pub pkce_verifier: Option<String>,

    /// Timeout for every outbound HTTP call, in seconds.
    pub timeout_secs: u64,

    /// How long an issued `state` stays valid, in seconds.
    pub state_ttl_secs: u64,

    /// Calendar API base URL.
    pub calendar_api_base: String,

    /// Photos Library API base URL.
    pub photos_api_base: String,

    /// Open the browser at the entry point once listening.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            listen: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            credentials_file: PathBuf::from("client_secret.json"),
            token_path: PathBuf::from("token.json"),
            redirect_uri: None,
            calendar_scopes: vec![CALENDAR_READONLY_SCOPE.to_string()],
            photos_scopes: vec![PHOTOS_READONLY_SCOPE.to_string()],
            pkce_verifier: None,
            timeout_secs: 30,
            state_ttl_secs: 600,
            calendar_api_base: CALENDAR_API_BASE.to_string(),
            photos_api_base: PHOTOS_API_BASE.to_string(),
            open_browser: false,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the default path, or defaults if it is absent.
    pub fn load() -> AppResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oauthflow")
            .join("config.toml")
    }

    /// Scopes for the configured variant.
    pub fn scopes(&self) -> &[String] {
        match self.variant {
            Variant::Calendar => &self.calendar_scopes,
            Variant::Photos => &self.photos_scopes,
        }
    }

    /// Outbound request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Lifetime of a pending authorization.
    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state_ttl_secs)
    }

    /// Picks the redirect URI: explicit setting, credentials file, then localhost.
    pub fn resolve_redirect_uri(&self, credentials: &ClientCredentials) -> String {
        self.redirect_uri
            .clone()
            .or_else(|| credentials.default_redirect_uri().map(String::from))
            .unwrap_or_else(|| format!("http://localhost:{}/callback", self.listen.port()))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.scopes().is_empty() {
            return Err(AppError::config(
                "at least one OAuth scope is required for the selected variant",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::config("timeout_secs must be greater than zero"));
        }
        if self.state_ttl_secs == 0 {
            return Err(AppError::config("state_ttl_secs must be greater than zero"));
        }
        if let Some(ref uri) = self.redirect_uri
            && !(uri.starts_with("http://") || uri.starts_with("https://"))
        {
            return Err(AppError::config(format!(
                "redirect_uri must be an http(s) URL, got {:?}",
                uri
            )));
        }
        if let Some(ref verifier) = self.pkce_verifier {
            validate_verifier(verifier).map_err(|e| AppError::config(e.message().to_string()))?;
        }
        Ok(())
    }
}
