//! Command-line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use oauthflow_core::TracingConfig;

use crate::config::{ServerConfig, Variant};
use crate::error::AppResult;

/// oauthflow - Google OAuth2 authorization code demo server
#[derive(Debug, Parser)]
#[command(name = "oauthflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "OAUTHFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log in JSON format
    #[arg(long)]
    pub json_logs: bool,

    /// Log filter directive (e.g. `oauthflow=trace`); `RUST_LOG` syntax
    #[arg(long, env = "OAUTHFLOW_LOG")]
    pub log_filter: Option<String>,

    // --- Flow flags ---
    /// Which flow to serve
    #[arg(long, value_enum)]
    pub variant: Option<Variant>,

    /// Address to listen on
    #[arg(long, env = "OAUTHFLOW_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Path to the client-secret JSON downloaded from the Cloud Console
    #[arg(long, env = "OAUTHFLOW_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Where the calendar token is stored
    #[arg(long)]
    pub token_path: Option<PathBuf>,

    /// Redirect URI registered for the client
    #[arg(long)]
    pub redirect_uri: Option<String>,

    /// Fixed PKCE verifier (43-128 unreserved characters)
    #[arg(long)]
    pub pkce_verifier: Option<String>,

    /// Outbound request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Open the browser at the entry point once listening
    #[arg(long)]
    pub open: bool,
}

impl Cli {
    /// Logging setup requested on the command line.
    pub fn tracing_config(&self) -> TracingConfig {
        let config = TracingConfig::from_flags(self.debug, self.json_logs);
        match self.log_filter {
            Some(ref filter) => config.with_env_filter(filter.as_str()),
            None => config,
        }
    }

    /// Loads the config file (explicit path or default location) and applies
    /// the flags on top.
    pub fn load_config(&self) -> AppResult<ServerConfig> {
        let config = match self.config {
            Some(ref path) => ServerConfig::load_from(path)?,
            None => ServerConfig::load()?,
        };
        Ok(self.apply(config))
    }

    /// Overrides `config` with every flag that was given.
    pub fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(ref path) = self.credentials {
            config.credentials_file = path.clone();
        }
        if let Some(ref path) = self.token_path {
            config.token_path = path.clone();
        }
        if let Some(ref uri) = self.redirect_uri {
            config.redirect_uri = Some(uri.clone());
        }
        if let Some(ref verifier) = self.pkce_verifier {
            config.pkce_verifier = Some(verifier.clone());
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if self.open {
            config.open_browser = true;
        }
        config
    }
}
