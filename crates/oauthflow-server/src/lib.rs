//! HTTP server for the Google OAuth2 calendar and photos flows.
//!
//! This crate provides:
//! - [`ServerConfig`] loaded from TOML and command-line flags
//! - [`AppState`] shared by every handler
//! - [`router`] with the routes for the configured [`Variant`]
//! - [`serve`] binding the listener and running until SIGTERM/SIGINT
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use oauthflow_server::{AppState, ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::load()?;
//!     let state = AppState::from_config(config)?;
//!     serve(Arc::new(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
mod config;
mod error;
mod render;
pub mod routes;
mod signals;
mod state;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

pub use config::{ServerConfig, Variant};
pub use error::{AppError, AppResult};
pub use render::Templates;
pub use routes::router;
pub use signals::shutdown_signal;
pub use state::{AppState, PendingAuthorization, PendingAuthorizations};

/// Binds the configured address and serves until a shutdown signal arrives.
pub async fn serve(state: Arc<AppState>) -> AppResult<()> {
    let listener = TcpListener::bind(state.config.listen).await?;
    let addr = listener.local_addr()?;
    let entry_url = format!("http://{}{}", addr, state.config.variant.entry_path());
    info!(
        variant = ?state.config.variant,
        "Server running on http://{}, start at {}",
        addr,
        entry_url
    );

    if state.config.open_browser
        && let Err(e) = open::that(&entry_url)
    {
        warn!(error = %e, url = %entry_url, "failed to open browser");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
