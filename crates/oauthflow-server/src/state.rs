//! Shared application state.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use oauthflow_providers::google::{
    CalendarClient, ClientCredentials, OAuthClient, PhotosClient, PkceChallenge, TokenStore,
    generate_state,
};
use oauthflow_providers::http_client;

use crate::config::{ServerConfig, Variant};
use crate::error::{AppError, AppResult};
use crate::render::Templates;

/// Outstanding authorizations kept at once; the oldest is evicted beyond this.
pub const MAX_PENDING_AUTHORIZATIONS: usize = 1024;

/// An authorization redirect that has not come back yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuthorization {
    /// The `state` sent to the provider.
    pub state: String,
    /// PKCE verifier for this flow, if any.
    pub verifier: Option<String>,
    /// When the redirect was issued.
    pub issued_at: Instant,
}

/// Issued `state` values awaiting their callback.
///
/// Each state is single use: [`take`](Self::take) removes it whether or not
/// it is still fresh.
#[derive(Debug)]
pub struct PendingAuthorizations {
    ttl: Duration,
    entries: Mutex<HashMap<String, PendingAuthorization>>,
}

impl PendingAuthorizations {
    /// Creates an empty store whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Records a new authorization and returns its `state`.
    pub fn issue(&self, verifier: Option<String>) -> String {
        let state = generate_state();
        let now = Instant::now();

        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, pending| now.duration_since(pending.issued_at) < self.ttl);
        if entries.len() < before {
            debug!(expired = before - entries.len(), "purged expired authorizations");
        }
        while entries.len() >= MAX_PENDING_AUTHORIZATIONS {
            let Some(oldest) = entries
                .values()
                .min_by_key(|pending| pending.issued_at)
                .map(|pending| pending.state.clone())
            else {
                break;
            };
            entries.remove(&oldest);
            warn!(
                limit = MAX_PENDING_AUTHORIZATIONS,
                "too many pending authorizations, evicted the oldest"
            );
        }
        entries.insert(
            state.clone(),
            PendingAuthorization {
                state: state.clone(),
                verifier,
                issued_at: now,
            },
        );
        state
    }

    /// Consumes `state`, returning its authorization if it was issued and has
    /// not expired.
    pub fn take(&self, state: &str) -> Option<PendingAuthorization> {
        let pending = self.lock().remove(state)?;
        if pending.issued_at.elapsed() >= self.ttl {
            debug!("authorization state expired");
            return None;
        }
        Some(pending)
    }

    /// Number of outstanding authorizations.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when nothing is outstanding.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PendingAuthorization>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Everything the handlers need, built once at startup.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    /// Redirect URI used for both the authorization request and the exchange.
    pub redirect_uri: String,
    pub oauth: OAuthClient,
    pub calendar: CalendarClient,
    pub photos: PhotosClient,
    pub pending: PendingAuthorizations,
    pub tokens: TokenStore,
    /// Configured PKCE pair; `None` means one is generated per flow.
    pub fixed_pkce: Option<PkceChallenge>,
    pub templates: Templates,
}

impl AppState {
    /// Reads the credentials file named by `config` and builds the state.
    pub fn from_config(config: ServerConfig) -> AppResult<Self> {
        let credentials = ClientCredentials::from_file(&config.credentials_file)?;
        Self::new(config, credentials)
    }

    /// Builds the state from already loaded credentials.
    pub fn new(config: ServerConfig, credentials: ClientCredentials) -> AppResult<Self> {
        config.validate()?;
        credentials.validate()?;

        let fixed_pkce = config
            .pkce_verifier
            .as_deref()
            .map(PkceChallenge::from_verifier)
            .transpose()?;

        let http = http_client(config.timeout())?;
        let redirect_uri = config.resolve_redirect_uri(&credentials);

        let tokens = TokenStore::new(config.token_path.clone());
        if config.variant == Variant::Calendar {
            match tokens.load() {
                Ok(Some(_)) => {}
                Ok(None) => debug!("no saved token, authorization required"),
                Err(e) => warn!(error = %e, "ignoring unreadable token file"),
            }
        }

        let pkce = match config.variant {
            Variant::Photos if fixed_pkce.is_some() => "fixed",
            Variant::Photos => "per-flow",
            Variant::Calendar => "off",
        };
        info!(
            variant = ?config.variant,
            client_id = %credentials.client_id,
            redirect_uri = %redirect_uri,
            pkce,
            "application state ready"
        );

        Ok(Self {
            redirect_uri,
            oauth: OAuthClient::new(credentials, http.clone()),
            calendar: CalendarClient::with_base_url(http.clone(), &config.calendar_api_base),
            photos: PhotosClient::with_base_url(http, &config.photos_api_base),
            pending: PendingAuthorizations::new(config.state_ttl()),
            tokens,
            fixed_pkce,
            templates: Templates::new()?,
            config,
        })
    }

    /// PKCE pair for a new photos flow.
    pub fn pkce_for_flow(&self) -> PkceChallenge {
        self.fixed_pkce.clone().unwrap_or_else(PkceChallenge::generate)
    }

    /// Consumes a callback `state`, mapping an unknown one to a 400.
    pub fn consume_state(&self, state: &str) -> AppResult<PendingAuthorization> {
        self.pending.take(state).ok_or_else(|| {
            AppError::state_mismatch("unknown or expired state, restart the authorization")
        })
    }
}
