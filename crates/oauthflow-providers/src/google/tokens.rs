//! Local token persistence.
//!
//! The calendar flow keeps its token in a plaintext `token.json` readable
//! only by the current user. Writes are serialized through a mutex and land
//! via temp file plus rename, so concurrent callbacks never interleave.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::oauth::TokenResponse;

/// A token as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    /// The access token for API requests.
    pub access_token: String,

    /// Usually `Bearer`.
    pub token_type: String,

    /// Present when offline access was granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// When the access token stops being valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Builds a stored token from a token endpoint response received `now`.
    ///
    /// An `expires_in` too large to represent is stored without an expiry.
    pub fn from_response(response: &TokenResponse, now: DateTime<Utc>) -> Self {
        let expiry = response.expires_in.and_then(|secs| {
            let expiry = Duration::try_seconds(secs).and_then(|d| now.checked_add_signed(d));
            if expiry.is_none() {
                warn!(expires_in = secs, "token lifetime out of range, storing without expiry");
            }
            expiry
        });

        Self {
            access_token: response.access_token.clone(),
            token_type: response.token_type.clone(),
            refresh_token: response.refresh_token.clone(),
            expiry,
        }
    }

    /// Returns true if the access token has expired at `now`.
    ///
    /// Tokens without an expiry never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| now >= expiry)
    }

    /// Returns true if the access token has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// File-backed token storage with an in-memory copy.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    current: Mutex<Option<StoredToken>>,
}

impl TokenStore {
    /// Creates a store for the given path; nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: Mutex::new(None),
        }
    }

    /// Returns the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the token file into memory.
    ///
    /// Returns `Ok(None)` when no file exists.
    pub fn load(&self) -> ProviderResult<Option<StoredToken>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no token file");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProviderError::storage(format!("failed to read token file: {}", e)).with_source(e)
        })?;
        let token: StoredToken = serde_json::from_str(&content).map_err(|e| {
            ProviderError::storage(format!("failed to parse token file: {}", e)).with_source(e)
        })?;

        info!(path = %self.path.display(), "loaded token from disk");
        *self.lock() = Some(token.clone());
        Ok(Some(token))
    }

    /// Returns a copy of the current token, if any.
    pub fn get(&self) -> Option<StoredToken> {
        self.lock().clone()
    }

    /// Persists `token` and makes it the current one.
    ///
    /// The lock is held for the whole write so the in-memory copy and the
    /// file always agree.
    pub fn save(&self, token: StoredToken) -> ProviderResult<()> {
        let mut current = self.lock();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::storage(format!("failed to create token directory: {}", e))
                    .with_source(e)
            })?;
        }

        let content = serde_json::to_string_pretty(&token)
            .map_err(|e| ProviderError::internal(format!("failed to serialize token: {}", e)))?;

        let temp_path = self.path.with_extension("json.tmp");
        write_private(&temp_path, content.as_bytes()).map_err(|e| {
            ProviderError::storage(format!("failed to write token file: {}", e)).with_source(e)
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ProviderError::storage(format!("failed to rename token file: {}", e)).with_source(e)
        })?;

        *current = Some(token);
        info!(path = %self.path.display(), "saved token");
        Ok(())
    }

    /// Forgets the current token and removes the file.
    pub fn clear(&self) -> ProviderResult<()> {
        let mut current = self.lock();
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                ProviderError::storage(format!("failed to remove token file: {}", e))
                    .with_source(e)
            })?;
        }
        *current = None;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<StoredToken>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates (or truncates) `path` with owner-only permissions and writes `data`.
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()?;

    // `mode` only applies on creation; a leftover temp file keeps its old bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}
