//! Google Photos Library API client.
//!
//! The photos flow forwards the media item listing untouched, so this client
//! never decodes the body.

use tracing::debug;

use crate::error::ProviderResult;

use super::resource::{RawResource, get_with_bearer};

/// Base URL for the Photos Library API.
pub const PHOTOS_API_BASE: &str = "https://photoslibrary.googleapis.com";

/// Google Photos Library API client.
#[derive(Debug, Clone)]
pub struct PhotosClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl PhotosClient {
    /// Creates a client against the public Photos Library API.
    pub fn new(http_client: reqwest::Client) -> Self {
        Self::with_base_url(http_client, PHOTOS_API_BASE)
    }

    /// Creates a client against another base URL.
    pub fn with_base_url(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `GET /v1/mediaItems`, returned as raw bytes.
    pub async fn list_media_items(&self, access_token: &str) -> ProviderResult<RawResource> {
        let url = format!("{}/v1/mediaItems", self.base_url);
        let resource =
            get_with_bearer(self.http_client.get(&url), access_token, "media items").await?;
        debug!(bytes = resource.body.len(), "fetched media items");
        Ok(resource)
    }
}
