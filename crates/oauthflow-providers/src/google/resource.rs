//! Bearer-authenticated GET shared by the resource clients.

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tracing::warn;

use crate::error::{ProviderError, ProviderResult};

/// A successful response body, untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResource {
    /// `Content-Type` as sent by the provider.
    pub content_type: Option<String>,
    /// Raw response bytes.
    pub body: Vec<u8>,
}

/// Sends `request` with `Authorization: Bearer {token}` and returns the body.
///
/// Anything other than 2xx, and any transport failure, is a resource request
/// error; the body is never handed back on failure.
pub(crate) async fn get_with_bearer(
    request: reqwest::RequestBuilder,
    access_token: &str,
    what: &str,
) -> ProviderResult<RawResource> {
    let response = request
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| transport_error(what, "request failed", e))?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, resource = what, body = %body, "resource request failed");
        let message = match status {
            StatusCode::UNAUTHORIZED => {
                format!("{}: access token expired or invalid", what)
            }
            StatusCode::FORBIDDEN => format!("{}: access denied", what),
            _ => format!("{}: API error ({}): {}", what, status, body),
        };
        return Err(ProviderError::resource_request(message).with_status(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(what, "failed to read response", e))?;

    Ok(RawResource {
        content_type,
        body: body.to_vec(),
    })
}

fn transport_error(what: &str, context: &str, err: reqwest::Error) -> ProviderError {
    let reason = if err.is_timeout() {
        "timed out".to_string()
    } else {
        err.to_string()
    };
    warn!(resource = what, error = %err, "{}", context);
    ProviderError::resource_request(format!("{}: {}: {}", what, context, reason)).with_source(err)
}
