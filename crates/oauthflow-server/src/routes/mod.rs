//! HTTP routes.
//!
//! | variant  | route       | handler                |
//! |----------|-------------|------------------------|
//! | calendar | `/`         | [`calendar::authorize`] |
//! | calendar | `/callback` | [`calendar::callback`]  |
//! | calendar | `/calendar` | [`calendar::events`]    |
//! | photos   | `/start`    | [`photos::authorize`]   |
//! | photos   | `/callback` | [`photos::callback`]    |
//! | both     | `/healthz`  | liveness check         |

pub mod calendar;
pub mod photos;

use std::sync::Arc;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Variant;
use crate::error::{AppError, AppResult};
use crate::state::{AppState, PendingAuthorization};

/// Builds the router for the configured variant.
pub fn router(state: Arc<AppState>) -> Router {
    let routes: Router<Arc<AppState>> = match state.config.variant {
        Variant::Calendar => Router::new()
            .route("/", get(calendar::authorize))
            .route("/callback", get(calendar::callback))
            .route("/calendar", get(calendar::events)),
        Variant::Photos => Router::new()
            .route("/start", get(photos::authorize))
            .route("/callback", get(photos::callback)),
    };

    routes
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// `302 Found` to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Query parameters Google appends to the redirect URI.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Checks a callback and consumes its `state`.
///
/// Returns the authorization code and the pending authorization it belongs to.
pub(crate) fn verify_callback(
    state: &AppState,
    params: CallbackParams,
) -> AppResult<(String, PendingAuthorization)> {
    if let Some(error) = params.error {
        warn!(
            error = %error,
            description = params.error_description.as_deref().unwrap_or(""),
            "authorization failed at provider"
        );
        return Err(AppError::denied(error));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::bad_request("missing authorization code"))?;
    let csrf = params
        .state
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("missing state"))?;

    let pending = state.consume_state(&csrf)?;
    Ok((code, pending))
}
