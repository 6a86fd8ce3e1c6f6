//! Calendar flow: authorization code grant, token on disk, HTML event list.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use chrono::{Local, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use oauthflow_core::DateWindow;
use oauthflow_providers::google::{AuthorizationRequest, PRIMARY_CALENDAR, StoredToken};

use super::{CallbackParams, found, verify_callback};
use crate::error::AppResult;
use crate::state::AppState;

/// `GET /`: redirects to Google's consent page.
pub async fn authorize(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let csrf = state.pending.issue(None);
    let request = AuthorizationRequest::new(
        state.redirect_uri.clone(),
        state.config.scopes().to_vec(),
        csrf,
    )
    .with_offline_access(true);

    let url = state.oauth.authorization_url(&request)?;
    info!("redirecting to Google for calendar consent");
    Ok(found(url.as_str()))
}

/// `GET /callback`: exchanges the code, saves the token, moves on to `/calendar`.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Response> {
    let (code, _) = verify_callback(&state, params)?;

    let response = state
        .oauth
        .exchange_code(&code, &state.redirect_uri, None)
        .await?;
    state
        .tokens
        .save(StoredToken::from_response(&response, Utc::now()))?;

    Ok(found("/calendar"))
}

#[derive(Debug, Default, Deserialize)]
pub struct WindowParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// `GET /calendar?start=YYYY-MM-DD&end=YYYY-MM-DD`
pub async fn events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowParams>,
) -> AppResult<Response> {
    let window = DateWindow::from_query(
        params.start.as_deref(),
        params.end.as_deref(),
        Local::now().date_naive(),
    )?;

    let token = match state.tokens.get() {
        Some(token) if !token.is_expired() => token,
        Some(_) => {
            info!("saved token has expired, restarting authorization");
            state.tokens.clear()?;
            return Ok(found("/"));
        }
        None => {
            debug!("no token yet, starting authorization");
            return Ok(found("/"));
        }
    };

    let events = state
        .calendar
        .list_events(
            &token.access_token,
            PRIMARY_CALENDAR,
            window.time_min(),
            window.time_max(),
        )
        .await?;
    info!(
        count = events.len(),
        days = window.days(),
        window = %window,
        "fetched calendar events"
    );

    let html = state.templates.render_events(&window, &events)?;
    Ok(Html(html).into_response())
}
