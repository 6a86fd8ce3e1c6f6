//! Photos flow: authorization code grant with PKCE, media items passed through.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::info;

use oauthflow_providers::google::AuthorizationRequest;

use super::{CallbackParams, found, verify_callback};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// `GET /start`: redirects to Google's consent page with a PKCE challenge.
pub async fn authorize(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let pkce = state.pkce_for_flow();
    let csrf = state.pending.issue(Some(pkce.verifier().to_string()));
    let request = AuthorizationRequest::new(
        state.redirect_uri.clone(),
        state.config.scopes().to_vec(),
        csrf,
    )
    .with_code_challenge(pkce.challenge());

    let url = state.oauth.authorization_url(&request)?;
    info!("redirecting to Google for photos consent");
    Ok(found(url.as_str()))
}

/// `GET /callback`: exchanges the code with its verifier and returns the
/// media item listing exactly as Google sent it.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Response> {
    let (code, pending) = verify_callback(&state, params)?;
    let verifier = pending
        .verifier
        .ok_or_else(|| AppError::internal("pending authorization has no PKCE verifier"))?;

    let token = state
        .oauth
        .exchange_code(&code, &state.redirect_uri, Some(&verifier))
        .await?;
    let resource = state.photos.list_media_items(&token.access_token).await?;

    let content_type = resource
        .content_type
        .unwrap_or_else(|| "application/json".to_string());
    Ok(([(header::CONTENT_TYPE, content_type)], resource.body).into_response())
}
