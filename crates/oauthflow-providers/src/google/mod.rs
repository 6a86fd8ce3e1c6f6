//! Google OAuth 2.0 and API clients.
//!
//! # Authentication Flow
//!
//! 1. Client credentials are read from a Cloud Console `client_secret.json`
//! 2. The browser is redirected to Google's consent page, optionally with a
//!    PKCE challenge
//! 3. Google redirects back with an authorization code
//! 4. The code (plus PKCE verifier) is exchanged for an access token
//! 5. The access token is sent as a bearer token to Calendar or Photos
//!
//! # Example
//!
//! ```ignore
//! use oauthflow_providers::google::{
//!     AuthorizationRequest, ClientCredentials, OAuthClient, PkceChallenge, generate_state,
//! };
//!
//! let credentials = ClientCredentials::from_file("client_secret.json")?;
//! let oauth = OAuthClient::new(credentials, http_client(timeout)?);
//!
//! let pkce = PkceChallenge::generate();
//! let request = AuthorizationRequest::new(redirect_uri, scopes, generate_state())
//!     .with_code_challenge(pkce.challenge());
//! let url = oauth.authorization_url(&request)?;
//!
//! // ... browser round-trip ...
//!
//! let token = oauth.exchange_code(&code, redirect_uri, Some(pkce.verifier())).await?;
//! ```

mod calendar;
mod config;
mod oauth;
mod photos;
mod pkce;
mod resource;
mod tokens;

pub use calendar::{
    CALENDAR_API_BASE, CalendarClient, CalendarEvent, EventDateTime, MAX_PAGES,
    PRIMARY_CALENDAR,
};
pub use config::{ClientCredentials, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL};
pub use oauth::{AuthorizationRequest, OAuthClient, TokenResponse};
pub use photos::{PHOTOS_API_BASE, PhotosClient};
pub use pkce::{
    CODE_CHALLENGE_METHOD, MAX_VERIFIER_LEN, MIN_VERIFIER_LEN, PkceChallenge, compute_challenge,
    generate_state, validate_verifier,
};
pub use resource::RawResource;
pub use tokens::{StoredToken, TokenStore};

/// Read-only Google Calendar scope.
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Read-only Google Photos Library scope.
pub const PHOTOS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/photoslibrary.readonly";
