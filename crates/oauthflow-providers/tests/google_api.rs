use chrono::{TimeZone, Utc};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use oauthflow_providers::ProviderErrorCode;
use oauthflow_providers::google::{
    CalendarClient, ClientCredentials, MAX_PAGES, OAuthClient, PhotosClient, PkceChallenge,
    PRIMARY_CALENDAR,
};

const RFC_VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
const REDIRECT_URI: &str = "http://localhost:8080/callback";

fn oauth_client(server: &MockServer) -> OAuthClient {
    let credentials = ClientCredentials::new("test-client.apps.googleusercontent.com", "s3cret")
        .with_token_endpoint(format!("{}/token", server.uri()));
    OAuthClient::new(credentials, reqwest::Client::new())
}

#[tokio::test]
async fn exchange_code_posts_form_with_verifier() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=4%2F0Abc"))
        .and(body_string_contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcallback",
        ))
        .and(body_string_contains("client_secret=s3cret"))
        .and(body_string_contains(format!("code_verifier={RFC_VERIFIER}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.token",
            "token_type": "Bearer",
            "expires_in": 3599,
            "scope": "https://www.googleapis.com/auth/photoslibrary.readonly"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pkce = PkceChallenge::from_verifier(RFC_VERIFIER).unwrap();
    let token = oauth_client(&server)
        .exchange_code("4/0Abc", REDIRECT_URI, Some(pkce.verifier()))
        .await
        .unwrap();

    assert_eq!(token.access_token, "ya29.token");
    assert_eq!(token.expires_in, Some(3599));
}

#[tokio::test]
async fn exchange_code_without_pkce_omits_verifier() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access_token": "plain", "refresh_token": "r"})),
        )
        .mount(&server)
        .await;

    let token = oauth_client(&server)
        .exchange_code("code", REDIRECT_URI, None)
        .await
        .unwrap();
    assert_eq!(token.refresh_token.as_deref(), Some("r"));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(!body.contains("code_verifier"));
}

#[tokio::test]
async fn exchange_code_non_2xx_is_token_exchange_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Bad Request"
        })))
        .mount(&server)
        .await;

    let err = oauth_client(&server)
        .exchange_code("used-code", REDIRECT_URI, None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), ProviderErrorCode::TokenExchangeFailed);
    assert_eq!(err.status(), Some(400));
    assert!(err.message().contains("invalid_grant"));
}

#[tokio::test]
async fn exchange_code_malformed_json_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = oauth_client(&server)
        .exchange_code("code", REDIRECT_URI, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
}

#[tokio::test]
async fn calendar_list_events_sends_window_and_follows_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(header("authorization", "Bearer ya29.token"))
        .and(query_param("timeMin", "2024-01-01T00:00:00Z"))
        .and(query_param("timeMax", "2024-01-01T23:59:59Z"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {"id": "c", "summary": "Lunch", "start": {"dateTime": "2024-01-01T12:00:00Z"}}
            ]
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(header("authorization", "Bearer ya29.token"))
        .and(query_param("timeMin", "2024-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {"id": "a", "summary": "Standup", "start": {"dateTime": "2024-01-01T09:00:00Z"}},
                {"id": "b", "status": "cancelled", "start": {"dateTime": "2024-01-01T10:00:00Z"}}
            ],
            "nextPageToken": "page-2"
        })))
        .mount(&server)
        .await;

    let client = CalendarClient::with_base_url(reqwest::Client::new(), server.uri());
    let events = client
        .list_events(
            "ya29.token",
            PRIMARY_CALENDAR,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap(),
        )
        .await
        .unwrap();

    let summaries: Vec<_> = events.iter().map(|e| e.summary.as_str()).collect();
    assert_eq!(summaries, vec!["Standup", "Lunch"]);
}

#[tokio::test]
async fn calendar_paging_stops_at_page_limit() {
    let server = MockServer::start().await;

    // Every page points at another one.
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {"summary": "Recurring", "start": {"dateTime": "2024-01-01T09:00:00Z"}}
            ],
            "nextPageToken": "more"
        })))
        .expect(MAX_PAGES as u64)
        .mount(&server)
        .await;

    let client = CalendarClient::with_base_url(reqwest::Client::new(), server.uri());
    let events = client
        .list_events(
            "ya29.token",
            PRIMARY_CALENDAR,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(events.len(), MAX_PAGES);
}

#[tokio::test]
async fn calendar_expired_token_is_resource_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"code": 401, "message": "Invalid Credentials"}
        })))
        .mount(&server)
        .await;

    let client = CalendarClient::with_base_url(reqwest::Client::new(), server.uri());
    let err = client
        .list_events(
            "expired",
            PRIMARY_CALENDAR,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), ProviderErrorCode::ResourceRequestFailed);
    assert_eq!(err.status(), Some(401));
    assert!(err.message().contains("expired or invalid"));
}

#[tokio::test]
async fn photos_returns_raw_body() {
    let server = MockServer::start().await;
    let body = r#"{"mediaItems":[{"id":"m1","filename":"IMG_0001.jpg"}]}"#;

    Mock::given(method("GET"))
        .and(path("/v1/mediaItems"))
        .and(header("authorization", "Bearer ya29.photos"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "application/json"),
        )
        .mount(&server)
        .await;

    let client = PhotosClient::with_base_url(reqwest::Client::new(), server.uri());
    let resource = client.list_media_items("ya29.photos").await.unwrap();

    assert_eq!(resource.body, body.as_bytes());
    assert_eq!(resource.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn photos_invalid_token_is_resource_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/mediaItems"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = PhotosClient::with_base_url(reqwest::Client::new(), server.uri());
    let err = client.list_media_items("bogus").await.unwrap_err();
    assert_eq!(err.code(), ProviderErrorCode::ResourceRequestFailed);
}

#[tokio::test]
async fn unreachable_resource_is_resource_error() {
    // Nothing listens on port 1.
    let client = PhotosClient::with_base_url(reqwest::Client::new(), "http://127.0.0.1:1");
    let err = client.list_media_items("token").await.unwrap_err();
    assert_eq!(err.code(), ProviderErrorCode::ResourceRequestFailed);
    assert!(err.status().is_none());
    assert!(err.message().starts_with("media items: request failed"));

    let client = CalendarClient::with_base_url(reqwest::Client::new(), "http://127.0.0.1:1");
    let err = client
        .list_events(
            "token",
            PRIMARY_CALENDAR,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ProviderErrorCode::ResourceRequestFailed);
}

#[tokio::test]
async fn unreachable_token_endpoint_is_network_error() {
    let credentials = ClientCredentials::new("test-client.apps.googleusercontent.com", "s3cret")
        .with_token_endpoint("http://127.0.0.1:1/token");
    let err = OAuthClient::new(credentials, reqwest::Client::new())
        .exchange_code("code", REDIRECT_URI, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ProviderErrorCode::NetworkError);
}
