//! Google Calendar API client.
//!
//! Only `events.list` is used: single events, ordered by start time, inside
//! a closed UTC window.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use oauthflow_core::format_utc;

use crate::error::{ProviderError, ProviderResult};

use super::resource::{RawResource, get_with_bearer};

/// Base URL for Google Calendar API v3.
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// The calendar every account has.
pub const PRIMARY_CALENDAR: &str = "primary";

/// Upper bound on pages followed for one listing.
pub const MAX_PAGES: usize = 20;

/// Start or end of an event: timed events carry `dateTime`, all-day events `date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// RFC 3339 timestamp for timed events.
    pub date_time: Option<String>,
    /// `YYYY-MM-DD` for all-day events.
    pub date: Option<String>,
    /// IANA zone the event was created in.
    pub time_zone: Option<String>,
}

impl EventDateTime {
    /// The timestamp if present, otherwise the all-day date.
    pub fn display(&self) -> &str {
        self.date_time
            .as_deref()
            .or(self.date.as_deref())
            .unwrap_or_default()
    }

    /// Returns true for all-day events.
    pub fn is_all_day(&self) -> bool {
        self.date_time.is_none() && self.date.is_some()
    }
}

/// An event as returned by `events.list`, reduced to what the page shows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub start: EventDateTime,
    #[serde(default)]
    pub end: EventDateTime,
    pub html_link: Option<String>,
    pub status: Option<String>,
}

impl CalendarEvent {
    fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
    next_page_token: Option<String>,
}

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CalendarClient {
    /// Creates a client against the public Calendar API.
    pub fn new(http_client: reqwest::Client) -> Self {
        Self::with_base_url(http_client, CALENDAR_API_BASE)
    }

    /// Creates a client against another base URL (for tests and proxies).
    pub fn with_base_url(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Lists the events of `calendar_id` between `time_min` and `time_max`.
    ///
    /// Recurring events are expanded server side and cancelled instances are
    /// dropped. Any failed page fails the whole listing.
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> ProviderResult<Vec<CalendarEvent>> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        );
        let time_min = format_utc(time_min);
        let time_max = format_utc(time_max);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut query = vec![
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ];
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.as_str()));
            }

            let request = self.http_client.get(&url).query(&query);
            let resource = get_with_bearer(request, access_token, "calendar events").await?;
            let page = parse_page(&resource)?;

            events.extend(page.items.into_iter().filter(|e| !e.is_cancelled()));

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        if page_token.is_some() {
            warn!(
                pages = MAX_PAGES,
                count = events.len(),
                calendar = calendar_id,
                "event listing truncated, more pages remain"
            );
        }

        debug!(
            count = events.len(),
            calendar = calendar_id,
            %time_min,
            %time_max,
            "fetched calendar events"
        );
        Ok(events)
    }
}

fn parse_page(resource: &RawResource) -> ProviderResult<EventListResponse> {
    serde_json::from_slice(&resource.body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse events response: {}", e))
    })
}
