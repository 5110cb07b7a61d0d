//! Incremental event sync against the Google Calendar API.
//!
//! The delta query returns only events changed since the previous
//! sync token, plus the token for the next call. A calendar with no
//! stored token falls back to a lookback-window listing, which yields
//! a fresh token as a side effect of the same call.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;

use crate::error::{FetchError, Result, WatchError};
use crate::event::ChangedEvent;

const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// Cap on events returned per invocation. Further pages are not
/// requested within one run.
const MAX_RESULTS: u32 = 100;

/// One page of changed events plus the checkpoint for the next call.
#[derive(Debug, Clone)]
pub struct SyncPage {
    pub events: Vec<ChangedEvent>,
    pub next_sync_token: Option<String>,
}

/// Source of changed calendar events.
#[async_trait]
pub trait EventSource {
    /// Fetch events changed since `sync_token`, or within the
    /// lookback window when no token is given.
    async fn fetch_changes(
        &self,
        calendar_id: &str,
        sync_token: Option<&str>,
    ) -> Result<SyncPage, WatchError>;

    /// List the currently known events in the lookback window,
    /// without touching sync state. Used to rebuild snapshots.
    async fn list_current(&self, calendar_id: &str) -> Result<Vec<ChangedEvent>, WatchError>;
}

/// `EventSource` backed by the Google Calendar `events.list` API.
pub struct GoogleCalendarSource {
    base_url: String,
    access_token: String,
    lookback_days: i64,
    http_client: Client,
}

impl GoogleCalendarSource {
    pub fn new(access_token: impl Into<String>, lookback_days: i64) -> Self {
        Self::with_base_url(GOOGLE_CALENDAR_API, access_token, lookback_days)
    }

    /// Point the source at a different API root. Used by tests.
    pub fn with_base_url(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        lookback_days: i64,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            lookback_days,
            http_client: Client::new(),
        }
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!("{}/calendars/{}/events", self.base_url, calendar_id)
    }

    /// Midnight UTC at `lookback_days` before now.
    fn window_start(&self) -> String {
        let start = (Utc::now() - Duration::days(self.lookback_days))
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();
        start.to_rfc3339()
    }

    async fn list(
        &self,
        calendar_id: &str,
        query: &[(&str, String)],
    ) -> Result<Option<SyncPage>, WatchError> {
        let resp = self
            .http_client
            .get(self.events_url(calendar_id))
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        // 410 Gone means the sync token has expired; the caller
        // restarts with the window fallback.
        if resp.status().as_u16() == 410 {
            return Ok(None);
        }

        let body: serde_json::Value = resp.json().await?;

        if let Some(err) = body.get("error") {
            return Err(FetchError::Api(err.to_string()).into());
        }

        let mut events = Vec::new();
        if let Some(items) = body["items"].as_array() {
            for item in items {
                if let Some(event) = ChangedEvent::from_json(item)? {
                    events.push(event);
                }
            }
        }

        let next_sync_token = body["nextSyncToken"].as_str().map(|s| s.to_string());

        Ok(Some(SyncPage {
            events,
            next_sync_token,
        }))
    }

    async fn fetch_window(&self, calendar_id: &str) -> Result<SyncPage, WatchError> {
        let query = [
            ("maxResults", MAX_RESULTS.to_string()),
            ("showDeleted", "true".to_string()),
            ("timeMin", self.window_start()),
        ];
        self.list(calendar_id, &query).await?.ok_or_else(|| {
            FetchError::TokenExpired {
                calendar_id: calendar_id.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl EventSource for GoogleCalendarSource {
    async fn fetch_changes(
        &self,
        calendar_id: &str,
        sync_token: Option<&str>,
    ) -> Result<SyncPage, WatchError> {
        if self.access_token.is_empty() {
            return Err(FetchError::NotAuthenticated.into());
        }

        let Some(token) = sync_token else {
            return self.fetch_window(calendar_id).await;
        };

        // showDeleted must stay set: without it the delta silently
        // drops cancellations.
        let query = [
            ("maxResults", MAX_RESULTS.to_string()),
            ("showDeleted", "true".to_string()),
            ("syncToken", token.to_string()),
        ];

        match self.list(calendar_id, &query).await? {
            Some(page) => Ok(page),
            // Expired token: restart this run from the window.
            None => self.fetch_window(calendar_id).await,
        }
    }

    async fn list_current(&self, calendar_id: &str) -> Result<Vec<ChangedEvent>, WatchError> {
        if self.access_token.is_empty() {
            return Err(FetchError::NotAuthenticated.into());
        }

        let query = [
            ("maxResults", MAX_RESULTS.to_string()),
            ("timeMin", self.window_start()),
        ];
        let page = self.list(calendar_id, &query).await?.ok_or_else(|| {
            FetchError::Malformed("unexpected 410 on window listing".to_string())
        })?;
        Ok(page.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn events_body() -> serde_json::Value {
        json!({
            "items": [
                {
                    "id": "e1",
                    "status": "confirmed",
                    "summary": "Standup",
                    "start": {"dateTime": "2024-01-10T09:00:00Z"},
                    "end": {"dateTime": "2024-01-10T09:30:00Z"},
                },
                {"id": "e2", "status": "cancelled"},
            ],
            "nextSyncToken": "tok-next",
        })
    }

    #[tokio::test]
    async fn test_delta_query_sends_sync_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/calendars/cal-1/events")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("syncToken".into(), "tok-old".into()),
                mockito::Matcher::UrlEncoded("showDeleted".into(), "true".into()),
                mockito::Matcher::UrlEncoded("maxResults".into(), "100".into()),
            ]))
            .with_body(events_body().to_string())
            .create_async()
            .await;

        let source = GoogleCalendarSource::with_base_url(server.url(), "token", 30);
        let page = source.fetch_changes("cal-1", Some("tok-old")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.events.len(), 2);
        assert_eq!(page.next_sync_token.as_deref(), Some("tok-next"));
        assert!(page.events[1].is_cancelled());
    }

    #[tokio::test]
    async fn test_no_token_uses_window_fallback() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/calendars/cal-1/events")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::Regex("timeMin=".into()),
                mockito::Matcher::UrlEncoded("showDeleted".into(), "true".into()),
            ]))
            .with_body(events_body().to_string())
            .create_async()
            .await;

        let source = GoogleCalendarSource::with_base_url(server.url(), "token", 30);
        let page = source.fetch_changes("cal-1", None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.next_sync_token.as_deref(), Some("tok-next"));
    }

    #[tokio::test]
    async fn test_expired_token_falls_back_to_window() {
        let mut server = mockito::Server::new_async().await;
        let gone = server
            .mock("GET", "/calendars/cal-1/events")
            .match_query(mockito::Matcher::Regex("syncToken=stale".into()))
            .with_status(410)
            .create_async()
            .await;
        let window = server
            .mock("GET", "/calendars/cal-1/events")
            .match_query(mockito::Matcher::Regex("timeMin=".into()))
            .with_body(events_body().to_string())
            .create_async()
            .await;

        let source = GoogleCalendarSource::with_base_url(server.url(), "token", 30);
        let page = source.fetch_changes("cal-1", Some("stale")).await.unwrap();

        gone.assert_async().await;
        window.assert_async().await;
        assert_eq!(page.next_sync_token.as_deref(), Some("tok-next"));
    }

    #[tokio::test]
    async fn test_api_error_payload_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/calendars/cal-1/events")
            .match_query(mockito::Matcher::Any)
            .with_body(json!({"error": {"code": 403, "message": "forbidden"}}).to_string())
            .create_async()
            .await;

        let source = GoogleCalendarSource::with_base_url(server.url(), "token", 30);
        let err = source.fetch_changes("cal-1", None).await.unwrap_err();
        assert!(matches!(err, WatchError::Fetch(FetchError::Api(_))));
    }

    #[tokio::test]
    async fn test_empty_access_token_is_not_authenticated() {
        let source = GoogleCalendarSource::new("", 30);
        let err = source.fetch_changes("cal-1", None).await.unwrap_err();
        assert!(matches!(
            err,
            WatchError::Fetch(FetchError::NotAuthenticated)
        ));
    }
}
