//! Changed-event data model and Google `events.list` item parsing.
//!
//! A delta query reports each changed occurrence as a JSON item.
//! Active items carry full detail; cancelled items carry only the
//! event id and status, which is why deletions need a prior snapshot
//! to be rendered with any detail.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Status of a changed event as reported by the delta query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Active,
    Cancelled,
}

/// Start or end of an event: an exact instant with an optional named
/// zone, or an all-day date with no time component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    DateTime {
        at: DateTime<FixedOffset>,
        time_zone: Option<String>,
    },
    Date(NaiveDate),
}

/// One calendar occurrence as reported by the delta query.
///
/// Produced fresh on every fetch; never persisted itself. Only its
/// rendering and, for active events, a snapshot survive the run.
#[derive(Debug, Clone)]
pub struct ChangedEvent {
    pub id: String,
    pub status: EventStatus,
    pub summary: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub location: Option<String>,
}

impl ChangedEvent {
    /// Whether the delta reported this event as cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }

    /// Parse one item from a Google Calendar `events.list` response.
    ///
    /// Items without an id are skipped (`Ok(None)`). Cancelled items
    /// legitimately carry no summary/start/end.
    pub fn from_json(item: &serde_json::Value) -> Result<Option<ChangedEvent>, FetchError> {
        let Some(id) = item["id"].as_str() else {
            return Ok(None);
        };

        let status = match item["status"].as_str() {
            Some("cancelled") => EventStatus::Cancelled,
            _ => EventStatus::Active,
        };

        let summary = item["summary"].as_str().map(|s| s.to_string());
        let location = item["location"].as_str().map(|s| s.to_string());
        let start = parse_time(&item["start"])?;
        let end = parse_time(&item["end"])?;

        Ok(Some(ChangedEvent {
            id: id.to_string(),
            status,
            summary,
            start,
            end,
            location,
        }))
    }
}

/// Parse a `{"dateTime": ..., "timeZone": ...}` or `{"date": ...}`
/// time object. Absent objects (cancelled items) parse to `None`.
fn parse_time(value: &serde_json::Value) -> Result<Option<EventTime>, FetchError> {
    if let Some(dt) = value["dateTime"].as_str() {
        let at = DateTime::parse_from_rfc3339(dt)
            .map_err(|_| FetchError::Malformed(format!("invalid dateTime: {dt}")))?;
        let time_zone = value["timeZone"].as_str().map(|s| s.to_string());
        return Ok(Some(EventTime::DateTime { at, time_zone }));
    }

    if let Some(d) = value["date"].as_str() {
        let date = d
            .parse::<NaiveDate>()
            .map_err(|_| FetchError::Malformed(format!("invalid date: {d}")))?;
        return Ok(Some(EventTime::Date(date)));
    }

    Ok(None)
}

/// Last known durable detail for an event, kept to recover the
/// summary and times of deletions the delta no longer describes.
///
/// `start`/`end` are normalized `YYYY-MM-DD HH:MM` display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub id: String,
    pub summary: String,
    pub start: String,
    pub end: String,
}
