//! Human-readable notification messages for changed events.
//!
//! Classification is decided per event against its prior snapshot:
//! a cancelled event renders from the snapshot (the live payload
//! carries no detail), an active event with a snapshot is an update,
//! and an active event without one is a new registration.

use chrono_tz::Tz;

use crate::event::{ChangedEvent, EventSnapshot, EventTime};

/// Separator line between per-event messages in one batched payload.
pub const MESSAGE_SEPARATOR: &str = "\n==========\n";

const HEADLINE_CREATED: &str = "Googleカレンダーの予定が登録されました。";
const HEADLINE_UPDATED: &str = "Googleカレンダーの予定が更新されました。";
const HEADLINE_DELETED: &str = "Googleカレンダーの予定が削除されました。";

/// Renders changed events into notification text in a fixed display
/// time zone.
pub struct Renderer {
    zone: Tz,
}

impl Renderer {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// Format an event time as `YYYY-MM-DD HH:MM` in the display
    /// zone. All-day dates render with `00:00`.
    pub fn format_time(&self, time: &EventTime) -> String {
        match time {
            EventTime::DateTime { at, .. } => {
                at.with_timezone(&self.zone).format("%Y-%m-%d %H:%M").to_string()
            }
            EventTime::Date(date) => format!("{} 00:00", date.format("%Y-%m-%d")),
        }
    }

    /// Build the snapshot row an active event should leave behind for
    /// the next run. Cancelled or detail-less events leave none.
    pub fn snapshot_of(&self, event: &ChangedEvent) -> Option<EventSnapshot> {
        if event.is_cancelled() {
            return None;
        }
        Some(EventSnapshot {
            id: event.id.clone(),
            summary: event.summary.clone().unwrap_or_default(),
            start: event.start.as_ref().map(|t| self.format_time(t)).unwrap_or_default(),
            end: event.end.as_ref().map(|t| self.format_time(t)).unwrap_or_default(),
        })
    }

    /// Render one changed event, consulting the prior snapshot.
    pub fn render(&self, event: &ChangedEvent, snapshot: Option<&EventSnapshot>) -> String {
        match (event.is_cancelled(), snapshot) {
            (true, Some(snap)) => format!(
                "{HEADLINE_DELETED}\n==========\nタイトル：{}\n開始日時：{}\n終了日時：{}",
                snap.summary, snap.start, snap.end
            ),
            (true, None) => HEADLINE_DELETED.to_string(),
            (false, snap) => {
                let headline = if snap.is_some() {
                    HEADLINE_UPDATED
                } else {
                    HEADLINE_CREATED
                };
                let summary = event.summary.as_deref().unwrap_or_default();
                let start = event.start.as_ref().map(|t| self.format_time(t)).unwrap_or_default();
                let end = event.end.as_ref().map(|t| self.format_time(t)).unwrap_or_default();
                let location = event.location.as_deref().unwrap_or_default();
                format!(
                    "{headline}\n==========\nタイトル：{summary}\n開始日時：{start}\n終了日時：{end}\n場所      ：{location}"
                )
            }
        }
    }

    /// Join per-event messages into the single per-run payload.
    pub fn join(&self, messages: &[String]) -> String {
        messages.join(MESSAGE_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventStatus;
    use chrono::{DateTime, NaiveDate};

    fn renderer() -> Renderer {
        Renderer::new(chrono_tz::Asia::Tokyo)
    }

    fn active_event() -> ChangedEvent {
        ChangedEvent {
            id: "e1".to_string(),
            status: EventStatus::Active,
            summary: Some("Standup".to_string()),
            start: Some(EventTime::DateTime {
                at: DateTime::parse_from_rfc3339("2024-01-10T09:00:00Z").unwrap(),
                time_zone: Some("UTC".to_string()),
            }),
            end: Some(EventTime::DateTime {
                at: DateTime::parse_from_rfc3339("2024-01-10T09:30:00Z").unwrap(),
                time_zone: Some("UTC".to_string()),
            }),
            location: Some("Room A".to_string()),
        }
    }

    fn cancelled_event() -> ChangedEvent {
        ChangedEvent {
            id: "e1".to_string(),
            status: EventStatus::Cancelled,
            summary: None,
            start: None,
            end: None,
            location: None,
        }
    }

    fn snapshot() -> EventSnapshot {
        EventSnapshot {
            id: "e1".to_string(),
            summary: "Standup".to_string(),
            start: "2024-01-10 18:00".to_string(),
            end: "2024-01-10 18:30".to_string(),
        }
    }

    #[test]
    fn test_created_without_snapshot() {
        let msg = renderer().render(&active_event(), None);
        assert!(msg.contains("登録されました"));
        assert!(msg.contains("Standup"));
        // 09:00 UTC is 18:00 in Tokyo.
        assert!(msg.contains("2024-01-10 18:00"));
        assert!(msg.contains("2024-01-10 18:30"));
        assert!(msg.contains("Room A"));
    }

    #[test]
    fn test_updated_with_snapshot_uses_live_fields() {
        let mut event = active_event();
        event.summary = Some("Standup (moved)".to_string());
        let msg = renderer().render(&event, Some(&snapshot()));
        assert!(msg.contains("更新されました"));
        assert!(msg.contains("Standup (moved)"));
    }

    #[test]
    fn test_deleted_with_snapshot_uses_snapshot_fields() {
        let msg = renderer().render(&cancelled_event(), Some(&snapshot()));
        assert!(msg.contains("削除されました"));
        assert!(msg.contains("Standup"));
        assert!(msg.contains("2024-01-10 18:00"));
    }

    #[test]
    fn test_deleted_without_snapshot_is_minimal() {
        let msg = renderer().render(&cancelled_event(), None);
        assert!(msg.contains("削除されました"));
        assert!(!msg.contains("タイトル"));
    }

    #[test]
    fn test_all_day_renders_midnight() {
        let time = EventTime::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(renderer().format_time(&time), "2024-02-01 00:00");
    }

    #[test]
    fn test_snapshot_of_skips_cancelled() {
        let r = renderer();
        assert!(r.snapshot_of(&cancelled_event()).is_none());

        let snap = r.snapshot_of(&active_event()).unwrap();
        assert_eq!(snap.summary, "Standup");
        assert_eq!(snap.start, "2024-01-10 18:00");
    }

    #[test]
    fn test_join_uses_separator() {
        let joined = renderer().join(&["a".to_string(), "b".to_string()]);
        assert_eq!(joined, "a\n==========\nb");
    }
}
