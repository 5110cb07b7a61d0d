//! # calwatch Core Library
//!
//! Core logic for calwatch, a Google Calendar change notifier: on
//! each trigger it fetches the delta of events since the stored sync
//! token (or a lookback window on first sync), classifies every
//! changed event as created, updated or cancelled, renders one
//! Japanese notification payload, and posts it to LINE Notify. Any
//! processing failure is reported to a Slack alert webhook instead.
//!
//! ## Key components
//!
//! - [`GoogleCalendarSource`]: the delta query adapter
//! - [`Database`]: sqlite-backed checkpoints, snapshots and properties
//! - [`Renderer`]: change classification and message formatting
//! - [`WebhookDispatcher`]: one-shot webhook delivery
//! - [`Watcher`]: the per-run orchestrator wiring the above together

pub mod config;
pub mod error;
pub mod event;
pub mod notify;
pub mod render;
pub mod storage;
pub mod sync;
pub mod watcher;

pub use config::Config;
pub use error::{ConfigError, FetchError, StoreError, WatchError};
pub use event::{ChangedEvent, EventSnapshot, EventStatus, EventTime};
pub use notify::{Dispatcher, WebhookDispatcher};
pub use render::Renderer;
pub use storage::{CheckpointStore, Database, PropertyBag, SnapshotStore};
pub use sync::{EventSource, GoogleCalendarSource, SyncPage};
pub use watcher::{CalendarTrigger, RunOutcome, Watcher};
