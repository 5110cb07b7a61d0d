//! The orchestrator for one notification run.
//!
//! A run is a single pass: read the checkpoint, fetch the delta,
//! render each changed event against its prior snapshot, deliver one
//! batched payload, rebuild the snapshot set from a fresh listing,
//! then commit the new checkpoint. Any failure short-circuits to the
//! alert channel and the original error is returned to the caller,
//! with the checkpoint left untouched so the next trigger re-reports
//! the same delta.

use std::sync::Arc;

use crate::error::Result;
use crate::event::EventSnapshot;
use crate::notify::Dispatcher;
use crate::render::Renderer;
use crate::storage::{CheckpointStore, SnapshotStore};
use crate::sync::EventSource;

/// Invocation context handed to the entry point by the trigger.
#[derive(Debug, Clone)]
pub struct CalendarTrigger {
    pub calendar_id: String,
    pub auth_mode: Option<String>,
    pub trigger_uid: Option<String>,
}

impl CalendarTrigger {
    pub fn new(calendar_id: impl Into<String>) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            auth_mode: None,
            trigger_uid: None,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOutcome {
    /// Number of changed events the delta reported.
    pub changed: usize,
    /// Whether a primary notification was delivered.
    pub notified: bool,
}

/// Sequences one notification run over injected collaborators.
pub struct Watcher {
    source: Box<dyn EventSource>,
    checkpoints: Arc<dyn CheckpointStore>,
    snapshots: Arc<dyn SnapshotStore>,
    renderer: Renderer,
    dispatcher: Box<dyn Dispatcher>,
}

impl Watcher {
    pub fn new(
        source: Box<dyn EventSource>,
        checkpoints: Arc<dyn CheckpointStore>,
        snapshots: Arc<dyn SnapshotStore>,
        renderer: Renderer,
        dispatcher: Box<dyn Dispatcher>,
    ) -> Self {
        Self {
            source,
            checkpoints,
            snapshots,
            renderer,
            dispatcher,
        }
    }

    /// Run one notification pass for the triggering calendar.
    ///
    /// On failure the alert channel receives the diagnostic before
    /// the error is returned. An alert delivery failure is logged but
    /// never masks the original error.
    pub async fn run(&self, trigger: &CalendarTrigger) -> Result<RunOutcome> {
        match self.process(&trigger.calendar_id).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let alert = format!(
                    "カレンダー変更通知処理中にエラーが発生しました。\nERROR=>{err}"
                );
                if let Err(alert_err) = self.dispatcher.send_alert(&alert).await {
                    eprintln!("Warning: failed to deliver alert: {alert_err}");
                }
                Err(err)
            }
        }
    }

    async fn process(&self, calendar_id: &str) -> Result<RunOutcome> {
        let token = self.checkpoints.checkpoint(calendar_id)?;
        let page = self
            .source
            .fetch_changes(calendar_id, token.as_deref())
            .await?;

        // Snapshot lookups happen before the rebuild below; they hold
        // the state of the previous run.
        let mut messages = Vec::with_capacity(page.events.len());
        for event in &page.events {
            let snapshot = self.snapshots.lookup(&event.id)?;
            messages.push(self.renderer.render(event, snapshot.as_ref()));
        }

        let notified = !messages.is_empty();
        if notified {
            self.dispatcher
                .send_primary(&self.renderer.join(&messages))
                .await?;
        }

        let current = self.source.list_current(calendar_id).await?;
        let rows: Vec<EventSnapshot> = current
            .iter()
            .filter_map(|e| self.renderer.snapshot_of(e))
            .collect();
        self.snapshots.replace_all(&rows)?;

        if let Some(next) = page.next_sync_token {
            self.checkpoints.set_checkpoint(calendar_id, &next)?;
        }

        Ok(RunOutcome {
            changed: page.events.len(),
            notified,
        })
    }
}
