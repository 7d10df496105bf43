//! # LogWriter: events as `tracing` records
//!
//! A subscriber that turns every [`Event`] into a structured `tracing` record.
//! Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Levels
//! ```text
//! task_starting / task_stopped        DEBUG
//! context_cancelled / group_finished  INFO
//! task_failed / subscriber_lagged     WARN
//! subscriber_panicked                 ERROR
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let group = e.group.as_deref();
        let task = e.task.as_deref();
        let reason = e.reason.as_deref();

        match e.kind {
            EventKind::TaskStarting => {
                tracing::debug!(seq = e.seq, group, task, index = e.index, "task starting");
            }
            EventKind::TaskStopped => {
                tracing::debug!(seq = e.seq, group, task, index = e.index, "task stopped");
            }
            EventKind::TaskFailed => {
                tracing::warn!(seq = e.seq, group, task, index = e.index, reason, "task failed");
            }
            EventKind::ContextCancelled => {
                tracing::info!(seq = e.seq, group, reason, "context cancelled");
            }
            EventKind::GroupFinished => {
                tracing::info!(seq = e.seq, group, outcome = reason, "group finished");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(seq = e.seq, group, subscriber = task, reason, "subscriber panicked");
            }
            EventKind::SubscriberLagged => {
                tracing::warn!(seq = e.seq, group, reason, "subscriber listener lagged");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
