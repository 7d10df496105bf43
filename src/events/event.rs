//! # Events emitted while a task group runs.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Task events**: per-task flow (starting, stopped, failed)
//! - **Group events**: context cancellation and the final outcome
//! - **Subscriber events**: problems inside the observability pipeline itself
//!
//! The [`Event`] struct carries metadata such as timestamps, group and task names,
//! submission index and a human-readable reason.
//!
//! ## Ordering guarantees
//! Each event has a process-wide unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use taskgroup::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_group("shutdown")
//!     .with_task("flush-metrics")
//!     .with_index(2)
//!     .with_reason("connection reset");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("flush-metrics"));
//! assert_eq!(ev.index, Some(2));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of group events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task events ===
    /// Task was launched.
    ///
    /// Sets: `task`, `index`.
    TaskStarting,

    /// Task returned without error (or exited gracefully after cancellation).
    ///
    /// Sets: `task`, `index`.
    TaskStopped,

    /// Task returned an error or panicked; the error was recorded.
    ///
    /// Sets: `task`, `index`, `reason`.
    TaskFailed,

    // === Group events ===
    /// The shared context was cancelled.
    ///
    /// Sets: `reason` (the cause).
    ContextCancelled,

    /// `wait` finished: every task returned.
    ///
    /// Sets: `reason` (outcome label, `ok` on success).
    GroupFinished,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason` (panic message).
    SubscriberPanicked,

    /// The subscriber listener fell behind the bus and skipped events.
    ///
    /// Sets: `reason` (number of skipped events).
    SubscriberLagged,
}

impl EventKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            EventKind::TaskStarting => "task_starting",
            EventKind::TaskStopped => "task_stopped",
            EventKind::TaskFailed => "task_failed",
            EventKind::ContextCancelled => "context_cancelled",
            EventKind::GroupFinished => "group_finished",
            EventKind::SubscriberPanicked => "subscriber_panicked",
            EventKind::SubscriberLagged => "subscriber_lagged",
        }
    }
}

/// Group event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the emitting group, if it has one.
    pub group: Option<Arc<str>>,
    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Submission index of the task, if applicable.
    pub index: Option<usize>,
    /// Human-readable reason (errors, causes, outcome).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            group: None,
            task: None,
            index: None,
            reason: None,
        }
    }

    /// Attaches a group name.
    #[inline]
    pub fn with_group(mut self, group: impl Into<Arc<str>>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Attaches an optional group name.
    #[inline]
    pub(crate) fn with_group_opt(mut self, group: Option<&Arc<str>>) -> Self {
        self.group = group.cloned();
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a submission index.
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    /// Creates a subscriber lag event.
    #[inline]
    pub fn subscriber_lagged(skipped: u64) -> Self {
        Event::new(EventKind::SubscriberLagged).with_reason(format!("skipped={skipped}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::TaskStarting);
        let b = Event::new(EventKind::TaskStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders() {
        let ev = Event::subscriber_lagged(7).with_group("svc");
        assert_eq!(ev.kind.as_label(), "subscriber_lagged");
        assert_eq!(ev.reason.as_deref(), Some("skipped=7"));
        assert_eq!(ev.group.as_deref(), Some("svc"));
        assert!(ev.task.is_none());
    }
}
