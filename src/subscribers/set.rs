//! # Event delivery to a list of subscribers.
//!
//! [`SubscriberSet`] owns the subscribers attached to a group and the listener
//! task that feeds them from the group's [`Bus`].
//!
//! ## Architecture
//! ```text
//! Bus ──► listener (one task per group)
//!           ├─► sub1.on_event(&ev)   panic → SubscriberPanicked to the others
//!           ├─► sub2.on_event(&ev)
//!           └─► subN.on_event(&ev)
//!         Lagged(n) → SubscriberLagged to everyone
//!         Closed    → exit (group and all its tasks are gone)
//! ```
//!
//! ## Panic handling
//! `on_event` futures run under `catch_unwind`; `AssertUnwindSafe` is used, so a
//! subscriber that panics while holding its own lock may leave that state inconsistent.
//! Panic reports are delivered locally, never re-published, so a subscriber that
//! also panics on the report cannot loop.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Ordered list of subscribers with panic-isolated delivery.
#[derive(Default)]
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a set from the given subscribers.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// Returns `true` when no subscriber is attached.
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Delivers `event` to every subscriber in order.
    ///
    /// Panics are caught and reported to the remaining subscribers as
    /// `SubscriberPanicked` (not reported again if `event` is itself a panic report).
    pub async fn emit(&self, event: &Event) {
        let is_panic_report = matches!(event.kind, EventKind::SubscriberPanicked);

        for (pos, sub) in self.subs.iter().enumerate() {
            let outcome = std::panic::AssertUnwindSafe(sub.on_event(event))
                .catch_unwind()
                .await;
            let Err(payload) = outcome else {
                continue;
            };
            if is_panic_report {
                continue;
            }

            let report = Event::subscriber_panicked(sub.name(), panic_message(payload.as_ref()))
                .with_group_opt(event.group.as_ref());
            for (other_pos, other) in self.subs.iter().enumerate() {
                if other_pos == pos {
                    continue;
                }
                let _ = std::panic::AssertUnwindSafe(other.on_event(&report))
                    .catch_unwind()
                    .await;
            }
        }
    }

    /// Spawns the listener that forwards every event published on `bus`.
    ///
    /// The listener ends once every sender of `bus` is dropped.
    pub(crate) fn spawn_listener(self: Arc<Self>, bus: &Bus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => self.emit(&ev).await,
                    Err(RecvError::Lagged(skipped)) => {
                        self.emit(&Event::subscriber_lagged(skipped)).await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
