//! # Event bus for broadcasting group events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]: the group, the
//! task runner and the subscriber listener publish, any number of receivers observe.
//!
//! ## Architecture
//! ```text
//! Publishers:                      Receivers:
//!   TaskGroup::wait ──┐
//!   runner (per task) ┼──► Bus ──┬──► subscriber listener ──► Subscribe::on_event
//!   listener (lag)  ──┘          └──► TaskGroup::subscribe() receivers
//! ```
//!
//! ## Rules
//! - `publish()` never blocks and never fails; events without receivers are dropped.
//! - Capacity is one shared ring buffer; slow receivers observe `RecvError::Lagged(n)`.
//! - A receiver only gets events sent after it subscribed.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for group events.
///
/// Cheap to clone (holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus; `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to every current receiver (fire-and-forget).
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new independent receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
