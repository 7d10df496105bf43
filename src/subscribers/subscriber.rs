//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for observing a group's [`Event`]s
//! (logging, metrics, audit).
//!
//! ## Rules
//! - Events are delivered in publication order, one at a time.
//! - A panic inside `on_event` is caught; the other subscribers are told via
//!   `EventKind::SubscriberPanicked` and delivery continues.
//! - Subscribers share one listener task: a slow subscriber delays the others,
//!   and if the listener falls behind the bus it skips events (`EventKind::SubscriberLagged`).
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use taskgroup::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter(std::sync::atomic::AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::TaskFailed {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for group observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs and panic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
