//! Group events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `TaskGroup::wait` (cancellation, outcome), `core::runner`
//!   (per-task lifecycle), the subscriber listener (panics, lag).
//! - **Consumers**: the subscriber listener spawned for `with_subscribers`, and
//!   receivers from `TaskGroup::subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
