//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] that
//! feeds subscribers from a group's bus, and (feature `logging`) the built-in
//! [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! runner / TaskGroup ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                                 ├──► LogWriter
//!                                                                 └──► custom ...
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
