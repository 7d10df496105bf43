//! # Core runtime: task groups and the entry points built on them.
//!
//! - [`TaskGroup`] runs tasks against one shared [`CancellableContext`](crate::CancellableContext)
//! - [`TaskGroupBuilder`] configures name, policy, signals, deadline and subscribers
//! - [`ErrorAggregator`] collects task failures in completion order
//! - [`run_until_failure_or_signal`] / [`shutdown_all`] whole-program helpers
//!
//! ## Wiring
//! ```text
//! TaskGroupBuilder::build()
//!   ├─► ctx = parent.child() | parent.with_deadline(t)
//!   ├─► SignalBridge::install(&ctx)            (optional)
//!   ├─► Bus + subscriber listener              (optional)
//!   └─► TaskGroup { Shared { ctx, errors, policy, bus } }
//!           submit ─► runner::run_once
//!           wait   ─► drain + outcome
//! ```

mod aggregator;
mod builder;
mod config;
mod group;
mod orchestrate;
mod runner;

pub use aggregator::ErrorAggregator;
pub use builder::TaskGroupBuilder;
pub use config::GroupConfig;
pub use group::{Phase, TaskGroup};
pub use orchestrate::{run_until_failure_or_signal, shutdown_all};
