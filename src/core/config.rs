//! # Group configuration.
//!
//! Provides [`GroupConfig`] the settings a [`TaskGroupBuilder`](crate::TaskGroupBuilder)
//! turns into a running [`TaskGroup`](crate::TaskGroup).
//!
//! ## Sentinel values
//! - `signals = None` → no signal bridge
//! - `signals = Some(vec![])` → default set (`SIGINT`, `SIGTERM`)
//! - `timeout = None` → no deadline
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::context::{Signal, SignalBridge};
use crate::policies::CancelPolicy;

/// Settings for one task group.
///
/// ## Field semantics
/// - `name`: label attached to every event of the group
/// - `policy`: what a task failure does to siblings
/// - `signals`: OS signals that cancel the group's context
/// - `timeout`: deadline measured from group construction
/// - `bus_capacity`: event bus ring buffer size
#[derive(Clone, Debug)]
pub struct GroupConfig {
    /// Optional group name used in events and logs.
    pub name: Option<String>,

    /// Cancellation policy.
    pub policy: CancelPolicy,

    /// Signals bridged into the context (`None` = no bridge, empty = default set).
    pub signals: Option<Vec<Signal>>,

    /// Deadline for the whole group (`None` = unbounded).
    ///
    /// When the deadline hits, tasks observe cancellation and `wait` reports
    /// `Cause::DeadlineExceeded`; tasks are still awaited.
    pub timeout: Option<Duration>,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events skip older ones.
    pub bus_capacity: usize,
}

impl GroupConfig {
    /// Returns the signal bridge to install, if signals are configured.
    #[inline]
    pub fn signal_bridge(&self) -> Option<SignalBridge> {
        self.signals
            .as_ref()
            .map(|signals| SignalBridge::new(signals.iter().copied()))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for GroupConfig {
    /// Default configuration (the zero-value group):
    ///
    /// - `name = None`
    /// - `policy = CancelPolicy::Never`
    /// - `signals = None` (no bridge)
    /// - `timeout = None` (no deadline)
    /// - `bus_capacity = 256`
    fn default() -> Self {
        Self {
            name: None,
            policy: CancelPolicy::default(),
            signals: None,
            timeout: None,
            bus_capacity: 256,
        }
    }
}
