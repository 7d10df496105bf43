use std::sync::Arc;
use std::time::Duration;

use crate::{
    context::{CancellableContext, Signal},
    core::{GroupConfig, TaskGroup, group::Shared},
    error::RuntimeError,
    events::Bus,
    policies::CancelPolicy,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for a [`TaskGroup`] with optional signals, deadline and subscribers.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use taskgroup::{CancellableContext, CancelPolicy, TaskGroup};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = CancellableContext::background();
/// let group = TaskGroup::builder(&root)
///     .with_name("workers")
///     .with_policy(CancelPolicy::CancelOnFirstError)
///     .with_timeout(Duration::from_secs(5))
///     .build()?;
///
/// group.spawn("noop", |_ctx| async { Ok(()) });
/// group.wait().await?;
/// # Ok(())
/// # }
/// ```
pub struct TaskGroupBuilder {
    parent: CancellableContext,
    cfg: GroupConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl TaskGroupBuilder {
    /// Creates a builder whose group derives its context from `parent`.
    pub fn new(parent: &CancellableContext) -> Self {
        Self {
            parent: parent.clone(),
            cfg: GroupConfig::default(),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, cfg: GroupConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the group name attached to every event.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.cfg.name = Some(name.into());
        self
    }

    /// Sets the cancellation policy.
    pub fn with_policy(mut self, policy: CancelPolicy) -> Self {
        self.cfg.policy = policy;
        self
    }

    /// Shorthand for `with_policy(CancelPolicy::CancelOnFirstError)`.
    pub fn cancel_on_first_error(self) -> Self {
        self.with_policy(CancelPolicy::CancelOnFirstError)
    }

    /// Bridges `signals` into the group context; an empty set means `SIGINT` + `SIGTERM`.
    pub fn with_signals(mut self, signals: impl IntoIterator<Item = Signal>) -> Self {
        self.cfg.signals = Some(signals.into_iter().collect());
        self
    }

    /// Bridges the default signal set (`SIGINT` + `SIGTERM`).
    pub fn with_default_signals(self) -> Self {
        self.with_signals([])
    }

    /// Bounds the group by a deadline measured from `build`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.timeout = Some(timeout);
        self
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive group events through one listener task fed by the
    /// group's bus; a slow subscriber delays the others, never the tasks.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the group.
    ///
    /// Must run inside a Tokio runtime when signals, a timeout or subscribers
    /// are configured (each spawns a background task).
    ///
    /// # Errors
    /// [`RuntimeError::SignalSetup`] / [`RuntimeError::UnsupportedSignal`] if a
    /// signal listener cannot be registered; nothing is left running then.
    pub fn build(self) -> Result<TaskGroup, RuntimeError> {
        let ctx = match self.cfg.timeout {
            Some(timeout) => self.parent.with_deadline(timeout),
            None => self.parent.child(),
        };
        if let Some(bridge) = self.cfg.signal_bridge() {
            if let Err(err) = bridge.install(&ctx) {
                ctx.release();
                return Err(err);
            }
        }

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        if !self.subscribers.is_empty() {
            Arc::new(SubscriberSet::new(self.subscribers)).spawn_listener(&bus);
        }

        let name = self.cfg.name.map(Arc::<str>::from);
        Ok(TaskGroup::from_shared(Shared::new(
            ctx,
            self.cfg.policy,
            bus,
            name,
        )))
    }
}
