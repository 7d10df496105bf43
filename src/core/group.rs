//! # TaskGroup: run a set of tasks against one shared context.
//!
//! A [`TaskGroup`] launches every submitted task immediately on its own Tokio
//! task, hands each one the group's [`CancellableContext`], records failures in
//! an [`ErrorAggregator`] and, in [`wait`](TaskGroup::wait), blocks until every
//! launched task has returned.
//!
//! ## Architecture
//! ```text
//! submit(task) ──► TaskTracker::spawn(runner::run_once(task, index, shared))
//!                                      │
//!                        task.run(ctx) ─┤─ Ok / graceful cancel ─► TaskStopped
//!                                       └─ Err ─► errors.push ─► (policy) ctx.cancel
//!
//! wait()
//!   ├─► tracker.close()
//!   ├─► loop select! {
//!   │       tracker.wait() ─► empty under `finished` lock? ─► done
//!   │       ctx.done()     ─► publish(ContextCancelled), release watchers (once)
//!   │   }
//!   ├─► release watchers
//!   ├─► outcome from (ctx.cause(), errors, policy)
//!   └─► publish(GroupFinished)
//! ```
//!
//! ## Outcome of `wait`
//! | cause                    | policy             | result                               |
//! |--------------------------|--------------------|--------------------------------------|
//! | none                     | `Never`            | `Ok` or `Tasks(all errors)`          |
//! | none                     | `CancelOnFirstError` | `Ok`                               |
//! | `TaskFailed(f)`          | any                | `Task(f)`                            |
//! | signal/deadline/parent   | any                | `Cancelled { cause, errors }`        |
//!
//! ## Rules
//! - The group never aborts a task: cancellation is a request via the context.
//! - `wait` always drains; the outcome is computed once and replayed afterwards.
//! - Submitting after `wait` finished is a programming error (see [`TaskGroup::try_submit`]).
//! - `TaskGroup::default()` is a usable group with a fresh background context
//!   and `CancelPolicy::Never`, created lazily on first use.

use std::fmt;
use std::future::Future;
use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use tokio::sync::{OnceCell, broadcast};
use tokio_util::task::TaskTracker;

use crate::{
    context::{CancellableContext, Cause, Signal},
    core::{ErrorAggregator, GroupConfig, TaskGroupBuilder, runner},
    error::{ErrorList, GroupError, RuntimeError, TaskError},
    events::{Bus, Event, EventKind},
    policies::CancelPolicy,
    tasks::{BoxTask, TaskFn},
};

/// Lifecycle phase of a [`TaskGroup`], derived from its counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing was submitted yet.
    Idle,
    /// Tasks are running; none has returned and the context is live.
    Running,
    /// At least one task returned or the context was cancelled.
    Draining,
    /// `wait` observed every task return.
    Done,
}

impl Phase {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Draining => "draining",
            Phase::Done => "done",
        }
    }
}

/// State shared by a group and every task future it spawned.
pub(crate) struct Shared {
    pub(crate) ctx: CancellableContext,
    pub(crate) errors: ErrorAggregator,
    pub(crate) policy: CancelPolicy,
    pub(crate) launched: AtomicUsize,
    pub(crate) completed: AtomicUsize,
    bus: Bus,
    name: Option<Arc<str>>,
}

impl Shared {
    pub(crate) fn new(
        ctx: CancellableContext,
        policy: CancelPolicy,
        bus: Bus,
        name: Option<Arc<str>>,
    ) -> Self {
        Self {
            ctx,
            errors: ErrorAggregator::new(),
            policy,
            launched: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            bus,
            name,
        }
    }

    fn background() -> Self {
        Self::new(
            CancellableContext::background(),
            CancelPolicy::Never,
            Bus::new(GroupConfig::default().bus_capacity_clamped()),
            None,
        )
    }

    /// Publishes `event` tagged with the group name.
    pub(crate) fn publish(&self, event: Event) {
        self.bus.publish(event.with_group_opt(self.name.as_ref()));
    }

    fn publish_cancelled(&self) {
        let reason = self
            .ctx
            .cause()
            .map(|cause| cause.to_string())
            .unwrap_or_default();
        self.publish(Event::new(EventKind::ContextCancelled).with_reason(reason));
    }

    fn outcome(&self) -> Result<(), GroupError> {
        match self.ctx.cause() {
            Some(Cause::TaskFailed(failure)) => Err(GroupError::Task(failure)),
            Some(cause) => Err(GroupError::Cancelled {
                cause,
                errors: self.errors.combined(),
            }),
            None if self.policy.cancels_on_error() => match self.errors.first() {
                Some(failure) => Err(GroupError::Task(failure)),
                None => Ok(()),
            },
            None => match self.errors.combined() {
                Some(list) => Err(GroupError::Tasks(list)),
                None => Ok(()),
            },
        }
    }
}

/// A set of concurrently running tasks sharing one cancellable context.
///
/// # Example
/// ```
/// use taskgroup::{CancellableContext, GroupError, TaskError, TaskGroup};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let group = TaskGroup::cancel_on_error(&CancellableContext::background());
///
/// group.spawn("reader", |ctx| async move {
///     ctx.done().await;
///     Err(TaskError::Canceled)
/// });
/// group.spawn("writer", |_ctx| async { Err(TaskError::fail("disk full")) });
///
/// let err = group.wait().await.unwrap_err();
/// assert!(matches!(&err, GroupError::Task(f) if f.task.as_ref() == "writer"));
/// # }
/// ```
#[derive(Default)]
pub struct TaskGroup {
    shared: OnceLock<Arc<Shared>>,
    tracker: TaskTracker,
    finished: Mutex<bool>,
    outcome: OnceCell<Result<(), GroupError>>,
}

impl TaskGroup {
    /// Group derived from `parent` that never cancels on task errors.
    pub fn new(parent: &CancellableContext) -> Self {
        Self::with_policy(parent, CancelPolicy::Never)
    }

    /// Group derived from `parent` that cancels its context on the first task error.
    pub fn cancel_on_error(parent: &CancellableContext) -> Self {
        Self::with_policy(parent, CancelPolicy::CancelOnFirstError)
    }

    fn with_policy(parent: &CancellableContext, policy: CancelPolicy) -> Self {
        Self::from_shared(Shared::new(
            parent.child(),
            policy,
            Bus::new(GroupConfig::default().bus_capacity_clamped()),
            None,
        ))
    }

    /// Cancel-on-first-error group whose context is also cancelled by `signals`
    /// (empty = `SIGINT` + `SIGTERM`).
    ///
    /// # Errors
    /// When a signal listener cannot be registered.
    pub fn with_signals(
        parent: &CancellableContext,
        signals: impl IntoIterator<Item = Signal>,
    ) -> Result<Self, RuntimeError> {
        Self::builder(parent)
            .cancel_on_first_error()
            .with_signals(signals)
            .build()
    }

    /// Never-cancel group bounded by a deadline of `timeout` from now.
    ///
    /// # Panics
    /// Outside a Tokio runtime with a non-zero `timeout`.
    pub fn with_timeout(parent: &CancellableContext, timeout: Duration) -> Self {
        Self::from_shared(Shared::new(
            parent.with_deadline(timeout),
            CancelPolicy::Never,
            Bus::new(GroupConfig::default().bus_capacity_clamped()),
            None,
        ))
    }

    /// Returns a builder for a configured group.
    pub fn builder(parent: &CancellableContext) -> TaskGroupBuilder {
        TaskGroupBuilder::new(parent)
    }

    pub(crate) fn from_shared(shared: Shared) -> Self {
        let group = Self::default();
        let _ = group.shared.set(Arc::new(shared));
        group
    }

    fn shared(&self) -> &Arc<Shared> {
        self.shared.get_or_init(|| Arc::new(Shared::background()))
    }

    fn finished(&self) -> MutexGuard<'_, bool> {
        self.finished.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Launches `task` immediately with the group's context.
    ///
    /// # Panics
    /// If [`wait`](Self::wait) already returned; use [`try_submit`](Self::try_submit)
    /// to get an error instead.
    pub fn submit(&self, task: BoxTask) {
        if let Err(err) = self.try_submit(task) {
            panic!("{err}");
        }
    }

    /// Launches `task` immediately with the group's context.
    ///
    /// Tasks submitted while `wait` is draining are awaited by that same `wait`.
    ///
    /// # Errors
    /// [`RuntimeError::GroupFinished`] once `wait` observed every task return.
    ///
    /// # Panics
    /// Outside a Tokio runtime.
    pub fn try_submit(&self, task: BoxTask) -> Result<(), RuntimeError> {
        let shared = Arc::clone(self.shared());
        let finished = self.finished();
        if *finished {
            return Err(RuntimeError::GroupFinished);
        }
        let index = shared.launched.fetch_add(1, Ordering::SeqCst);
        self.tracker.spawn(runner::run_once(task, index, shared));
        drop(finished);
        Ok(())
    }

    /// Launches a closure-backed task named `name`.
    ///
    /// # Panics
    /// Same as [`submit`](Self::submit).
    pub fn spawn<F, Fut>(&self, name: impl Into<Cow<'static, str>>, f: F)
    where
        F: FnOnce(CancellableContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.submit(TaskFn::boxed(name, f));
    }

    /// Blocks until every launched task returned and reports the outcome.
    ///
    /// Idempotent: later (or concurrent) calls return the same outcome.
    pub async fn wait(&self) -> Result<(), GroupError> {
        self.outcome.get_or_init(|| self.drain()).await.clone()
    }

    async fn drain(&self) -> Result<(), GroupError> {
        let shared = Arc::clone(self.shared());
        self.tracker.close();

        let mut observed_cancel = false;
        loop {
            tokio::select! {
                biased;
                _ = self.tracker.wait() => {
                    if self.try_finish() {
                        break;
                    }
                }
                _ = shared.ctx.done(), if !observed_cancel => {
                    observed_cancel = true;
                    shared.ctx.release();
                    shared.publish_cancelled();
                }
            }
        }
        shared.ctx.release();
        if !observed_cancel && shared.ctx.is_cancelled() {
            shared.publish_cancelled();
        }

        let outcome = shared.outcome();
        let label = match &outcome {
            Ok(()) => "ok",
            Err(err) => err.as_label(),
        };
        shared.publish(Event::new(EventKind::GroupFinished).with_reason(label));
        outcome
    }

    fn try_finish(&self) -> bool {
        let mut finished = self.finished();
        if self.tracker.is_empty() {
            *finished = true;
        }
        *finished
    }

    /// Shared context handed to every task.
    pub fn context(&self) -> CancellableContext {
        self.shared().ctx.clone()
    }

    /// Cancellation policy of the group.
    pub fn policy(&self) -> CancelPolicy {
        self.shared().policy
    }

    /// All errors recorded so far, in completion order; `None` if there are none.
    pub fn error_list(&self) -> Option<ErrorList> {
        self.shared().errors.combined()
    }

    /// Number of tasks submitted so far.
    pub fn launched(&self) -> usize {
        self.shared().launched.load(Ordering::SeqCst)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        if *self.finished() {
            return Phase::Done;
        }
        let Some(shared) = self.shared.get() else {
            return Phase::Idle;
        };
        if shared.launched.load(Ordering::SeqCst) == 0 {
            Phase::Idle
        } else if shared.completed.load(Ordering::SeqCst) == 0 && !shared.ctx.is_cancelled() {
            Phase::Running
        } else {
            Phase::Draining
        }
    }

    /// Subscribes to the group's events.
    ///
    /// Receivers only see events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared().bus.subscribe()
    }
}

impl fmt::Debug for TaskGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("TaskGroup");
        if let Some(shared) = self.shared.get() {
            dbg.field("name", &shared.name)
                .field("policy", &shared.policy)
                .field("launched", &shared.launched.load(Ordering::SeqCst))
                .field("errors", &shared.errors.len());
        }
        dbg.field("phase", &self.phase()).finish()
    }
}
