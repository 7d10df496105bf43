//! # Cancellation-aware execution context.
//!
//! [`CancellableContext`] is the value every task of a group receives. It wraps a
//! [`CancellationToken`] and adds what a bare token lacks: a single recorded
//! [`Cause`], parent/child derivation that carries the cause along, and scoped
//! watchers (OS signals, deadline) that are torn down as soon as the context is
//! cancelled, released, or dropped.
//!
//! ## Derivation tree
//! ```text
//! background()
//!   ├─► child()                        cancelled with Parent(cause) when the parent is
//!   ├─► with_deadline(d)               + timer: DeadlineExceeded after `d`
//!   └─► with_signals(&SignalBridge)    + listeners: Signal(s) on first delivery
//! ```
//!
//! ## Rules
//! - `cancel` is single-fire: the first call records its cause, later calls are no-ops.
//! - The cause is recorded **before** the token fires, so an observer that saw
//!   [`done`](CancellableContext::done) resolve always reads a cause.
//! - Parents cancel their children synchronously (no helper task involved).
//! - Watchers hold only weak references; they exit on cancel, [`release`](CancellableContext::release),
//!   or when the last handle is dropped.

mod cause;
mod signals;

pub use cause::Cause;
pub use signals::{DEFAULT_SIGNALS, Signal, SignalBridge};

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::error::RuntimeError;

/// Shared state behind a [`CancellableContext`] handle.
pub(crate) struct Inner {
    token: CancellationToken,
    cause: OnceLock<Cause>,
    children: Mutex<Vec<Weak<Inner>>>,
    /// Fires when watchers (signals, deadline) must stop.
    release: CancellationToken,
    deadline: Option<Instant>,
}

impl Inner {
    fn new(deadline: Option<Instant>) -> Self {
        Self {
            token: CancellationToken::new(),
            cause: OnceLock::new(),
            children: Mutex::new(Vec::new()),
            release: CancellationToken::new(),
            deadline,
        }
    }

    /// Records `cause` if nothing was recorded yet, then cancels children, the token and watchers.
    pub(crate) fn cancel(&self, cause: Cause) -> bool {
        if self.cause.set(cause).is_err() {
            return false;
        }
        let Some(recorded) = self.cause.get() else {
            return false;
        };

        let children = std::mem::take(
            &mut *self.children.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel(Cause::Parent(Box::new(recorded.clone())));
        }

        self.token.cancel();
        self.release.cancel();
        true
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.release.cancel();
    }
}

/// Cancellation-aware context shared by every task of a group.
///
/// Cheap to clone; all clones observe the same cancellation and cause.
///
/// # Example
/// ```
/// use taskgroup::{CancellableContext, Cause, Signal};
///
/// let root = CancellableContext::background();
/// let child = root.child();
///
/// assert!(root.cancel(Cause::Signal(Signal::Terminate)));
/// assert!(!root.cancel(Cause::Signal(Signal::Interrupt))); // first cause wins
///
/// assert!(child.is_cancelled());
/// assert_eq!(child.cause().and_then(|c| c.signal()), Some(Signal::Terminate));
/// ```
#[derive(Clone)]
pub struct CancellableContext {
    inner: Arc<Inner>,
}

impl CancellableContext {
    /// Returns a fresh root context that is only cancelled explicitly.
    pub fn background() -> Self {
        Self {
            inner: Arc::new(Inner::new(None)),
        }
    }

    /// Derives a child context.
    ///
    /// The child is cancelled with [`Cause::Parent`] when `self` is cancelled and
    /// inherits an already-cancelled parent immediately. Cancelling the child
    /// never affects the parent.
    pub fn child(&self) -> Self {
        self.derive(self.inner.deadline)
    }

    /// Derives a child context that is cancelled with [`Cause::DeadlineExceeded`]
    /// once `timeout` elapses, unless it was cancelled earlier for another reason.
    ///
    /// A zero `timeout` cancels the child before returning.
    ///
    /// # Panics
    /// When called outside a Tokio runtime with a non-zero `timeout`.
    pub fn with_deadline(&self, timeout: Duration) -> Self {
        let at = Instant::now().checked_add(timeout);
        let deadline = match (self.inner.deadline, at) {
            (Some(parent), Some(own)) => Some(parent.min(own)),
            (parent, own) => parent.or(own),
        };
        let child = self.derive(deadline);

        if timeout.is_zero() {
            child.cancel(Cause::DeadlineExceeded { timeout });
            return child;
        }
        let Some(at) = at else {
            // Too far in the future to ever fire.
            return child;
        };
        if child.is_cancelled() {
            return child;
        }

        let weak = Arc::downgrade(&child.inner);
        let release = child.inner.release.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = release.cancelled() => {}
                _ = tokio::time::sleep_until(at) => {
                    if let Some(inner) = weak.upgrade() {
                        inner.cancel(Cause::DeadlineExceeded { timeout });
                    }
                }
            }
        });
        child
    }

    /// Derives a child context that is cancelled with [`Cause::Signal`] the first
    /// time one of the bridge's signals is delivered to the process.
    ///
    /// Listeners are registered before this returns.
    ///
    /// # Errors
    /// [`RuntimeError::SignalSetup`] or [`RuntimeError::UnsupportedSignal`] when a
    /// listener cannot be installed.
    ///
    /// # Panics
    /// When called outside a Tokio runtime.
    pub fn with_signals(&self, bridge: &SignalBridge) -> Result<Self, RuntimeError> {
        let child = self.child();
        bridge.install(&child)?;
        Ok(child)
    }

    fn derive(&self, deadline: Option<Instant>) -> Self {
        let child = Arc::new(Inner::new(deadline));

        let mut children = self
            .inner
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match self.inner.cause.get() {
            Some(cause) => {
                drop(children);
                child.cancel(Cause::Parent(Box::new(cause.clone())));
            }
            None => {
                children.retain(|c| c.strong_count() > 0);
                children.push(Arc::downgrade(&child));
            }
        }

        Self { inner: child }
    }

    /// Cancels the context with `cause`.
    ///
    /// Returns `true` if this call performed the cancellation, `false` if the
    /// context was already cancelled (the recorded cause is left untouched).
    pub fn cancel(&self, cause: Cause) -> bool {
        self.inner.cancel(cause)
    }

    /// Returns the recorded cause, or `None` while the context is live.
    pub fn cause(&self) -> Option<Cause> {
        self.inner.cause.get().cloned()
    }

    /// Returns `true` once the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Future that completes once the context is cancelled.
    ///
    /// Resolves immediately if it already is.
    pub fn done(&self) -> WaitForCancellationFuture<'_> {
        self.inner.token.cancelled()
    }

    /// Returns a token that fires with this context.
    ///
    /// The token is a child: cancelling it does not cancel the context, so the
    /// recorded cause stays authoritative.
    pub fn token(&self) -> CancellationToken {
        self.inner.token.child_token()
    }

    /// Returns the earliest deadline bound to this context or its ancestors.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Stops signal and deadline watchers without cancelling the context.
    pub fn release(&self) {
        self.inner.release.cancel();
    }

    /// Returns `true` if both handles refer to the same context.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<Inner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn release_token(&self) -> CancellationToken {
        self.inner.release.clone()
    }
}

impl Default for CancellableContext {
    fn default() -> Self {
        Self::background()
    }
}

impl fmt::Debug for CancellableContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellableContext")
            .field("cancelled", &self.is_cancelled())
            .field("cause", &self.inner.cause.get())
            .field("deadline", &self.inner.deadline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TaskError, TaskFailure};

    #[test]
    fn test_background_is_live() {
        let ctx = CancellableContext::background();
        assert!(!ctx.is_cancelled());
        assert!(ctx.cause().is_none());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn test_cancel_is_single_fire() {
        let ctx = CancellableContext::background();
        let failure = TaskFailure::new(0, "a", TaskError::fail("first"));

        assert!(ctx.cancel(Cause::TaskFailed(failure)));
        assert!(!ctx.cancel(Cause::Signal(Signal::Interrupt)));
        assert!(!ctx.cancel(Cause::DeadlineExceeded {
            timeout: Duration::ZERO
        }));

        let cause = ctx.cause().expect("cancelled");
        assert_eq!(cause.task_failure().map(|f| f.error.to_string()).as_deref(), Some("execution failed: first"));
    }

    #[test]
    fn test_parent_cancel_reaches_grandchildren() {
        let root = CancellableContext::background();
        let child = root.child();
        let grandchild = child.child();

        root.cancel(Cause::Signal(Signal::Hangup));

        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
        let cause = grandchild.cause().expect("cancelled");
        assert!(matches!(&cause, Cause::Parent(inner) if inner.is_parent()));
        assert_eq!(cause.signal(), Some(Signal::Hangup));
    }

    #[test]
    fn test_child_of_cancelled_parent_is_cancelled() {
        let root = CancellableContext::background();
        root.cancel(Cause::Signal(Signal::Quit));

        let child = root.child();
        assert!(child.is_cancelled());
        assert!(child.cause().is_some_and(|c| c.is_parent()));
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent() {
        let root = CancellableContext::background();
        let child = root.child();
        child.cancel(Cause::Signal(Signal::User1));

        assert!(!root.is_cancelled());
        assert!(root.cause().is_none());
    }

    #[test]
    fn test_token_does_not_override_cause() {
        let ctx = CancellableContext::background();
        let token = ctx.token();
        token.cancel();

        assert!(!ctx.is_cancelled());
        ctx.cancel(Cause::Signal(Signal::Terminate));
        assert!(ctx.token().is_cancelled());
    }

    #[test]
    fn test_zero_deadline_cancels_immediately() {
        let ctx = CancellableContext::background().with_deadline(Duration::ZERO);
        assert!(ctx.is_cancelled());
        assert!(ctx.cause().is_some_and(|c| c.is_deadline()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires() {
        let ctx = CancellableContext::background().with_deadline(Duration::from_millis(30));
        assert!(ctx.deadline().is_some());
        assert!(!ctx.is_cancelled());

        ctx.done().await;
        assert!(matches!(
            ctx.cause(),
            Some(Cause::DeadlineExceeded { timeout }) if timeout == Duration::from_millis(30)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_loses_to_earlier_cancel() {
        let ctx = CancellableContext::background().with_deadline(Duration::from_millis(30));
        ctx.cancel(Cause::Signal(Signal::Interrupt));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ctx.cause().and_then(|c| c.signal()), Some(Signal::Interrupt));
    }

    #[tokio::test(start_paused = true)]
    async fn test_released_deadline_never_fires() {
        let ctx = CancellableContext::background().with_deadline(Duration::from_millis(10));
        ctx.release();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_inherits_earlier_deadline() {
        let outer = CancellableContext::background().with_deadline(Duration::from_millis(10));
        let inner = outer.with_deadline(Duration::from_secs(10));
        assert_eq!(inner.deadline(), outer.deadline());

        inner.done().await;
        assert!(inner.cause().is_some_and(|c| c.is_parent() && c.is_deadline()));
    }
}
