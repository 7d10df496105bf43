//! # Cancellation causes.
//!
//! A [`Cause`] records *why* a [`CancellableContext`](crate::CancellableContext)
//! stopped. It is written exactly once, by whichever cancellation happens first,
//! and never changes afterwards. "Not cancelled" is `None` from
//! [`CancellableContext::cause`](crate::CancellableContext::cause).

use std::time::Duration;

use thiserror::Error;

use crate::context::Signal;
use crate::error::TaskFailure;

/// Reason a context was cancelled.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum Cause {
    /// A task of the owning group failed and the group cancels on first error.
    #[error("{0}")]
    TaskFailed(TaskFailure),

    /// A watched OS signal arrived.
    #[error("received {0}")]
    Signal(Signal),

    /// The context deadline elapsed.
    #[error("deadline of {timeout:?} exceeded")]
    DeadlineExceeded {
        /// Configured timeout.
        timeout: Duration,
    },

    /// The parent context was cancelled; carries the parent's cause.
    #[error("parent cancelled: {0}")]
    Parent(Box<Cause>),
}

impl Cause {
    /// Follows [`Cause::Parent`] links down to the original cause.
    ///
    /// # Example
    /// ```
    /// use taskgroup::{Cause, Signal};
    ///
    /// let cause = Cause::Parent(Box::new(Cause::Parent(Box::new(Cause::Signal(Signal::Terminate)))));
    /// assert!(matches!(cause.root(), Cause::Signal(Signal::Terminate)));
    /// ```
    pub fn root(&self) -> &Cause {
        let mut cause = self;
        while let Cause::Parent(parent) = cause {
            cause = parent;
        }
        cause
    }

    /// Signal behind this cause, looking through parent links.
    pub fn signal(&self) -> Option<Signal> {
        match self.root() {
            Cause::Signal(signal) => Some(*signal),
            _ => None,
        }
    }

    /// `true` when a deadline (own or inherited) caused the cancellation.
    pub fn is_deadline(&self) -> bool {
        matches!(self.root(), Cause::DeadlineExceeded { .. })
    }

    /// `true` when the cancellation was inherited from a parent context.
    pub fn is_parent(&self) -> bool {
        matches!(self, Cause::Parent(_))
    }

    /// Task failure behind this cause, looking through parent links.
    pub fn task_failure(&self) -> Option<&TaskFailure> {
        match self.root() {
            Cause::TaskFailed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Cause::TaskFailed(_) => "cause_task_failed",
            Cause::Signal(_) => "cause_signal",
            Cause::DeadlineExceeded { .. } => "cause_deadline_exceeded",
            Cause::Parent(_) => "cause_parent_cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;

    #[test]
    fn test_root_of_direct_cause_is_itself() {
        let cause = Cause::Signal(Signal::Interrupt);
        assert!(matches!(cause.root(), Cause::Signal(Signal::Interrupt)));
        assert!(!cause.is_parent());
    }

    #[test]
    fn test_parent_chain_lookups() {
        let failure = TaskFailure::new(3, "writer", TaskError::fail("disk full"));
        let cause = Cause::Parent(Box::new(Cause::TaskFailed(failure)));

        assert!(cause.is_parent());
        assert_eq!(cause.as_label(), "cause_parent_cancelled");
        assert_eq!(cause.task_failure().map(|f| f.index), Some(3));
        assert!(cause.signal().is_none());
        assert!(!cause.is_deadline());
        assert!(cause.to_string().starts_with("parent cancelled: task \"writer\""));
    }

    #[test]
    fn test_deadline_display() {
        let cause = Cause::DeadlineExceeded {
            timeout: Duration::from_millis(250),
        };
        assert!(cause.is_deadline());
        assert_eq!(cause.to_string(), "deadline of 250ms exceeded");
    }
}
