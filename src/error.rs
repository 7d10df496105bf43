//! Error types used by task groups and the tasks they run.
//!
//! This module defines the error taxonomy of the crate:
//!
//! - [`TaskError`]: returned by an individual task; recorded, never fatal to the group.
//! - [`TaskFailure`]: a [`TaskError`] tagged with the task that produced it.
//! - [`ErrorList`]: the combined, insertion-ordered view of every failure.
//! - [`GroupError`]: the group-level outcome returned by [`TaskGroup::wait`](crate::TaskGroup::wait).
//! - [`RuntimeError`]: misuse and setup failures, plus the orchestration wrappers.
//!
//! Every enum provides `as_label` (a stable snake_case label for logs/metrics).
//! Cancellation *causes* live in [`Cause`](crate::Cause); they are distinct from task errors.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::context::{Cause, Signal};

/// # Errors produced by task execution.
///
/// Cloneable so a finished group can hand out the same result on every
/// [`wait`](crate::TaskGroup::wait) call.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    /// Task execution failed with a message.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task panicked; the panic was caught at the group boundary.
    #[error("task panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
    },

    /// Task stopped because the shared context was cancelled.
    ///
    /// Returned while the context is cancelled this is a graceful exit and is not recorded.
    #[error("context cancelled")]
    Canceled,

    /// Any other error produced by the task.
    #[error(transparent)]
    Source(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use taskgroup::TaskError;
    ///
    /// let err = TaskError::fail("disk full");
    /// assert_eq!(err.to_string(), "execution failed: disk full");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Wraps an arbitrary error value.
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TaskError::Source(Arc::new(err))
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
            TaskError::Source(_) => "task_error",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { message } => format!("panic: {message}"),
            TaskError::Canceled => "context cancelled".to_string(),
            TaskError::Source(err) => format!("error: {err}"),
        }
    }

    /// Returns `true` for [`TaskError::Canceled`].
    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

impl From<std::io::Error> for TaskError {
    fn from(err: std::io::Error) -> Self {
        TaskError::from_error(err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync + 'static>> for TaskError {
    fn from(err: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        TaskError::Source(Arc::from(err))
    }
}

/// A task error together with the task that returned it.
#[derive(Error, Debug, Clone)]
#[error("task {task:?} (#{index}): {error}")]
pub struct TaskFailure {
    /// Submission index of the task within its group (0-based).
    pub index: usize,
    /// Task name.
    pub task: Arc<str>,
    /// The error the task returned.
    #[source]
    pub error: TaskError,
}

impl TaskFailure {
    /// Creates a new failure record.
    pub fn new(index: usize, task: impl Into<Arc<str>>, error: TaskError) -> Self {
        Self {
            index,
            task: task.into(),
            error,
        }
    }
}

/// Combined view of every failure collected by a group, in completion order.
///
/// Never empty: an empty collection is represented by `None` at every API
/// boundary that hands out an `ErrorList`.
///
/// ## Display
/// ```text
/// 2 errors occurred:
///     [0] task "db" (#1): execution failed: disk full
///     [1] task "cache" (#0): execution failed: connection reset
/// ```
#[derive(Debug, Clone)]
pub struct ErrorList {
    failures: Vec<TaskFailure>,
}

impl ErrorList {
    /// Builds a list; returns `None` when `failures` is empty.
    pub fn new(failures: Vec<TaskFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    /// Number of collected failures (always `>= 1`).
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Always `false`; provided for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Earliest collected failure.
    pub fn first(&self) -> &TaskFailure {
        &self.failures[0]
    }

    /// All failures in completion order.
    pub fn failures(&self) -> &[TaskFailure] {
        &self.failures
    }

    /// Iterates over the original task errors in completion order.
    pub fn errors(&self) -> impl Iterator<Item = &TaskError> {
        self.failures.iter().map(|f| &f.error)
    }

    /// Extracts the original list.
    pub fn into_failures(self) -> Vec<TaskFailure> {
        self.failures
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.len() {
            1 => write!(f, "1 error occurred:")?,
            n => write!(f, "{n} errors occurred:")?,
        }
        for (pos, failure) in self.failures.iter().enumerate() {
            write!(f, "\n    [{pos}] {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.first())
    }
}

/// # Group-level outcome of [`TaskGroup::wait`](crate::TaskGroup::wait).
///
/// - [`GroupError::Task`]: first error under [`CancelPolicy::CancelOnFirstError`](crate::CancelPolicy).
/// - [`GroupError::Tasks`]: every error under [`CancelPolicy::Never`](crate::CancelPolicy).
/// - [`GroupError::Cancelled`]: the context stopped for a non-task reason
///   (signal, deadline, parent); carries whatever tasks reported meanwhile.
///
/// `Ok(())` from `wait` means no task failed and nothing cancelled the group.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum GroupError {
    /// The first task error; it also cancelled the shared context.
    #[error("{0}")]
    Task(TaskFailure),

    /// Every task error, in completion order.
    #[error("{0}")]
    Tasks(ErrorList),

    /// The shared context was cancelled by something other than a task.
    #[error("context cancelled: {cause}{}", with_errors(.errors))]
    Cancelled {
        /// Why the context was cancelled.
        cause: Cause,
        /// Errors tasks reported before they returned, if any.
        errors: Option<ErrorList>,
    },
}

fn with_errors(errors: &Option<ErrorList>) -> String {
    match errors {
        Some(list) => format!("; {list}"),
        None => String::new(),
    }
}

impl GroupError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            GroupError::Task(_) => "group_task_failed",
            GroupError::Tasks(_) => "group_tasks_failed",
            GroupError::Cancelled { .. } => "group_cancelled",
        }
    }

    /// Returns the non-task cancellation cause, if that is why the group stopped.
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            GroupError::Cancelled { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Returns every task failure carried by this error, in completion order.
    pub fn failures(&self) -> &[TaskFailure] {
        match self {
            GroupError::Task(failure) => std::slice::from_ref(failure),
            GroupError::Tasks(list) => list.failures(),
            GroupError::Cancelled {
                errors: Some(list), ..
            } => list.failures(),
            GroupError::Cancelled { errors: None, .. } => &[],
        }
    }

    /// `true` when an operator signal stopped the group.
    pub fn is_signal(&self) -> bool {
        self.cause().is_some_and(|c| c.signal().is_some())
    }

    /// `true` when the group deadline elapsed.
    pub fn is_deadline(&self) -> bool {
        self.cause().is_some_and(Cause::is_deadline)
    }
}

/// # Errors produced by the group runtime itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The OS refused to install a listener for a signal.
    #[error("failed to listen for {signal}: {source}")]
    SignalSetup {
        /// Signal that could not be registered.
        signal: Signal,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The signal cannot be observed on this platform.
    #[error("{signal} is not supported on this platform")]
    UnsupportedSignal {
        /// The offending signal.
        signal: Signal,
    },

    /// A task was submitted after [`TaskGroup::wait`](crate::TaskGroup::wait) returned.
    #[error("task submitted after the group finished")]
    GroupFinished,

    /// A run group stopped with an error.
    #[error("an error occurred during run: {source}")]
    DuringRun {
        /// Group outcome.
        source: GroupError,
    },

    /// One or more shutdown steps failed or the shutdown deadline elapsed.
    #[error("an error occurred during shutdown: {source}")]
    DuringShutdown {
        /// Group outcome.
        source: GroupError,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskgroup::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::GroupFinished.as_label(), "runtime_group_finished");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::SignalSetup { .. } => "runtime_signal_setup",
            RuntimeError::UnsupportedSignal { .. } => "runtime_unsupported_signal",
            RuntimeError::GroupFinished => "runtime_group_finished",
            RuntimeError::DuringRun { .. } => "runtime_during_run",
            RuntimeError::DuringShutdown { .. } => "runtime_during_shutdown",
        }
    }

    /// Returns the wrapped group outcome for [`RuntimeError::DuringRun`] and
    /// [`RuntimeError::DuringShutdown`].
    pub fn group_error(&self) -> Option<&GroupError> {
        match self {
            RuntimeError::DuringRun { source } | RuntimeError::DuringShutdown { source } => {
                Some(source)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(index: usize, task: &str, msg: &str) -> TaskFailure {
        TaskFailure::new(index, task, TaskError::fail(msg))
    }

    #[test]
    fn test_error_list_empty_is_none() {
        assert!(ErrorList::new(Vec::new()).is_none());
    }

    #[test]
    fn test_error_list_display_lists_positions() {
        let list = ErrorList::new(vec![failure(2, "db", "disk full"), failure(0, "cache", "reset")])
            .expect("non-empty");
        let text = list.to_string();

        assert!(text.starts_with("2 errors occurred:"));
        assert!(text.contains("[0] task \"db\" (#2): execution failed: disk full"));
        assert!(text.contains("[1] task \"cache\" (#0): execution failed: reset"));
    }

    #[test]
    fn test_error_list_preserves_originals() {
        let list = ErrorList::new(vec![failure(0, "a", "one"), failure(1, "b", "two")])
            .expect("non-empty");
        let messages: Vec<String> = list.errors().map(ToString::to_string).collect();
        assert_eq!(messages, ["execution failed: one", "execution failed: two"]);

        let failures = list.into_failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(&*failures[1].task, "b");
    }

    #[test]
    fn test_group_error_failures() {
        let err = GroupError::Task(failure(0, "a", "boom"));
        assert_eq!(err.failures().len(), 1);
        assert!(err.cause().is_none());
        assert_eq!(err.as_label(), "group_task_failed");

        let err = GroupError::Cancelled {
            cause: Cause::DeadlineExceeded {
                timeout: std::time::Duration::from_millis(5),
            },
            errors: None,
        };
        assert!(err.failures().is_empty());
        assert!(err.is_deadline());
        assert!(!err.is_signal());
    }

    #[test]
    fn test_task_error_from_io() {
        let err: TaskError = std::io::Error::other("pipe closed").into();
        assert_eq!(err.as_label(), "task_error");
        assert_eq!(err.to_string(), "pipe closed");
    }
}
