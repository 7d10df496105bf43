//! # Task abstraction.
//!
//! A [`Task`] is a one-shot unit of work: it has a name and is consumed by a
//! single [`run`](Task::run) that receives the group's shared [`CancellableContext`].
//! Implementors should watch the context and exit promptly once it is cancelled;
//! the group never interrupts a task.

use std::future::Future;
use std::pin::Pin;

use crate::context::CancellableContext;
use crate::error::TaskError;

/// Future returned by [`Task::run`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Owned, type-erased task; what groups and the orchestration helpers accept.
pub type BoxTask = Box<dyn Task>;

/// # Asynchronous, cancelable, one-shot unit.
///
/// # Example
/// ```
/// use taskgroup::{BoxTaskFuture, CancellableContext, Task, TaskError};
///
/// struct Flush {
///     target: String,
/// }
///
/// impl Task for Flush {
///     fn name(&self) -> &str { "flush" }
///
///     fn run(self: Box<Self>, ctx: CancellableContext) -> BoxTaskFuture {
///         Box::pin(async move {
///             if ctx.is_cancelled() {
///                 return Err(TaskError::Canceled);
///             }
///             // flush self.target ...
///             let _ = self.target;
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Task: Send + 'static {
    /// Returns a human-readable task name; an empty name is replaced by `task-<index>`.
    fn name(&self) -> &str;

    /// Consumes the task and returns the future that performs it.
    fn run(self: Box<Self>, ctx: CancellableContext) -> BoxTaskFuture;
}
