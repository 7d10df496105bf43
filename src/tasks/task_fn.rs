//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: FnOnce(CancellableContext) -> Fut`. The closure
//! is called exactly once, when the group launches the task; whatever it captured
//! moves into the returned future.
//!
//! ## Example
//! ```rust
//! use taskgroup::{BoxTask, CancellableContext, TaskError, TaskFn};
//!
//! let t: BoxTask = TaskFn::boxed("worker", |ctx: CancellableContext| async move {
//!     ctx.done().await;
//!     Err::<(), _>(TaskError::Canceled)
//! });
//!
//! assert_eq!(t.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;

use crate::context::CancellableContext;
use crate::error::TaskError;
use crate::tasks::task::{BoxTask, BoxTaskFuture, Task};

/// Function-backed task implementation.
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::boxed`] when you immediately need a [`BoxTask`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates an unnamed task; the group names it `task-<index>`.
    pub fn anonymous(f: F) -> Self {
        Self::new("", f)
    }
}

impl<F, Fut> TaskFn<F>
where
    F: FnOnce(CancellableContext) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    /// Creates the task and returns it boxed.
    pub fn boxed(name: impl Into<Cow<'static, str>>, f: F) -> BoxTask {
        Box::new(Self::new(name, f))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: FnOnce(CancellableContext) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(self: Box<Self>, ctx: CancellableContext) -> BoxTaskFuture {
        let this = *self;
        Box::pin((this.f)(ctx))
    }
}

impl<F> std::fmt::Debug for TaskFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskFn").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closure_receives_context() {
        let ctx = CancellableContext::background();
        let expected = ctx.clone();

        let task = TaskFn::boxed("probe", move |have: CancellableContext| async move {
            assert!(have.ptr_eq(&expected));
            Ok(())
        });
        assert_eq!(task.name(), "probe");
        task.run(ctx).await.expect("task succeeds");
    }

    #[test]
    fn test_anonymous_has_empty_name() {
        let task = TaskFn::anonymous(|_ctx: CancellableContext| async { Ok::<(), TaskError>(()) });
        assert_eq!(task.name(), "");
    }
}
