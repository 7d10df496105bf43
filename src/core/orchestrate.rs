//! # Whole-program entry points.
//!
//! Two ready-made groups for the shape most services have:
//!
//! - [`run_until_failure_or_signal`]: run long-lived workers until one fails or
//!   the process receives `SIGINT`/`SIGTERM`, then wait for all of them.
//! - [`shutdown_all`]: run cleanup steps concurrently, never cancelling one
//!   because another failed, optionally bounded by a deadline.
//!
//! ```text
//! main
//!  ├─► run_until_failure_or_signal(&root, workers)
//!  │      group: CancelOnFirstError + signals(SIGINT, SIGTERM)
//!  │      Err ─► RuntimeError::DuringRun { source }
//!  └─► shutdown_all(&root, Some(grace), cleanups)
//!         group: Never + deadline(grace)
//!         Err ─► RuntimeError::DuringShutdown { source }
//! ```

use std::time::Duration;

use crate::{
    context::CancellableContext,
    core::TaskGroup,
    error::RuntimeError,
    tasks::BoxTask,
};

/// Runs `tasks` concurrently until the first failure or termination signal.
///
/// The group cancels its context on the first task error and bridges the
/// default signals; it then waits for every task to return.
///
/// # Errors
/// - [`RuntimeError::SignalSetup`] / [`RuntimeError::UnsupportedSignal`] before any task starts
/// - [`RuntimeError::DuringRun`] wrapping the group outcome otherwise
///
/// # Example
/// ```no_run
/// use taskgroup::{run_until_failure_or_signal, CancellableContext, TaskError, TaskFn};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = CancellableContext::background();
/// run_until_failure_or_signal(&root, [
///     TaskFn::boxed("http", |ctx| async move {
///         ctx.done().await;
///         Err::<(), _>(TaskError::Canceled)
///     }),
/// ])
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_until_failure_or_signal<I>(
    parent: &CancellableContext,
    tasks: I,
) -> Result<(), RuntimeError>
where
    I: IntoIterator<Item = BoxTask>,
{
    let group = TaskGroup::builder(parent)
        .with_name("run")
        .cancel_on_first_error()
        .with_default_signals()
        .build()?;
    for task in tasks {
        group.submit(task);
    }
    group
        .wait()
        .await
        .map_err(|source| RuntimeError::DuringRun { source })
}

/// Runs shutdown `tasks` concurrently and collects every failure.
///
/// No task is cancelled because another failed. With `timeout`, the shared
/// context is cancelled once it elapses; tasks are still awaited, so a task
/// that ignores its context extends the shutdown.
///
/// # Errors
/// [`RuntimeError::DuringShutdown`] wrapping either every task error or the
/// deadline cause (plus any task errors).
pub async fn shutdown_all<I>(
    parent: &CancellableContext,
    timeout: Option<Duration>,
    tasks: I,
) -> Result<(), RuntimeError>
where
    I: IntoIterator<Item = BoxTask>,
{
    let mut builder = TaskGroup::builder(parent).with_name("shutdown");
    if let Some(timeout) = timeout {
        builder = builder.with_timeout(timeout);
    }
    let group = builder.build()?;
    for task in tasks {
        group.submit(task);
    }
    group
        .wait()
        .await
        .map_err(|source| RuntimeError::DuringShutdown { source })
}
