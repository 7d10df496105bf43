//! # taskgroup
//!
//! **taskgroup** runs a set of async tasks against one shared cancellable
//! context and waits for all of them.
//!
//! A failing task can cancel its siblings (or not, depending on policy), an OS
//! termination signal or a deadline can cancel the whole group, and the group
//! reports either the first error or every error once all tasks have returned.
//! Two ready-made entry points cover the usual program shape: run workers until
//! one fails or a signal arrives, then run shutdown steps that must all complete.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   parent CancellableContext
//!            │ child / with_deadline
//!            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  TaskGroup                                                        │
//! │  - CancellableContext (shared, single-fire cause)                 │
//! │  - SignalBridge       (optional: SIGINT/SIGTERM/... ─► cancel)    │
//! │  - ErrorAggregator    (failures in completion order)              │
//! │  - CancelPolicy       (Never | CancelOnFirstError)                │
//! │  - Bus                (broadcast events)                          │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!    ┌────────┐         ┌────────┐         ┌────────┐
//!    │ task 0 │         │ task 1 │   ...   │ task N │   run(ctx)
//!    └───┬────┘         └───┬────┘         └───┬────┘
//!        │ Err              │ Ok               │ observes ctx.done()
//!        ▼                  ▼                  ▼
//!   errors.push        TaskStopped        returns (Canceled = graceful)
//!   (first + policy)
//!        └──► ctx.cancel(TaskFailed) ─► every task and child context sees it
//!
//! wait() ─► all returned ─► Ok | Task(first) | Tasks(all) | Cancelled{cause, errors}
//! ```
//!
//! ### Program shape
//! ```text
//! main
//!  ├─► run_until_failure_or_signal(&root, workers)   CancelOnFirstError + SIGINT/SIGTERM
//!  └─► shutdown_all(&root, Some(grace), cleanups)    Never + deadline
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                              |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------------|
//! | **Context**       | Cancellation tree with a recorded cause and deadlines.        | [`CancellableContext`], [`Cause`]               |
//! | **Signals**       | Bridge OS termination signals into a context.                 | [`SignalBridge`], [`Signal`]                    |
//! | **Groups**        | Launch tasks, wait for all, aggregate errors.                 | [`TaskGroup`], [`TaskGroupBuilder`], [`Phase`]  |
//! | **Policies**      | Whether one failure cancels the siblings.                     | [`CancelPolicy`]                                |
//! | **Entry points**  | Whole-program run and shutdown helpers.                       | [`run_until_failure_or_signal`], [`shutdown_all`] |
//! | **Errors**        | Typed task, group and runtime errors.                         | [`TaskError`], [`GroupError`], [`RuntimeError`] |
//! | **Tasks**         | One-shot tasks as closures or trait objects.                  | [`Task`], [`TaskFn`], [`BoxTask`]               |
//! | **Subscriber API**| Observe task and group events.                                | [`Subscribe`], [`Event`]                        |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] subscriber backed by `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskgroup::{shutdown_all, CancellableContext, TaskError, TaskFn, TaskGroup};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = CancellableContext::background();
//!
//!     // Workers: the first error cancels the rest.
//!     let group = TaskGroup::cancel_on_error(&root);
//!     group.spawn("ticker", |ctx| async move {
//!         loop {
//!             tokio::select! {
//!                 _ = ctx.done() => return Err(TaskError::Canceled),
//!                 _ = tokio::time::sleep(Duration::from_millis(5)) => {}
//!             }
//!         }
//!     });
//!     group.spawn("job", |_ctx| async { Err(TaskError::fail("bad config")) });
//!     if let Err(err) = group.wait().await {
//!         eprintln!("workers stopped: {err}");
//!     }
//!
//!     // Cleanup: every step runs, all errors are collected.
//!     shutdown_all(&root, Some(Duration::from_secs(1)), [
//!         TaskFn::boxed("flush", |_ctx| async { Ok(()) }),
//!         TaskFn::boxed("close", |_ctx| async { Ok(()) }),
//!     ])
//!     .await?;
//!     Ok(())
//! }
//! ```

mod context;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use context::{CancellableContext, Cause, DEFAULT_SIGNALS, Signal, SignalBridge};
pub use core::{
    ErrorAggregator, GroupConfig, Phase, TaskGroup, TaskGroupBuilder,
    run_until_failure_or_signal, shutdown_all,
};
pub use error::{ErrorList, GroupError, RuntimeError, TaskError, TaskFailure};
pub use events::{Bus, Event, EventKind};
pub use policies::CancelPolicy;
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BoxTask, BoxTaskFuture, Task, TaskFn};

// Optional: expose a simple built-in logger subscriber (demo/reference only).
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
