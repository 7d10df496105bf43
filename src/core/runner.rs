//! # One-shot task execution.
//!
//! [`run_once`] drives a single task of a group to completion and records its
//! outcome. It is the body of every future the group's tracker spawns.
//!
//! ## Flow
//! ```text
//! publish(TaskStarting)
//!   └─► task.run(ctx)             (panics caught)
//!         ├─ Ok(())                         ─► publish(TaskStopped)
//!         ├─ Err(Canceled) && ctx cancelled ─► publish(TaskStopped)
//!         └─ Err(e)                         ─► publish(TaskFailed)
//!                                             errors.push(e) == 0 && CancelOnFirstError
//!                                               └─► ctx.cancel(TaskFailed(e))
//! completed += 1
//! ```
//!
//! Only the task whose error lands first in the aggregator attempts the
//! cancellation, so the context cause and the first aggregated error agree
//! unless a signal, deadline or parent won earlier.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use futures::FutureExt;

use crate::{
    context::Cause,
    core::group::Shared,
    error::{TaskError, TaskFailure},
    events::{Event, EventKind},
    subscribers::panic_message,
    tasks::BoxTask,
};

/// Runs `task` (submitted as number `index`) against the group state.
pub(crate) async fn run_once(task: BoxTask, index: usize, shared: Arc<Shared>) {
    let name: Arc<str> = match task.name() {
        "" => Arc::from(format!("task-{index}")),
        name => Arc::from(name),
    };
    shared.publish(
        Event::new(EventKind::TaskStarting)
            .with_task(Arc::clone(&name))
            .with_index(index),
    );

    let ctx = shared.ctx.clone();
    let result = match AssertUnwindSafe(async move { task.run(ctx).await })
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(payload) => Err(TaskError::Panicked {
            message: panic_message(payload.as_ref()),
        }),
    };

    match result {
        Ok(()) => shared.publish(
            Event::new(EventKind::TaskStopped)
                .with_task(name)
                .with_index(index),
        ),
        Err(TaskError::Canceled) if shared.ctx.is_cancelled() => shared.publish(
            Event::new(EventKind::TaskStopped)
                .with_task(name)
                .with_index(index)
                .with_reason("cancelled"),
        ),
        Err(error) => {
            shared.publish(
                Event::new(EventKind::TaskFailed)
                    .with_task(Arc::clone(&name))
                    .with_index(index)
                    .with_reason(error.to_string()),
            );
            let failure = TaskFailure::new(index, name, error);
            let position = shared.errors.push(failure.clone());
            if position == 0 && shared.policy.cancels_on_error() {
                shared.ctx.cancel(Cause::TaskFailed(failure));
            }
        }
    }
    shared.completed.fetch_add(1, Ordering::SeqCst);
}
