use std::time::Duration;

use taskgroup::{
    CancellableContext, Cause, GroupError, RuntimeError, TaskError, TaskFn, run_until_failure_or_signal,
    shutdown_all,
};
use tokio::time::{Instant, sleep};

#[tokio::test]
async fn test_shutdown_all_succeeds_when_every_step_does() {
    let root = CancellableContext::background();
    let res = shutdown_all(
        &root,
        None,
        [
            TaskFn::boxed("flush", |_ctx| async { Ok(()) }),
            TaskFn::boxed("close", |_ctx| async { Ok(()) }),
        ],
    )
    .await;
    assert!(res.is_ok());
}

#[tokio::test]
async fn test_shutdown_all_collects_every_error() {
    let root = CancellableContext::background();
    let err = shutdown_all(
        &root,
        None,
        [
            TaskFn::boxed("flush", |_ctx| async { Err(TaskError::fail("flush failed")) }),
            TaskFn::boxed("close", |ctx| async move {
                tokio::task::yield_now().await;
                assert!(!ctx.is_cancelled(), "one failure must not cancel the others");
                Err(TaskError::fail("close failed"))
            }),
            TaskFn::boxed("report", |_ctx| async { Ok(()) }),
        ],
    )
    .await
    .unwrap_err();

    assert_eq!(err.as_label(), "runtime_during_shutdown");
    let group = err.group_error().expect("group outcome");
    assert!(matches!(group, GroupError::Tasks(list) if list.len() == 2));
    assert!(err.to_string().starts_with("an error occurred during shutdown: "));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_deadline_still_drains() {
    let root = CancellableContext::background();
    let started = Instant::now();

    let err = shutdown_all(
        &root,
        Some(Duration::from_millis(50)),
        [
            // Ignores its context and outlives the deadline.
            TaskFn::boxed("stubborn", |_ctx| async {
                sleep(Duration::from_millis(200)).await;
                Ok(())
            }),
            TaskFn::boxed("flush", |_ctx| async { Err(TaskError::fail("flush failed")) }),
        ],
    )
    .await
    .unwrap_err();

    assert!(started.elapsed() >= Duration::from_millis(200));

    let Some(GroupError::Cancelled { cause, errors }) = err.group_error() else {
        panic!("expected a deadline, got {err:?}");
    };
    assert!(matches!(cause, Cause::DeadlineExceeded { timeout } if *timeout == Duration::from_millis(50)));
    let errors = errors.as_ref().expect("task error kept");
    assert_eq!(errors.first().task.as_ref(), "flush");
    assert!(err.to_string().contains("flush failed"));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_within_deadline_is_ok() {
    let root = CancellableContext::background();
    let res = shutdown_all(
        &root,
        Some(Duration::from_secs(5)),
        [TaskFn::boxed("quick", |_ctx| async {
            sleep(Duration::from_millis(10)).await;
            Ok(())
        })],
    )
    .await;
    assert!(res.is_ok());
}

#[tokio::test]
async fn test_zero_timeout_cancels_before_tasks_start() {
    let root = CancellableContext::background();
    let err = shutdown_all(
        &root,
        Some(Duration::ZERO),
        [TaskFn::boxed("step", |ctx| async move {
            if ctx.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            Ok(())
        })],
    )
    .await
    .unwrap_err();

    let group = err.group_error().expect("group outcome");
    assert!(group.is_deadline());
    assert!(group.failures().is_empty());
}

#[tokio::test]
async fn test_run_reports_first_failure() {
    let root = CancellableContext::background();
    let err = run_until_failure_or_signal(
        &root,
        [
            TaskFn::boxed("server", |ctx| async move {
                ctx.done().await;
                Err(TaskError::Canceled)
            }),
            TaskFn::boxed("migrator", |_ctx| async { Err(TaskError::fail("schema mismatch")) }),
        ],
    )
    .await
    .unwrap_err();

    let RuntimeError::DuringRun { source: GroupError::Task(failure) } = &err else {
        panic!("expected first failure, got {err:?}");
    };
    assert_eq!(failure.task.as_ref(), "migrator");
    assert!(err.to_string().contains("schema mismatch"));
    assert!(!root.is_cancelled());
}

#[tokio::test]
async fn test_run_with_cancelled_parent_reports_cancellation() {
    let root = CancellableContext::background();
    root.cancel(Cause::DeadlineExceeded { timeout: Duration::ZERO });

    let err = run_until_failure_or_signal(
        &root,
        [TaskFn::boxed("server", |ctx| async move {
            ctx.done().await;
            Err(TaskError::Canceled)
        })],
    )
    .await
    .unwrap_err();

    let group = err.group_error().expect("group outcome");
    assert!(group.cause().is_some_and(|c| c.is_parent()));
    assert!(group.is_deadline());
}

#[tokio::test]
async fn test_run_then_shutdown() {
    let root = CancellableContext::background();
    let run = run_until_failure_or_signal(
        &root,
        [TaskFn::boxed("once", |_ctx| async { Ok(()) })],
    )
    .await;
    assert!(run.is_ok());

    let shutdown = shutdown_all(
        &root,
        Some(Duration::from_secs(1)),
        [TaskFn::boxed("cleanup", |_ctx| async { Ok(()) })],
    )
    .await;
    assert!(shutdown.is_ok());
}
