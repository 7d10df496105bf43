//! Signal delivery tests.
//!
//! Every test raises a different signal so parallel tests never observe each
//! other's deliveries. `SIGINT`/`SIGTERM` are never raised here.
#![cfg(unix)]

use std::time::Duration;

use nix::sys::signal::{Signal as NixSignal, raise};
use taskgroup::{
    CancellableContext, GroupError, Signal, SignalBridge, TaskError, TaskGroup,
};
use tokio::time::timeout;

#[tokio::test]
async fn test_signal_cancels_group() {
    let group = TaskGroup::with_signals(&CancellableContext::background(), [Signal::User1])
        .expect("listener installed");
    group.spawn("server", |ctx| async move {
        ctx.done().await;
        Err(TaskError::Canceled)
    });

    raise(NixSignal::SIGUSR1).expect("raise SIGUSR1");

    let err = timeout(Duration::from_secs(5), group.wait())
        .await
        .expect("group stopped after the signal")
        .unwrap_err();
    let GroupError::Cancelled { cause, errors } = &err else {
        panic!("expected a signal cancellation, got {err:?}");
    };
    assert_eq!(cause.signal(), Some(Signal::User1));
    assert!(!cause.is_parent());
    assert!(errors.is_none());
    assert_eq!(err.to_string(), "context cancelled: received SIGUSR1");
}

#[tokio::test]
async fn test_signal_after_completion_is_ignored() {
    let group = TaskGroup::with_signals(&CancellableContext::background(), [Signal::User2])
        .expect("listener installed");
    group.spawn("job", |_ctx| async { Ok(()) });
    group.wait().await.unwrap();

    raise(NixSignal::SIGUSR2).expect("raise SIGUSR2");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(group.context().cause().is_none());
    assert!(group.wait().await.is_ok());
}

#[tokio::test]
async fn test_context_bridge_records_signal() {
    let root = CancellableContext::background();
    let ctx = root
        .with_signals(&SignalBridge::new([Signal::Hangup]))
        .expect("listener installed");
    let child = ctx.child();

    raise(NixSignal::SIGHUP).expect("raise SIGHUP");

    timeout(Duration::from_secs(5), child.done())
        .await
        .expect("signal delivered");
    assert_eq!(ctx.cause().and_then(|c| c.signal()), Some(Signal::Hangup));
    assert!(child.cause().is_some_and(|c| c.is_parent()));
    assert!(!root.is_cancelled());
}

#[tokio::test]
async fn test_first_cause_wins_over_later_signal() {
    let group = TaskGroup::with_signals(&CancellableContext::background(), [Signal::Quit])
        .expect("listener installed");
    group.spawn("bad", |_ctx| async { Err(TaskError::fail("boom")) });
    group.spawn("server", |ctx| async move {
        ctx.done().await;
        Err(TaskError::Canceled)
    });

    let err = group.wait().await.unwrap_err();
    raise(NixSignal::SIGQUIT).expect("raise SIGQUIT");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(matches!(err, GroupError::Task(_)));
    assert!(group.context().cause().is_some_and(|c| c.signal().is_none()));
}

#[tokio::test]
async fn test_uncatchable_signal_fails_setup() {
    let err = TaskGroup::with_signals(&CancellableContext::background(), [Signal::Other(9)])
        .unwrap_err();
    assert_eq!(err.as_label(), "runtime_signal_setup");
}
