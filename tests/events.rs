use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use taskgroup::{
    CancellableContext, Event, EventKind, Subscribe, TaskError, TaskGroup,
};
use tokio::sync::{Notify, broadcast};

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

fn kinds(events: &[Event]) -> Vec<EventKind> {
    events.iter().map(|e| e.kind).collect()
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
    finished: Notify,
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
        if event.kind == EventKind::GroupFinished {
            self.finished.notify_one();
        }
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

struct Bomb;

#[async_trait]
impl Subscribe for Bomb {
    async fn on_event(&self, event: &Event) {
        if event.kind == EventKind::TaskStarting {
            panic!("bomb went off");
        }
    }

    fn name(&self) -> &'static str {
        "bomb"
    }
}

#[tokio::test]
async fn test_successful_task_lifecycle() {
    let group = TaskGroup::default();
    let mut rx = group.subscribe();

    group.spawn("job", |_ctx| async { Ok(()) });
    group.wait().await.unwrap();

    let events = drain(&mut rx);
    assert_eq!(
        kinds(&events),
        [EventKind::TaskStarting, EventKind::TaskStopped, EventKind::GroupFinished]
    );
    assert_eq!(events[0].task.as_deref(), Some("job"));
    assert_eq!(events[0].index, Some(0));
    assert_eq!(events[2].reason.as_deref(), Some("ok"));
    assert!(events.windows(2).all(|w| w[0].seq < w[1].seq));
}

#[tokio::test]
async fn test_failure_publishes_cancellation_and_outcome() {
    let group = TaskGroup::builder(&CancellableContext::background())
        .with_name("workers")
        .cancel_on_first_error()
        .build()
        .unwrap();
    let mut rx = group.subscribe();

    group.spawn("bad", |_ctx| async { Err(TaskError::fail("boom")) });
    assert!(group.wait().await.is_err());

    let events = drain(&mut rx);
    assert_eq!(
        kinds(&events),
        [
            EventKind::TaskStarting,
            EventKind::TaskFailed,
            EventKind::ContextCancelled,
            EventKind::GroupFinished,
        ]
    );
    assert!(events.iter().all(|e| e.group.as_deref() == Some("workers")));
    assert!(events[1].reason.as_deref().is_some_and(|r| r.contains("boom")));
    assert_eq!(events[3].reason.as_deref(), Some("group_task_failed"));
}

#[tokio::test]
async fn test_graceful_cancel_is_reported_as_stopped() {
    let group = TaskGroup::default();
    let mut rx = group.subscribe();

    group.spawn("worker", |ctx| async move {
        ctx.done().await;
        Err(TaskError::Canceled)
    });
    group.context().cancel(taskgroup::Cause::Signal(taskgroup::Signal::Quit));
    let _ = group.wait().await;

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| e.kind == EventKind::TaskStopped));
    assert!(!events.iter().any(|e| e.kind == EventKind::TaskFailed));
}

#[tokio::test]
async fn test_subscribers_receive_events() {
    let recorder = Arc::new(Recorder::default());
    let group = TaskGroup::builder(&CancellableContext::background())
        .with_subscribers(vec![recorder.clone()])
        .build()
        .unwrap();

    group.spawn("job", |_ctx| async { Ok(()) });
    group.wait().await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), recorder.finished.notified())
        .await
        .expect("GroupFinished delivered");
    let seen = kinds(&recorder.events.lock().unwrap());
    assert_eq!(
        seen,
        [EventKind::TaskStarting, EventKind::TaskStopped, EventKind::GroupFinished]
    );
}

#[tokio::test]
async fn test_panicking_subscriber_is_isolated() {
    let recorder = Arc::new(Recorder::default());
    let group = TaskGroup::builder(&CancellableContext::background())
        .with_subscribers(vec![Arc::new(Bomb), recorder.clone()])
        .build()
        .unwrap();

    group.spawn("job", |_ctx| async { Ok(()) });
    group.wait().await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), recorder.finished.notified())
        .await
        .expect("delivery continued after the panic");

    let events = recorder.events.lock().unwrap();
    let report = events
        .iter()
        .find(|e| e.kind == EventKind::SubscriberPanicked)
        .expect("panic reported");
    assert_eq!(report.task.as_deref(), Some("bomb"));
    assert!(report.reason.as_deref().is_some_and(|r| r.contains("bomb went off")));
    assert!(events.iter().any(|e| e.kind == EventKind::TaskStopped));
}

#[cfg(feature = "logging")]
#[tokio::test]
async fn test_log_writer_accepts_every_event() {
    let group = TaskGroup::builder(&CancellableContext::background())
        .with_name("logged")
        .with_subscribers(vec![Arc::new(taskgroup::LogWriter::new())])
        .build()
        .unwrap();

    group.spawn("ok", |_ctx| async { Ok(()) });
    group.spawn("bad", |_ctx| async { Err(TaskError::fail("boom")) });
    assert!(group.wait().await.is_err());
}
