//! # Example: service
//!
//! A small service lifecycle built on the two entry points.
//!
//! Shows how to:
//! - Run workers with [`run_until_failure_or_signal`] (first error or Ctrl-C stops all).
//! - Run cleanup with [`shutdown_all`] under a grace deadline.
//! - Attach [`LogWriter`] to a custom group to see events as `tracing` records.
//!
//! ## Flow
//! ```text
//! main
//!  ├─► TaskGroup (named "warmup", LogWriter attached)
//!  │     └─► cache-warm, config-load ─► wait()
//!  ├─► run_until_failure_or_signal(&root, [ticker, flaky])
//!  │     flaky fails after ~1.5s ─► ticker observes ctx.done() ─► DuringRun
//!  └─► shutdown_all(&root, Some(2s), [flush, close])
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example service
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use taskgroup::{
    CancellableContext, LogWriter, TaskError, TaskFn, TaskGroup, run_until_failure_or_signal,
    shutdown_all,
};
use tokio::time::sleep;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let root = CancellableContext::background();

    let warmup = TaskGroup::builder(&root)
        .with_name("warmup")
        .cancel_on_first_error()
        .with_timeout(Duration::from_secs(1))
        .with_subscribers(vec![Arc::new(LogWriter::new())])
        .build()
        .context("building warmup group")?;
    warmup.spawn("cache-warm", |_ctx| async {
        sleep(Duration::from_millis(200)).await;
        Ok(())
    });
    warmup.spawn("config-load", |_ctx| async {
        sleep(Duration::from_millis(100)).await;
        Ok(())
    });
    warmup.wait().await.context("warmup failed")?;

    let run = run_until_failure_or_signal(
        &root,
        [
            TaskFn::boxed("ticker", |ctx| async move {
                let mut ticks = 0u64;
                loop {
                    tokio::select! {
                        _ = ctx.done() => {
                            println!("[ticker] stopping after {ticks} ticks");
                            return Err(TaskError::Canceled);
                        }
                        _ = sleep(Duration::from_millis(300)) => {
                            ticks += 1;
                            println!("[ticker] tick {ticks}");
                        }
                    }
                }
            }),
            TaskFn::boxed("flaky", |ctx| async move {
                tokio::select! {
                    _ = ctx.done() => Err(TaskError::Canceled),
                    _ = sleep(Duration::from_millis(1500)) => Err(TaskError::fail("upstream went away")),
                }
            }),
        ],
    )
    .await;
    if let Err(err) = &run {
        println!("run stopped: {err}");
    }

    shutdown_all(
        &root,
        Some(Duration::from_secs(2)),
        [
            TaskFn::boxed("flush", |_ctx| async {
                sleep(Duration::from_millis(100)).await;
                println!("[flush] done");
                Ok(())
            }),
            TaskFn::boxed("close", |_ctx| async {
                println!("[close] done");
                Ok(())
            }),
        ],
    )
    .await
    .context("shutdown failed")?;

    Ok(())
}
