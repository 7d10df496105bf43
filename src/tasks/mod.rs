//! # Task abstractions.
//!
//! - [`Task`] - trait for one-shot, cancelable units of work
//! - [`TaskFn`] - closure-backed implementation
//! - [`BoxTask`] - owned, type-erased task (`Box<dyn Task>`)
//! - [`BoxTaskFuture`] - the future a task runs as

mod task;
mod task_fn;

pub use task::{BoxTask, BoxTaskFuture, Task};
pub use task_fn::TaskFn;
