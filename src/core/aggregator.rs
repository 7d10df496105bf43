//! # Concurrency-safe error collection.
//!
//! [`ErrorAggregator`] is the only mutable state tasks of a group share besides
//! the context. It is append-only: entries are kept in insertion (completion)
//! order, never sorted, deduplicated or removed.
//!
//! ## Views
//! ```text
//! push/record ──► [f0, f1, f2, ...]
//!                   │
//!                   ├─► first()    → Some(f0) | None
//!                   └─► combined() → Some(ErrorList[f0, f1, ...]) | None
//! ```
//!
//! Reads are meant for after all tasks returned, but a concurrent late writer
//! still lands in the sequence and is visible to the next read.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ErrorList, TaskError, TaskFailure};

/// Append-only, insertion-ordered list of task failures.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    entries: Mutex<Vec<TaskFailure>>,
}

impl ErrorAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<TaskFailure>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `failure` and returns its position (0 = first error of the group).
    pub fn push(&self, failure: TaskFailure) -> usize {
        let mut entries = self.entries();
        entries.push(failure);
        entries.len() - 1
    }

    /// Records the outcome of a task; `Ok` is ignored.
    ///
    /// Returns the position of the stored failure, if one was stored.
    pub fn record(
        &self,
        index: usize,
        task: impl Into<Arc<str>>,
        result: Result<(), TaskError>,
    ) -> Option<usize> {
        result
            .err()
            .map(|error| self.push(TaskFailure::new(index, task, error)))
    }

    /// Earliest stored failure.
    pub fn first(&self) -> Option<TaskFailure> {
        self.entries().first().cloned()
    }

    /// All failures as one error value; `None` iff nothing was stored.
    pub fn combined(&self) -> Option<ErrorList> {
        ErrorList::new(self.snapshot())
    }

    /// Copy of every stored failure, in insertion order.
    pub fn snapshot(&self) -> Vec<TaskFailure> {
        self.entries().clone()
    }

    /// Number of stored failures.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns `true` when no failure was stored.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
