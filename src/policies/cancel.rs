//! # Cancellation policies for task groups.
//!
//! [`CancelPolicy`] decides what a task failure does to its siblings.
//!
//! - [`CancelPolicy::CancelOnFirstError`] the first failure cancels the shared context;
//!   siblings are *asked* to stop, and `wait` reports that first error.
//! - [`CancelPolicy::Never`] failures are only recorded; every task runs to completion
//!   and `wait` reports all of them (default).
//!
//! ## Choosing the right policy
//!
//! **Long-running services** (stop everything when one part breaks):
//! ```text
//! CancelPolicy::CancelOnFirstError  → server + workers + signal bridge
//! ```
//!
//! **Shutdown hooks** (every step must get its chance):
//! ```text
//! CancelPolicy::Never               → flush, close, release; collect all errors
//! ```

/// Policy controlling whether a task failure cancels the group's context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CancelPolicy {
    /// Record failures; never cancel because of them (default).
    #[default]
    Never,
    /// Cancel the shared context as soon as the first task fails.
    CancelOnFirstError,
}

impl CancelPolicy {
    /// Returns `true` for [`CancelPolicy::CancelOnFirstError`].
    #[inline]
    pub fn cancels_on_error(self) -> bool {
        matches!(self, CancelPolicy::CancelOnFirstError)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            CancelPolicy::Never => "never",
            CancelPolicy::CancelOnFirstError => "cancel_on_first_error",
        }
    }
}
