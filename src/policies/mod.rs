//! Group policies.
//!
//! ## Contents
//! - [`CancelPolicy`] whether a task failure cancels the shared context
//!
//! ## Quick wiring
//! ```text
//! GroupConfig { policy: CancelPolicy, .. }
//!      └─► core::runner records a failure and, under CancelOnFirstError,
//!          cancels the context with Cause::TaskFailed
//! ```
//!
//! ## Defaults
//! - `CancelPolicy::Never` (the zero-value group never cancels on error).

mod cancel;

pub use cancel::CancelPolicy;
