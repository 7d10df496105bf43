//! # OS signal bridge.
//!
//! [`SignalBridge`] turns asynchronous OS termination notifications into exactly
//! one cancellation of a [`CancellableContext`], then stops listening.
//!
//! ## Signals
//! **Unix platforms:** any [`Signal`]; the default set is `SIGINT` + `SIGTERM`.
//!
//! **Windows platforms:** only [`Signal::Interrupt`] (Ctrl-C).
//!
//! ## Lifecycle
//! ```text
//! install(ctx)
//!   ├─► register one listener per signal (synchronously; errors returned)
//!   └─► spawn watcher
//!         select! {
//!           ctx released / cancelled / dropped ─► exit
//!           first delivery of any signal      ─► ctx.cancel(Signal(s)), exit
//!         }
//!         listeners dropped on exit (subscription gone)
//! ```
//!
//! ## Notes
//! Tokio keeps the process-level handler installed once a signal was listened
//! for; dropping the listener only stops delivery to it. After the first bridge
//! for `SIGINT` is installed, Ctrl-C no longer terminates the process by default.

use std::fmt;

use crate::context::{CancellableContext, Cause};
use crate::error::RuntimeError;

/// Signals watched when none are specified.
pub const DEFAULT_SIGNALS: [Signal; 2] = [Signal::Interrupt, Signal::Terminate];

/// OS-level termination signal identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// `SIGINT` / Ctrl-C.
    Interrupt,
    /// `SIGTERM`.
    Terminate,
    /// `SIGQUIT`.
    Quit,
    /// `SIGHUP`.
    Hangup,
    /// `SIGUSR1`.
    User1,
    /// `SIGUSR2`.
    User2,
    /// Any other signal by its raw number (unix only).
    Other(i32),
}

impl Signal {
    #[cfg(unix)]
    fn kind(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;

        match self {
            Signal::Interrupt => SignalKind::interrupt(),
            Signal::Terminate => SignalKind::terminate(),
            Signal::Quit => SignalKind::quit(),
            Signal::Hangup => SignalKind::hangup(),
            Signal::User1 => SignalKind::user_defined1(),
            Signal::User2 => SignalKind::user_defined2(),
            Signal::Other(raw) => SignalKind::from_raw(raw),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Interrupt => f.write_str("SIGINT"),
            Signal::Terminate => f.write_str("SIGTERM"),
            Signal::Quit => f.write_str("SIGQUIT"),
            Signal::Hangup => f.write_str("SIGHUP"),
            Signal::User1 => f.write_str("SIGUSR1"),
            Signal::User2 => f.write_str("SIGUSR2"),
            Signal::Other(raw) => write!(f, "signal {raw}"),
        }
    }
}

/// Ordered, deduplicated set of signals that cancel a context.
///
/// # Example
/// ```
/// use taskgroup::{Signal, SignalBridge};
///
/// let bridge = SignalBridge::new([Signal::Terminate, Signal::Hangup, Signal::Terminate]);
/// assert_eq!(bridge.signals(), &[Signal::Terminate, Signal::Hangup]);
///
/// // An empty set falls back to SIGINT + SIGTERM.
/// assert_eq!(SignalBridge::new([]).signals(), &[Signal::Interrupt, Signal::Terminate]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalBridge {
    signals: Vec<Signal>,
}

impl SignalBridge {
    /// Creates a bridge for `signals`; duplicates are dropped, first occurrence wins.
    pub fn new(signals: impl IntoIterator<Item = Signal>) -> Self {
        let mut set: Vec<Signal> = Vec::new();
        for signal in signals {
            if !set.contains(&signal) {
                set.push(signal);
            }
        }
        if set.is_empty() {
            set.extend(DEFAULT_SIGNALS);
        }
        Self { signals: set }
    }

    /// Watched signals, in order.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Registers listeners and spawns the watcher that cancels `ctx`.
    ///
    /// Does nothing if `ctx` is already cancelled.
    ///
    /// # Errors
    /// Fails if any listener cannot be registered; no listener stays installed then.
    pub fn install(&self, ctx: &CancellableContext) -> Result<(), RuntimeError> {
        if ctx.is_cancelled() {
            return Ok(());
        }
        let listeners = self
            .signals
            .iter()
            .map(|&signal| Listener::register(signal))
            .collect::<Result<Vec<_>, _>>()?;

        let weak = ctx.downgrade();
        let release = ctx.release_token();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = release.cancelled() => {}
                signal = first_delivery(listeners) => {
                    if let Some(inner) = weak.upgrade() {
                        inner.cancel(Cause::Signal(signal));
                    }
                }
            }
        });
        Ok(())
    }
}

impl Default for SignalBridge {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNALS)
    }
}

/// Resolves with the first signal delivered to any listener.
async fn first_delivery(mut listeners: Vec<Listener>) -> Signal {
    if listeners.is_empty() {
        return std::future::pending().await;
    }
    let pending = listeners.iter_mut().map(|l| Box::pin(l.recv()));
    let (signal, _, _) = futures::future::select_all(pending).await;
    signal
}

#[cfg(unix)]
struct Listener {
    signal: Signal,
    stream: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Listener {
    fn register(signal: Signal) -> Result<Self, RuntimeError> {
        let stream = tokio::signal::unix::signal(signal.kind())
            .map_err(|source| RuntimeError::SignalSetup { signal, source })?;
        Ok(Self { signal, stream })
    }

    async fn recv(&mut self) -> Signal {
        if self.stream.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
        self.signal
    }
}

#[cfg(windows)]
struct Listener {
    signal: Signal,
    stream: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl Listener {
    fn register(signal: Signal) -> Result<Self, RuntimeError> {
        match signal {
            Signal::Interrupt => {
                let stream = tokio::signal::windows::ctrl_c()
                    .map_err(|source| RuntimeError::SignalSetup { signal, source })?;
                Ok(Self { signal, stream })
            }
            other => Err(RuntimeError::UnsupportedSignal { signal: other }),
        }
    }

    async fn recv(&mut self) -> Signal {
        if self.stream.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
        self.signal
    }
}

#[cfg(not(any(unix, windows)))]
struct Listener;

#[cfg(not(any(unix, windows)))]
impl Listener {
    fn register(signal: Signal) -> Result<Self, RuntimeError> {
        Err(RuntimeError::UnsupportedSignal { signal })
    }

    async fn recv(&mut self) -> Signal {
        std::future::pending().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserves_order() {
        let bridge = SignalBridge::new([
            Signal::Hangup,
            Signal::Interrupt,
            Signal::Hangup,
            Signal::Other(40),
            Signal::Interrupt,
        ]);
        assert_eq!(
            bridge.signals(),
            &[Signal::Hangup, Signal::Interrupt, Signal::Other(40)]
        );
    }

    #[test]
    fn test_default_set() {
        assert_eq!(SignalBridge::default().signals(), &DEFAULT_SIGNALS);
    }

    #[test]
    fn test_display() {
        assert_eq!(Signal::Terminate.to_string(), "SIGTERM");
        assert_eq!(Signal::Other(34).to_string(), "signal 34");
    }

    #[tokio::test]
    async fn test_install_on_cancelled_context_is_noop() {
        let ctx = CancellableContext::background();
        ctx.cancel(Cause::Signal(Signal::Quit));

        SignalBridge::default()
            .install(&ctx)
            .expect("nothing to register");
        assert_eq!(ctx.cause().and_then(|c| c.signal()), Some(Signal::Quit));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_forbidden_signal_is_reported() {
        // SIGKILL (9) cannot be caught.
        let ctx = CancellableContext::background();
        let err = SignalBridge::new([Signal::Other(9)])
            .install(&ctx)
            .expect_err("SIGKILL must be rejected");
        assert_eq!(err.as_label(), "runtime_signal_setup");
    }
}
