//! Single-fire termination signal shared by the control loop and receiver.

use std::sync::Arc;

use tokio::sync::watch;

/// Close-once broadcast.
///
/// Any number of clones may call [`Termination::trigger`], concurrently or
/// repeatedly; only the first call changes state. Waiters either poll
/// [`Termination::is_triggered`] from blocking code or await
/// [`Termination::triggered`].
#[derive(Debug, Clone)]
pub(crate) struct Termination {
    tx: Arc<watch::Sender<bool>>,
}

impl Termination {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal. Returns `true` only for the call that fired it.
    pub(crate) fn trigger(&self) -> bool {
        self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    pub(crate) fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the signal has fired (immediately if it already has).
    pub(crate) async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

/// Handle for stopping a running [`Pinger`](crate::Pinger) from elsewhere.
///
/// Equivalent to delivering an interrupt to the process, but scoped to one
/// engine.
#[derive(Debug, Clone)]
pub struct StopHandle {
    termination: Termination,
}

impl StopHandle {
    pub(crate) fn new(termination: Termination) -> Self {
        Self { termination }
    }

    /// Request termination. Calling this more than once is harmless.
    pub fn stop(&self) {
        if self.termination.trigger() {
            tracing::debug!("Stop requested");
        }
    }

    /// Whether termination has been requested by any source.
    pub fn is_stopped(&self) -> bool {
        self.termination.is_triggered()
    }
}
