//! Cooperative cancellation for the challenge loop
//!
//! Built on a `tokio::sync::watch` channel carrying a single "stop" flag.
//! Dropping the [`ShutdownHandle`] is treated the same as triggering it.

use std::future::Future;
use tokio::sync::watch;

/// Create a linked handle/signal pair
pub fn shutdown_channel() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx }, ShutdownSignal { rx })
}

/// Sending side, owned by whoever decides when to stop
#[derive(Debug)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    /// Request cancellation
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Receiving side, observed at every suspension point
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Whether cancellation has already been requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolve once cancellation is requested or the handle is dropped
    pub async fn cancelled(&mut self) {
        // wait_for errors only when the sender is gone
        let _ = self.rx.wait_for(|stop| *stop).await;
    }

    /// Drive `fut` to completion unless cancellation arrives first
    ///
    /// On cancellation the future is dropped, which aborts any in-flight
    /// request or retry sleep it owns.
    pub async fn run_until_cancelled<F>(&mut self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return None;
        }

        tokio::select! {
            output = fut => Some(output),
            _ = self.cancelled() => None,
        }
    }
}
