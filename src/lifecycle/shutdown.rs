//! Shutdown coordination for the gateway.
//!
//! A single latch shared by the signal listener, the HTTP server and tests.
//! Once tripped it stays tripped: a server that starts waiting after the
//! trigger still stops, and in-flight requests are drained by axum.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Latch that stops the gateway.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Trip the latch. Later calls are no-ops.
    pub fn trigger(&self) {
        let first = !self.tx.send_replace(true);
        if first {
            tracing::info!(waiters = self.tx.receiver_count(), "Shutdown triggered");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Future that resolves once the latch is tripped, including when it
    /// already was. Suitable for `axum::serve(..).with_graceful_shutdown`.
    pub fn notified(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            // Err only if every sender is gone, which also means shutdown.
            let _ = rx.wait_for(|triggered| *triggered).await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
