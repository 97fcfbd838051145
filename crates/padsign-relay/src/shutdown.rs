// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process-wide shutdown signal.
//
// Raised once at operator interrupt. Observed by the accept loop (stop
// accepting) and by inter-retry waits (abort the wait). In-flight
// network calls and file writes are allowed to finish naturally.

use std::sync::Arc;

use tokio::sync::watch;

/// Clonable handle to the process-wide shutdown signal.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    /// Raise the signal. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether the signal has been raised.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the signal has been raised. Completes immediately if
    /// it already was.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        // The sender lives inside every token, so wait_for only errs if
        // all tokens are gone — treat that as triggered.
        let _ = rx.wait_for(|raised| *raised).await;
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}
