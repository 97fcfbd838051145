// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded-attempt retry with linearly growing delay.
//
// The delay after attempt n is `backoff_unit * n` — linear, not
// exponential. Waits race the shutdown signal and abort immediately
// when it fires; the attempt itself is never interrupted.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use padsign_core::config::RelayConfig;
use padsign_core::error::{PadsignError, Result};

use crate::shutdown::ShutdownToken;

/// Attempt limit and delay unit for one job's upload loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Base delay; attempt n waits `backoff_unit * n` before attempt n+1.
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            max_attempts: config.max_attempts(),
            backoff_unit: config.backoff_unit(),
        }
    }

    /// Delay after a failed attempt `n`, saturating at `Duration::MAX`
    /// so an absurd configured unit cannot overflow.
    fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(attempt)
    }
}

/// Run `op` until it succeeds or the attempt limit is reached.
///
/// `op` receives the attempt number starting at 1. The final attempt's
/// error is propagated without a trailing wait; a shutdown during a
/// wait aborts with [`PadsignError::Cancelled`].
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    shutdown: &ShutdownToken,
    mut op: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => {
                debug!(attempt, "attempt succeeded");
                return Ok(value);
            }
            Err(e) if attempt >= max => {
                warn!(attempt, max, error = %e, "attempt limit exhausted");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "attempt failed, waiting before retry"
                );
                tokio::select! {
                    _ = shutdown.triggered() => {
                        debug!(attempt, "retry wait aborted by shutdown");
                        return Err(PadsignError::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
                attempt += 1;
            }
        }
    }
}
