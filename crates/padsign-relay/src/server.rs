// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw print capture server (loopback, JetDirect-style port 9100).
//
// No framing, no handshake: one TCP connection = one job, the payload
// is everything until the peer closes its write half. Each connection
// runs its own pipeline task; a slow or failing job never blocks the
// accept loop or its siblings.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use padsign_core::error::{PadsignError, Result};
use padsign_core::types::{JobId, JobOutcome};

use crate::pipeline::JobProcessor;
use crate::shutdown::ShutdownToken;
use crate::upload::Uploader;

/// Loopback acceptor feeding connections into the job pipeline.
pub struct RelayServer<U> {
    listener: TcpListener,
    local_addr: SocketAddr,
    processor: Arc<JobProcessor<U>>,
}

impl<U: Uploader + 'static> RelayServer<U> {
    /// Bind the loopback port.
    ///
    /// Binding failure (port in use, permission denied) is fatal and
    /// surfaces here, before any job is processed. Port 0 asks the OS
    /// for a free port; see [`local_addr`](Self::local_addr).
    pub async fn bind(port: u16, processor: Arc<JobProcessor<U>>) -> Result<Self> {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| PadsignError::Server(format!("bind {addr}: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| PadsignError::Server(format!("local addr: {e}")))?;
        info!(addr = %local_addr, "raw print port listening");
        Ok(Self {
            listener,
            local_addr,
            processor,
        })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until shutdown, then drain in-flight jobs.
    ///
    /// Every accepted connection gets a fresh job id and its own task.
    /// Jobs are tracked in a `JoinSet`; shutdown stops the accepting
    /// but lets dispatched jobs run to their natural end.
    pub async fn run(self, shutdown: ShutdownToken) {
        let mut jobs = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.triggered() => {
                    info!(addr = %self.local_addr, "shutdown signal received, no longer accepting");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let id = JobId::new();
                        info!(job_id = %id, peer = %peer, "connection accepted");
                        let processor = Arc::clone(&self.processor);
                        let shutdown = shutdown.clone();
                        jobs.spawn(handle_connection(stream, id, processor, shutdown));
                    }
                    Err(e) => {
                        // Transient accept errors (e.g. EMFILE) should not
                        // take the relay down.
                        error!(error = %e, "accept failed");
                    }
                },
                // Reap finished jobs so the set does not grow unbounded.
                Some(joined) = jobs.join_next(), if !jobs.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "job task panicked");
                    }
                }
            }
        }

        let outstanding = jobs.len();
        if outstanding > 0 {
            info!(outstanding, "waiting for in-flight jobs to finish");
        }
        while let Some(joined) = jobs.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "job task panicked");
            }
        }
        info!(addr = %self.local_addr, "raw print port closed");
    }
}

/// Job boundary: run the pipeline and convert every result into a log
/// line. Errors stop here — they never reach the accept loop.
async fn handle_connection<U: Uploader>(
    mut stream: TcpStream,
    id: JobId,
    processor: Arc<JobProcessor<U>>,
    shutdown: ShutdownToken,
) {
    match processor.process(&mut stream, &id, &shutdown).await {
        Ok(JobOutcome::Uploaded) => info!(job_id = %id, outcome = "uploaded", "job completed"),
        Ok(JobOutcome::Skipped(format)) => {
            info!(job_id = %id, outcome = "skipped", format = %format, "job completed")
        }
        Ok(JobOutcome::Rejected) => {
            warn!(job_id = %id, outcome = "rejected", "job completed: empty payload")
        }
        Err(e) => error!(job_id = %id, outcome = "failed", error = %e, "job failed"),
    }
    debug!(job_id = %id, "connection closed");
}
