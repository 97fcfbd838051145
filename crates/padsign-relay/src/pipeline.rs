// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-job pipeline: spool -> sniff -> upload-with-retry -> cleanup.
//
// Non-PDF input is skipped and retained, never uploaded. An earlier
// deployment shelled out to Ghostscript to convert such jobs; the relay
// deliberately does not — mixing conversion and skip policies silently
// is a correctness hazard, so skip-and-log is the one policy here.

use std::sync::Arc;

use tokio::io::AsyncRead;
use tracing::{error, info};

use padsign_core::config::RelayConfig;
use padsign_core::error::Result;
use padsign_core::types::{JobFormat, JobId, JobOutcome};

use crate::retry::{RetryPolicy, run_with_retry};
use crate::shutdown::ShutdownToken;
use crate::sniff::detect_format;
use crate::spool::SpoolStore;
use crate::upload::Uploader;

/// Runs the full pipeline for one job. One instance is shared by all
/// connection tasks; per-job state lives entirely in the task.
pub struct JobProcessor<U> {
    config: Arc<RelayConfig>,
    spool: SpoolStore,
    uploader: U,
    retry: RetryPolicy,
}

impl<U: Uploader> JobProcessor<U> {
    pub fn new(config: Arc<RelayConfig>, spool: SpoolStore, uploader: U) -> Self {
        let retry = RetryPolicy::from_config(&config);
        Self {
            config,
            spool,
            uploader,
            retry,
        }
    }

    /// Process one connection's byte stream to a terminal outcome.
    ///
    /// Returns the normal outcomes as [`JobOutcome`]; spool failures and
    /// upload exhaustion come back as errors for the caller to log as
    /// the job's `failed` outcome. Nothing here ever affects another
    /// job.
    pub async fn process<R>(
        &self,
        reader: &mut R,
        id: &JobId,
        shutdown: &ShutdownToken,
    ) -> Result<JobOutcome>
    where
        R: AsyncRead + Unpin + Send,
    {
        let (spool_path, bytes) = self.spool.spool(reader, id).await?;
        info!(job_id = %id, bytes, path = %spool_path.display(), "job received");

        if bytes == 0 {
            error!(job_id = %id, "empty payload, job rejected");
            self.spool.cleanup(&[spool_path]).await;
            return Ok(JobOutcome::Rejected);
        }

        let format = detect_format(&spool_path).await;
        info!(job_id = %id, format = %format, "format detected");

        if format != JobFormat::Pdf {
            info!(job_id = %id, format = %format, "non-PDF input, skipping upload");
            return Ok(JobOutcome::Skipped(format));
        }

        let artifact = self.spool.stage_pdf(id).await?;

        let max = self.retry.max_attempts;
        run_with_retry(&self.retry, shutdown, |attempt| {
            info!(job_id = %id, attempt, max, "upload attempt");
            self.uploader.upload(&artifact, id)
        })
        .await?;
        info!(job_id = %id, "upload successful");

        if self.config.cleanup_on_success {
            self.spool.cleanup(&[spool_path, artifact]).await;
        }

        Ok(JobOutcome::Uploaded)
    }

    /// The spool store backing this processor.
    pub fn spool(&self) -> &SpoolStore {
        &self.spool
    }
}
