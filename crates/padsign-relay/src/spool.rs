// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Durable per-job spool storage.
//
// One job = one `job-{id}.prn` file holding the raw bytes as received,
// plus a `job-{id}.pdf` sibling staged for upload. Filenames are unique
// per job id, so concurrent jobs never touch each other's files and no
// locking is needed.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, warn};

use padsign_core::error::Result;
use padsign_core::types::JobId;

/// File store for raw job payloads and staged upload artifacts.
#[derive(Debug, Clone)]
pub struct SpoolStore {
    dir: PathBuf,
}

impl SpoolStore {
    /// Open the spool directory, creating it if absent.
    ///
    /// Creation failure is fatal — without a spool directory no job can
    /// be processed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory this store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the raw spool file for a job.
    pub fn spool_path(&self, id: &JobId) -> PathBuf {
        self.dir.join(format!("job-{id}.prn"))
    }

    /// Path of the staged upload artifact for a job.
    pub fn artifact_path(&self, id: &JobId) -> PathBuf {
        self.dir.join(format!("job-{id}.pdf"))
    }

    /// Copy the entire stream into the job's spool file, counting bytes.
    ///
    /// Returns the file path and total byte count. Storage errors (disk
    /// full, permission denied) are fatal to this job only.
    pub async fn spool<R>(&self, reader: &mut R, id: &JobId) -> Result<(PathBuf, u64)>
    where
        R: AsyncRead + Unpin,
    {
        let path = self.spool_path(id);
        let mut file = tokio::fs::File::create(&path).await?;
        let bytes = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        debug!(job_id = %id, bytes, path = %path.display(), "payload spooled");
        Ok((path, bytes))
    }

    /// Stage the raw spool file as the upload artifact.
    ///
    /// The input is already in the target format, so this is a plain
    /// copy under the `.pdf` name the endpoint expects.
    pub async fn stage_pdf(&self, id: &JobId) -> Result<PathBuf> {
        let artifact = self.artifact_path(id);
        tokio::fs::copy(self.spool_path(id), &artifact).await?;
        Ok(artifact)
    }

    /// Best-effort deletion of job files after a successful upload.
    ///
    /// Failures are logged, never escalated — the job is already done.
    pub async fn cleanup(&self, paths: &[PathBuf]) {
        for path in paths {
            match tokio::fs::remove_file(path).await {
                Ok(()) => debug!(path = %path.display(), "spool file removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to remove spool file");
                }
            }
        }
    }
}
