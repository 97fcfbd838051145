// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Padsign relay.

use chrono::Utc;
use uuid::Uuid;

/// Unique identifier for a captured print job.
///
/// Combines a UTC timestamp with a random 128-bit suffix, e.g.
/// `20260830-142501-381-f3a1…`. The timestamp keeps spool files sortable
/// by arrival; the UUID component makes collisions across the process
/// lifetime negligible. The id appears in every log line and spool file
/// name for the job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new() -> Self {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S-%3f");
        Self(format!("{stamp}-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of sniffing the first bytes of a spooled job.
///
/// This is a signature classification, not a structural guarantee — a
/// `Pdf`-labelled file may still be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFormat {
    /// Starts with `%PDF-` (case-insensitive).
    Pdf,
    /// Starts with `%!` (case-insensitive) — PostScript or similar.
    PostScript,
    /// Anything else, including unreadable files.
    Unknown,
}

impl std::fmt::Display for JobFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pdf => "pdf",
            Self::PostScript => "postscript",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Normal terminal states of a job's pipeline run.
///
/// Failures (spool I/O, upload exhaustion, cancellation) travel on the
/// error channel and are converted to a logged `failed` outcome at the
/// connection boundary — they never cross into the accept loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The artifact was accepted by the remote endpoint.
    Uploaded,
    /// Non-PDF input — logged and retained, no upload attempted.
    Skipped(JobFormat),
    /// Empty payload — no upload attempted.
    Rejected,
}
