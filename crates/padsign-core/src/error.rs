// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the Padsign relay.

use thiserror::Error;

/// Top-level error type for all relay operations.
#[derive(Debug, Error)]
pub enum PadsignError {
    // -- Startup / configuration --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server error: {0}")]
    Server(String),

    // -- Upload --
    #[error("upload failed: {0}")]
    Upload(String),

    #[error("upload rejected: {status} {reason}. Body: {body_prefix}")]
    UploadRejected {
        status: u16,
        reason: String,
        body_prefix: String,
    },

    // -- Lifecycle --
    #[error("operation cancelled by shutdown")]
    Cancelled,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PadsignError>;
