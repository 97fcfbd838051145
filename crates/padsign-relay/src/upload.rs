// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Multipart upload of a job artifact to the signing endpoint.
//
// One call = one POST with the artifact plus the configured identity
// fields. The configured credential header is attached to every
// request; for the standard `Authorization` header the value must look
// like `scheme credentials` or the client refuses to construct at all —
// a malformed credential should fail at startup, not on job N.

use std::future::Future;
use std::path::Path;

use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use tracing::{debug, info};

use padsign_core::config::RelayConfig;
use padsign_core::error::{PadsignError, Result};
use padsign_core::types::JobId;

/// Maximum number of response-body characters kept for diagnostics.
const BODY_PREFIX_CHARS: usize = 500;

/// Seam between the job pipeline and the HTTP client, so tests can
/// count and fail upload attempts without a network.
pub trait Uploader: Send + Sync {
    /// Perform one submission of the artifact. One call, no retries.
    fn upload(&self, artifact: &Path, job_id: &JobId) -> impl Future<Output = Result<()>> + Send;
}

/// Production uploader backed by `reqwest`.
pub struct HttpUploader {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    header_name: HeaderName,
    header_value: HeaderValue,
    email: String,
    company: String,
}

impl HttpUploader {
    /// Build an uploader from validated config.
    ///
    /// Applies the per-request timeout and pre-validates the credential
    /// header so that a bad value fails here, before any network I/O.
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.upload_timeout())
            .build()
            .map_err(|e| PadsignError::Config(format!("HTTP client: {e}")))?;

        let endpoint = reqwest::Url::parse(config.api_url.trim())
            .map_err(|e| PadsignError::Config(format!("ApiUrl: {e}")))?;

        let header_name = HeaderName::from_bytes(config.authentication_header_name.trim().as_bytes())
            .map_err(|e| {
                PadsignError::Config(format!(
                    "invalid header name '{}': {e}",
                    config.authentication_header_name
                ))
            })?;

        let raw_value = config.authentication_header_value.trim();
        if header_name == AUTHORIZATION {
            validate_authorization_value(raw_value)?;
        }
        let mut header_value = HeaderValue::from_str(raw_value).map_err(|e| {
            PadsignError::Config(format!("invalid value for header '{header_name}': {e}"))
        })?;
        header_value.set_sensitive(true);

        Ok(Self {
            client,
            endpoint,
            header_name,
            header_value,
            email: config.email.trim().to_string(),
            company: config.company.trim().to_string(),
        })
    }
}

impl Uploader for HttpUploader {
    async fn upload(&self, artifact: &Path, job_id: &JobId) -> Result<()> {
        let file_name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("job-{job_id}.pdf"));

        // Stream the artifact from disk; print jobs can run to hundreds
        // of megabytes. The known length keeps Content-Length on the
        // request, and each attempt reopens the file from the start.
        let file = tokio::fs::File::open(artifact).await?;
        let length = file.metadata().await?.len();
        let part = reqwest::multipart::Part::stream_with_length(file, length)
            .file_name(file_name.clone())
            .mime_str("application/pdf")
            .map_err(|e| PadsignError::Upload(format!("multipart: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("email", self.email.clone())
            .text("company", self.company.clone());

        info!(job_id = %job_id, file = %file_name, url = %self.endpoint, "uploading");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(self.header_name.clone(), self.header_value.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| PadsignError::Upload(format!("POST {}: {e}", self.endpoint)))?;

        let status = response.status();
        // Read the body fully regardless of status so diagnostics always
        // carry the server's answer.
        let body = response
            .text()
            .await
            .map_err(|e| PadsignError::Upload(format!("read response body: {e}")))?;

        if !status.is_success() {
            return Err(PadsignError::UploadRejected {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body_prefix: truncate(&body, BODY_PREFIX_CHARS),
            });
        }

        debug!(job_id = %job_id, status = status.as_u16(), body = %truncate(&body, BODY_PREFIX_CHARS), "endpoint response");
        Ok(())
    }
}

/// The `Authorization` header must carry `scheme SP credentials`.
fn validate_authorization_value(value: &str) -> Result<()> {
    let malformed = || {
        PadsignError::Config(
            "Authorization value must be '<scheme> <credentials>' (e.g. 'Bearer <token>')".into(),
        )
    };
    let (scheme, credentials) = value.split_once(' ').ok_or_else(malformed)?;
    let scheme_ok = !scheme.is_empty()
        && scheme
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if !scheme_ok || credentials.trim().is_empty() {
        return Err(malformed());
    }
    Ok(())
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut prefix: String = value.chars().take(max_chars).collect();
        prefix.push_str("...");
        prefix
    }
}
