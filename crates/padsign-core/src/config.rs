// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Relay configuration.
//
// The config file is owned by the external manager tool, which writes it
// with PascalCase field names; camelCase is accepted as well. The relay
// loads it exactly once at startup — there is no hot-reload, the manager
// restarts the process after rewriting the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{PadsignError, Result};

/// Default authentication header name.
pub const DEFAULT_AUTH_HEADER: &str = "Authorization";

/// Default raw print port (HP JetDirect).
pub const DEFAULT_PORT: u16 = 9100;

/// Immutable relay settings, loaded once at process start.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RelayConfig {
    /// Upload endpoint. Must be an absolute URL.
    #[serde(default, alias = "apiUrl")]
    pub api_url: String,
    /// Header carrying the credential on every upload.
    #[serde(default = "default_auth_header", alias = "authenticationHeaderName")]
    pub authentication_header_name: String,
    /// Credential value, attached verbatim (validated only for the
    /// standard `Authorization` header).
    #[serde(default, alias = "authenticationHeaderValue")]
    pub authentication_header_value: String,
    /// Legacy field from older config files; used as a Bearer token when
    /// no header value is set.
    #[serde(default, alias = "apiKey")]
    pub api_key: String,
    /// Identity field forwarded verbatim with every upload.
    #[serde(default, alias = "email")]
    pub email: String,
    /// Identity field forwarded verbatim with every upload.
    #[serde(default, alias = "company")]
    pub company: String,
    /// Loopback TCP port to listen on.
    #[serde(default = "default_port", alias = "port")]
    pub port: u16,
    /// Spool directory; resolved against the executable's directory when
    /// not absolute.
    #[serde(default = "default_working_directory", alias = "workingDirectory")]
    pub working_directory: PathBuf,
    /// Per-request upload timeout.
    #[serde(default = "default_upload_timeout", alias = "uploadTimeoutSeconds")]
    pub upload_timeout_seconds: u64,
    /// Maximum upload attempts per job (effective minimum 1).
    #[serde(default = "default_max_retries", alias = "maxUploadRetries")]
    pub max_upload_retries: u32,
    /// Base delay unit for the linear retry backoff.
    #[serde(default = "default_backoff", alias = "retryBackoffSeconds")]
    pub retry_backoff_seconds: u64,
    /// Delete the spool file and artifact after a successful upload.
    #[serde(default, alias = "cleanupOnSuccess")]
    pub cleanup_on_success: bool,
}

fn default_auth_header() -> String {
    DEFAULT_AUTH_HEADER.into()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_working_directory() -> PathBuf {
    PathBuf::from("spool")
}

fn default_upload_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff() -> u64 {
    2
}

impl RelayConfig {
    /// Load and validate the config file.
    ///
    /// Fails fast on a missing file, malformed JSON, a relative or
    /// unparsable `ApiUrl`, or blank credential/identity fields. The
    /// working directory is resolved against the executable's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PadsignError::Config(format!("read {}: {e}", path.display()))
        })?;
        let mut cfg: RelayConfig = serde_json::from_str(&json)
            .map_err(|e| PadsignError::Config(format!("parse {}: {e}", path.display())))?;

        if cfg.authentication_header_name.trim().is_empty() {
            cfg.authentication_header_name = default_auth_header();
        }
        // Older manager versions wrote only ApiKey; treat it as a Bearer
        // credential when no explicit header value is present.
        if cfg.authentication_header_value.trim().is_empty() && !cfg.api_key.trim().is_empty() {
            cfg.authentication_header_value = format!("Bearer {}", cfg.api_key.trim());
        }

        cfg.validate()?;
        cfg.working_directory = resolve_path(&cfg.working_directory, &executable_dir());
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(PadsignError::Config("ApiUrl missing in config".into()));
        }
        let parsed = Url::parse(self.api_url.trim())
            .map_err(|e| PadsignError::Config(format!("ApiUrl invalid: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(PadsignError::Config(format!(
                "ApiUrl is not an absolute URL: {}",
                self.api_url
            )));
        }
        if self.authentication_header_value.trim().is_empty() {
            return Err(PadsignError::Config(
                "AuthenticationHeaderValue missing in config".into(),
            ));
        }
        if self.email.trim().is_empty() {
            return Err(PadsignError::Config("Email missing in config".into()));
        }
        if self.company.trim().is_empty() {
            return Err(PadsignError::Config("Company missing in config".into()));
        }
        Ok(())
    }

    /// Per-request upload timeout as a `Duration`.
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_seconds)
    }

    /// Base delay unit for the linear retry backoff.
    pub fn backoff_unit(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_seconds)
    }

    /// Maximum upload attempts, clamped to at least one.
    pub fn max_attempts(&self) -> u32 {
        self.max_upload_retries.max(1)
    }
}

/// Directory containing the running executable, falling back to the
/// current directory when unavailable.
fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        base.join("spool")
    } else if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(json.as_bytes()).expect("write config");
        file
    }

    const MINIMAL: &str = r#"{
        "ApiUrl": "https://sign.example.com/api/upload",
        "AuthenticationHeaderValue": "Bearer abc123",
        "Email": "ops@example.com",
        "Company": "Example GmbH"
    }"#;

    #[test]
    fn minimal_config_applies_defaults() {
        let file = write_config(MINIMAL);
        let cfg = RelayConfig::load(file.path()).expect("load");
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.authentication_header_name, "Authorization");
        assert_eq!(cfg.upload_timeout_seconds, 30);
        assert_eq!(cfg.max_upload_retries, 3);
        assert_eq!(cfg.retry_backoff_seconds, 2);
        assert!(!cfg.cleanup_on_success);
        assert!(cfg.working_directory.is_absolute());
        assert!(cfg.working_directory.ends_with("spool"));
    }

    #[test]
    fn camel_case_field_names_are_accepted() {
        let file = write_config(
            r#"{
                "apiUrl": "https://sign.example.com/api/upload",
                "authenticationHeaderValue": "Bearer abc123",
                "email": "ops@example.com",
                "company": "Example GmbH",
                "port": 9101,
                "maxUploadRetries": 5,
                "retryBackoffSeconds": 7
            }"#,
        );
        let cfg = RelayConfig::load(file.path()).expect("load");
        assert_eq!(cfg.port, 9101);
        assert_eq!(cfg.max_upload_retries, 5);
        assert_eq!(cfg.backoff_unit(), Duration::from_secs(7));
    }

    #[test]
    fn missing_url_is_rejected() {
        let file = write_config(
            r#"{
                "AuthenticationHeaderValue": "Bearer abc123",
                "Email": "ops@example.com",
                "Company": "Example GmbH"
            }"#,
        );
        let err = RelayConfig::load(file.path()).expect_err("should fail");
        assert!(err.to_string().contains("ApiUrl"));
    }

    #[test]
    fn relative_url_is_rejected() {
        let json = MINIMAL.replace("https://sign.example.com/api/upload", "not-a-url");
        let file = write_config(&json);
        assert!(RelayConfig::load(file.path()).is_err());
    }

    #[test]
    fn blank_identity_fields_are_rejected() {
        let json = MINIMAL.replace("ops@example.com", "   ");
        let file = write_config(&json);
        let err = RelayConfig::load(file.path()).expect_err("should fail");
        assert!(err.to_string().contains("Email"));

        let json = MINIMAL.replace("Example GmbH", "");
        let file = write_config(&json);
        let err = RelayConfig::load(file.path()).expect_err("should fail");
        assert!(err.to_string().contains("Company"));
    }

    #[test]
    fn legacy_api_key_becomes_bearer_value() {
        let file = write_config(
            r#"{
                "ApiUrl": "https://sign.example.com/api/upload",
                "ApiKey": "legacy-token",
                "Email": "ops@example.com",
                "Company": "Example GmbH"
            }"#,
        );
        let cfg = RelayConfig::load(file.path()).expect("load");
        assert_eq!(cfg.authentication_header_value, "Bearer legacy-token");
    }

    #[test]
    fn blank_header_name_falls_back_to_authorization() {
        let json = MINIMAL.replace(
            "\"ApiUrl\"",
            "\"AuthenticationHeaderName\": \"  \", \"ApiUrl\"",
        );
        let file = write_config(&json);
        let cfg = RelayConfig::load(file.path()).expect("load");
        assert_eq!(cfg.authentication_header_name, "Authorization");
    }

    #[test]
    fn absolute_working_directory_is_kept() {
        let dir = tempfile::tempdir().expect("temp dir");
        let abs = dir.path().join("jobs");
        let json = MINIMAL.replace(
            "\"ApiUrl\"",
            &format!(
                "\"WorkingDirectory\": {}, \"ApiUrl\"",
                serde_json::to_string(&abs).expect("json path")
            ),
        );
        let file = write_config(&json);
        let cfg = RelayConfig::load(file.path()).expect("load");
        assert_eq!(cfg.working_directory, abs);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = RelayConfig::load(Path::new("/nonexistent/padsign.json"))
            .expect_err("should fail");
        assert!(matches!(err, PadsignError::Config(_)));
    }

    #[test]
    fn zero_retries_clamps_to_one_attempt() {
        let json = MINIMAL.replace(
            "\"ApiUrl\"",
            "\"MaxUploadRetries\": 0, \"ApiUrl\"",
        );
        let file = write_config(&json);
        let cfg = RelayConfig::load(file.path()).expect("load");
        assert_eq!(cfg.max_attempts(), 1);
    }
}
