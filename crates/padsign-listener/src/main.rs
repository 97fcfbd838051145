// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Padsign listener daemon.
//
// Entry point. Loads the config (one optional positional argument, else
// `padsign.json` beside the executable), initialises logging, and runs
// the relay until interrupted. Exit code 0 on clean shutdown, 1 on a
// configuration or fatal startup error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use padsign_core::RelayConfig;
use padsign_relay::{HttpUploader, JobProcessor, RelayServer, ShutdownToken, SpoolStore};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    let config = match RelayConfig::load(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!(path = %config_path.display(), error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };

    info!(
        port = config.port,
        spool = %config.working_directory.display(),
        url = %config.api_url,
        "padsign listener starting"
    );

    let spool = match SpoolStore::new(&config.working_directory) {
        Ok(store) => store,
        Err(e) => {
            error!(dir = %config.working_directory.display(), error = %e, "cannot create spool directory");
            return ExitCode::FAILURE;
        }
    };

    let uploader = match HttpUploader::new(&config) {
        Ok(uploader) => uploader,
        Err(e) => {
            error!(error = %e, "invalid upload configuration");
            return ExitCode::FAILURE;
        }
    };

    let processor = Arc::new(JobProcessor::new(Arc::clone(&config), spool, uploader));

    let server = match RelayServer::bind(config.port, processor).await {
        Ok(server) => server,
        Err(e) => {
            error!(port = config.port, error = %e, "cannot bind raw print port");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = ShutdownToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, shutting down");
                signal.trigger();
            }
            Err(e) => {
                error!(error = %e, "failed to listen for interrupt");
            }
        }
    });

    server.run(shutdown).await;

    info!("padsign listener stopped");
    ExitCode::SUCCESS
}

/// Default config location: `padsign.json` next to the executable,
/// falling back to the current directory.
fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("padsign.json")
}
