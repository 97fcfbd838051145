// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Padsign relay — raw print capture, spooling, sniffing, and retrying
// upload to the signing endpoint.

pub mod pipeline;
pub mod retry;
pub mod server;
pub mod shutdown;
pub mod sniff;
pub mod spool;
pub mod upload;

pub use pipeline::JobProcessor;
pub use server::RelayServer;
pub use shutdown::ShutdownToken;
pub use spool::SpoolStore;
pub use upload::{HttpUploader, Uploader};
