// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Padsign — configuration, error, and domain types shared across crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::RelayConfig;
pub use error::PadsignError;
pub use types::*;
