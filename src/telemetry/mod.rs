// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Structured logging.
//!
//! Initialize once at startup:
//!
//! ```rust,ignore
//! use osc::telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::default())?;
//! ```
//!
//! Record paths, servers and user names as fields. Never record tokens or
//! passwords.

mod init;

pub use init::{init_telemetry, level_for_verbosity, TelemetryConfig, TelemetryGuard};
