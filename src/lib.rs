// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! osc - OpenShift command-line client.
//!
//! Loads and merges kubeconfig-style client configuration from several
//! locations, logs in to an OpenShift server and keeps the resulting
//! credentials in a config file.
//!
//! # Architecture
//!
//! - [`config`] - Config file locations, loading, merging and writing
//! - [`client`] - HTTP client chain, token requests and API calls
//! - [`login`] - Login orchestration and project switching
//! - [`prompt`] - Interactive prompts
//! - [`error`] - Error types and result aliases
//! - [`telemetry`] - Structured logging setup
//!
//! # Example
//!
//! ```rust,ignore
//! use osc::config::{load_config, EnvPaths};
//!
//! let outcome = load_config(&EnvPaths::from_process(), None);
//! println!("current context: {}", outcome.config.current_context);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod login;
pub mod prompt;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use client::{ClientConfig, ConfigOverrides, OpenShiftClient};
pub use config::{Config, ConfigStore, EnvPaths, LoadOutcome, LoadingRules};
pub use error::{AggregateError, ClientError, ConfigError, LoginError, Result};
pub use login::{LoginFlow, LoginOptions, LoginSummary};
pub use prompt::{Prompter, TerminalPrompter};

/// osc version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
