// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for the osc client.
//!
//! This module provides strongly-typed errors for the different parts of the client,
//! using `thiserror` for ergonomic error definitions and `anyhow` for error propagation
//! at the binary boundary.

use std::fmt;

use thiserror::Error;

/// Guidance shown when the server presents a certificate we cannot verify.
pub const CERTIFICATE_AUTHORITY_UNKNOWN_MSG: &str = "The server uses a certificate signed by unknown authority. You may need to use the --certificate-authority flag to provide the path to a certificate file for the certificate authority, or --insecure-skip-tls-verify to bypass the certificate check and use insecure connections.";

/// Guidance shown when no server could be resolved from the configuration.
pub const NOT_CONFIGURED_MSG: &str = "OpenShift is not configured. You need to run the login command in order to create a default config for your server and credentials:
  osc login
You can also run this command again providing the path to a config file directly, either through the --config flag of the OPENSHIFTCONFIG environment variable.
";

/// Guidance shown when an authenticated API call is rejected.
pub const SESSION_EXPIRED_MSG: &str = "Your session has expired. Use the following command to log in again:
  osc login
";

/// Errors that can occur during configuration loading and persistence.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("The config file {0} does not exist")]
    MissingConfigFile(String),

    #[error("Error loading config file \"{path}\": {message}")]
    Load { path: String, message: String },

    #[error("Could not determine the absolute path of config file {path}: {message}")]
    ResolvePath { path: String, message: String },

    #[error("Config file not found in {0}")]
    StoreNotFound(String),

    #[error("Config file not found in any of the default locations. Tried to create but failed with: {0}")]
    StoreCreateFailed(String),

    #[error("Failed to write config file {path}: {message}")]
    Write { path: String, message: String },

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("IO error reading config: {0}")]
    IoError(String),

    #[error("YAML parsing error: {0}")]
    YamlError(String),
}

impl ConfigError {
    /// Check if this error means the file simply is not there.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

/// Every problem encountered while loading the candidate config files.
///
/// A single error displays as itself, several as `[first, second, ...]`.
#[derive(Debug, Default)]
pub struct AggregateError {
    errors: Vec<ConfigError>,
}

impl AggregateError {
    /// Build an aggregate, or `None` when there is nothing to report.
    pub fn new(errors: Vec<ConfigError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.len() == 1 {
            return write!(f, "{}", self.errors[0]);
        }
        write!(f, "[")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        write!(f, "]")
    }
}

impl std::error::Error for AggregateError {}

/// Errors that can occur while talking to the server.
///
/// Each variant is produced where the failure happens; callers match on the
/// variant instead of inspecting message text.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{}", NOT_CONFIGURED_MSG)]
    NotConfigured,

    #[error("{}", CERTIFICATE_AUTHORITY_UNKNOWN_MSG)]
    CertificateAuthorityUnknown,

    #[error("{}", SESSION_EXPIRED_MSG)]
    SessionExpired,

    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Response parsing error: {0}")]
    InvalidResponse(String),

    #[error("The server did not return an access token")]
    MissingToken,

    #[error("Failed to read user input: {0}")]
    Prompt(String),

    #[error("TLS configuration error: {0}")]
    Tls(String),
}

impl ClientError {
    /// Create a status error.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Check if the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured)
    }

    pub fn is_certificate_authority_unknown(&self) -> bool {
        matches!(self, Self::CertificateAuthorityUnknown)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

/// Errors that can occur during the login flow.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Context '{0}' not found")]
    ContextNotFound(String),

    #[error("The 'context' flag cannot be used with {flags} since it already provides this information. You must either provide a context or {instead}.")]
    ConflictingContext {
        flags: &'static str,
        instead: &'static str,
    },

    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("You don't have any project.\nUse the 'osc new-project <project-name>' command to create a new project.")]
    NoProjects,
}

/// Result type alias using anyhow for flexible error handling.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: ConfigError = io_err.into();
        assert!(err.is_not_found());

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn test_config_error_from_yaml() {
        let result: std::result::Result<serde_yaml::Value, _> = serde_yaml::from_str("a: [b");
        let err: ConfigError = result.unwrap_err().into();
        assert!(matches!(err, ConfigError::YamlError(_)));
    }

    #[test]
    fn test_aggregate_display_single() {
        let agg = AggregateError::new(vec![ConfigError::MissingConfigFile("/x".to_string())])
            .unwrap();
        assert_eq!(agg.to_string(), "The config file /x does not exist");
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn test_aggregate_display_multiple() {
        let agg = AggregateError::new(vec![
            ConfigError::MissingConfigFile("/a".to_string()),
            ConfigError::MissingConfigFile("/b".to_string()),
        ])
        .unwrap();
        assert_eq!(
            agg.to_string(),
            "[The config file /a does not exist, The config file /b does not exist]"
        );
    }

    #[test]
    fn test_aggregate_empty_is_none() {
        assert!(AggregateError::new(Vec::new()).is_none());
    }

    #[test]
    fn test_client_error_guidance_text() {
        assert!(ClientError::NotConfigured
            .to_string()
            .starts_with("OpenShift is not configured."));
        assert!(ClientError::CertificateAuthorityUnknown
            .to_string()
            .contains("--insecure-skip-tls-verify"));
        assert!(ClientError::status(404, "missing").is_not_found());
        assert!(!ClientError::status(500, "boom").is_not_found());
    }

    #[test]
    fn test_login_error_from_client() {
        let err: LoginError = ClientError::NotConfigured.into();
        assert!(matches!(err, LoginError::Client(ClientError::NotConfigured)));
    }
}
