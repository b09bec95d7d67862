// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Request execution and the stages that wrap it.
//!
//! A chain starts from a base executor (usually [`HttpExecutor`]) and is
//! extended by [`ExecutorStage`]s. Each stage wraps everything added before
//! it, so the last stage sees a request first.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{redirect, Certificate, Client, Request, Response};
use tracing::trace;

use crate::error::ClientError;

use super::config::ClientConfig;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error text that TLS backends use for an untrusted certificate chain.
const UNKNOWN_AUTHORITY_MARKERS: &[&str] = &[
    "certificate verify failed",
    "UnknownIssuer",
    "unable to get local issuer certificate",
    "self signed certificate",
    "self-signed certificate",
    "certificate signed by unknown authority",
];

/// Sends one request and returns the response.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response, ClientError>;
}

pub type SharedExecutor = Arc<dyn RequestExecutor>;

/// Wraps an executor with extra behavior.
pub trait ExecutorStage: Send + Sync {
    fn wrap(&self, inner: SharedExecutor) -> SharedExecutor;
}

/// Builder for an executor chain.
pub struct ClientChain {
    base: SharedExecutor,
    stages: Vec<Box<dyn ExecutorStage>>,
}

impl ClientChain {
    pub fn new(base: SharedExecutor) -> Self {
        Self {
            base,
            stages: Vec::new(),
        }
    }

    /// Add a stage outside every stage added so far.
    pub fn with(mut self, stage: impl ExecutorStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn build(self) -> SharedExecutor {
        self.stages
            .iter()
            .fold(self.base, |inner, stage| stage.wrap(inner))
    }
}

/// Executor backed by a `reqwest` client. Redirects are never followed.
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client honoring the TLS settings of `config`.
    pub fn for_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .redirect(redirect::Policy::none())
            .user_agent(format!("osc/{}", crate::VERSION))
            .danger_accept_invalid_certs(config.insecure);

        if !config.ca_file.is_empty() && !config.insecure {
            let pem = std::fs::read(&config.ca_file)
                .map_err(|e| ClientError::Tls(format!("{}: {}", config.ca_file, e)))?;
            let cert = Certificate::from_pem(&pem)
                .map_err(|e| ClientError::Tls(format!("{}: {}", config.ca_file, e)))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Tls(e.to_string()))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        trace!(method = %request.method(), url = %request.url(), "sending request");
        let response = self
            .client
            .execute(request)
            .await
            .map_err(classify_transport_error)?;
        trace!(status = %response.status(), "received response");
        Ok(response)
    }
}

/// Map a transport failure to a typed error.
///
/// TLS backends only report verification failures as text, so this is the one
/// place that reads error messages.
pub fn classify_transport_error(err: reqwest::Error) -> ClientError {
    let chain = error_chain(&err);
    if UNKNOWN_AUTHORITY_MARKERS
        .iter()
        .any(|marker| chain.contains(marker))
    {
        return ClientError::CertificateAuthorityUnknown;
    }
    ClientError::Transport(chain)
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

/// Sets an `Authorization: Basic` header on every request.
pub struct BasicAuthStage {
    username: String,
    password: String,
}

impl BasicAuthStage {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl ExecutorStage for BasicAuthStage {
    fn wrap(&self, inner: SharedExecutor) -> SharedExecutor {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        Arc::new(AuthorizationExecutor {
            inner,
            value: format!("Basic {}", encoded),
            replace: true,
        })
    }
}

/// Sets an `Authorization: Bearer` header unless the request already has one.
/// An empty token leaves requests untouched.
pub struct BearerTokenStage {
    token: String,
}

impl BearerTokenStage {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl ExecutorStage for BearerTokenStage {
    fn wrap(&self, inner: SharedExecutor) -> SharedExecutor {
        if self.token.is_empty() {
            return inner;
        }
        Arc::new(AuthorizationExecutor {
            inner,
            value: format!("Bearer {}", self.token),
            replace: false,
        })
    }
}

struct AuthorizationExecutor {
    inner: SharedExecutor,
    value: String,
    replace: bool,
}

#[async_trait]
impl RequestExecutor for AuthorizationExecutor {
    async fn execute(&self, mut request: Request) -> Result<Response, ClientError> {
        if self.replace || !request.headers().contains_key(AUTHORIZATION) {
            let mut value = HeaderValue::from_str(&self.value).map_err(|_| {
                ClientError::Transport("credentials contain invalid header characters".to_string())
            })?;
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        self.inner.execute(request).await
    }
}
