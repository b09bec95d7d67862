// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The handful of OpenShift API calls the CLI needs.

use std::sync::Arc;

use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Method, Request, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use crate::error::ClientError;

use super::config::ClientConfig;
use super::status::StatusHandlerStage;
use super::transport::{
    BearerTokenStage, ClientChain, HttpExecutor, RequestExecutor, SharedExecutor,
};

/// Versioned API prefix.
pub const API_PREFIX: &str = "/osapi/v1beta1";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
}

/// The user a token belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub full_name: String,
}

impl User {
    /// User name without the identity provider prefix (`provider:name`).
    pub fn username(&self) -> &str {
        match self.metadata.name.split_once(':') {
            Some((_, name)) => name,
            None => &self.metadata.name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub display_name: String,
}

impl Project {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

#[derive(Debug, Deserialize)]
struct ProjectList {
    #[serde(default)]
    items: Vec<Project>,
}

/// Authenticated API client. A 401 surfaces as [`ClientError::SessionExpired`].
pub struct OpenShiftClient {
    config: ClientConfig,
    executor: SharedExecutor,
}

impl OpenShiftClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base: SharedExecutor = Arc::new(HttpExecutor::for_config(config)?);
        let executor = ClientChain::new(base)
            .with(BearerTokenStage::new(config.bearer_token.clone()))
            .with(StatusHandlerStage)
            .build();
        Ok(Self::with_executor(config.clone(), executor))
    }

    pub fn with_executor(config: ClientConfig, executor: SharedExecutor) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The user the current token belongs to.
    #[instrument(skip(self), fields(server = %self.config.host))]
    pub async fn whoami(&self) -> Result<User, ClientError> {
        self.get_json(&["users", "~"]).await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        let list: ProjectList = self.get_json(&["projects"]).await?;
        Ok(list.items)
    }

    pub async fn get_project(&self, name: &str) -> Result<Project, ClientError> {
        if matches!(name, "" | "." | "..") {
            return Err(ClientError::InvalidUrl(format!(
                "invalid project name {:?}",
                name
            )));
        }
        self.get_json(&["projects", name]).await
    }

    /// URL under [`API_PREFIX`]. Each segment is percent-encoded.
    fn api_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.config.url(API_PREFIX)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.config.host.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.api_url(segments)?;
        let mut request = Request::new(Method::GET, url);
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));

        let response = self.executor.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::status(status.as_u16(), message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}
