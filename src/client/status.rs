// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Translating response statuses of authenticated API calls.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Request, Response, StatusCode};
use tracing::debug;

use crate::error::ClientError;

use super::transport::{ExecutorStage, RequestExecutor, SharedExecutor};

/// Turns a 401 into [`ClientError::SessionExpired`].
pub struct StatusHandlerStage;

impl ExecutorStage for StatusHandlerStage {
    fn wrap(&self, inner: SharedExecutor) -> SharedExecutor {
        Arc::new(StatusHandler { inner })
    }
}

struct StatusHandler {
    inner: SharedExecutor,
}

#[async_trait]
impl RequestExecutor for StatusHandler {
    async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        let url = request.url().clone();
        let response = self.inner.execute(request).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            debug!(url = %url, "server rejected credentials");
            return Err(ClientError::SessionExpired);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientChain, ClientConfig, HttpExecutor};
    use reqwest::Method;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chain() -> SharedExecutor {
        let base: SharedExecutor =
            Arc::new(HttpExecutor::for_config(&ClientConfig::default()).unwrap());
        ClientChain::new(base).with(StatusHandlerStage).build()
    }

    #[tokio::test]
    async fn test_unauthorized_is_session_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let url = format!("{}/x", server.uri()).parse().unwrap();
        let err = chain()
            .execute(Request::new(Method::GET, url))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::SessionExpired));
        assert!(err.to_string().starts_with("Your session has expired."));
    }

    #[tokio::test]
    async fn test_other_statuses_pass_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let url = format!("{}/x", server.uri()).parse().unwrap();
        let response = chain()
            .execute(Request::new(Method::GET, url))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
