// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Requesting an OAuth access token with the challenging client flow.

use std::sync::Arc;

use reqwest::header::LOCATION;
use reqwest::{Method, Request, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::ClientError;
use crate::prompt::Prompter;

use super::challenge::ChallengeStage;
use super::config::ClientConfig;
use super::transport::{ClientChain, HttpExecutor, RequestExecutor, SharedExecutor};

/// Authorization endpoint path.
pub const AUTHORIZE_PATH: &str = "/oauth/authorize";

/// OAuth client that answers challenges instead of redirecting to a login page.
pub const CHALLENGING_CLIENT_ID: &str = "openshift-challenging-client";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Request a new token, answering Basic challenges with `username`/`password`
/// and prompting for anything missing.
#[instrument(skip(config, prompter, password), fields(server = %config.host))]
pub async fn request_token(
    config: &ClientConfig,
    prompter: Arc<dyn Prompter>,
    username: &str,
    password: &str,
) -> Result<String, ClientError> {
    let base: SharedExecutor = Arc::new(HttpExecutor::for_config(config)?);
    let executor = ClientChain::new(base)
        .with(ChallengeStage::new(prompter, username, password))
        .build();
    request_token_with(executor.as_ref(), config).await
}

/// Run the authorize request through an existing executor.
///
/// The token is read from the `access_token` fragment parameter of a redirect,
/// or from the `access_token` field of a JSON body.
pub async fn request_token_with(
    executor: &dyn RequestExecutor,
    config: &ClientConfig,
) -> Result<String, ClientError> {
    let mut url = config.url(AUTHORIZE_PATH)?;
    url.query_pairs_mut()
        .append_pair("response_type", "token")
        .append_pair("client_id", CHALLENGING_CLIENT_ID);

    let response = executor
        .execute(Request::new(Method::GET, url.clone()))
        .await?;
    let status = response.status();
    debug!(status = %status, "authorize response");

    if status.is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ClientError::MissingToken)?;
        let target = url
            .join(location)
            .map_err(|e| ClientError::InvalidResponse(format!("bad redirect {}: {}", location, e)))?;
        return token_from_fragment(target.fragment().unwrap_or_default())
            .ok_or(ClientError::MissingToken);
    }

    if status.is_success() {
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        return body
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(ClientError::MissingToken);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ClientError::status(status.as_u16(), message))
}

/// `access_token` value from a URL fragment such as
/// `access_token=abc&expires_in=86400`. The fragment is form-encoded.
pub fn token_from_fragment(fragment: &str) -> Option<String> {
    let mut params = Url::parse("http://fragment.invalid/").ok()?;
    params.set_query(Some(fragment));
    params
        .query_pairs()
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::MockPrompter;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ClientConfig {
        ClientConfig {
            host: server.uri(),
            ..Default::default()
        }
    }

    #[test]
    fn test_token_from_fragment() {
        assert_eq!(
            token_from_fragment("access_token=abc&expires_in=86400").as_deref(),
            Some("abc")
        );
        assert_eq!(
            token_from_fragment("token_type=Bearer&access_token=xyz").as_deref(),
            Some("xyz")
        );
        assert_eq!(token_from_fragment("error=access_denied"), None);
        assert_eq!(token_from_fragment("access_token="), None);
        assert_eq!(token_from_fragment(""), None);
    }

    #[test]
    fn test_token_from_fragment_decodes_value() {
        assert_eq!(
            token_from_fragment("access_token=a%2Fb%3D%3D&expires_in=86400").as_deref(),
            Some("a/b==")
        );
    }

    #[tokio::test]
    async fn test_token_from_redirect_after_challenge() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(AUTHORIZE_PATH))
            .and(query_param("client_id", CHALLENGING_CLIENT_ID))
            .and(query_param("response_type", "token"))
            .and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
            .respond_with(ResponseTemplate::new(302).insert_header(
                "location",
                "https://h:8443/oauth/token/implicit#access_token=abc&expires_in=86400",
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(AUTHORIZE_PATH))
            .respond_with(
                ResponseTemplate::new(401).insert_header("www-authenticate", r#"Basic realm="origin""#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let token = request_token(
            &config_for(&server),
            Arc::new(MockPrompter::new()),
            "alice",
            "secret",
        )
        .await
        .unwrap();

        assert_eq!(token, "abc");
    }

    #[tokio::test]
    async fn test_token_from_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(AUTHORIZE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "from-body" })),
            )
            .mount(&server)
            .await;

        let token = request_token(
            &config_for(&server),
            Arc::new(MockPrompter::new()),
            "alice",
            "secret",
        )
        .await
        .unwrap();

        assert_eq!(token, "from-body");
    }

    #[tokio::test]
    async fn test_redirect_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", "/login#error=access_denied"),
            )
            .mount(&server)
            .await;

        let err = request_token(
            &config_for(&server),
            Arc::new(MockPrompter::new()),
            "alice",
            "secret",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::MissingToken));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = request_token(
            &config_for(&server),
            Arc::new(MockPrompter::new()),
            "alice",
            "secret",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::Status { status: 500, ref message } if message == "boom"));
    }
}
