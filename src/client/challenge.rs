// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Answering Basic auth challenges.
//!
//! When the server answers 401 with `WWW-Authenticate: Basic realm="..."`, the
//! request is replayed once with Basic credentials. Missing credentials are
//! prompted for if the terminal is interactive. Once installed, the
//! credentials are used for every later request through the same client.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, WWW_AUTHENTICATE};
use reqwest::{Request, Response, StatusCode};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::prompt::Prompter;

use super::transport::{BasicAuthStage, ExecutorStage, RequestExecutor, SharedExecutor};

/// How many times one request is replayed after a challenge.
pub const MAX_CHALLENGE_RETRIES: u32 = 1;

static BASIC_AUTH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\s]*Basic[\s]*realm="([\w]+)""#).unwrap());

/// Realm of the first Basic challenge in `headers`, if any.
pub fn basic_auth_realm(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            BASIC_AUTH_REGEX
                .captures(value)
                .and_then(|caps| caps.get(1))
                .map(|realm| realm.as_str().to_string())
        })
}

/// Executor that answers Basic challenges.
pub struct ChallengingClient {
    base: SharedExecutor,
    current: RwLock<SharedExecutor>,
    prompter: Arc<dyn Prompter>,
    default_username: String,
    default_password: String,
}

impl ChallengingClient {
    pub fn new(
        base: SharedExecutor,
        prompter: Arc<dyn Prompter>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            current: RwLock::new(Arc::clone(&base)),
            base,
            prompter,
            default_username: username.into(),
            default_password: password.into(),
        }
    }

    fn current(&self) -> SharedExecutor {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    fn install(&self, executor: SharedExecutor) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = executor;
    }

    /// Credentials for `realm`, prompting for whatever is missing.
    fn credentials(&self, realm: &str) -> Result<(String, String), ClientError> {
        let mut username = self.default_username.clone();
        let mut password = self.default_password.clone();
        let missing_username = username.is_empty();
        let missing_password = password.is_empty();

        if (missing_username || missing_password) && self.prompter.is_interactive() {
            self.prompter
                .message(&format!("Authenticate for \"{}\"", realm));
            if missing_username {
                username = self.prompter.prompt_string("Username")?;
            }
            if missing_password {
                password = self.prompter.prompt_password("Password")?;
            }
        }

        Ok((username, password))
    }
}

#[async_trait]
impl RequestExecutor for ChallengingClient {
    async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        let mut request = request;
        let mut retries = 0;

        loop {
            let replay = request.try_clone();
            let response = self.current().execute(request).await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            let Some(realm) = basic_auth_realm(response.headers()) else {
                return Ok(response);
            };
            if retries >= MAX_CHALLENGE_RETRIES {
                warn!(realm = %realm, retries, "basic auth challenge still failing, giving up");
                return Ok(response);
            }
            let Some(replay) = replay else {
                debug!("request body cannot be replayed, returning challenge");
                return Ok(response);
            };

            debug!(realm = %realm, "answering basic auth challenge");
            let (username, password) = self.credentials(&realm)?;
            self.install(BasicAuthStage::new(username, password).wrap(Arc::clone(&self.base)));

            retries += 1;
            request = replay;
        }
    }
}

/// Stage form of [`ChallengingClient`].
pub struct ChallengeStage {
    prompter: Arc<dyn Prompter>,
    username: String,
    password: String,
}

impl ChallengeStage {
    pub fn new(
        prompter: Arc<dyn Prompter>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            prompter,
            username: username.into(),
            password: password.into(),
        }
    }
}

impl ExecutorStage for ChallengeStage {
    fn wrap(&self, inner: SharedExecutor) -> SharedExecutor {
        Arc::new(ChallengingClient::new(
            inner,
            Arc::clone(&self.prompter),
            self.username.clone(),
            self.password.clone(),
        ))
    }
}
