// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! HTTP client for the OpenShift API.
//!
//! Requests go through a chain of executors built with [`ClientChain`]:
//! a base [`HttpExecutor`] wrapped by stages for authentication, challenge
//! handling and status translation.

mod api;
mod challenge;
mod config;
mod status;
mod token;
mod transport;

pub use api::{ObjectMeta, OpenShiftClient, Project, User, API_PREFIX};
pub use challenge::{basic_auth_realm, ChallengeStage, ChallengingClient, MAX_CHALLENGE_RETRIES};
pub use config::{
    matching_contexts, normalize_server, ClientConfig, ConfigOverrides, DEFAULT_NAMESPACE,
};
pub use status::StatusHandlerStage;
pub use token::{
    request_token, request_token_with, token_from_fragment, AUTHORIZE_PATH, CHALLENGING_CLIENT_ID,
};
pub use transport::{
    classify_transport_error, BasicAuthStage, BearerTokenStage, ClientChain, ExecutorStage,
    HttpExecutor, RequestExecutor, SharedExecutor, DEFAULT_TIMEOUT_SECS,
};
