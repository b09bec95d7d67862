// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Login and project switching.
//!
//! A login runs these steps in order:
//! 1. Apply the `--context` option, rejecting flags the context already fixes.
//! 2. Determine the server, asking for one if nothing is configured.
//! 3. Determine credentials: reuse a working token, else request a new one.
//! 4. Determine the project to use.
//! 5. Write the identity into the config store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::client::{
    matching_contexts, request_token, ClientConfig, ConfigOverrides, OpenShiftClient, User,
};
use crate::config::{update_config_file, Config, ConfigStore, LoadingRules};
use crate::error::{ClientError, LoginError};
use crate::prompt::Prompter;

/// Server offered when nothing is configured.
pub const DEFAULT_CLUSTER_URL: &str = "https://localhost:8443";

/// Options given to the login command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginOptions {
    pub username: String,
    pub password: String,
    pub server: String,
    pub context: String,
    pub project: String,
}

/// Who we ended up authenticated as.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSetup {
    pub username: String,
    pub full_name: String,
    pub token: String,
    /// False when an existing token was reused.
    pub new_auth: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSetup {
    pub projects: Vec<String>,
    pub project_in_use: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSummary {
    pub server: String,
    pub auth: AuthSetup,
    pub project: ProjectSetup,
    pub config_path: PathBuf,
}

/// Drives one login.
pub struct LoginFlow {
    rules: LoadingRules,
    store_fallback: Option<PathBuf>,
    overrides: ConfigOverrides,
    prompter: Arc<dyn Prompter>,
    options: LoginOptions,
    default_server: String,
}

impl LoginFlow {
    pub fn new(
        rules: LoadingRules,
        overrides: ConfigOverrides,
        prompter: Arc<dyn Prompter>,
        options: LoginOptions,
    ) -> Self {
        Self {
            rules,
            store_fallback: None,
            overrides,
            prompter,
            options,
            default_server: DEFAULT_CLUSTER_URL.to_string(),
        }
    }

    /// Where to create a config file when none exists.
    pub fn with_store_fallback(mut self, path: Option<PathBuf>) -> Self {
        self.store_fallback = path;
        self
    }

    pub fn with_default_server(mut self, server: impl Into<String>) -> Self {
        self.default_server = server.into();
        self
    }

    #[instrument(skip(self), fields(username = %self.options.username))]
    pub async fn run(mut self) -> Result<LoginSummary, LoginError> {
        let config = self.load_config();
        self.apply_context_option(&config)?;

        let mut client = self.determine_server_info(&config)?;
        let mut store = ConfigStore::locate(&self.rules, self.store_fallback.as_deref())?;

        let auth = self.determine_auth_info(&mut client, &store).await?;
        client.bearer_token = auth.token.clone();

        let project = self.determine_project_info(&mut client).await?;

        update_config_file(&auth.username, &auth.token, &client, &mut store)?;
        info!(
            server = %client.host,
            user = %auth.username,
            project = %project.project_in_use,
            "logged in"
        );

        Ok(LoginSummary {
            server: client.host,
            auth,
            project,
            config_path: store.path,
        })
    }

    fn load_config(&self) -> Config {
        let (config, errors) = self.rules.load().into_parts();
        if let Some(errors) = errors {
            warn!(error = %errors, "some config files could not be loaded");
        }
        config
    }

    fn apply_context_option(&mut self, config: &Config) -> Result<(), LoginError> {
        if self.options.context.is_empty() {
            if !self.options.server.is_empty() {
                self.overrides.server = Some(self.options.server.clone());
            }
            return Ok(());
        }

        let context = config
            .contexts
            .get(&self.options.context)
            .ok_or_else(|| LoginError::ContextNotFound(self.options.context.clone()))?;

        let options = &mut self.options;
        if (!options.username.is_empty() || !options.password.is_empty())
            && !context.auth_info.is_empty()
        {
            return Err(LoginError::ConflictingContext {
                flags: "'username' or 'password'",
                instead: "username and password",
            });
        }
        if !options.server.is_empty() && !context.cluster.is_empty() {
            return Err(LoginError::ConflictingContext {
                flags: "'server'",
                instead: "server",
            });
        }
        if !options.project.is_empty() && !context.namespace.is_empty() {
            return Err(LoginError::ConflictingContext {
                flags: "'project'",
                instead: "project",
            });
        }

        if !context.auth_info.is_empty() {
            options.username = context.auth_info.clone();
            options.password.clear();
        }
        if !context.namespace.is_empty() {
            options.project = context.namespace.clone();
        }
        if !options.server.is_empty() {
            self.overrides.server = Some(options.server.clone());
        }
        self.overrides.context = Some(options.context.clone());
        Ok(())
    }

    fn determine_server_info(&mut self, config: &Config) -> Result<ClientConfig, LoginError> {
        let client = match ClientConfig::resolve(config, &self.overrides) {
            Ok(client) => client,
            Err(ClientError::NotConfigured) => {
                let server = self
                    .prompter
                    .prompt_string_with_default(
                        &format!(
                            "Please provide the server URL or hit <enter> to use '{}'",
                            self.default_server
                        ),
                        &self.default_server,
                    )
                    .map_err(ClientError::from)?;
                self.overrides.server = Some(server);
                ClientConfig::resolve(config, &self.overrides)?
            }
            Err(err) => return Err(err.into()),
        };

        self.options.server = client.host.clone();
        Ok(client)
    }

    async fn determine_auth_info(
        &self,
        client: &mut ClientConfig,
        store: &ConfigStore,
    ) -> Result<AuthSetup, LoginError> {
        if !client.bearer_token.is_empty() {
            if let Some(auth) = self.try_token(client, &client.bearer_token).await {
                debug!(user = %auth.username, "already logged in");
                return Ok(auth);
            }
        }

        if !self.options.username.is_empty() {
            for token in self.stored_tokens(&store.config, &client.host) {
                if let Some(auth) = self.try_token(client, &token).await {
                    debug!(user = %auth.username, "reusing stored token");
                    return Ok(auth);
                }
            }
        }

        client.bearer_token.clear();
        let token = match self.request_new_token(client).await {
            Ok(token) => token,
            Err(ClientError::CertificateAuthorityUnknown) if !client.insecure => {
                self.prompter.message(
                    "The server uses a certificate signed by unknown authority. You can bypass the certificate check but it will make all connections insecure.",
                );
                let insecure = self
                    .prompter
                    .prompt_bool("Use insecure connections", false)
                    .map_err(ClientError::from)?;
                if !insecure {
                    return Err(ClientError::CertificateAuthorityUnknown.into());
                }
                client.insecure = true;
                self.request_new_token(client).await?
            }
            Err(err) => return Err(err.into()),
        };

        let user = whoami(&client.with_token(&token)).await?;
        Ok(AuthSetup {
            username: user.username().to_string(),
            full_name: user.full_name.clone(),
            token,
            new_auth: true,
        })
    }

    async fn request_new_token(&self, client: &ClientConfig) -> Result<String, ClientError> {
        request_token(
            client,
            Arc::clone(&self.prompter),
            &self.options.username,
            &self.options.password,
        )
        .await
    }

    /// The token's identity, if it still works and matches the requested user.
    async fn try_token(&self, client: &ClientConfig, token: &str) -> Option<AuthSetup> {
        match whoami(&client.with_token(token)).await {
            Ok(user)
                if self.options.username.is_empty()
                    || user.username() == self.options.username =>
            {
                Some(AuthSetup {
                    username: user.username().to_string(),
                    full_name: user.full_name.clone(),
                    token: token.to_string(),
                    new_auth: false,
                })
            }
            Ok(user) => {
                debug!(user = %user.username(), "token belongs to a different user");
                None
            }
            Err(err) => {
                debug!(error = %err, "token rejected");
                None
            }
        }
    }

    fn stored_tokens(&self, config: &Config, host: &str) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        for (_, context) in matching_contexts(config, &self.options.username, host) {
            let token = config
                .auth_infos
                .get(&context.auth_info)
                .map(|auth| auth.token.clone())
                .unwrap_or_default();
            if !token.is_empty() && !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens
    }

    async fn determine_project_info(
        &self,
        client: &mut ClientConfig,
    ) -> Result<ProjectSetup, LoginError> {
        let api = OpenShiftClient::new(client)?;

        if !self.options.project.is_empty() {
            let project = api
                .get_project(&self.options.project)
                .await
                .map_err(|err| project_error(err, &self.options.project))?;
            client.namespace = project.name().to_string();
            return Ok(ProjectSetup {
                projects: vec![client.namespace.clone()],
                project_in_use: client.namespace.clone(),
            });
        }

        let projects: Vec<String> = api
            .list_projects()
            .await?
            .iter()
            .map(|p| p.name().to_string())
            .collect();

        let project_in_use = match projects.as_slice() {
            [] => String::new(),
            [only] => {
                client.namespace = only.clone();
                only.clone()
            }
            _ => client.namespace.clone(),
        };

        Ok(ProjectSetup {
            projects,
            project_in_use,
        })
    }
}

async fn whoami(client: &ClientConfig) -> Result<User, ClientError> {
    OpenShiftClient::new(client)?.whoami().await
}

fn project_error(err: ClientError, name: &str) -> LoginError {
    if err.is_not_found() {
        LoginError::ProjectNotFound(name.to_string())
    } else {
        err.into()
    }
}

/// Make `name` the namespace of the current context and save the store.
///
/// The project must exist on the server.
#[instrument(skip(rules, client), fields(server = %client.host))]
pub async fn switch_project(
    rules: &LoadingRules,
    fallback: Option<&Path>,
    client: &ClientConfig,
    name: &str,
) -> Result<String, LoginError> {
    let project = OpenShiftClient::new(client)?
        .get_project(name)
        .await
        .map_err(|err| project_error(err, name))?;

    let mut store = ConfigStore::locate(rules, fallback)?;
    let current = store.config.current_context.clone();
    if current.is_empty() {
        return Err(ClientError::NotConfigured.into());
    }

    store.config.contexts.entry(current).or_default().namespace = project.name().to_string();
    store.save()?;
    info!(project = %project.name(), path = %store.path.display(), "switched project");

    Ok(project.name().to_string())
}
