// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Client configuration: locating, loading, merging and writing config files.
//!
//! Config files are kubeconfig-shaped YAML documents. Several files can
//! contribute to one effective configuration:
//! - `--config` flag
//! - `$OPENSHIFTCONFIG`, `./.openshiftconfig`, `~/.openshift/.openshiftconfig`
//! - `$KUBECONFIG`, `./.kubeconfig`, `~/.kube/.kubeconfig`
//!
//! Named entries (clusters, users, contexts) from the earliest file win.
//! The current context comes from the earliest file that sets one.

mod loader;
mod merger;
mod paths;
mod persist;
mod rules;
mod store;
mod types;

pub use loader::{decode, encode, load_from_file, write_to_file, CONFIG_FILE_MODE};

pub use merger::{merge, merge_layers, LoadOutcome};

pub use paths::{resolve_local_path, resolve_local_paths};

pub use persist::{
    cluster_name_for_server, identity_config, update_config_file, DEFAULT_CREDENTIALS_NAME,
};

pub use rules::{
    Candidate, ConfigEngine, ConfigSlot, EnvPaths, LoadingRule, LoadingRules, KUBECONFIG_ENV_VAR,
    KUBE_CONFIG_FILE_NAME, KUBE_CONFIG_HOME_DIR, OPENSHIFT_CONFIG_ENV_VAR,
    OPENSHIFT_CONFIG_FILE_NAME, OPENSHIFT_CONFIG_HOME_DIR,
};

pub use store::ConfigStore;

pub use types::{AuthInfo, Cluster, Config, Context};

/// Build the OpenShift loading rules for an environment, with an optional
/// `--config` path bound onto the first tier.
pub fn loading_rules(env: &EnvPaths, command_line_path: Option<&str>) -> LoadingRules {
    let mut rules = LoadingRules::openshift(env);
    if let Some(path) = command_line_path {
        rules.set_command_line_path(path);
    }
    rules
}

/// Load and merge every config file visible from `env`.
///
/// This is the main entry point for configuration loading.
pub fn load_config(env: &EnvPaths, command_line_path: Option<&str>) -> LoadOutcome {
    loading_rules(env, command_line_path).load()
}
