// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Writing a freshly acquired identity into the config store.

use reqwest::Url;
use tracing::info;

use crate::client::ClientConfig;
use crate::error::ConfigError;

use super::merger::merge_layers;
use super::store::ConfigStore;
use super::types::{AuthInfo, Cluster, Config, Context};

/// Credentials name used when the server did not tell us who we are.
pub const DEFAULT_CREDENTIALS_NAME: &str = "osc-login";

/// Cluster entry name for a server: `host:port`, with the scheme's default port
/// filled in.
pub fn cluster_name_for_server(server: &str) -> String {
    match Url::parse(server) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default();
            match url.port_or_known_default() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            }
        }
        Err(_) => server.to_string(),
    }
}

/// Build a document holding exactly one identity, one cluster and one context
/// joining them, with that context current.
pub fn identity_config(username: &str, token: &str, client: &ClientConfig) -> Config {
    let credentials_name = if username.is_empty() {
        DEFAULT_CREDENTIALS_NAME
    } else {
        username
    };
    let cluster_name = cluster_name_for_server(&client.host);
    let context_name = format!("{}-{}", cluster_name, credentials_name);

    let mut config = Config::new();
    config.auth_infos.insert(
        credentials_name.to_string(),
        AuthInfo {
            token: token.to_string(),
            ..Default::default()
        },
    );
    config.clusters.insert(
        cluster_name.clone(),
        Cluster {
            server: client.host.clone(),
            insecure_skip_tls_verify: client.insecure,
            certificate_authority: client.ca_file.clone(),
        },
    );
    config.contexts.insert(
        context_name.clone(),
        Context {
            cluster: cluster_name,
            auth_info: credentials_name.to_string(),
            namespace: client.namespace.clone(),
        },
    );
    config.current_context = context_name;
    config
}

/// Merge the identity into the store's document and write it back.
///
/// The new entries take precedence over existing entries of the same name
/// (so logging in again refreshes the token in place) and everything else in
/// the file is kept.
pub fn update_config_file(
    username: &str,
    token: &str,
    client: &ClientConfig,
    store: &mut ConfigStore,
) -> Result<(), ConfigError> {
    let fresh = identity_config(username, token, client);
    let merged = merge_layers(&[fresh, store.config.clone()]);

    store.config = merged;
    store.save()?;

    info!(
        path = %store.path.display(),
        context = %store.config.current_context,
        "updated config file"
    );
    Ok(())
}
