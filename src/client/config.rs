// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Connection settings resolved from a merged config plus overrides.

use reqwest::Url;

use crate::config::{AuthInfo, Cluster, Config, Context};
use crate::error::ClientError;

/// Namespace used when neither the context nor an override names one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Values taken from global command-line flags. `None` means "use the config".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub server: Option<String>,
    pub context: Option<String>,
    pub namespace: Option<String>,
    pub token: Option<String>,
    pub insecure_skip_tls_verify: Option<bool>,
    pub certificate_authority: Option<String>,
}

/// Everything needed to open a connection to one server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server base URL with scheme, no trailing slash.
    pub host: String,
    pub bearer_token: String,
    pub insecure: bool,
    pub ca_file: String,
    pub namespace: String,
    /// Name of the context the settings came from, empty if none.
    pub context: String,
}

impl ClientConfig {
    /// Resolve connection settings.
    ///
    /// Context references to clusters and users may dangle; missing entries
    /// contribute nothing. Returns [`ClientError::NotConfigured`] when no server
    /// can be determined.
    pub fn resolve(config: &Config, overrides: &ConfigOverrides) -> Result<Self, ClientError> {
        let context_name = overrides
            .context
            .clone()
            .unwrap_or_else(|| config.current_context.clone());

        let context = config.contexts.get(&context_name).cloned().unwrap_or_default();
        let cluster = lookup::<Cluster>(&config.clusters, &context.cluster);
        let auth_info = lookup::<AuthInfo>(&config.auth_infos, &context.auth_info);

        let server_override = overrides.server.clone().filter(|s| !s.trim().is_empty());
        // The context's token belongs to the context's cluster only.
        let other_server = server_override
            .as_deref()
            .is_some_and(|server| !same_server(server, &cluster.server));
        let server = server_override.unwrap_or(cluster.server);
        if server.trim().is_empty() {
            return Err(ClientError::NotConfigured);
        }
        let bearer_token = match &overrides.token {
            Some(token) => token.clone(),
            None if other_server => String::new(),
            None => auth_info.token,
        };

        let namespace = overrides
            .namespace
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| Some(context.namespace.clone()).filter(|n| !n.is_empty()))
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        Ok(Self {
            host: normalize_server(&server)?,
            bearer_token,
            insecure: overrides
                .insecure_skip_tls_verify
                .unwrap_or(cluster.insecure_skip_tls_verify),
            ca_file: overrides
                .certificate_authority
                .clone()
                .unwrap_or(cluster.certificate_authority),
            namespace,
            context: if config.contexts.contains_key(&context_name) {
                context_name
            } else {
                String::new()
            },
        })
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        Url::parse(&format!("{}{}", self.host, path))
            .map_err(|e| ClientError::InvalidUrl(format!("{}{}: {}", self.host, path, e)))
    }

    /// Same settings with a different bearer token.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            bearer_token: token.into(),
            ..self.clone()
        }
    }
}

/// Add `https://` when no scheme is given and drop trailing slashes.
pub fn normalize_server(server: &str) -> Result<String, ClientError> {
    let trimmed = server.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", server, e)))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ClientError::InvalidUrl(format!("{}: missing host", server)));
    }

    Ok(with_scheme.trim_end_matches('/').to_string())
}

fn same_server(a: &str, b: &str) -> bool {
    match (normalize_server(a), normalize_server(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn lookup<T: Clone + Default>(entries: &std::collections::BTreeMap<String, T>, name: &str) -> T {
    entries.get(name).cloned().unwrap_or_default()
}

/// Contexts whose user is `username` and whose cluster points at `host`.
pub fn matching_contexts<'a>(
    config: &'a Config,
    username: &'a str,
    host: &'a str,
) -> impl Iterator<Item = (&'a String, &'a Context)> + 'a {
    config.contexts.iter().filter(move |(_, context)| {
        context.auth_info == username
            && config
                .clusters
                .get(&context.cluster)
                .and_then(|cluster| normalize_server(&cluster.server).ok())
                .is_some_and(|server| server == host)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        crate::config::decode(
            br#"
clusters:
  dev:
    server: dev.example.com:8443
    certificate-authority: /etc/ca.crt
users:
  alice:
    token: alice-token
contexts:
  dev-alice:
    cluster: dev
    user: alice
    namespace: team
  dangling:
    cluster: nowhere
    user: nobody
current-context: dev-alice
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_current_context() {
        let client = ClientConfig::resolve(&sample(), &ConfigOverrides::default()).unwrap();

        assert_eq!(client.host, "https://dev.example.com:8443");
        assert_eq!(client.bearer_token, "alice-token");
        assert_eq!(client.ca_file, "/etc/ca.crt");
        assert_eq!(client.namespace, "team");
        assert_eq!(client.context, "dev-alice");
        assert!(!client.insecure);
    }

    #[test]
    fn test_resolve_overrides_win() {
        let overrides = ConfigOverrides {
            server: Some("http://other:8080/".to_string()),
            namespace: Some("mine".to_string()),
            token: Some("flag-token".to_string()),
            insecure_skip_tls_verify: Some(true),
            ..Default::default()
        };
        let client = ClientConfig::resolve(&sample(), &overrides).unwrap();

        assert_eq!(client.host, "http://other:8080");
        assert_eq!(client.bearer_token, "flag-token");
        assert_eq!(client.namespace, "mine");
        assert!(client.insecure);
    }

    #[test]
    fn test_resolve_other_server_drops_context_token() {
        let overrides = ConfigOverrides {
            server: Some("https://elsewhere:8443".to_string()),
            ..Default::default()
        };
        let client = ClientConfig::resolve(&sample(), &overrides).unwrap();

        assert_eq!(client.host, "https://elsewhere:8443");
        assert!(client.bearer_token.is_empty());
    }

    #[test]
    fn test_resolve_same_server_keeps_context_token() {
        let overrides = ConfigOverrides {
            server: Some("dev.example.com:8443/".to_string()),
            ..Default::default()
        };
        let client = ClientConfig::resolve(&sample(), &overrides).unwrap();

        assert_eq!(client.bearer_token, "alice-token");
    }

    #[test]
    fn test_resolve_dangling_context_is_not_configured() {
        let overrides = ConfigOverrides {
            context: Some("dangling".to_string()),
            ..Default::default()
        };
        let err = ClientConfig::resolve(&sample(), &overrides).unwrap_err();
        assert!(err.is_not_configured());
    }

    #[test]
    fn test_resolve_empty_config() {
        let err = ClientConfig::resolve(&Config::new(), &ConfigOverrides::default()).unwrap_err();
        assert!(err.is_not_configured());

        let overrides = ConfigOverrides {
            server: Some("localhost:8443".to_string()),
            ..Default::default()
        };
        let client = ClientConfig::resolve(&Config::new(), &overrides).unwrap();
        assert_eq!(client.host, "https://localhost:8443");
        assert_eq!(client.namespace, DEFAULT_NAMESPACE);
        assert_eq!(client.context, "");
    }

    #[test]
    fn test_normalize_server_rejects_garbage() {
        assert!(matches!(
            normalize_server("https://"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_url_join() {
        let client = ClientConfig {
            host: "https://h:8443".to_string(),
            ..Default::default()
        };
        assert_eq!(
            client.url("/osapi/v1beta1/users/~").unwrap().as_str(),
            "https://h:8443/osapi/v1beta1/users/~"
        );
    }

    #[test]
    fn test_matching_contexts() {
        let config = sample();
        let found: Vec<_> = matching_contexts(&config, "alice", "https://dev.example.com:8443")
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(found, vec!["dev-alice"]);
        assert_eq!(matching_contexts(&config, "alice", "https://other").count(), 0);
    }
}
