// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration document types.
//!
//! The field names here are the on-disk wire contract shared with other
//! kubeconfig-style tools and must not change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A complete client configuration document.
///
/// `Context::cluster` and `Context::user` refer to entries of `clusters` and
/// `auth_infos` by name. Nothing enforces that the referenced entries exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub clusters: BTreeMap<String, Cluster>,

    #[serde(default, rename = "users")]
    pub auth_infos: BTreeMap<String, AuthInfo>,

    #[serde(default)]
    pub contexts: BTreeMap<String, Context>,

    #[serde(default)]
    pub current_context: String,
}

impl Config {
    /// Create an empty config: no entries and no current context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the document carries no information at all.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
            && self.auth_infos.is_empty()
            && self.contexts.is_empty()
            && self.current_context.is_empty()
    }

    /// The context named by `current_context`, if it exists.
    pub fn current(&self) -> Option<&Context> {
        if self.current_context.is_empty() {
            return None;
        }
        self.contexts.get(&self.current_context)
    }
}

/// Connection information for one API server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Cluster {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub insecure_skip_tls_verify: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub certificate_authority: String,
}

/// Credentials for one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuthInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_certificate: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_key: String,

    /// Legacy path to a separate auth file.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_path: String,
}

/// A named (cluster, identity, namespace) triple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cluster: String,

    #[serde(default, rename = "user", skip_serializing_if = "String::is_empty")]
    pub auth_info: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}
