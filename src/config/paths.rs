// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Relative path resolution for loaded config documents.
//!
//! File references inside a config file are relative to that file. Once
//! documents from several files are merged the origin is lost, so every
//! reference is made absolute right after decoding and before merging.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::Config;

/// Rewrite every file reference in `config` relative to the directory of `filename`.
///
/// Only the in-memory document changes. Empty and absolute references are left alone.
pub fn resolve_local_paths(filename: &str, config: &mut Config) -> Result<(), ConfigError> {
    if filename.is_empty() {
        return Ok(());
    }

    let config_dir = absolute_dir(Path::new(filename)).map_err(|e| ConfigError::ResolvePath {
        path: filename.to_string(),
        message: e.to_string(),
    })?;

    for cluster in config.clusters.values_mut() {
        cluster.certificate_authority =
            resolve_local_path(&config_dir, &cluster.certificate_authority);
    }

    for auth_info in config.auth_infos.values_mut() {
        auth_info.auth_path = resolve_local_path(&config_dir, &auth_info.auth_path);
        auth_info.client_certificate = resolve_local_path(&config_dir, &auth_info.client_certificate);
        auth_info.client_key = resolve_local_path(&config_dir, &auth_info.client_key);
    }

    Ok(())
}

/// Make `path` absolute with respect to `starting_dir`.
pub fn resolve_local_path(starting_dir: &Path, path: &str) -> String {
    if path.is_empty() || Path::new(path).is_absolute() {
        return path.to_string();
    }
    starting_dir.join(path).to_string_lossy().into_owned()
}

fn absolute_dir(file: &Path) -> std::io::Result<PathBuf> {
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::path::absolute(dir)
}
