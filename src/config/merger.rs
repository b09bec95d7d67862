// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration merging.
//!
//! Map fields and scalar fields of a config need opposite precedence rules:
//!
//! - For `clusters`, `users` and `contexts`, the first (highest priority)
//!   document to define a key owns that whole entry. Entries under the same
//!   key in later documents are discarded, even their non-conflicting fields.
//! - For `current-context`, the highest priority non-empty value wins.
//!
//! The merge primitive [`merge`] never replaces an existing map key but lets
//! non-empty scalars overwrite. Walking the documents high-to-low therefore
//! gets the maps right, walking them low-to-high gets the scalars right, and
//! merging the second result on top of the first gets both.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{AggregateError, ConfigError};

use super::loader::load_from_file;
use super::paths::resolve_local_paths;
use super::rules::{ConfigSlot, LoadingRules};
use super::types::Config;

/// Result of loading every candidate file.
///
/// Loading never fails outright; the config holds whatever could be merged
/// and `errors` lists everything that went wrong along the way.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub config: Config,
    pub errors: Vec<ConfigError>,
}

impl LoadOutcome {
    /// Check if every candidate was either loaded or legitimately absent.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Split into the merged config and the aggregated errors, if any.
    pub fn into_parts(self) -> (Config, Option<AggregateError>) {
        (self.config, AggregateError::new(self.errors))
    }

    /// Fail if anything went wrong, discarding the partial config.
    pub fn into_result(self) -> Result<Config, AggregateError> {
        match AggregateError::new(self.errors) {
            None => Ok(self.config),
            Some(err) => Err(err),
        }
    }
}

/// Merge `src` into `dst`.
///
/// Map keys already present in `dst` keep their entry untouched; new keys are
/// added whole. A non-empty `current_context` in `src` replaces the one in `dst`.
pub fn merge(dst: &mut Config, src: Config) {
    for (name, cluster) in src.clusters {
        dst.clusters.entry(name).or_insert(cluster);
    }
    for (name, auth_info) in src.auth_infos {
        dst.auth_infos.entry(name).or_insert(auth_info);
    }
    for (name, context) in src.contexts {
        dst.contexts.entry(name).or_insert(context);
    }
    if !src.current_context.is_empty() {
        dst.current_context = src.current_context;
    }
}

/// Lay the scalar-pass result over the map-pass result.
fn combine(map_config: Config, non_map_config: Config) -> Config {
    let mut config = Config::new();
    merge(&mut config, map_config);
    merge(&mut config, non_map_config);
    config
}

/// Merge in-memory documents, highest priority first, with the same rules as
/// [`LoadingRules::load`].
pub fn merge_layers(layers: &[Config]) -> Config {
    let mut map_config = Config::new();
    for layer in layers {
        merge(&mut map_config, layer.clone());
    }

    let mut non_map_config = Config::new();
    for layer in layers.iter().rev() {
        merge(&mut non_map_config, layer.clone());
    }

    combine(map_config, non_map_config)
}

impl LoadingRules {
    /// Load and merge every candidate file.
    ///
    /// Candidates are visited in priority order: per tier the command-line
    /// path, the environment variable path, the current directory file and
    /// the home directory file.
    ///
    /// - An explicitly given command-line path that does not exist is an error.
    /// - Empty paths and other missing files are skipped silently.
    /// - Unreadable or undecodable files are errors and contribute nothing.
    /// - Relative file references are made absolute against their own file's
    ///   directory before merging.
    pub fn load(&self) -> LoadOutcome {
        let candidates = self.candidates();
        let mut errors = Vec::new();

        let mut map_config = Config::new();
        for candidate in &candidates {
            if candidate.slot == ConfigSlot::CommandLine
                && !candidate.path.is_empty()
                && is_missing(&candidate.path)
            {
                errors.push(ConfigError::MissingConfigFile(candidate.path.clone()));
                continue;
            }
            match read_candidate(&candidate.path) {
                Ok(Some(config)) => {
                    debug!(
                        path = %candidate.path,
                        tier = candidate.tier,
                        slot = %candidate.slot,
                        "merging config file"
                    );
                    merge(&mut map_config, config);
                }
                Ok(None) => {}
                Err(err) => errors.push(err),
            }
        }

        // Files are read a second time; problems were already reported above.
        let mut non_map_config = Config::new();
        for candidate in candidates.iter().rev() {
            match read_candidate(&candidate.path) {
                Ok(Some(config)) => merge(&mut non_map_config, config),
                Ok(None) => {}
                Err(err) => debug!(error = %err, "config file failed on second read"),
            }
        }

        for err in &errors {
            warn!(error = %err, "problem loading config");
        }

        LoadOutcome {
            config: combine(map_config, non_map_config),
            errors,
        }
    }
}

/// Decode and resolve one candidate. `Ok(None)` means there is nothing to load.
fn read_candidate(path: &str) -> Result<Option<Config>, ConfigError> {
    if path.is_empty() {
        return Ok(None);
    }

    let mut config = match load_from_file(Path::new(path)) {
        Ok(config) => config,
        Err(err) if err.is_not_found() => return Ok(None),
        Err(err) => {
            return Err(ConfigError::Load {
                path: path.to_string(),
                message: err.to_string(),
            })
        }
    };

    resolve_local_paths(path, &mut config)?;
    Ok(Some(config))
}

fn is_missing(path: &str) -> bool {
    matches!(
        std::fs::metadata(path),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound
    )
}
