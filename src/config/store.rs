// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The single config file that commands write back to.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

use super::loader::{load_from_file, write_to_file};
use super::rules::{Candidate, ConfigEngine, ConfigSlot, LoadingRules};
use super::types::Config;

/// A config document together with the file it belongs to.
///
/// The document is kept exactly as read (relative paths are not resolved) so
/// that writing it back does not rewrite the user's file references. The
/// engine and location only record where the file was found.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    pub config: Config,
    pub path: PathBuf,
    pub engine: ConfigEngine,
    pub location: ConfigSlot,
}

impl ConfigStore {
    /// Find the file to write to.
    ///
    /// If a command-line path is set, only that file is considered. Otherwise
    /// the first candidate that loads wins. When nothing loads, an empty config
    /// is created at `fallback`.
    pub fn locate(rules: &LoadingRules, fallback: Option<&Path>) -> Result<Self, ConfigError> {
        let candidates = rules.candidates();

        if let Some(flag) = candidates
            .iter()
            .find(|c| c.slot == ConfigSlot::CommandLine && !c.path.is_empty())
        {
            return Self::try_load(flag)
                .map_err(|_| ConfigError::StoreNotFound(flag.path.clone()));
        }

        for candidate in candidates.iter().filter(|c| !c.path.is_empty()) {
            match Self::try_load(candidate) {
                Ok(store) => return Ok(store),
                Err(err) => debug!(
                    path = %candidate.path,
                    engine = %candidate.engine,
                    slot = %candidate.slot,
                    error = %err,
                    "unable to load config file"
                ),
            }
        }

        let path = fallback.ok_or_else(|| {
            ConfigError::StoreCreateFailed("no home directory to create it in".to_string())
        })?;
        debug!(
            path = %path.display(),
            "config file not found in any of the expected locations, creating a new one"
        );
        Self::create_new_empty(path)
    }

    /// Write an empty config to `path`, creating parent directories as needed.
    pub fn create_new_empty(path: &Path) -> Result<Self, ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::StoreCreateFailed(e.to_string()))?;
        }

        let config = Config::new();
        write_to_file(&config, path).map_err(|e| ConfigError::StoreCreateFailed(e.to_string()))?;

        Ok(Self {
            config,
            path: path.to_path_buf(),
            engine: ConfigEngine::OpenShift,
            location: ConfigSlot::HomeDirectory,
        })
    }

    /// Write the document back to its file.
    pub fn save(&self) -> Result<(), ConfigError> {
        write_to_file(&self.config, &self.path)
    }

    pub fn from_flag(&self) -> bool {
        self.location == ConfigSlot::CommandLine
    }

    pub fn from_env_var(&self) -> bool {
        self.location == ConfigSlot::EnvVar
    }

    pub fn from_local_dir(&self) -> bool {
        self.location == ConfigSlot::CurrentDirectory
    }

    pub fn from_home_dir(&self) -> bool {
        self.location == ConfigSlot::HomeDirectory
    }

    pub fn from_openshift(&self) -> bool {
        self.engine == ConfigEngine::OpenShift
    }

    pub fn from_kube(&self) -> bool {
        self.engine == ConfigEngine::Kube
    }

    fn try_load(candidate: &Candidate) -> Result<Self, ConfigError> {
        let path = PathBuf::from(&candidate.path);
        let config = load_from_file(&path)?;
        Ok(Self {
            config,
            path,
            engine: candidate.engine,
            location: candidate.slot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_locate_first_loadable_candidate() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing").to_string_lossy().into_owned();
        let broken = write(&temp, "broken", "clusters: [1]\n");
        let good = write(&temp, "good", "current-context: found\n");

        let mut rules = LoadingRules::new();
        rules.append_rule("", missing, broken, "");
        rules.append_rule("", "", "", good.clone());

        let store = ConfigStore::locate(&rules, None).unwrap();
        assert_eq!(store.path, PathBuf::from(good));
        assert_eq!(store.config.current_context, "found");
        assert!(store.from_home_dir());
        assert!(store.from_kube());
    }

    #[test]
    fn test_locate_command_line_only() {
        let temp = TempDir::new().unwrap();
        let flag = temp.path().join("flag").to_string_lossy().into_owned();
        let other = write(&temp, "other", "current-context: other\n");

        let mut rules = LoadingRules::new();
        rules.append_rule(flag.clone(), other, "", "");

        let err = ConfigStore::locate(&rules, None).unwrap_err();
        assert!(matches!(err, ConfigError::StoreNotFound(p) if p == flag));
    }

    #[test]
    fn test_locate_keeps_relative_paths() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            "config",
            "clusters:\n  c:\n    certificate-authority: ca.crt\n",
        );

        let mut rules = LoadingRules::new();
        rules.append_rule(path, "", "", "");

        let store = ConfigStore::locate(&rules, None).unwrap();
        assert!(store.from_flag());
        assert_eq!(store.config.clusters["c"].certificate_authority, "ca.crt");
    }

    #[test]
    fn test_locate_creates_fallback() {
        let temp = TempDir::new().unwrap();
        let fallback = temp.path().join(".openshift").join(".openshiftconfig");

        let store = ConfigStore::locate(&LoadingRules::new(), Some(&fallback)).unwrap();

        assert!(fallback.exists());
        assert!(store.config.is_empty());
        assert!(store.from_openshift());
        assert_eq!(load_from_file(&fallback).unwrap(), Config::new());
    }

    #[test]
    fn test_locate_without_fallback_fails() {
        let err = ConfigStore::locate(&LoadingRules::new(), None).unwrap_err();
        assert!(matches!(err, ConfigError::StoreCreateFailed(_)));
    }

    #[test]
    fn test_save_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");
        let mut store = ConfigStore::create_new_empty(&path).unwrap();
        store.config.current_context = "saved".to_string();
        store.save().unwrap();

        assert_eq!(load_from_file(&path).unwrap().current_context, "saved");
    }
}
