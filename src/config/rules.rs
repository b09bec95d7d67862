// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Loading rules: where to look for config files, and in which order.
//!
//! A rule is one precedence tier of four slots (command-line flag,
//! environment variable, current directory, home directory). Rules are kept
//! in priority order, and flattening them yields every candidate path with
//! its provenance.

use std::fmt;
use std::path::PathBuf;

/// Environment variable naming a generic kubeconfig file.
pub const KUBECONFIG_ENV_VAR: &str = "KUBECONFIG";

/// Environment variable naming an OpenShift config file.
pub const OPENSHIFT_CONFIG_ENV_VAR: &str = "OPENSHIFTCONFIG";

/// Kubeconfig file name, looked up in the current directory.
pub const KUBE_CONFIG_FILE_NAME: &str = ".kubeconfig";

/// Kubeconfig directory under the home directory.
pub const KUBE_CONFIG_HOME_DIR: &str = ".kube";

/// OpenShift config file name, looked up in the current directory.
pub const OPENSHIFT_CONFIG_FILE_NAME: &str = ".openshiftconfig";

/// OpenShift config directory under the home directory.
pub const OPENSHIFT_CONFIG_HOME_DIR: &str = ".openshift";

/// Which family of config files a tier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigEngine {
    #[default]
    Kube,
    OpenShift,
}

impl fmt::Display for ConfigEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigEngine::Kube => write!(f, "kube"),
            ConfigEngine::OpenShift => write!(f, "openshift"),
        }
    }
}

/// Slot within a tier, in fixed evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSlot {
    CommandLine,
    EnvVar,
    CurrentDirectory,
    HomeDirectory,
}

impl fmt::Display for ConfigSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSlot::CommandLine => write!(f, "flag"),
            ConfigSlot::EnvVar => write!(f, "envvar"),
            ConfigSlot::CurrentDirectory => write!(f, "localdir"),
            ConfigSlot::HomeDirectory => write!(f, "homedir"),
        }
    }
}

/// One precedence tier. Empty paths mean "no candidate in this slot".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingRule {
    pub command_line_path: String,
    pub env_var_path: String,
    pub current_directory_path: String,
    pub home_directory_path: String,
    pub engine: ConfigEngine,
}

impl LoadingRule {
    pub fn new(
        command_line_path: impl Into<String>,
        env_var_path: impl Into<String>,
        current_directory_path: impl Into<String>,
        home_directory_path: impl Into<String>,
    ) -> Self {
        Self {
            command_line_path: command_line_path.into(),
            env_var_path: env_var_path.into(),
            current_directory_path: current_directory_path.into(),
            home_directory_path: home_directory_path.into(),
            engine: ConfigEngine::default(),
        }
    }

    /// Tag the tier with the config family it belongs to.
    pub fn with_engine(mut self, engine: ConfigEngine) -> Self {
        self.engine = engine;
        self
    }

    /// The four slots in evaluation order.
    pub fn slots(&self) -> [(ConfigSlot, &str); 4] {
        [
            (ConfigSlot::CommandLine, self.command_line_path.as_str()),
            (ConfigSlot::EnvVar, self.env_var_path.as_str()),
            (ConfigSlot::CurrentDirectory, self.current_directory_path.as_str()),
            (ConfigSlot::HomeDirectory, self.home_directory_path.as_str()),
        ]
    }
}

/// A single path to try, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: String,
    pub tier: usize,
    pub engine: ConfigEngine,
    pub slot: ConfigSlot,
}

/// Ordered tiers, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingRules {
    pub rules: Vec<LoadingRule>,
}

impl LoadingRules {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generic kubeconfig locations: `$KUBECONFIG`, `./.kubeconfig`, `~/.kube/.kubeconfig`.
    pub fn kube(env: &EnvPaths) -> Self {
        let mut rules = Self::new();
        rules.append_rule(
            "",
            env.kubeconfig.clone().unwrap_or_default(),
            KUBE_CONFIG_FILE_NAME,
            env.home_file(KUBE_CONFIG_HOME_DIR, KUBE_CONFIG_FILE_NAME),
        );
        rules
    }

    /// OpenShift locations ahead of the generic kubeconfig ones.
    ///
    /// 1. `--config` flag (bound later onto [`LoadingRules::default_rule_mut`])
    /// 2. `$OPENSHIFTCONFIG`
    /// 3. `./.openshiftconfig`
    /// 4. `~/.openshift/.openshiftconfig`
    /// 5. `$KUBECONFIG`
    /// 6. `./.kubeconfig`
    /// 7. `~/.kube/.kubeconfig`
    pub fn openshift(env: &EnvPaths) -> Self {
        let mut rules = Self::kube(env);
        rules
            .prepend_rule(
                "",
                env.openshift_config.clone().unwrap_or_default(),
                OPENSHIFT_CONFIG_FILE_NAME,
                env.home_file(OPENSHIFT_CONFIG_HOME_DIR, OPENSHIFT_CONFIG_FILE_NAME),
            )
            .engine = ConfigEngine::OpenShift;
        rules
    }

    /// The first tier, the one flags and environment variables bind to.
    pub fn default_rule(&self) -> Option<&LoadingRule> {
        self.rules.first()
    }

    pub fn default_rule_mut(&mut self) -> Option<&mut LoadingRule> {
        self.rules.first_mut()
    }

    /// Add a tier with the lowest priority.
    pub fn append_rule(
        &mut self,
        command_line_path: impl Into<String>,
        env_var_path: impl Into<String>,
        current_directory_path: impl Into<String>,
        home_directory_path: impl Into<String>,
    ) -> &mut LoadingRule {
        self.rules.push(LoadingRule::new(
            command_line_path,
            env_var_path,
            current_directory_path,
            home_directory_path,
        ));
        let last = self.rules.len() - 1;
        &mut self.rules[last]
    }

    /// Add a tier with the highest priority.
    pub fn prepend_rule(
        &mut self,
        command_line_path: impl Into<String>,
        env_var_path: impl Into<String>,
        current_directory_path: impl Into<String>,
        home_directory_path: impl Into<String>,
    ) -> &mut LoadingRule {
        self.rules.insert(
            0,
            LoadingRule::new(
                command_line_path,
                env_var_path,
                current_directory_path,
                home_directory_path,
            ),
        );
        &mut self.rules[0]
    }

    /// Every slot of every tier, highest priority first. Empty slots are kept.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.rules
            .iter()
            .enumerate()
            .flat_map(|(tier, rule)| {
                rule.slots().map(|(slot, path)| Candidate {
                    path: path.to_string(),
                    tier,
                    engine: rule.engine,
                    slot,
                })
            })
            .collect()
    }

    /// Candidate paths only, in the same order as [`LoadingRules::candidates`].
    pub fn candidate_paths(&self) -> Vec<String> {
        self.candidates().into_iter().map(|c| c.path).collect()
    }

    /// Set the command-line path of the first tier.
    pub fn set_command_line_path(&mut self, path: impl Into<String>) {
        if let Some(rule) = self.default_rule_mut() {
            rule.command_line_path = path.into();
        }
    }
}

/// The parts of the process environment that decide config locations.
///
/// Captured once and passed in explicitly so rule construction never reads
/// global state on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvPaths {
    pub kubeconfig: Option<String>,
    pub openshift_config: Option<String>,
    pub home: Option<PathBuf>,
}

impl EnvPaths {
    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        Self {
            kubeconfig: non_empty_var(KUBECONFIG_ENV_VAR),
            openshift_config: non_empty_var(OPENSHIFT_CONFIG_ENV_VAR),
            home: dirs::home_dir(),
        }
    }

    /// Where a new config is created when none can be found.
    pub fn default_store_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|home| {
            home.join(OPENSHIFT_CONFIG_HOME_DIR)
                .join(OPENSHIFT_CONFIG_FILE_NAME)
        })
    }

    fn home_file(&self, dir: &str, file: &str) -> String {
        self.home
            .as_ref()
            .map(|home| home.join(dir).join(file).to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> EnvPaths {
        EnvPaths {
            kubeconfig: Some("/env/kube".to_string()),
            openshift_config: None,
            home: Some(PathBuf::from("/home/u")),
        }
    }

    #[test]
    fn test_default_rule_empty() {
        let rules = LoadingRules::new();
        assert!(rules.default_rule().is_none());
        assert!(rules.candidates().is_empty());
    }

    #[test]
    fn test_append_and_prepend_order() {
        let mut rules = LoadingRules::new();
        rules.append_rule("a1", "a2", "a3", "a4");
        rules.append_rule("b1", "", "", "b4");
        rules.prepend_rule("z1", "", "", "");

        assert_eq!(rules.default_rule().unwrap().command_line_path, "z1");
        assert_eq!(
            rules.candidate_paths(),
            vec!["z1", "", "", "", "a1", "a2", "a3", "a4", "b1", "", "", "b4"]
        );
    }

    #[test]
    fn test_candidate_provenance() {
        let mut rules = LoadingRules::new();
        rules.append_rule("flag", "env", "local", "home");
        let candidates = rules.candidates();

        assert_eq!(candidates.len(), 4);
        assert_eq!(candidates[0].slot, ConfigSlot::CommandLine);
        assert_eq!(candidates[1].slot, ConfigSlot::EnvVar);
        assert_eq!(candidates[2].slot, ConfigSlot::CurrentDirectory);
        assert_eq!(candidates[3].slot, ConfigSlot::HomeDirectory);
        assert!(candidates.iter().all(|c| c.tier == 0));
    }

    #[test]
    fn test_kube_rules() {
        let rules = LoadingRules::kube(&env());
        assert_eq!(
            rules.candidate_paths(),
            vec!["", "/env/kube", ".kubeconfig", "/home/u/.kube/.kubeconfig"]
        );
    }

    #[test]
    fn test_openshift_rules_precede_kube() {
        let mut rules = LoadingRules::openshift(&env());
        rules.set_command_line_path("/tmp/flag");

        let candidates = rules.candidates();
        assert_eq!(candidates.len(), 8);
        assert_eq!(candidates[0].path, "/tmp/flag");
        assert_eq!(candidates[0].engine, ConfigEngine::OpenShift);
        assert_eq!(candidates[2].path, ".openshiftconfig");
        assert_eq!(candidates[3].path, "/home/u/.openshift/.openshiftconfig");
        assert_eq!(candidates[4].engine, ConfigEngine::Kube);
        assert_eq!(candidates[5].path, "/env/kube");
    }

    #[test]
    fn test_no_home_leaves_slot_empty() {
        let rules = LoadingRules::kube(&EnvPaths::default());
        assert_eq!(rules.candidate_paths()[3], "");
        assert!(EnvPaths::default().default_store_path().is_none());
    }

    #[test]
    fn test_default_store_path() {
        assert_eq!(
            env().default_store_path().unwrap(),
            PathBuf::from("/home/u/.openshift/.openshiftconfig")
        );
    }
}
