// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Config document encoding and file access.
//!
//! Documents are read as YAML (which also accepts JSON) and written as YAML.
//! Writes never leave a half-written file behind: content goes to a private
//! sibling file first and is then renamed over the target.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

use super::types::Config;

/// Permissions for written config files (owner read/write only).
pub const CONFIG_FILE_MODE: u32 = 0o600;

/// Decode a config document from raw bytes.
///
/// Whitespace-only input is an empty document.
pub fn decode(data: &[u8]) -> Result<Config, ConfigError> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Config::new());
    }
    serde_yaml::from_slice(data).map_err(ConfigError::from)
}

/// Encode a config document as YAML.
pub fn encode(config: &Config) -> Result<Vec<u8>, ConfigError> {
    let content = serde_yaml::to_string(config)?;
    Ok(content.into_bytes())
}

/// Read and decode a config file without modifying any of its contents.
pub fn load_from_file(path: &Path) -> Result<Config, ConfigError> {
    let data = std::fs::read(path)?;
    decode(&data)
}

/// Serialize the config and replace the file at `path` with it.
///
/// The file ends up with [`CONFIG_FILE_MODE`] permissions whether or not it
/// existed before.
pub fn write_to_file(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = encode(config)?;
    let staging = staging_path(path);

    let result = write_private(&staging, &content).and_then(|_| std::fs::rename(&staging, path));
    if let Err(err) = result {
        let _ = std::fs::remove_file(&staging);
        return Err(ConfigError::Write {
            path: path.display().to_string(),
            message: err.to_string(),
        });
    }

    debug!(path = %path.display(), bytes = content.len(), "wrote config file");
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    path.with_file_name(format!(".{}.tmp-{}", name, std::process::id()))
}

fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(CONFIG_FILE_MODE);
    }

    let mut file = options.open(path)?;
    file.write_all(content)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{AuthInfo, Cluster, Context};
    use tempfile::TempDir;

    fn sample_config() -> Config {
        let mut config = Config::new();
        config.clusters.insert(
            "c1".to_string(),
            Cluster {
                server: "https://h1:8443".to_string(),
                insecure_skip_tls_verify: true,
                certificate_authority: "/etc/ca.crt".to_string(),
            },
        );
        config.auth_infos.insert(
            "alice".to_string(),
            AuthInfo {
                token: "tok".to_string(),
                ..Default::default()
            },
        );
        config.contexts.insert(
            "ctx1".to_string(),
            Context {
                cluster: "c1".to_string(),
                auth_info: "alice".to_string(),
                namespace: "demo".to_string(),
            },
        );
        config.current_context = "ctx1".to_string();
        config
    }

    #[test]
    fn test_decode_empty_input() {
        assert!(decode(b"").unwrap().is_empty());
        assert!(decode(b"  \n\t").unwrap().is_empty());
    }

    #[test]
    fn test_decode_json() {
        let config = decode(br#"{"current-context": "x", "clusters": {"a": {"server": "https://a"}}}"#)
            .unwrap();
        assert_eq!(config.current_context, "x");
        assert_eq!(config.clusters["a"].server, "https://a");
    }

    #[test]
    fn test_decode_invalid() {
        let err = decode(b"clusters: [not, a, map]").unwrap_err();
        assert!(matches!(err, ConfigError::YamlError(_)));
    }

    #[test]
    fn test_encode_decode_preserves_fields() {
        let config = sample_config();
        let bytes = encode(&config).unwrap();
        assert_eq!(decode(&bytes).unwrap(), config);
    }

    #[test]
    fn test_load_from_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = load_from_file(&temp.path().join("nope")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_write_replaces_contents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");
        std::fs::write(&path, "garbage that is much longer than the new content ".repeat(50))
            .unwrap();

        write_to_file(&sample_config(), &path).unwrap();

        assert_eq!(load_from_file(&path).unwrap(), sample_config());
        let leftovers: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_sets_owner_only_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");
        std::fs::write(&path, "").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_to_file(&Config::new(), &path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, CONFIG_FILE_MODE);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("config");
        let err = write_to_file(&Config::new(), &path).unwrap_err();
        assert!(matches!(err, ConfigError::Write { .. }));
    }
}
