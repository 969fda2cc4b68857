use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::metadata::json::read_record;

// =============================================================================
// Project file names
// =============================================================================

pub const MANIFEST_FILE: &str = "manifest.json";
pub const PACKAGE_FILE: &str = "package.json";
pub const VERSIONS_FILE: &str = "versions.json";
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

/// Optional per-project configuration file
pub const CONFIG_FILE: &str = "plugin-release.json";

// =============================================================================
// Build defaults
// =============================================================================

/// Timeout for the build command in seconds
pub const BUILD_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_BASE_BRANCH: &str = "main";

const APP_NAME: &str = "plugin-release";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration in {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Release configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReleaseConfig {
    pub build: BuildConfig,
    pub artifacts: ArtifactConfig,
    pub base_branch: Option<String>,
    /// Test vault that `deploy` copies artifacts into
    pub vault: Option<PathBuf>,
}

/// Build command configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    /// Program followed by its arguments
    pub command: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: vec!["npm".to_string(), "run".to_string(), "build".to_string()],
            timeout_secs: BUILD_TIMEOUT_SECS,
        }
    }
}

impl BuildConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Files the build must produce
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactConfig {
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            required: vec!["main.js".to_string(), MANIFEST_FILE.to_string()],
            optional: vec!["styles.css".to_string()],
        }
    }
}

impl ReleaseConfig {
    /// Load `plugin-release.json` from `root`, or defaults if it does not exist
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        let config = read_record::<ReleaseConfig>(&path).map_err(|e| ConfigError::Invalid {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let config = config.unwrap_or_default();

        if config.build.command.is_empty() {
            return Err(ConfigError::Invalid {
                path,
                reason: "build.command must name a program".to_string(),
            });
        }
        Ok(config)
    }

    pub fn base_branch(&self) -> &str {
        self.base_branch.as_deref().unwrap_or(DEFAULT_BASE_BRANCH)
    }
}

/// Returns the path to the data directory for plugin-release.
/// Uses $XDG_DATA_HOME/plugin-release if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/plugin-release,
/// or ./plugin-release if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join(format!("{}.log", APP_NAME))
}

pub(crate) fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn release_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<ReleaseConfig>(json!({
            "build": {
                "timeoutSecs": 300
            }
        }))
        .unwrap();

        assert_eq!(result.build.timeout_secs, 300);
        assert_eq!(result.build.command, ["npm", "run", "build"]);
        assert_eq!(result.artifacts, ArtifactConfig::default());
        assert_eq!(result.base_branch(), "main");
    }

    #[test]
    fn release_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<ReleaseConfig>(json!({
            "build": {
                "command": ["pnpm", "build"],
                "timeoutSecs": 60
            },
            "artifacts": {
                "required": ["main.js"],
                "optional": []
            },
            "baseBranch": "release",
            "vault": "/vaults/test"
        }))
        .unwrap();

        assert_eq!(
            result,
            ReleaseConfig {
                build: BuildConfig {
                    command: vec!["pnpm".to_string(), "build".to_string()],
                    timeout_secs: 60,
                },
                artifacts: ArtifactConfig {
                    required: vec!["main.js".to_string()],
                    optional: vec![],
                },
                base_branch: Some("release".to_string()),
                vault: Some(PathBuf::from("/vaults/test")),
            }
        );
    }

    #[test]
    fn load_returns_defaults_when_file_is_absent() {
        let temp_dir = TempDir::new().unwrap();

        let config = ReleaseConfig::load(temp_dir.path()).unwrap();

        assert_eq!(config, ReleaseConfig::default());
        assert_eq!(config.build.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn load_rejects_empty_build_command() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            r#"{"build": {"command": []}}"#,
        )
        .unwrap();

        let result = ReleaseConfig::load(temp_dir.path());

        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/plugin-release"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/plugin-release"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./plugin-release"));
    }
}
