//! Copy build artifacts into a local test vault

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::build::{ArtifactSet, BuildError};
use crate::metadata::{MetadataError, manifest::ManifestRecord};

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("No test vault configured. Pass --vault or set \"vault\" in plugin-release.json")]
    NoVault,

    #[error("Test vault {} does not exist", .0.display())]
    VaultNotFound(PathBuf),

    #[error("manifest.json has no \"id\" field")]
    MissingPluginId,

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// Directory a plugin is installed to inside a vault
pub fn plugin_dir(vault: &Path, plugin_id: &str) -> PathBuf {
    vault.join(".obsidian").join("plugins").join(plugin_id)
}

/// Copy `artifacts` into the plugin directory of `vault`.
///
/// Returns the plugin directory.
pub fn deploy_artifacts(
    vault: &Path,
    manifest: &ManifestRecord,
    artifacts: &ArtifactSet,
) -> Result<PathBuf, DeployError> {
    if !vault.is_dir() {
        return Err(DeployError::VaultNotFound(vault.to_path_buf()));
    }
    let plugin_id = manifest.plugin_id().ok_or(DeployError::MissingPluginId)?;

    let target = plugin_dir(vault, plugin_id);
    fs::create_dir_all(&target).map_err(|source| DeployError::Copy {
        from: vault.to_path_buf(),
        to: target.clone(),
        source,
    })?;

    for artifact in &artifacts.artifacts {
        let destination = target.join(&artifact.name);
        fs::copy(&artifact.path, &destination).map_err(|source| DeployError::Copy {
            from: artifact.path.clone(),
            to: destination.clone(),
            source,
        })?;
        info!("Copied {} to {}", artifact.name, destination.display());
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::verify_artifacts;
    use crate::config::ReleaseConfig;
    use crate::metadata::store::load_manifest;
    use tempfile::TempDir;

    fn project(manifest: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("manifest.json"), manifest).unwrap();
        fs::write(dir.path().join("main.js"), "module.exports = {};").unwrap();
        dir
    }

    #[test]
    fn deploy_artifacts_copies_into_plugin_directory() {
        let project = project(r#"{"id": "sample", "version": "1.0.0", "minAppVersion": "0.15.0"}"#);
        let vault = TempDir::new().unwrap();
        let manifest = load_manifest(project.path()).unwrap();
        let artifacts = verify_artifacts(project.path(), &ReleaseConfig::default()).unwrap();

        let target = deploy_artifacts(vault.path(), &manifest, &artifacts).unwrap();

        assert_eq!(target, vault.path().join(".obsidian/plugins/sample"));
        assert_eq!(
            fs::read_to_string(target.join("main.js")).unwrap(),
            "module.exports = {};"
        );
        assert!(target.join("manifest.json").is_file());
        assert!(!target.join("styles.css").exists());
    }

    #[test]
    fn deploy_artifacts_requires_plugin_id() {
        let project = project(r#"{"version": "1.0.0", "minAppVersion": "0.15.0"}"#);
        let vault = TempDir::new().unwrap();
        let manifest = load_manifest(project.path()).unwrap();
        let artifacts = verify_artifacts(project.path(), &ReleaseConfig::default()).unwrap();

        let result = deploy_artifacts(vault.path(), &manifest, &artifacts);

        assert!(matches!(result, Err(DeployError::MissingPluginId)));
    }

    #[test]
    fn deploy_artifacts_requires_existing_vault() {
        let project = project(r#"{"id": "sample", "version": "1.0.0", "minAppVersion": "0.15.0"}"#);
        let manifest = load_manifest(project.path()).unwrap();
        let artifacts = verify_artifacts(project.path(), &ReleaseConfig::default()).unwrap();

        let result = deploy_artifacts(Path::new("/nonexistent/vault"), &manifest, &artifacts);

        assert!(matches!(result, Err(DeployError::VaultNotFound(_))));
    }
}
