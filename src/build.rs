//! Build runner and artifact verification

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{PACKAGE_FILE, ReleaseConfig};
use crate::process::{CommandRunner, Invocation, ProcessError, run_checked};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{} not found", .0.display())]
    MissingPackageJson(PathBuf),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("Missing required files: {}", .0.join(", "))]
    MissingArtifacts(Vec<String>),
}

/// A build output found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub required: bool,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name, group_thousands(self.size))
    }
}

/// Artifacts present after a build, required ones first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    pub artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.artifacts.iter().map(|a| a.path.as_path())
    }

    pub fn names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.name.as_str()).collect()
    }
}

impl fmt::Display for ArtifactSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for artifact in &self.artifacts {
            writeln!(f, "✓ {}", artifact)?;
        }
        Ok(())
    }
}

/// Check that every required artifact exists in `root`.
///
/// Optional artifacts are included when present and silently skipped
/// otherwise.
pub fn verify_artifacts(root: &Path, config: &ReleaseConfig) -> Result<ArtifactSet, BuildError> {
    let mut artifacts = Vec::new();
    let mut missing = Vec::new();

    for name in &config.artifacts.required {
        match artifact(root, name, true) {
            Some(found) => artifacts.push(found),
            None => missing.push(name.clone()),
        }
    }

    if !missing.is_empty() {
        warn!("Missing required build artifacts: {:?}", missing);
        return Err(BuildError::MissingArtifacts(missing));
    }

    artifacts.extend(
        config
            .artifacts
            .optional
            .iter()
            .filter_map(|name| artifact(root, name, false)),
    );

    Ok(ArtifactSet { artifacts })
}

fn artifact(root: &Path, name: &str, required: bool) -> Option<Artifact> {
    let path = root.join(name);
    let metadata = fs::metadata(&path).ok().filter(|m| m.is_file())?;
    Some(Artifact {
        name: name.to_string(),
        path,
        size: metadata.len(),
        required,
    })
}

/// Run the configured build command in `root` and verify its artifacts
pub async fn build_plugin(
    root: &Path,
    config: &ReleaseConfig,
    runner: &dyn CommandRunner,
) -> Result<ArtifactSet, BuildError> {
    let package_json = root.join(PACKAGE_FILE);
    if !package_json.is_file() {
        return Err(BuildError::MissingPackageJson(package_json));
    }

    let invocation = build_invocation(root, config);
    info!("Building plugin: {}", invocation.command_line());
    run_checked(runner, &invocation).await?;
    info!("Build completed successfully");

    verify_artifacts(root, config)
}

fn build_invocation(root: &Path, config: &ReleaseConfig) -> Invocation {
    let (program, args) = config
        .build
        .command
        .split_first()
        .map(|(program, args)| (program.as_str(), args.to_vec()))
        .unwrap_or(("npm", vec!["run".to_string(), "build".to_string()]));

    Invocation::new(program, args, root).with_timeout(config.build.timeout())
}

/// Format a byte count with `,` thousands separators
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
