//! Pull request and release creation through the GitHub CLI (`gh`)

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use semver::Version;
use thiserror::Error;
use tracing::info;

use crate::build::{ArtifactSet, BuildError};
use crate::process::{CommandRunner, Invocation, ProcessError, run_checked};

const GH: &str = "gh";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error(
        "GitHub CLI (gh) is not installed or not authenticated\n\n\
         To install gh:\n  https://cli.github.com/\n\n\
         To authenticate:\n  gh auth login"
    )]
    NotAuthenticated,

    #[error("Invalid repository format: {0} (expected owner/repo)")]
    InvalidRepository(String),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Artifacts(#[from] BuildError),
}

/// A GitHub repository slug, `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for Repository {
    type Err = GitHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Repository::new(owner, name))
            }
            _ => Err(GitHubError::InvalidRepository(s.to_string())),
        }
    }
}

/// Fail unless `gh` is installed and logged in
pub async fn ensure_authenticated(
    runner: &dyn CommandRunner,
    root: &Path,
) -> Result<(), GitHubError> {
    let invocation = Invocation::new(GH, ["auth", "status"], root);
    match runner.run(&invocation).await {
        Ok(output) if output.success() => Ok(()),
        Ok(_) | Err(ProcessError::NotFound { .. }) => Err(GitHubError::NotAuthenticated),
        Err(e) => Err(e.into()),
    }
}

pub fn pr_title(version: &Version) -> String {
    format!("Release v{}", version)
}

pub fn pr_body(version: &Version, artifact_names: &[String]) -> String {
    format!(
        "## Release v{version}

This PR prepares the release for version {version}.

### Changes

See CHANGELOG.md for detailed changes.

### Release Checklist

- [ ] Version numbers updated in manifest.json, package.json, versions.json
- [ ] CHANGELOG.md updated with release notes
- [ ] Build completes without errors
- [ ] Manual testing completed

### Post-Merge Steps

After merging this PR:

1. Checkout main branch and pull latest changes
2. Run the build to generate release artifacts
3. Create GitHub Release with tag `{version}` (no 'v' prefix)
4. Attach build artifacts: {artifacts}
5. Publish the release
",
        artifacts = artifact_names
            .iter()
            .map(|name| format!("`{}`", name))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Open a pull request from `from_branch` into `to_branch`.
///
/// Returns the PR URL printed by `gh`.
pub async fn create_pr(
    runner: &dyn CommandRunner,
    root: &Path,
    from_branch: &str,
    to_branch: &str,
    version: &Version,
    artifact_names: &[String],
) -> Result<String, GitHubError> {
    let invocation = Invocation::new(
        GH,
        [
            "pr".to_string(),
            "create".to_string(),
            "--base".to_string(),
            to_branch.to_string(),
            "--head".to_string(),
            from_branch.to_string(),
            "--title".to_string(),
            pr_title(version),
            "--body".to_string(),
            pr_body(version, artifact_names),
        ],
        root,
    );

    info!("Creating PR {} -> {} for {}", from_branch, to_branch, version);
    let output = run_checked(runner, &invocation).await?;
    Ok(output.stdout.trim().to_string())
}

/// Release notes: the changelog section when available, then install steps
pub fn release_notes(
    version: &Version,
    plugin_id: &str,
    artifact_names: &[&str],
    changelog_section: Option<&str>,
) -> String {
    let summary = changelog_section.unwrap_or("See full changelog at CHANGELOG.md");
    let files = artifact_names
        .iter()
        .map(|name| format!("`{}`", name))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "# Release v{version}

{summary}

## Installation

### Via BRAT
1. Install [BRAT plugin](https://github.com/TfTHacker/obsidian42-brat)
2. Add this repository URL in BRAT settings
3. BRAT will auto-update to this version

### Manual
1. Download the attached files: {files}
2. Place them in: `<VaultFolder>/.obsidian/plugins/{plugin_id}/`
3. Restart Obsidian and enable the plugin
"
    )
}

/// Options for a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest<'a> {
    pub version: &'a Version,
    pub notes: String,
    /// Publish immediately instead of creating a draft
    pub publish: bool,
}

/// Create a release tagged `version` (no `v` prefix) with `artifacts` attached.
///
/// Returns the release URL printed by `gh`.
pub async fn create_release(
    runner: &dyn CommandRunner,
    root: &Path,
    request: &ReleaseRequest<'_>,
    artifacts: &ArtifactSet,
) -> Result<String, GitHubError> {
    let mut args = vec![
        "release".to_string(),
        "create".to_string(),
        request.version.to_string(),
        "--title".to_string(),
        format!("v{}", request.version),
        "--notes".to_string(),
        request.notes.clone(),
    ];
    if !request.publish {
        args.push("--draft".to_string());
    }
    args.extend(artifacts.paths().map(|path| path.display().to_string()));

    info!(
        "Creating {}release {}",
        if request.publish { "" } else { "draft " },
        request.version
    );
    let output = run_checked(runner, &Invocation::new(GH, args, root)).await?;
    Ok(output.stdout.trim().to_string())
}
