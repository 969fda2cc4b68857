//! Release preparation workflow
//!
//! A release is planned as an ordered list of [`ReleaseStep`]s which run one
//! after another. The first failing step stops the run; the error names it
//! together with the last step that completed.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use semver::Version;
use thiserror::Error;
use tracing::{info, warn};

use crate::build::{BuildError, build_plugin};
use crate::changelog::{self, ChangelogError};
use crate::config::ReleaseConfig;
use crate::git;
use crate::github::Repository;
use crate::metadata::MetadataStore;
use crate::process::{CommandRunner, ProcessError};
use crate::sync::{SyncError, Synchronizer};

/// What to release and how far to take it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOptions {
    pub root: PathBuf,
    /// `major`, `minor`, `patch` or `X.Y.Z`; `None` keeps the current version
    pub bump: Option<String>,
    /// First release: create CHANGELOG.md instead of updating it
    pub initial: bool,
    /// Repository slug; detected from the `origin` remote when absent
    pub repository: Option<Repository>,
    pub push: bool,
    pub allow_dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStep {
    CheckGitStatus,
    DetectBranch,
    ResolveRepository,
    BumpVersion,
    UpdateChangelog,
    Build,
    Stage,
    Commit,
    Push,
}

impl ReleaseStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStep::CheckGitStatus => "check git status",
            ReleaseStep::DetectBranch => "detect branch",
            ReleaseStep::ResolveRepository => "resolve repository",
            ReleaseStep::BumpVersion => "bump version",
            ReleaseStep::UpdateChangelog => "update changelog",
            ReleaseStep::Build => "build",
            ReleaseStep::Stage => "stage changes",
            ReleaseStep::Commit => "commit",
            ReleaseStep::Push => "push",
        }
    }
}

impl fmt::Display for ReleaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Steps to run for `options`, in order
pub fn plan(options: &ReleaseOptions) -> Vec<ReleaseStep> {
    let mut steps = vec![
        ReleaseStep::CheckGitStatus,
        ReleaseStep::DetectBranch,
        ReleaseStep::ResolveRepository,
        ReleaseStep::BumpVersion,
        ReleaseStep::UpdateChangelog,
        ReleaseStep::Build,
        ReleaseStep::Stage,
        ReleaseStep::Commit,
    ];
    if options.push {
        steps.push(ReleaseStep::Push);
    }
    steps
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error("Working directory has uncommitted changes (use --allow-dirty to continue anyway)")]
    DirtyWorkingTree,

    #[error("Could not detect GitHub repository; pass --repo owner/repo")]
    NoRepository,

    #[error("{0} ran before the version was bumped")]
    VersionNotBumped(ReleaseStep),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// A step that finished, with what it reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedStep {
    pub step: ReleaseStep,
    pub message: String,
}

#[derive(Debug, Error)]
#[error("Release step '{step}' failed ({}): {source}", describe_last(.last_completed))]
pub struct WorkflowError {
    pub step: ReleaseStep,
    pub last_completed: Option<ReleaseStep>,
    pub completed: Vec<CompletedStep>,
    pub source: StepError,
}

fn describe_last(last: &Option<ReleaseStep>) -> String {
    match last {
        Some(step) => format!("last completed step: {}", step),
        None => "no step completed".to_string(),
    }
}

/// Outcome of a full run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub version: Version,
    pub branch: String,
    pub base_branch: String,
    pub repository: Repository,
    pub pushed: bool,
    pub completed: Vec<CompletedStep>,
}

impl fmt::Display for ReleaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for completed in &self.completed {
            writeln!(f, "✓ {}: {}", completed.step, completed.message)?;
        }
        writeln!(f)?;
        writeln!(f, "✅ Release preparation complete!")?;
        writeln!(f)?;
        writeln!(f, "Next steps:")?;
        let mut steps = Vec::new();
        if !self.pushed {
            steps.push("Push the release commit".to_string());
        }
        steps.extend([
            format!("Create PR: {} → {}", self.branch, self.base_branch),
            "Review and merge PR".to_string(),
            format!("Checkout {} and pull", self.base_branch),
            format!("Run the build on {}", self.base_branch),
            format!(
                "Create GitHub Release with tag: {} (no 'v' prefix) in {}",
                self.version, self.repository
            ),
            "Publish release".to_string(),
        ]);
        for (n, step) in steps.iter().enumerate() {
            writeln!(f, "  {}. {}", n + 1, step)?;
        }
        writeln!(f)?;
        write!(
            f,
            "The create_pr and create_release commands automate the PR and release steps."
        )
    }
}

/// Runs the planned steps for one release
pub struct ReleaseWorkflow<'a> {
    options: ReleaseOptions,
    config: &'a ReleaseConfig,
    runner: &'a dyn CommandRunner,
    today: NaiveDate,
    branch: Option<String>,
    repository: Option<Repository>,
    version: Option<Version>,
}

impl<'a> ReleaseWorkflow<'a> {
    pub fn new(
        options: ReleaseOptions,
        config: &'a ReleaseConfig,
        runner: &'a dyn CommandRunner,
        today: NaiveDate,
    ) -> Self {
        Self {
            repository: options.repository.clone(),
            options,
            config,
            runner,
            today,
            branch: None,
            version: None,
        }
    }

    pub async fn run(mut self) -> Result<ReleaseSummary, WorkflowError> {
        let mut completed: Vec<CompletedStep> = Vec::new();

        for step in plan(&self.options) {
            info!("Release step: {}", step);
            match self.run_step(step).await {
                Ok(message) => completed.push(CompletedStep { step, message }),
                Err(source) => {
                    warn!("Release step '{}' failed: {}", step, source);
                    return Err(WorkflowError {
                        step,
                        last_completed: completed.last().map(|c| c.step),
                        completed,
                        source,
                    });
                }
            }
        }

        let (Some(version), Some(repository)) = (self.version, self.repository) else {
            return Err(WorkflowError {
                step: ReleaseStep::BumpVersion,
                last_completed: completed.last().map(|c| c.step),
                completed,
                source: StepError::VersionNotBumped(ReleaseStep::BumpVersion),
            });
        };
        Ok(ReleaseSummary {
            version,
            branch: self.branch.unwrap_or_default(),
            base_branch: self.config.base_branch().to_string(),
            repository,
            pushed: self.options.push,
            completed,
        })
    }

    async fn run_step(&mut self, step: ReleaseStep) -> Result<String, StepError> {
        let root = self.options.root.clone();
        let runner = self.runner;

        match step {
            ReleaseStep::CheckGitStatus => {
                if git::status_is_clean(runner, &root).await? {
                    Ok("Clean".to_string())
                } else if self.options.allow_dirty {
                    warn!("Working directory has uncommitted changes; continuing");
                    Ok("Working directory has uncommitted changes (allowed)".to_string())
                } else {
                    Err(StepError::DirtyWorkingTree)
                }
            }
            ReleaseStep::DetectBranch => {
                let branch = git::current_branch(runner, &root).await?;
                self.branch = Some(branch.clone());
                Ok(format!("Current branch: {}", branch))
            }
            ReleaseStep::ResolveRepository => {
                if self.repository.is_none() {
                    self.repository = match git::remote_repository(runner, &root).await {
                        Ok(repository) => repository,
                        Err(e) => {
                            warn!("Could not read the origin remote: {}", e);
                            None
                        }
                    };
                }
                let repository = self.repository.as_ref().ok_or(StepError::NoRepository)?;
                Ok(format!("Repository: {}", repository))
            }
            ReleaseStep::BumpVersion => {
                let synchronizer = Synchronizer::for_root(&root);
                let spec = match &self.options.bump {
                    Some(spec) => spec.clone(),
                    None => synchronizer
                        .store()
                        .load_manifest()
                        .map_err(SyncError::from)?
                        .version()
                        .to_string(),
                };
                let outcome = synchronizer.bump(&spec)?;
                let message = format!("{} -> {}", outcome.previous, outcome.version);
                self.version = Some(outcome.version);
                Ok(message)
            }
            ReleaseStep::UpdateChangelog => {
                let version = self
                    .version
                    .clone()
                    .ok_or(StepError::VersionNotBumped(step))?;
                let repository = self.repository.as_ref().ok_or(StepError::NoRepository)?;
                let result = if self.options.initial {
                    changelog::create_changelog(&root, &version, repository, self.today)
                        .map(|path| format!("Created {}", path.display()))
                } else {
                    changelog::update_changelog(&root, &version, repository, self.today)
                        .map(|update| format!("Updated {}", update.path.display()))
                };
                // A changelog problem does not block the release.
                Ok(result.unwrap_or_else(|e| {
                    warn!("CHANGELOG update failed: {}", e);
                    format!("CHANGELOG update failed (non-critical): {}", e)
                }))
            }
            ReleaseStep::Build => {
                let artifacts = build_plugin(&root, self.config, runner).await?;
                Ok(format!("Built {}", artifacts.names().join(", ")))
            }
            ReleaseStep::Stage => {
                git::stage_all(runner, &root).await?;
                Ok("Changes staged".to_string())
            }
            ReleaseStep::Commit => {
                let version = self
                    .version
                    .as_ref()
                    .ok_or(StepError::VersionNotBumped(step))?;
                let message = commit_message(version);
                git::commit(runner, &root, &message).await?;
                Ok(format!("Committed: {}", message))
            }
            ReleaseStep::Push => {
                git::push(runner, &root).await?;
                Ok("Pushed to remote".to_string())
            }
        }
    }
}

pub fn commit_message(version: &Version) -> String {
    format!("chore: prepare for v{} release", version)
}
