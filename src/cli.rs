//! Command-line surface of the `plugin-release` binary

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use semver::Version;
use tracing::debug;

use crate::build::{build_plugin, verify_artifacts};
use crate::changelog::{self, ChangelogMode};
use crate::config::ReleaseConfig;
use crate::deploy::{DeployError, deploy_artifacts};
use crate::github::{self, ReleaseRequest, Repository};
use crate::metadata::store::load_manifest;
use crate::process::SystemRunner;
use crate::sync::Synchronizer;
use crate::version::parse_version;
use crate::workflow::{ReleaseOptions, ReleaseWorkflow};

/// Plugin id used in install instructions when manifest.json has none
const FALLBACK_PLUGIN_ID: &str = "plugin";

#[derive(Debug, Parser)]
#[command(name = "plugin-release")]
#[command(version, about = "Release automation for Obsidian plugins")]
pub struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Bump the version in manifest.json, package.json and versions.json
    Bump {
        /// major, minor, patch or an explicit X.Y.Z version
        spec: String,
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Check that the version files agree
    Check {
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Run the build and verify its artifacts
    Build {
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Create CHANGELOG.md or add a release section to it
    Changelog {
        #[arg(value_enum)]
        mode: ChangelogMode,
        #[arg(value_parser = parse_version)]
        version: Version,
        /// GitHub repository as owner/repo
        repo: Repository,
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Open a release pull request with the GitHub CLI
    #[command(name = "create_pr", alias = "create-pr")]
    CreatePr {
        from_branch: String,
        to_branch: String,
        #[arg(value_parser = parse_version)]
        version: Version,
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Create a GitHub release with the build artifacts attached
    #[command(name = "create_release", alias = "create-release")]
    CreateRelease {
        #[arg(value_parser = parse_version)]
        version: Version,
        /// Publish immediately instead of creating a draft
        #[arg(long)]
        publish: bool,
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Prepare a release: bump, changelog, build, commit
    Release {
        /// major, minor, patch or an explicit X.Y.Z version
        #[arg(long, required_unless_present = "initial")]
        bump: Option<String>,
        /// First release: create CHANGELOG.md
        #[arg(long)]
        initial: bool,
        /// GitHub repository as owner/repo (default: origin remote)
        #[arg(long)]
        repo: Option<Repository>,
        /// Push the release commit
        #[arg(long)]
        push: bool,
        /// Continue with uncommitted changes in the working tree
        #[arg(long)]
        allow_dirty: bool,
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Copy the build artifacts into a test vault
    Deploy {
        /// Vault directory (default: "vault" in plugin-release.json)
        #[arg(long)]
        vault: Option<PathBuf>,
        /// Deploy the existing artifacts without building
        #[arg(long)]
        skip_build: bool,
        #[arg(default_value = ".")]
        root: PathBuf,
    },
}

/// Run `command`, printing its report to stdout
pub async fn run(command: Command) -> anyhow::Result<ExitCode> {
    debug!("Running {:?}", command);

    match command {
        Command::Bump { spec, root } => {
            let outcome = Synchronizer::for_root(&root).bump(&spec)?;
            println!("{}", outcome);
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { root } => {
            let report = Synchronizer::for_root(&root).check()?;
            println!("{}", report);
            Ok(if report.is_consistent() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Build { root } => {
            let config = ReleaseConfig::load(&root)?;
            let artifacts = build_plugin(&root, &config, &SystemRunner).await?;
            println!("✅ Build successful!\n");
            print!("{}", artifacts);
            Ok(ExitCode::SUCCESS)
        }
        Command::Changelog {
            mode,
            version,
            repo,
            root,
        } => {
            let today = chrono::Local::now().date_naive();
            match mode {
                ChangelogMode::Create => {
                    let path = changelog::create_changelog(&root, &version, &repo, today)?;
                    println!("✅ Created {} with version {}", path.display(), version);
                }
                ChangelogMode::Update => {
                    let update = changelog::update_changelog(&root, &version, &repo, today)?;
                    if !update.previous_detected {
                        println!(
                            "⚠️  Could not detect previous version, using {}",
                            update.previous_version
                        );
                    }
                    println!(
                        "✅ Updated {} with version {}",
                        update.path.display(),
                        version
                    );
                }
            }
            println!("\n⚠️  Remember to fill in the changelog sections before releasing!");
            Ok(ExitCode::SUCCESS)
        }
        Command::CreatePr {
            from_branch,
            to_branch,
            version,
            root,
        } => {
            github::ensure_authenticated(&SystemRunner, &root).await?;
            let config = ReleaseConfig::load(&root)?;
            let artifact_names = config
                .artifacts
                .required
                .iter()
                .chain(&config.artifacts.optional)
                .cloned()
                .collect::<Vec<_>>();
            let url = github::create_pr(
                &SystemRunner,
                &root,
                &from_branch,
                &to_branch,
                &version,
                &artifact_names,
            )
            .await?;
            println!("✅ Pull request created successfully!\n{}", url);
            Ok(ExitCode::SUCCESS)
        }
        Command::CreateRelease {
            version,
            publish,
            root,
        } => create_release(&root, &version, publish).await,
        Command::Release {
            bump,
            initial,
            repo,
            push,
            allow_dirty,
            root,
        } => {
            let config = ReleaseConfig::load(&root)?;
            let options = ReleaseOptions {
                root,
                bump,
                initial,
                repository: repo,
                push,
                allow_dirty,
            };
            let today = chrono::Local::now().date_naive();
            match ReleaseWorkflow::new(options, &config, &SystemRunner, today)
                .run()
                .await
            {
                Ok(summary) => {
                    println!("{}", summary);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    for completed in &e.completed {
                        println!("✓ {}: {}", completed.step, completed.message);
                    }
                    Err(e.into())
                }
            }
        }
        Command::Deploy {
            vault,
            skip_build,
            root,
        } => {
            let config = ReleaseConfig::load(&root)?;
            let vault = vault
                .or_else(|| config.vault.clone())
                .ok_or(DeployError::NoVault)?;
            let artifacts = if skip_build {
                verify_artifacts(&root, &config).map_err(DeployError::from)?
            } else {
                build_plugin(&root, &config, &SystemRunner)
                    .await
                    .map_err(DeployError::from)?
            };
            let manifest = load_manifest(&root).map_err(DeployError::from)?;
            let target = deploy_artifacts(&vault, &manifest, &artifacts)?;
            print!("{}", artifacts);
            println!("\n✅ Deployed to {}", target.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn create_release(
    root: &Path,
    version: &Version,
    publish: bool,
) -> anyhow::Result<ExitCode> {
    github::ensure_authenticated(&SystemRunner, root).await?;
    let config = ReleaseConfig::load(root)?;
    let artifacts = verify_artifacts(root, &config).context("Cannot create release")?;

    let manifest = load_manifest(root).ok();
    let plugin_id = manifest
        .as_ref()
        .and_then(|m| m.plugin_id())
        .unwrap_or(FALLBACK_PLUGIN_ID);
    let section = changelog::read_section(root, version);
    let notes = github::release_notes(version, plugin_id, &artifacts.names(), section.as_deref());

    let request = ReleaseRequest {
        version,
        notes,
        publish,
    };
    let url = github::create_release(&SystemRunner, root, &request, &artifacts).await?;

    print!("{}", artifacts);
    println!("\n✅ GitHub Release {} created successfully!\n{}", version, url);
    if !publish {
        println!(
            "\n⚠️  Release created as DRAFT. Review it, then publish with:\n  \
             gh release edit {} --draft=false",
            version
        );
    }
    Ok(ExitCode::SUCCESS)
}
