//! Release automation for Obsidian plugins.
//!
//! The core is the version synchronizer ([`sync`]), which keeps
//! `manifest.json`, `package.json` and `versions.json` consistent across a
//! semantic-version bump. Around it sit thin adapters over the build
//! command, CHANGELOG.md, `git` and the GitHub CLI.

pub mod build;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod git;
pub mod github;
pub mod logging;
pub mod metadata;
pub mod process;
pub mod sync;
pub mod version;
pub mod workflow;
