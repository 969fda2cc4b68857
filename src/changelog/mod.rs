//! CHANGELOG.md creation and update
//!
//! - template.rs: text of new changelogs and release sections
//! - sections.rs: header classification, insertion point, section extraction

pub mod sections;
pub mod template;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use semver::Version;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::CHANGELOG_FILE;
use crate::github::Repository;

/// Previous version assumed when the changelog names none
pub const FALLBACK_PREVIOUS_VERSION: &str = "0.0.0";

#[derive(Debug, Error)]
pub enum ChangelogError {
    #[error("{} already exists. Use update mode instead.", .0.display())]
    AlreadyExists(PathBuf),

    #[error("{} not found. Use create mode instead.", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to {action} {}: {source}", path.display())]
    Io {
        path: PathBuf,
        action: &'static str,
        source: std::io::Error,
    },
}

/// Whether to start a new changelog or add a section to an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ChangelogMode {
    Create,
    Update,
}

/// Result of adding a release section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogUpdate {
    pub path: PathBuf,
    /// Version the comparison link points from
    pub previous_version: String,
    /// False when no release section existed and the fallback was used
    pub previous_detected: bool,
}

/// Create CHANGELOG.md in `root` with a first section for `version`
pub fn create_changelog(
    root: &Path,
    version: &Version,
    repo: &Repository,
    date: NaiveDate,
) -> Result<PathBuf, ChangelogError> {
    let path = root.join(CHANGELOG_FILE);
    if path.exists() {
        return Err(ChangelogError::AlreadyExists(path));
    }

    let content = template::initial_changelog(version, date, repo);
    fs::write(&path, content).map_err(|source| ChangelogError::Io {
        path: path.clone(),
        action: "write",
        source,
    })?;

    info!("Created {} with version {}", path.display(), version);
    Ok(path)
}

/// Add a section for `version` to the existing CHANGELOG.md in `root`
pub fn update_changelog(
    root: &Path,
    version: &Version,
    repo: &Repository,
    date: NaiveDate,
) -> Result<ChangelogUpdate, ChangelogError> {
    let path = root.join(CHANGELOG_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ChangelogError::NotFound(path));
        }
        Err(source) => {
            return Err(ChangelogError::Io {
                path,
                action: "read",
                source,
            });
        }
    };

    let detected = sections::previous_version(&content);
    if detected.is_none() {
        warn!(
            "Could not detect previous version from {}, using {}",
            path.display(),
            FALLBACK_PREVIOUS_VERSION
        );
    }
    let previous_version = detected.unwrap_or(FALLBACK_PREVIOUS_VERSION).to_string();

    let entry = template::release_entry(version, &previous_version, date, repo);
    let updated = sections::insert_entry(&content, &entry);
    fs::write(&path, updated).map_err(|source| ChangelogError::Io {
        path: path.clone(),
        action: "write",
        source,
    })?;

    info!(
        "Updated {} with version {} (previous {})",
        path.display(),
        version,
        previous_version
    );
    Ok(ChangelogUpdate {
        path,
        previous_version,
        previous_detected: detected.is_some(),
    })
}

/// Release notes recorded for `version`, if CHANGELOG.md exists and has them
pub fn read_section(root: &Path, version: &Version) -> Option<String> {
    let content = fs::read_to_string(root.join(CHANGELOG_FILE)).ok()?;
    sections::section_for(&content, &version.to_string()).filter(|body| !body.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
    }

    fn repo() -> Repository {
        "octo/sample-plugin".parse().unwrap()
    }

    #[test]
    fn create_changelog_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CHANGELOG_FILE), "# Changelog\n").unwrap();

        let result = create_changelog(temp_dir.path(), &Version::new(1, 0, 0), &repo(), date());

        assert!(matches!(result, Err(ChangelogError::AlreadyExists(_))));
        assert_eq!(
            fs::read_to_string(temp_dir.path().join(CHANGELOG_FILE)).unwrap(),
            "# Changelog\n"
        );
    }

    #[test]
    fn update_changelog_requires_existing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = update_changelog(temp_dir.path(), &Version::new(1, 1, 0), &repo(), date());

        assert!(matches!(result, Err(ChangelogError::NotFound(_))));
    }

    #[test]
    fn update_after_create_links_to_previous_release() {
        let temp_dir = TempDir::new().unwrap();
        create_changelog(temp_dir.path(), &Version::new(1, 0, 0), &repo(), date()).unwrap();

        let update =
            update_changelog(temp_dir.path(), &Version::new(1, 1, 0), &repo(), date()).unwrap();

        assert_eq!(update.previous_version, "1.0.0");
        assert!(update.previous_detected);

        let content = fs::read_to_string(&update.path).unwrap();
        let new_section = content.find("## [1.1.0] - 2026-05-01").unwrap();
        let old_section = content.find("## [1.0.0] - 2026-05-01").unwrap();
        assert!(new_section < old_section);
        assert!(content.contains("compare/1.0.0...1.1.0"));
    }

    #[test]
    fn update_falls_back_when_no_release_section_exists() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CHANGELOG_FILE), "# Changelog\n").unwrap();

        let update =
            update_changelog(temp_dir.path(), &Version::new(0, 1, 0), &repo(), date()).unwrap();

        assert_eq!(update.previous_version, FALLBACK_PREVIOUS_VERSION);
        assert!(!update.previous_detected);
    }

    #[test]
    fn read_section_returns_notes_for_version() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CHANGELOG_FILE),
            "# Changelog\n\n## [1.0.0] - 2026-01-01\n\n### Fixed\n- Crash on load\n",
        )
        .unwrap();

        assert_eq!(
            read_section(temp_dir.path(), &Version::new(1, 0, 0)).as_deref(),
            Some("### Fixed\n- Crash on load")
        );
        assert_eq!(read_section(temp_dir.path(), &Version::new(2, 0, 0)), None);
    }
}
