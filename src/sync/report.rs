//! Outcomes of bump and check operations

use std::fmt;
use std::path::PathBuf;

use semver::Version;

/// Result of a successful bump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpOutcome {
    pub previous: Version,
    pub version: Version,
    pub min_app_version: String,
    /// Files rewritten with the new version, in write order
    pub updated: Vec<PathBuf>,
    pub package_updated: bool,
    /// Whether versions.json held an entry for the previous version
    pub previous_entry_removed: bool,
    pub warnings: Vec<String>,
}

impl fmt::Display for BumpOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "✓ Updated manifest.json: {} -> {}",
            self.previous, self.version
        )?;
        if self.package_updated {
            writeln!(
                f,
                "✓ Updated package.json: {} -> {}",
                self.previous, self.version
            )?;
        }
        for warning in &self.warnings {
            writeln!(f, "⚠️  {}", warning)?;
        }
        writeln!(
            f,
            "✓ Updated versions.json: {} -> {}",
            self.version, self.min_app_version
        )?;
        write!(f, "\n✅ Version bumped successfully to {}", self.version)
    }
}

/// Inconsistency found by a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckFinding {
    /// A secondary record carries a different version than the manifest
    VersionMismatch {
        file: &'static str,
        expected: String,
        found: Option<String>,
    },
    /// versions.json has no entry for the manifest version
    MissingHistoryEntry { version: String },
    /// versions.json maps the manifest version to another minAppVersion
    HistoryMismatch {
        version: String,
        expected: String,
        found: String,
    },
}

impl fmt::Display for CheckFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckFinding::VersionMismatch {
                file,
                expected,
                found,
            } => write!(
                f,
                "{} version ({}) differs from manifest.json ({})",
                file,
                found.as_deref().unwrap_or("missing"),
                expected
            ),
            CheckFinding::MissingHistoryEntry { version } => {
                write!(f, "No entry for version {} in versions.json", version)
            }
            CheckFinding::HistoryMismatch {
                version,
                expected,
                found,
            } => write!(
                f,
                "versions.json entry for {} ({}) differs from manifest.json minAppVersion ({})",
                version, found, expected
            ),
        }
    }
}

/// Which consistency rule a check covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    ManifestVersion,
    PackageVersion,
    HistoryEntry,
}

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Passed(String),
    Failed(CheckFinding),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub kind: CheckKind,
    pub status: CheckStatus,
}

/// Every check performed against a project and its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub manifest_version: Version,
    pub checks: Vec<CheckOutcome>,
}

impl CheckReport {
    pub fn findings(&self) -> impl Iterator<Item = &CheckFinding> {
        self.checks.iter().filter_map(|check| match &check.status {
            CheckStatus::Failed(finding) => Some(finding),
            _ => None,
        })
    }

    /// True when no check failed. Skipped checks do not count as failures.
    pub fn is_consistent(&self) -> bool {
        self.findings().next().is_none()
    }

    pub fn status_of(&self, kind: CheckKind) -> Option<&CheckStatus> {
        self.checks
            .iter()
            .find(|check| check.kind == kind)
            .map(|check| &check.status)
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            match &check.status {
                CheckStatus::Passed(detail) => writeln!(f, "✓ {}", detail)?,
                CheckStatus::Failed(finding) => writeln!(f, "❌ {}", finding)?,
                CheckStatus::Skipped(reason) => writeln!(f, "⚠️  {}", reason)?,
            }
        }
        if self.is_consistent() {
            write!(f, "\n✅ All version files are consistent")
        } else {
            write!(f, "\n❌ Version files are inconsistent")
        }
    }
}
