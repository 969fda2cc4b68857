//! Version synchronizer
//!
//! Keeps manifest.json, package.json and versions.json consistent under a
//! version bump, and checks their consistency without touching them.
//!
//! A bump is not transactional: files are written one after another and a
//! failure part-way leaves earlier files updated. The error reports which
//! files were written so they can be reconciled by hand.

pub mod error;
pub mod report;

use std::path::PathBuf;

use tracing::{info, warn};

use crate::metadata::{JsonFileStore, MetadataStore};
use crate::version::BumpSpec;

pub use error::{BumpStep, SyncError};
pub use report::{BumpOutcome, CheckFinding, CheckKind, CheckOutcome, CheckReport, CheckStatus};

pub struct Synchronizer<S: MetadataStore> {
    store: S,
}

impl Synchronizer<JsonFileStore> {
    /// Synchronizer over the JSON files in `root`
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self::new(JsonFileStore::new(root))
    }
}

impl<S: MetadataStore> Synchronizer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Advance the project version according to `spec`.
    ///
    /// `spec` is `major`, `minor`, `patch` or an explicit `X.Y.Z` version.
    /// Nothing is written unless the manifest loads and the spec resolves.
    pub fn bump(&self, spec: &str) -> Result<BumpOutcome, SyncError> {
        let mut manifest = self.store.load_manifest()?;
        let previous = manifest.version().clone();
        let version = spec.parse::<BumpSpec>()?.resolve(&previous)?;
        let min_app_version = manifest.min_app_version().to_string();

        info!("Bumping version {} -> {} ({})", previous, version, spec);

        let mut written = Vec::new();
        let mut warnings = Vec::new();

        manifest.set_version(version.clone());
        self.store
            .save_manifest(&manifest)
            .map_err(|source| bump_failure(BumpStep::WriteManifest, &written, source))?;
        written.push(self.store.manifest_path());

        let package = self
            .store
            .load_package()
            .map_err(|source| bump_failure(BumpStep::WritePackage, &written, source))?;
        let package_updated = match package {
            Some(mut package) => {
                package.set_version(&version);
                self.store
                    .save_package(&package)
                    .map_err(|source| bump_failure(BumpStep::WritePackage, &written, source))?;
                written.push(self.store.package_path());
                true
            }
            None => {
                warn!(
                    "{} not found, skipping",
                    self.store.package_path().display()
                );
                warnings.push("package.json not found (skipped)".to_string());
                false
            }
        };

        let mut history = self
            .store
            .load_version_history()
            .map_err(|source| bump_failure(BumpStep::LoadHistory, &written, source))?;
        let previous_entry_removed = history.record_release(&previous, &version, &min_app_version);
        self.store
            .save_version_history(&history)
            .map_err(|source| bump_failure(BumpStep::WriteHistory, &written, source))?;
        written.push(self.store.history_path());

        info!("Version bumped to {}", version);

        Ok(BumpOutcome {
            previous,
            version,
            min_app_version,
            updated: written,
            package_updated,
            previous_entry_removed,
            warnings,
        })
    }

    /// Compare package.json and versions.json against the manifest
    pub fn check(&self) -> Result<CheckReport, SyncError> {
        let manifest = self.store.load_manifest()?;
        let package = self.store.load_package()?;
        let history = self.store.load_version_history()?;

        let expected = manifest.version().to_string();
        let mut checks = vec![CheckOutcome {
            kind: CheckKind::ManifestVersion,
            status: CheckStatus::Passed(format!("manifest.json version: {}", expected)),
        }];

        let package_status = match &package {
            None => CheckStatus::Skipped("package.json not found (optional)".to_string()),
            Some(package) if package.version() == Some(expected.as_str()) => {
                CheckStatus::Passed(format!("package.json version: {}", expected))
            }
            Some(package) => CheckStatus::Failed(CheckFinding::VersionMismatch {
                file: "package.json",
                expected: expected.clone(),
                found: package.version().map(str::to_string),
            }),
        };
        checks.push(CheckOutcome {
            kind: CheckKind::PackageVersion,
            status: package_status,
        });

        let history_status = match history.get(&expected) {
            None => CheckStatus::Failed(CheckFinding::MissingHistoryEntry {
                version: expected.clone(),
            }),
            Some(found) if found == manifest.min_app_version() => {
                CheckStatus::Passed(format!("versions.json entry: {} -> {}", expected, found))
            }
            Some(found) => CheckStatus::Failed(CheckFinding::HistoryMismatch {
                version: expected.clone(),
                expected: manifest.min_app_version().to_string(),
                found: found.to_string(),
            }),
        };
        checks.push(CheckOutcome {
            kind: CheckKind::HistoryEntry,
            status: history_status,
        });

        let report = CheckReport {
            manifest_version: manifest.version().clone(),
            checks,
        };
        for finding in report.findings() {
            warn!("Inconsistent version metadata: {}", finding);
        }
        Ok(report)
    }
}

fn bump_failure(
    step: BumpStep,
    written: &[PathBuf],
    source: crate::metadata::MetadataError,
) -> SyncError {
    warn!(
        "Bump aborted while {}; {} file(s) already updated",
        step,
        written.len()
    );
    SyncError::Bump {
        step,
        written: written.to_vec(),
        source,
    }
}
