//! Loading and persisting the three metadata records of a project root

use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{MANIFEST_FILE, PACKAGE_FILE, VERSIONS_FILE};
use crate::metadata::error::MetadataError;
use crate::metadata::history::VersionHistory;
use crate::metadata::json::{Indent, read_record, write_record};
use crate::metadata::manifest::ManifestRecord;
use crate::metadata::package::PackageRecord;

/// Trait for reading and writing the metadata records
#[cfg_attr(test, automock)]
pub trait MetadataStore {
    fn manifest_path(&self) -> PathBuf;

    fn package_path(&self) -> PathBuf;

    fn history_path(&self) -> PathBuf;

    /// Load manifest.json; absence is an error
    fn load_manifest(&self) -> Result<ManifestRecord, MetadataError>;

    /// Load package.json; absence yields `None`
    fn load_package(&self) -> Result<Option<PackageRecord>, MetadataError>;

    /// Load versions.json; absence is an error
    fn load_version_history(&self) -> Result<VersionHistory, MetadataError>;

    fn save_manifest(&self, record: &ManifestRecord) -> Result<(), MetadataError>;

    fn save_package(&self, record: &PackageRecord) -> Result<(), MetadataError>;

    fn save_version_history(&self, history: &VersionHistory) -> Result<(), MetadataError>;
}

/// Metadata store backed by the JSON files in a project root
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MetadataStore for JsonFileStore {
    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    fn package_path(&self) -> PathBuf {
        self.root.join(PACKAGE_FILE)
    }

    fn history_path(&self) -> PathBuf {
        self.root.join(VERSIONS_FILE)
    }

    fn load_manifest(&self) -> Result<ManifestRecord, MetadataError> {
        load_manifest(&self.root)
    }

    fn load_package(&self) -> Result<Option<PackageRecord>, MetadataError> {
        load_package(&self.root)
    }

    fn load_version_history(&self) -> Result<VersionHistory, MetadataError> {
        load_version_history(&self.root)
    }

    fn save_manifest(&self, record: &ManifestRecord) -> Result<(), MetadataError> {
        save_manifest(&self.root, record)
    }

    fn save_package(&self, record: &PackageRecord) -> Result<(), MetadataError> {
        save_package(&self.root, record)
    }

    fn save_version_history(&self, history: &VersionHistory) -> Result<(), MetadataError> {
        save_version_history(&self.root, history)
    }
}

pub fn load_manifest(root: &Path) -> Result<ManifestRecord, MetadataError> {
    let path = root.join(MANIFEST_FILE);
    let document: Map<String, Value> =
        read_record(&path)?.ok_or_else(|| MetadataError::MissingFile(path.clone()))?;
    let record = ManifestRecord::from_document(document, &path)?;
    debug!(
        "Loaded {}: version {}, minAppVersion {}",
        path.display(),
        record.version(),
        record.min_app_version()
    );
    Ok(record)
}

pub fn load_package(root: &Path) -> Result<Option<PackageRecord>, MetadataError> {
    let path = root.join(PACKAGE_FILE);
    let document: Option<Map<String, Value>> = read_record(&path)?;
    if document.is_none() {
        debug!("{} not present", path.display());
    }
    Ok(document.map(PackageRecord::from_document))
}

pub fn load_version_history(root: &Path) -> Result<VersionHistory, MetadataError> {
    let path = root.join(VERSIONS_FILE);
    let history: VersionHistory =
        read_record(&path)?.ok_or_else(|| MetadataError::MissingFile(path.clone()))?;
    debug!("Loaded {} with {} entries", path.display(), history.len());
    Ok(history)
}

pub fn save_manifest(root: &Path, record: &ManifestRecord) -> Result<(), MetadataError> {
    write_record(&root.join(MANIFEST_FILE), record.document(), Indent::Tab)
}

pub fn save_package(root: &Path, record: &PackageRecord) -> Result<(), MetadataError> {
    write_record(&root.join(PACKAGE_FILE), record.document(), Indent::TwoSpaces)
}

pub fn save_version_history(root: &Path, history: &VersionHistory) -> Result<(), MetadataError> {
    write_record(&root.join(VERSIONS_FILE), history, Indent::Tab)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_manifest_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_manifest(temp_dir.path());

        assert!(
            matches!(result, Err(MetadataError::MissingFile(path)) if path.ends_with(MANIFEST_FILE))
        );
    }

    #[test]
    fn load_manifest_reports_non_object_as_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(MANIFEST_FILE), "[\"1.0.0\"]").unwrap();

        let result = load_manifest(temp_dir.path());

        assert!(matches!(result, Err(MetadataError::CorruptRecord { .. })));
    }

    #[test]
    fn load_package_returns_none_when_absent() {
        let temp_dir = TempDir::new().unwrap();

        assert!(load_package(temp_dir.path()).unwrap().is_none());
    }

    #[test]
    fn load_version_history_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_version_history(temp_dir.path());

        assert!(matches!(result, Err(MetadataError::MissingFile(_))));
    }

    #[test]
    fn save_manifest_writes_tab_indented_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(MANIFEST_FILE),
            r#"{"id": "sample", "version": "1.0.0", "minAppVersion": "0.15.0"}"#,
        )
        .unwrap();

        let record = load_manifest(temp_dir.path()).unwrap();
        save_manifest(temp_dir.path(), &record).unwrap();

        let written = fs::read_to_string(temp_dir.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(
            written,
            "{\n\t\"id\": \"sample\",\n\t\"version\": \"1.0.0\",\n\t\"minAppVersion\": \"0.15.0\"\n}\n"
        );
    }

    #[test]
    fn save_package_writes_two_space_indented_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(PACKAGE_FILE),
            r#"{"name": "sample", "version": "1.0.0"}"#,
        )
        .unwrap();

        let record = load_package(temp_dir.path()).unwrap().unwrap();
        save_package(temp_dir.path(), &record).unwrap();

        let written = fs::read_to_string(temp_dir.path().join(PACKAGE_FILE)).unwrap();
        assert_eq!(
            written,
            "{\n  \"name\": \"sample\",\n  \"version\": \"1.0.0\"\n}\n"
        );
    }
}
