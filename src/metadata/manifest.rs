//! manifest.json record

use std::path::Path;

use semver::Version;
use serde_json::{Map, Value};

use crate::metadata::error::MetadataError;
use crate::version::parse_version;

pub const VERSION_FIELD: &str = "version";
pub const MIN_APP_VERSION_FIELD: &str = "minAppVersion";
const ID_FIELD: &str = "id";

/// The plugin's primary metadata record.
///
/// Keeps the whole JSON object so that fields other than `version` are
/// written back exactly as they were read, in their original order.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRecord {
    document: Map<String, Value>,
    version: Version,
    min_app_version: String,
}

impl ManifestRecord {
    /// Build a record from a parsed JSON object read from `path`
    pub fn from_document(document: Map<String, Value>, path: &Path) -> Result<Self, MetadataError> {
        let version_text = string_field(&document, VERSION_FIELD, path)?;
        let version = parse_version(version_text).map_err(|source| {
            MetadataError::MalformedVersion {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let min_app_version = string_field(&document, MIN_APP_VERSION_FIELD, path)?.to_string();

        Ok(Self {
            document,
            version,
            min_app_version,
        })
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Minimum host application version, passed through verbatim
    pub fn min_app_version(&self) -> &str {
        &self.min_app_version
    }

    /// Plugin identifier (`id` field), if the manifest declares one
    pub fn plugin_id(&self) -> Option<&str> {
        self.document.get(ID_FIELD).and_then(Value::as_str)
    }

    /// Replace the version, leaving every other field untouched
    pub fn set_version(&mut self, version: Version) {
        self.document
            .insert(VERSION_FIELD.to_string(), Value::String(version.to_string()));
        self.version = version;
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }
}

fn string_field<'a>(
    document: &'a Map<String, Value>,
    field: &'static str,
    path: &Path,
) -> Result<&'a str, MetadataError> {
    document
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| MetadataError::MissingField {
            path: path.to_path_buf(),
            field,
        })
}
