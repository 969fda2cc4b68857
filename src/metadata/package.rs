//! package.json record

use semver::Version;
use serde_json::{Map, Value};

use crate::metadata::manifest::VERSION_FIELD;

/// The npm package record. Only `version` is read or written.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRecord {
    document: Map<String, Value>,
}

impl PackageRecord {
    pub fn from_document(document: Map<String, Value>) -> Self {
        Self { document }
    }

    /// The version text as stored, which may not be a valid version at all
    pub fn version(&self) -> Option<&str> {
        self.document.get(VERSION_FIELD).and_then(Value::as_str)
    }

    pub fn set_version(&mut self, version: &Version) {
        self.document
            .insert(VERSION_FIELD.to_string(), Value::String(version.to_string()));
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }
}
