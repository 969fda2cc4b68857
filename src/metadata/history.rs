//! versions.json record

use indexmap::IndexMap;
use semver::Version;
use serde::{Deserialize, Serialize};

/// Ledger of which minimum host version was in effect for each release.
///
/// Keys keep the order they have in the file; a newly recorded version is
/// appended at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionHistory {
    entries: IndexMap<String, String>,
}

impl VersionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum host version recorded for `version`
    pub fn get(&self, version: &str) -> Option<&str> {
        self.entries.get(version).map(String::as_str)
    }

    pub fn contains(&self, version: &str) -> bool {
        self.entries.contains_key(version)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn insert(&mut self, version: impl Into<String>, min_app_version: impl Into<String>) {
        self.entries.insert(version.into(), min_app_version.into());
    }

    /// Replace the entry of `previous` with an entry for `new`.
    ///
    /// Only the entry keyed by `previous` is pruned; older entries stay.
    /// Returns true if an entry for `previous` existed.
    pub fn record_release(
        &mut self,
        previous: &Version,
        new: &Version,
        min_app_version: &str,
    ) -> bool {
        let removed = self.entries.shift_remove(&previous.to_string()).is_some();
        self.entries
            .insert(new.to_string(), min_app_version.to_string());
        removed
    }
}
