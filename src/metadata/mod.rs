//! Metadata store adapter
//!
//! Reads and writes the three JSON records that carry a plugin's version:
//!
//! - `manifest.json` ([`ManifestRecord`]): `version` and `minAppVersion`
//! - `package.json` ([`PackageRecord`]): `version` (optional file)
//! - `versions.json` ([`VersionHistory`]): version -> minAppVersion ledger
//!
//! Writes are whole-file replacements that keep every field the tool does not
//! own, in its original order.

pub mod error;
pub mod history;
pub mod json;
pub mod manifest;
pub mod package;
pub mod store;

pub use error::MetadataError;
pub use history::VersionHistory;
pub use manifest::ManifestRecord;
pub use package::PackageRecord;
pub use store::{JsonFileStore, MetadataStore};
