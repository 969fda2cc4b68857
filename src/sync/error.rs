use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::metadata::MetadataError;
use crate::version::VersionError;

/// Step of a bump that touches storage after the new version is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpStep {
    WriteManifest,
    WritePackage,
    LoadHistory,
    WriteHistory,
}

impl fmt::Display for BumpStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BumpStep::WriteManifest => "writing manifest.json",
            BumpStep::WritePackage => "writing package.json",
            BumpStep::LoadHistory => "reading versions.json",
            BumpStep::WriteHistory => "writing versions.json",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Version(#[from] VersionError),

    /// A bump failed after the new version was resolved. Files listed in
    /// `written` already carry the new version and are not rolled back.
    #[error("Version bump failed while {step} ({}): {source}", describe_written(.written))]
    Bump {
        step: BumpStep,
        written: Vec<PathBuf>,
        source: MetadataError,
    },
}

fn describe_written(written: &[PathBuf]) -> String {
    if written.is_empty() {
        return "no files were updated".to_string();
    }
    let files: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
    format!("already updated: {}", files.join(", "))
}
