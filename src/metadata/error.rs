use std::path::PathBuf;

use thiserror::Error;

use crate::version::VersionError;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("{} not found", .0.display())]
    MissingFile(PathBuf),

    #[error("{} is not a valid record: {reason}", path.display())]
    CorruptRecord { path: PathBuf, reason: String },

    #[error("{field} not found in {}", path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{}: {source}", path.display())]
    MalformedVersion {
        path: PathBuf,
        source: VersionError,
    },

    #[error("Failed to {action} {}: {source}", path.display())]
    Io {
        path: PathBuf,
        action: &'static str,
        source: std::io::Error,
    },
}
