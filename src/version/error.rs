use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid version format: {0} (expected major.minor.patch)")]
    MalformedVersion(String),

    #[error("Invalid bump type: {0}. Use major, minor, or patch")]
    InvalidBumpKind(String),

    #[error("Invalid version spec: {0}. Use major, minor, patch, or an explicit X.Y.Z version")]
    InvalidVersionSpec(String),

    #[error("Cannot apply {kind} bump to {version}: component would overflow")]
    VersionOverflow { version: String, kind: &'static str },
}
