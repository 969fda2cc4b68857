//! Semantic version model
//!
//! Strict three-component versions (`major.minor.patch`) backed by
//! [`semver::Version`], plus the increment rules used by a bump.
//!
//! # Modules
//!
//! - [`semver`]: parsing, bump kinds and bump specs
//! - [`error`]: Error types for version parsing

pub mod error;
pub mod semver;

pub use self::error::VersionError;
pub use self::semver::{BumpKind, BumpSpec, bump_version, parse_version};
