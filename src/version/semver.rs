use std::str::FromStr;

use semver::Version;

use crate::version::error::VersionError;

/// Granularity of a version increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
}

impl BumpKind {
    /// Returns the string representation of the bump kind
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Patch => "patch",
        }
    }
}

impl FromStr for BumpKind {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "patch" => Ok(BumpKind::Patch),
            _ => Err(VersionError::InvalidBumpKind(s.to_string())),
        }
    }
}

/// Target of a bump: an increment of the current version, or an explicit version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpSpec {
    Kind(BumpKind),
    Exact(Version),
}

impl BumpSpec {
    /// Resolve the new version relative to `current`
    pub fn resolve(&self, current: &Version) -> Result<Version, VersionError> {
        match self {
            BumpSpec::Kind(kind) => bump_version(current, *kind),
            BumpSpec::Exact(version) => Ok(version.clone()),
        }
    }
}

impl FromStr for BumpSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(kind) = s.parse::<BumpKind>() {
            return Ok(BumpSpec::Kind(kind));
        }
        parse_version(s)
            .map(BumpSpec::Exact)
            .map_err(|_| VersionError::InvalidVersionSpec(s.to_string()))
    }
}

impl std::fmt::Display for BumpSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BumpSpec::Kind(kind) => f.write_str(kind.as_str()),
            BumpSpec::Exact(version) => write!(f, "{}", version),
        }
    }
}

/// Parse a strict `major.minor.patch` version string.
///
/// Unlike `semver::Version::parse`, pre-release and build metadata are
/// rejected, as is anything but plain decimal digits in each component.
/// Leading zeros are rejected so that formatting a parsed version always
/// yields the input text again.
///
/// Examples:
/// - "1.2.3" -> Version(1, 2, 3)
/// - "1.2" -> MalformedVersion
/// - "1.2.3-beta" -> MalformedVersion
pub fn parse_version(text: &str) -> Result<Version, VersionError> {
    let malformed = || VersionError::MalformedVersion(text.to_string());

    let parts: Vec<&str> = text.split('.').collect();
    let [major, minor, patch] = parts.as_slice() else {
        return Err(malformed());
    };

    let component = |part: &str| -> Result<u64, VersionError> {
        let digits_only = !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        let leading_zero = part.len() > 1 && part.starts_with('0');
        if !digits_only || leading_zero {
            return Err(malformed());
        }
        part.parse::<u64>().map_err(|_| malformed())
    };

    Ok(Version::new(
        component(major)?,
        component(minor)?,
        component(patch)?,
    ))
}

/// Increment `version` at the given granularity, zeroing lower components.
///
/// Fails with [`VersionError::VersionOverflow`] when the incremented
/// component is already `u64::MAX`.
pub fn bump_version(version: &Version, kind: BumpKind) -> Result<Version, VersionError> {
    let overflow = || VersionError::VersionOverflow {
        version: version.to_string(),
        kind: kind.as_str(),
    };
    let next = |component: u64| component.checked_add(1).ok_or_else(overflow);

    Ok(match kind {
        BumpKind::Major => Version::new(next(version.major)?, 0, 0),
        BumpKind::Minor => Version::new(version.major, next(version.minor)?, 0),
        BumpKind::Patch => Version::new(version.major, version.minor, next(version.patch)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0.0.0")]
    #[case("1.2.3")]
    #[case("10.20.30")]
    #[case("0.15.0")]
    fn parse_version_round_trips_canonical_text(#[case] text: &str) {
        assert_eq!(parse_version(text).unwrap().to_string(), text);
    }

    #[rstest]
    #[case("1.2")] // too few components
    #[case("1.2.3.4")] // too many components
    #[case("1.x.0")] // non-integer component
    #[case("")]
    #[case("1..3")]
    #[case("-1.2.3")]
    #[case("+1.2.3")]
    #[case(" 1.2.3")]
    #[case("1.2.3-beta.1")] // pre-release not supported
    #[case("1.2.3+build")] // build metadata not supported
    #[case("01.2.3")] // leading zero
    #[case("v1.2.3")]
    fn parse_version_rejects_malformed_input(#[case] text: &str) {
        assert_eq!(
            parse_version(text),
            Err(VersionError::MalformedVersion(text.to_string()))
        );
    }

    #[test]
    fn parsed_versions_are_totally_ordered() {
        let mut versions: Vec<Version> = ["1.10.0", "1.2.3", "2.0.0", "1.2.10", "0.9.9"]
            .iter()
            .map(|v| parse_version(v).unwrap())
            .collect();
        versions.sort();

        let sorted: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        assert_eq!(sorted, ["0.9.9", "1.2.3", "1.2.10", "1.10.0", "2.0.0"]);
    }

    #[rstest]
    #[case("1.2.3", BumpKind::Patch, "1.2.4")]
    #[case("1.2.3", BumpKind::Minor, "1.3.0")]
    #[case("1.2.3", BumpKind::Major, "2.0.0")]
    #[case("0.0.9", BumpKind::Patch, "0.0.10")]
    #[case("0.9.5", BumpKind::Minor, "0.10.0")]
    fn bump_version_increments_and_zeroes_lower_components(
        #[case] current: &str,
        #[case] kind: BumpKind,
        #[case] expected: &str,
    ) {
        let current = parse_version(current).unwrap();
        assert_eq!(bump_version(&current, kind).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("18446744073709551615.0.0", BumpKind::Major)]
    #[case("1.18446744073709551615.0", BumpKind::Minor)]
    #[case("1.2.18446744073709551615", BumpKind::Patch)]
    fn bump_version_reports_overflow_of_max_component(
        #[case] current: &str,
        #[case] kind: BumpKind,
    ) {
        let current = parse_version(current).unwrap();

        assert_eq!(
            bump_version(&current, kind),
            Err(VersionError::VersionOverflow {
                version: current.to_string(),
                kind: kind.as_str(),
            })
        );
    }

    #[test]
    fn bump_version_below_max_component_does_not_overflow() {
        let current = parse_version("1.2.18446744073709551614").unwrap();

        assert_eq!(
            bump_version(&current, BumpKind::Patch).unwrap(),
            Version::new(1, 2, u64::MAX)
        );
    }

    #[rstest]
    #[case("major", BumpKind::Major)]
    #[case("minor", BumpKind::Minor)]
    #[case("patch", BumpKind::Patch)]
    fn bump_kind_parses_known_names(#[case] text: &str, #[case] expected: BumpKind) {
        assert_eq!(text.parse::<BumpKind>().unwrap(), expected);
        assert_eq!(expected.as_str(), text);
    }

    #[test]
    fn bump_kind_rejects_unknown_name() {
        assert_eq!(
            "Patch".parse::<BumpKind>(),
            Err(VersionError::InvalidBumpKind("Patch".to_string()))
        );
    }

    #[rstest]
    #[case("patch", BumpSpec::Kind(BumpKind::Patch))]
    #[case("2.5.0", BumpSpec::Exact(Version::new(2, 5, 0)))]
    fn bump_spec_accepts_kinds_and_explicit_versions(
        #[case] text: &str,
        #[case] expected: BumpSpec,
    ) {
        assert_eq!(text.parse::<BumpSpec>().unwrap(), expected);
    }

    #[rstest]
    #[case("banana")]
    #[case("1.2")]
    #[case("")]
    fn bump_spec_rejects_everything_else(#[case] text: &str) {
        assert_eq!(
            text.parse::<BumpSpec>(),
            Err(VersionError::InvalidVersionSpec(text.to_string()))
        );
    }

    #[test]
    fn bump_spec_resolves_relative_to_current_version() {
        let current = Version::new(1, 0, 0);

        assert_eq!(
            BumpSpec::Kind(BumpKind::Patch).resolve(&current),
            Ok(Version::new(1, 0, 1))
        );
        assert_eq!(
            BumpSpec::Exact(Version::new(0, 1, 0)).resolve(&current),
            Ok(Version::new(0, 1, 0))
        );
    }
}
