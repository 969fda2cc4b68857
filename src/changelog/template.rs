//! Changelog text templates

use chrono::NaiveDate;
use semver::Version;

use crate::github::Repository;

const DATE_FORMAT: &str = "%Y-%m-%d";

const PREAMBLE: &str = "# Changelog

All notable changes to this project will be documented in this file.

The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.0.0/),
and this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).";

/// Section header line for a release
pub fn section_header(version: &Version, date: NaiveDate) -> String {
    format!("## [{}] - {}", version, date.format(DATE_FORMAT))
}

fn placeholders(headings: &[(&str, &str)]) -> String {
    headings
        .iter()
        .map(|(heading, todo)| format!("### {}\n- TODO: {}\n", heading, todo))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full text of a new CHANGELOG.md whose first release is `version`
pub fn initial_changelog(version: &Version, date: NaiveDate, repo: &Repository) -> String {
    let sections = placeholders(&[
        ("Added", "List new features and capabilities"),
        ("Changed", "List changes to existing functionality"),
        ("Fixed", "List bug fixes"),
        ("Security", "List security improvements (if any)"),
    ]);

    format!(
        "{preamble}\n\n{header}\n\n{sections}\n[{version}]: https://github.com/{repo}/releases/tag/{version}\n",
        preamble = PREAMBLE,
        header = section_header(version, date),
    )
}

/// Section for `version`, linking a comparison against `previous`
pub fn release_entry(
    version: &Version,
    previous: &str,
    date: NaiveDate,
    repo: &Repository,
) -> String {
    let sections = placeholders(&[
        ("Added", "List new features and capabilities"),
        ("Changed", "List changes to existing functionality"),
        ("Fixed", "List bug fixes"),
        ("Deprecated", "List deprecated features (if any)"),
        ("Removed", "List removed features (if any)"),
        ("Security", "List security improvements (if any)"),
    ]);

    format!(
        "{header}\n\n{sections}\n[{version}]: https://github.com/{repo}/compare/{previous}...{version}\n",
        header = section_header(version, date),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn repo() -> Repository {
        "octo/sample-plugin".parse().unwrap()
    }

    #[test]
    fn initial_changelog_contains_first_release() {
        let text = initial_changelog(&Version::new(1, 0, 0), date(), &repo());

        assert!(text.starts_with("# Changelog\n\nAll notable changes"));
        assert!(text.contains("\n## [1.0.0] - 2026-03-14\n\n### Added\n- TODO:"));
        assert!(text.contains("### Security\n"));
        assert!(!text.contains("### Deprecated"));
        assert!(
            text.ends_with(
                "[1.0.0]: https://github.com/octo/sample-plugin/releases/tag/1.0.0\n"
            )
        );
    }

    #[test]
    fn release_entry_links_comparison_with_previous_version() {
        let text = release_entry(&Version::new(1, 1, 0), "1.0.0", date(), &repo());

        assert!(text.starts_with("## [1.1.0] - 2026-03-14\n\n### Added\n"));
        assert!(text.contains("### Deprecated\n- TODO: List deprecated features (if any)\n"));
        assert!(text.contains("### Removed\n"));
        assert!(text.ends_with(
            "[1.1.0]: https://github.com/octo/sample-plugin/compare/1.0.0...1.1.0\n"
        ));
    }
}
