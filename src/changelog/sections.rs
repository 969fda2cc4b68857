//! Line-level structure of a Keep a Changelog document

use std::sync::LazyLock;

use regex::Regex;

static RELEASE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^##\s+\[([^\]]+)\]").expect("release header pattern is valid")
});

/// Classification of a single changelog line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Top-level `# ` title
    Title,
    /// `## [Unreleased]` or `## Unreleased`
    Unreleased,
    /// `## [<version>] ...`
    Release(&'a str),
    Other,
}

impl LineKind<'_> {
    pub fn is_section_header(&self) -> bool {
        matches!(self, LineKind::Unreleased | LineKind::Release(_))
    }
}

pub fn classify(line: &str) -> LineKind<'_> {
    if line.starts_with("# ") {
        return LineKind::Title;
    }
    if let Some(captures) = RELEASE_HEADER.captures(line)
        && let Some(label) = captures.get(1)
    {
        let label = label.as_str().trim();
        if label.eq_ignore_ascii_case("unreleased") {
            return LineKind::Unreleased;
        }
        return LineKind::Release(label);
    }
    if line
        .strip_prefix("## ")
        .is_some_and(|rest| rest.trim().eq_ignore_ascii_case("unreleased"))
    {
        return LineKind::Unreleased;
    }
    LineKind::Other
}

/// Version of the most recent release section, skipping `Unreleased`
pub fn previous_version(content: &str) -> Option<&str> {
    content.lines().find_map(|line| match classify(line) {
        LineKind::Release(version) => Some(version),
        _ => None,
    })
}

/// Index of the line a new release section is inserted before.
///
/// - First header is `Unreleased`: before the second header, or at the end.
/// - First header is a release: before it.
/// - No section header: at the end.
pub fn insertion_line(lines: &[&str]) -> usize {
    let mut seen_unreleased = false;

    for (index, line) in lines.iter().enumerate() {
        match classify(line) {
            LineKind::Unreleased if !seen_unreleased => seen_unreleased = true,
            kind if kind.is_section_header() => return index,
            _ => {}
        }
    }

    lines.len()
}

/// Insert `entry` as a new release section, separated by blank lines
pub fn insert_entry(content: &str, entry: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let at = insertion_line(&lines);

    let mut out: Vec<&str> = lines[..at].to_vec();
    while out.last().is_some_and(|line| line.trim().is_empty()) {
        out.pop();
    }
    if !out.is_empty() {
        out.push("");
    }
    out.extend(entry.trim().lines());
    if at < lines.len() {
        out.push("");
        out.extend(&lines[at..]);
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}

/// Body of the section for `version`, without its header and trimmed.
///
/// Returns `None` when the changelog has no section for that version.
pub fn section_for(content: &str, version: &str) -> Option<String> {
    let mut lines = content.lines();
    lines.find(|line| classify(line) == LineKind::Release(version))?;

    let body: Vec<&str> = lines
        .take_while(|line| !classify(line).is_section_header())
        .collect();
    Some(body.join("\n").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const CHANGELOG: &str = "# Changelog

Intro text.

## [Unreleased]

- pending work

## [1.1.0] - 2026-02-01

### Added
- Feature B

## [1.0.0] - 2026-01-01

### Added
- Feature A
";

    #[rstest]
    #[case("# Changelog", LineKind::Title)]
    #[case("## [Unreleased]", LineKind::Unreleased)]
    #[case("## Unreleased", LineKind::Unreleased)]
    #[case("## [1.2.0] - 2026-01-01", LineKind::Release("1.2.0"))]
    #[case("### Added", LineKind::Other)]
    #[case("[1.2.0]: https://example.com", LineKind::Other)]
    #[case("", LineKind::Other)]
    fn classify_recognizes_line_kinds(#[case] line: &str, #[case] expected: LineKind) {
        assert_eq!(classify(line), expected);
    }

    #[test]
    fn previous_version_skips_unreleased() {
        assert_eq!(previous_version(CHANGELOG), Some("1.1.0"));
    }

    #[test]
    fn previous_version_is_none_without_release_sections() {
        assert_eq!(previous_version("# Changelog\n\n## [Unreleased]\n"), None);
    }

    #[test]
    fn insertion_line_goes_after_unreleased_section() {
        let lines: Vec<&str> = CHANGELOG.lines().collect();

        assert_eq!(lines[insertion_line(&lines)], "## [1.1.0] - 2026-02-01");
    }

    #[test]
    fn insertion_line_goes_before_first_release() {
        let lines = ["# Changelog", "", "## [1.0.0] - 2026-01-01", "- A"];

        assert_eq!(insertion_line(&lines), 2);
    }

    #[test]
    fn insertion_line_appends_without_sections() {
        let lines = ["# Changelog", "", "Intro"];

        assert_eq!(insertion_line(&lines), 3);
    }

    #[test]
    fn insert_entry_places_new_section_between_blank_lines() {
        let content = "# Changelog\n\n## [1.0.0] - 2026-01-01\n- A\n";

        let result = insert_entry(content, "## [1.1.0] - 2026-02-01\n\n- B\n");

        assert_eq!(
            result,
            "# Changelog\n\n## [1.1.0] - 2026-02-01\n\n- B\n\n## [1.0.0] - 2026-01-01\n- A\n"
        );
    }

    #[test]
    fn section_for_extracts_body_until_next_header() {
        assert_eq!(
            section_for(CHANGELOG, "1.1.0").as_deref(),
            Some("### Added\n- Feature B")
        );
        assert_eq!(
            section_for(CHANGELOG, "1.0.0").as_deref(),
            Some("### Added\n- Feature A")
        );
    }

    #[test]
    fn section_for_is_none_for_unknown_version() {
        assert_eq!(section_for(CHANGELOG, "9.9.9"), None);
    }
}
