//! Source-control queries and actions through the `git` command line

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::github::Repository;
use crate::process::{CommandRunner, Invocation, ProcessError, run_checked};

const GIT: &str = "git";

/// Matches `git@github.com:owner/repo(.git)` and `https://github.com/owner/repo(.git)`
static GITHUB_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com[:/]+([^/\s]+)/([^/\s]+?)(?:\.git)?/?$")
        .expect("GitHub remote pattern is valid")
});

async fn git(
    runner: &dyn CommandRunner,
    root: &Path,
    args: &[&str],
) -> Result<String, ProcessError> {
    let invocation = Invocation::new(GIT, args.iter().copied(), root);
    let output = run_checked(runner, &invocation).await?;
    Ok(output.stdout)
}

/// True when `git status --porcelain` reports no changes
pub async fn status_is_clean(
    runner: &dyn CommandRunner,
    root: &Path,
) -> Result<bool, ProcessError> {
    let status = git(runner, root, &["status", "--porcelain"]).await?;
    debug!("git status --porcelain: {:?}", status);
    Ok(status.trim().is_empty())
}

pub async fn current_branch(
    runner: &dyn CommandRunner,
    root: &Path,
) -> Result<String, ProcessError> {
    let branch = git(runner, root, &["branch", "--show-current"]).await?;
    Ok(branch.trim().to_string())
}

/// GitHub repository of the `origin` remote, if it points at GitHub
pub async fn remote_repository(
    runner: &dyn CommandRunner,
    root: &Path,
) -> Result<Option<Repository>, ProcessError> {
    let url = git(runner, root, &["remote", "get-url", "origin"]).await?;
    Ok(parse_remote_url(&url))
}

/// Extract `owner/repo` from an SSH or HTTPS GitHub remote URL
pub fn parse_remote_url(url: &str) -> Option<Repository> {
    let captures = GITHUB_REMOTE.captures(url.trim())?;
    Some(Repository::new(&captures[1], &captures[2]))
}

pub async fn stage_all(runner: &dyn CommandRunner, root: &Path) -> Result<(), ProcessError> {
    git(runner, root, &["add", "."]).await?;
    info!("Changes staged");
    Ok(())
}

pub async fn commit(
    runner: &dyn CommandRunner,
    root: &Path,
    message: &str,
) -> Result<(), ProcessError> {
    git(runner, root, &["commit", "-m", message]).await?;
    info!("Committed: {}", message);
    Ok(())
}

pub async fn push(runner: &dyn CommandRunner, root: &Path) -> Result<(), ProcessError> {
    git(runner, root, &["push"]).await?;
    info!("Pushed to remote");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandOutput, MockCommandRunner};
    use rstest::rstest;

    #[rstest]
    #[case("git@github.com:octo/sample-plugin.git", Some(("octo", "sample-plugin")))]
    #[case("git@github.com:octo/sample-plugin", Some(("octo", "sample-plugin")))]
    #[case("https://github.com/octo/sample-plugin.git\n", Some(("octo", "sample-plugin")))]
    #[case("https://github.com/octo/sample-plugin/", Some(("octo", "sample-plugin")))]
    #[case("ssh://git@github.com/octo/sample.plugin.git", Some(("octo", "sample.plugin")))]
    #[case("https://gitlab.com/octo/sample-plugin.git", None)]
    #[case("https://github.com/octo", None)]
    fn parse_remote_url_extracts_owner_and_repo(
        #[case] url: &str,
        #[case] expected: Option<(&str, &str)>,
    ) {
        assert_eq!(
            parse_remote_url(url),
            expected.map(|(owner, name)| Repository::new(owner, name))
        );
    }

    #[rstest]
    #[case("", true)]
    #[case("\n", true)]
    #[case(" M manifest.json\n", false)]
    #[tokio::test]
    async fn status_is_clean_checks_porcelain_output(
        #[case] stdout: &'static str,
        #[case] clean: bool,
    ) {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|invocation| invocation.args == ["status", "--porcelain"])
            .returning(move |_| Ok(CommandOutput::ok(stdout)));

        assert_eq!(status_is_clean(&runner, Path::new(".")).await.unwrap(), clean);
    }

    #[tokio::test]
    async fn commit_passes_message_as_single_argument() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|invocation| {
                invocation.args == ["commit", "-m", "chore: prepare for v1.0.1 release"]
            })
            .times(1)
            .returning(|_| Ok(CommandOutput::ok("")));

        commit(&runner, Path::new("."), "chore: prepare for v1.0.1 release")
            .await
            .unwrap();
    }
}
