//! Logging setup for the binary.
//!
//! Console output for the operator is printed directly by the commands;
//! tracing events go to stderr (warnings by default) and, when the data
//! directory is writable, as JSON lines to `config::log_path()`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::config::{data_dir, log_path};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to set the global tracing subscriber.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// The log directory could not be created.
    #[error("cannot create {}: {source}", path.display())]
    CreateLogDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The log file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    OpenLogFile { path: PathBuf, source: InitError },
}

/// Open `file_name` in `dir` for appending, creating `dir` if needed
fn open_log_file(dir: &Path, file_name: &str) -> Result<RollingFileAppender, LoggingError> {
    fs::create_dir_all(dir).map_err(|source| LoggingError::CreateLogDir {
        path: dir.to_path_buf(),
        source,
    })?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .map_err(|source| LoggingError::OpenLogFile {
            path: dir.join(file_name),
            source,
        })
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "info" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber. Subsequent calls are no-ops.
///
/// A log file that cannot be created or opened only disables the file layer.
pub fn init(verbose: bool) -> Result<(), LoggingError> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    let stderr_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    let path = log_path();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_layer = match open_log_file(&data_dir(), &file_name) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = LOG_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        Err(e) => {
            eprintln!("warning: file logging disabled, {}", e);
            None
        }
    };

    let subscriber = Registry::default()
        .with(build_env_filter(verbose))
        .with(stderr_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!("Logging initialized; log file at {}", log_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::data_dir_with_env;
    use tempfile::TempDir;

    const LOG_FILE: &str = "plugin-release.log";

    #[test]
    fn open_log_file_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = data_dir_with_env(Some(temp_dir.path().display().to_string()), None);

        open_log_file(&dir, LOG_FILE).unwrap();

        assert!(dir.join(LOG_FILE).is_file());
    }

    #[test]
    fn open_log_file_reports_directory_in_place_of_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = data_dir_with_env(Some(temp_dir.path().display().to_string()), None);
        fs::create_dir_all(dir.join(LOG_FILE)).unwrap();

        let result = open_log_file(&dir, LOG_FILE);

        assert!(matches!(
            result,
            Err(LoggingError::OpenLogFile { ref path, .. }) if path == &dir.join(LOG_FILE)
        ));
    }

    #[test]
    fn open_log_file_reports_uncreatable_directory() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("plugin-release");
        fs::write(&blocker, "").unwrap();

        let result = open_log_file(&blocker, LOG_FILE);

        assert!(matches!(result, Err(LoggingError::CreateLogDir { .. })));
    }
}
