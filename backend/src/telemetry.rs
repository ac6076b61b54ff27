//! Tracing subscriber setup.
//!
//! Console output is pretty-printed in development and JSON otherwise,
//! filtered by `RUST_LOG` or the run mode's default level. Every `ERROR`
//! event is also appended as JSON to `<log_dir>/error.log`.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::settings::RunMode;

/// File name of the error-only log.
pub const ERROR_LOG: &str = "error.log";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("cannot open error log at {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("tracing subscriber already installed: {0}")]
    Install(String),
}

/// Create `dir` if needed and open its error log for appending.
///
/// # Errors
/// Returns [`TelemetryError::LogFile`] when the directory or file cannot be
/// created.
pub fn open_error_log(dir: &Path) -> Result<File, TelemetryError> {
    let path = dir.join(ERROR_LOG);
    let log_file_error = |source| TelemetryError::LogFile {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(log_file_error)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(log_file_error)
}

/// JSON layer keeping only `ERROR` events.
pub fn error_layer<S>(file: File) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::ERROR)
}

/// Install the global subscriber.
///
/// # Errors
/// Returns [`TelemetryError`] when the error log cannot be opened or a
/// subscriber is already installed.
pub fn init(mode: RunMode, log_dir: &Path) -> Result<(), TelemetryError> {
    let file = open_error_log(log_dir)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(mode.default_log_level()));
    let console = if mode.is_development() {
        fmt::layer().pretty().boxed()
    } else {
        fmt::layer().json().boxed()
    };
    tracing_subscriber::registry()
        .with(console.with_filter(filter))
        .with(error_layer(file))
        .try_init()
        .map_err(|err| TelemetryError::Install(err.to_string()))
}
