//! Logging initialization module
//!
//! Installs the process-wide `tracing` subscriber exactly once per run.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use tracing::Level;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::errors::{ExError, ExErrorKind, Result};

/// File name used inside the log directory
pub const LOG_FILE_NAME: &str = "poller.log";

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output
    Development,
    /// JSON structured output
    Production,
    /// No output; tests install their own capture layer
    Test,
}

/// Where log lines go and how verbose they are
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub level: Level,
    /// When set, logs are appended to `<log_dir>/poller.log` instead of stderr
    pub log_dir: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_dir: None,
        }
    }
}

/// Map the operator-facing verbosity (1 warnings, 2 info, 3 debug) to a level
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Keeps the log target alive for the duration of a run.
///
/// Dropping the guard flushes the log file, so buffered lines reach disk
/// before the process exits with its status code.
#[derive(Debug)]
pub struct LoggingGuard {
    file: Option<Arc<File>>,
}

impl LoggingGuard {
    /// Path-less guard for runs that log to stderr or not at all
    fn detached() -> Self {
        Self { file: None }
    }

    pub fn has_log_file(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            tracing::debug!("closing log file");
            let mut handle: &File = file;
            let _ = handle.flush();
            let _ = file.sync_data();
        }
    }
}

static INIT_ONCE: Once = Once::new();

fn open_log_file(dir: &Path) -> Result<File> {
    std::fs::create_dir_all(dir).map_err(|e| {
        ExError::new(ExErrorKind::Io)
            .with_op("logging_init")
            .with_message(format!("Cannot create log directory {}: {}", dir.display(), e))
    })?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))
        .map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("logging_init")
                .with_message(format!("Cannot open log file in {}: {}", dir.display(), e))
        })
}

/// Initialize the logging facility
///
/// Only the first call installs a subscriber; later calls return a detached
/// guard. `RUST_LOG` overrides the level derived from `options`.
///
/// # Errors
///
/// Returns `ExErrorKind::Io` if the log directory or file cannot be opened.
pub fn init(profile: Profile, options: &LogOptions) -> Result<LoggingGuard> {
    if INIT_ONCE.is_completed() {
        return Ok(LoggingGuard::detached());
    }

    let file = match (&options.log_dir, profile) {
        (Some(dir), Profile::Development | Profile::Production) => {
            Some(Arc::new(open_log_file(dir)?))
        }
        _ => None,
    };

    let level = options.level.to_string().to_lowercase();
    let writer_file = file.clone();

    INIT_ONCE.call_once(|| {
        let filter = || {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("warn,sispoll={}", level)))
        };
        let writer = || match &writer_file {
            Some(f) => BoxMakeWriter::new(f.clone()),
            None => BoxMakeWriter::new(std::io::stderr),
        };
        match profile {
            Profile::Development => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter())
                    .with_ansi(writer_file.is_none())
                    .with_writer(writer())
                    .try_init();
            }
            Profile::Production => {
                let _ = tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter())
                    .with_writer(writer())
                    .try_init();
            }
            Profile::Test => {
                // Tests install a capture layer via init_test_capture()
            }
        }
    });

    Ok(LoggingGuard { file })
}
