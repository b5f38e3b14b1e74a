//! Logging setup for the encoder binary.
//!
//! Logs go to the console and to daily rolling files. The file directory is
//! `--log-dir` / `BILLCODE_LOG_DIR` when given, else `billcode/logs` under the
//! platform data directory. `RUST_LOG` overrides the console and file level.
//!
//! ```no_run
//! use billcode::logging::{LogSettings, init};
//!
//! let log_dir = init(&LogSettings::default()).expect("Failed to initialize logging");
//! tracing::info!("Encoder started, logs in {}", log_dir.display());
//! ```

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

const APP_DIR: &str = "billcode";

/// Prefix of the file that only receives warnings and errors.
const ERROR_LOG_PREFIX: &str = "billcode-errors";

const MAX_LOG_FILES: usize = 10;

/// Where and how verbosely to log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    /// Directory for the rolling log files; `None` uses [`default_log_dir`].
    pub dir: Option<PathBuf>,

    /// Log per-column progress from this crate at `debug`.
    pub verbose: bool,
}

impl LogSettings {
    /// Resolve the log directory without touching the filesystem.
    pub fn log_dir(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => default_log_dir(),
        }
    }

    /// Filter used when `RUST_LOG` is unset.
    pub fn default_directive(&self) -> &'static str {
        if self.verbose {
            "info,billcode=debug"
        } else {
            "info"
        }
    }
}

/// Platform log directory:
///
/// - Windows: `%APPDATA%/billcode/logs`
/// - macOS: `~/Library/Application Support/billcode/logs`
/// - Linux: `~/.local/share/billcode/logs`
pub fn default_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    Ok(base_dir.join(APP_DIR).join("logs"))
}

fn appender(log_dir: &Path, prefix: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create '{prefix}' log appender"))
}

/// Install the console and file subscribers and return the log directory in use.
///
/// `billcode.<date>.log` receives everything that passes the filter and
/// `billcode-errors.<date>.log` only warnings and errors.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the appenders fail
pub fn init(settings: &LogSettings) -> Result<PathBuf> {
    let log_dir = settings.log_dir()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.default_directive()))
        .context("Failed to create env filter")?;

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .compact();

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(appender(&log_dir, APP_DIR)?);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(appender(&log_dir, ERROR_LOG_PREFIX)?)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .init();

    tracing::debug!("Logging initialized, log directory: {}", log_dir.display());

    Ok(log_dir)
}

/// Today's full log file inside `log_dir`.
pub fn current_log_path(log_dir: &Path) -> PathBuf {
    let today = chrono::Local::now().format("%Y-%m-%d");
    log_dir.join(format!("{APP_DIR}.{today}.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_dir() {
        let log_dir = default_log_dir().expect("Failed to get log dir");
        assert!(log_dir.ends_with("billcode/logs") || log_dir.ends_with("billcode\\logs"));
    }

    #[test]
    fn test_explicit_dir_wins() {
        let settings = LogSettings {
            dir: Some(PathBuf::from("/tmp/encoder-logs")),
            verbose: false,
        };
        assert_eq!(settings.log_dir().unwrap(), PathBuf::from("/tmp/encoder-logs"));
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(LogSettings::default().default_directive(), "info");
        let verbose = LogSettings {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(verbose.default_directive(), "info,billcode=debug");
        assert!(EnvFilter::try_new(verbose.default_directive()).is_ok());
    }

    #[test]
    fn test_current_log_path_is_dated() {
        let path = current_log_path(Path::new("logs"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(path.starts_with("logs"));
        assert!(name.starts_with("billcode."));
        assert!(!name.starts_with("billcode-errors"));
        assert!(name.ends_with(".log"));
    }
}
