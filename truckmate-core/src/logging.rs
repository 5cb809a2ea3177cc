//! Logging for the truckmate binaries
//!
//! Each binary logs to its own daily-rotated file under the XDG state
//! directory (`~/.local/state/truckmate/`), so a scripted `truckmate-cli`
//! run never interleaves with an open TUI session. Nothing is written to
//! stdout: the TUI owns the terminal and the CLI's stdout is its output.
//!
//! Request bodies carry passwords and session tokens; callers log usernames,
//! routes and statuses only.

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// HTTP stack crates that are noisy below `warn`.
const QUIET_DEPENDENCIES: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls"];

/// Which binary is logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Interactive terminal UI (`truckmate`)
    Tui,
    /// One-shot command line (`truckmate-cli`)
    Cli,
}

impl LogTarget {
    /// Base file name; the appender adds a date suffix when rotating.
    pub fn file_name(self) -> &'static str {
        match self {
            LogTarget::Tui => "truckmate.log",
            LogTarget::Cli => "truckmate-cli.log",
        }
    }

    /// Path of this binary's log file.
    pub fn path(self) -> PathBuf {
        Config::log_path(self.file_name())
    }
}

/// Filter used when `RUST_LOG` is unset: the configured level for our
/// crates, `warn` for the HTTP stack.
fn default_filter(level: &str) -> String {
    let mut directives = vec![level.to_string()];
    directives.extend(QUIET_DEPENDENCIES.iter().map(|krate| format!("{krate}=warn")));
    directives.join(",")
}

/// Initialize file logging for `target`.
///
/// `RUST_LOG` overrides the configured level.
pub fn init(config: &LoggingConfig, target: LogTarget) -> Result<LoggingGuard> {
    let log_dir = Config::state_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(target.file_name())
        .max_log_files(config.max_files.max(1))
        .build(&log_dir)
        .map_err(|e| Error::Config(format!("failed to create log appender: {e}")))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.level)));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    tracing::info!(
        target_binary = ?target,
        log_file = %target.path().display(),
        level = %config.level,
        version = env!("CARGO_PKG_VERSION"),
        "Logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

/// Route logs through the test harness's captured output.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Flushes buffered log lines when dropped; hold it for the life of `main`.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_binary_has_its_own_file() {
        assert!(LogTarget::Tui.path().ends_with("truckmate.log"));
        assert!(LogTarget::Cli.path().ends_with("truckmate-cli.log"));
        assert_eq!(LogTarget::Tui.path().parent(), LogTarget::Cli.path().parent());
    }

    #[test]
    fn test_default_filter_quiets_http_stack() {
        let filter = default_filter("debug");
        assert!(filter.starts_with("debug,"));
        assert!(filter.contains("hyper=warn"));
        assert!(filter.contains("reqwest=warn"));
        // Must be accepted by the subscriber as-is
        assert!(EnvFilter::try_new(&filter).is_ok());
    }
}
