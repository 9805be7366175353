//! Logging bootstrap.
//!
//! Human-readable lines go to stderr at the configured level; when a log file
//! is configured, everything from debug up also goes to a size-rotated file
//! with source locations. Stdout stays reserved for command output.
//!
//! Failing to open the log file never aborts a command: logging falls back
//! to stderr only and says so.

use crate::config::normalize_level;
use flexi_logger::{
    Cleanup, Criterion, DeferredNow, Duplicate, FileSpec, Logger, LoggerHandle, Naming,
};
use log::Record;
use std::io::Write;
use std::path::Path;

const MAX_LOG_FILE_SIZE_BYTES: u64 = 10_000_000;
const MAX_LOG_FILES: usize = 3;

/// Start logging. Keep the returned handle alive for the life of the process.
///
/// # Errors
/// - Returns an error when `level` is unsupported.
/// - Returns an error when no logger at all could be started.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<LoggerHandle, String> {
    let level = normalize_level(level)?;

    if let Some(path) = log_file.filter(|p| !p.as_os_str().is_empty()) {
        match start_with_file(level, path) {
            Ok(handle) => return Ok(handle),
            Err(file_error) => {
                let handle = start_stderr_only(level)?;
                log::warn!(
                    "logging to stderr only, cannot use log file '{}': {}",
                    path.display(),
                    file_error
                );
                return Ok(handle);
            }
        }
    }

    start_stderr_only(level)
}

fn start_with_file(level: &'static str, path: &Path) -> Result<LoggerHandle, String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            format!(
                "failed to create log directory '{}': {}",
                parent.display(),
                e
            )
        })?;
    }

    let file_spec = FileSpec::try_from(path).map_err(|e| e.to_string())?;

    Logger::try_with_str(file_level(level))
        .map_err(|e| format!("invalid log level `{level}`: {e}"))?
        .log_to_file(file_spec)
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::NumbersDirect,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .duplicate_to_stderr(stderr_duplicate(level))
        .format_for_stderr(stderr_format)
        .start()
        .map_err(|e| format!("failed to start logger: {e}"))
}

fn start_stderr_only(level: &'static str) -> Result<LoggerHandle, String> {
    Logger::try_with_str(level)
        .map_err(|e| format!("invalid log level `{level}`: {e}"))?
        .log_to_stderr()
        .format(stderr_format)
        .start()
        .map_err(|e| format!("failed to start logger: {e}"))
}

/// The file always gets at least debug output.
fn file_level(level: &'static str) -> &'static str {
    if level == "trace" { "trace" } else { "debug" }
}

fn stderr_duplicate(level: &str) -> Duplicate {
    match level {
        "trace" => Duplicate::Trace,
        "debug" => Duplicate::Debug,
        "info" => Duplicate::Info,
        "warn" => Duplicate::Warn,
        _ => Duplicate::Error,
    }
}

/// `2024-01-31 12:00:00 WARN  [vpnblock::blocker] message`
fn stderr_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(
        w,
        "{} {:<5} [{}] {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.module_path().unwrap_or("<unnamed>"),
        record.args()
    )
}
