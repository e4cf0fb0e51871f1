//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Start the rolling file logger exactly once per process.
//! - Capture panics as sanitized log events.
//!
//! # Invariants
//! - Re-initialization with identical settings is a no-op.
//! - Re-initialization with a different level or directory is rejected.
//! - Initialization never panics.
//! - Record field values are never logged; keys and counts only.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "usertable";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
///
/// # Errors
/// - Unsupported `level`.
/// - Empty or relative `log_dir`, or a directory that cannot be created.
/// - Logging already active with a different level or directory.
/// - Logger backend setup failure.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = normalize_level(level)?;
    let log_dir = normalize_log_dir(log_dir)?;

    let active = ACTIVE.get_or_try_init(|| start_logger(level, &log_dir))?;
    if active.log_dir != log_dir {
        return Err(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            active.log_dir.display(),
            log_dir.display()
        ));
    }
    if active.level != level {
        return Err(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            active.level, level
        ));
    }
    Ok(())
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: &'static str, log_dir: &Path) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(log_dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            log_dir.display()
        )
    })?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook_once();
    info!(
        "event=logging_init module=core status=ok level={} log_dir={} version={}",
        level,
        log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    })
}

/// Maps user input onto a supported level name.
pub fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook_once() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous_hook(panic_info);
    }));
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    let mut truncated: String = flattened.chars().take(max_chars).collect();
    if flattened.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{init_logging, normalize_level, normalize_log_dir, sanitize_message, ACTIVE};

    #[test]
    fn normalize_level_accepts_aliases_and_rejects_unknown() {
        assert_eq!(normalize_level(" WARNING ").unwrap(), "warn");
        assert_eq!(normalize_level("Info").unwrap(), "info");
        assert!(normalize_level("verbose").is_err());
    }

    #[test]
    fn normalize_log_dir_requires_absolute_path() {
        assert!(normalize_log_dir("").is_err());
        let error = normalize_log_dir("logs/dev").unwrap_err();
        assert!(error.contains("absolute"));
    }

    #[test]
    fn sanitize_message_flattens_and_truncates() {
        let sanitized = sanitize_message("a\nb\rcdefghij", 5);
        assert_eq!(sanitized, "a b c...");
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_conflicts() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let first_dir = first.path().to_str().unwrap().to_string();
        let second_dir = second.path().to_str().unwrap().to_string();

        init_logging("info", &first_dir).unwrap();
        init_logging("info", &first_dir).unwrap();

        let level_error = init_logging("debug", &first_dir).unwrap_err();
        assert!(level_error.contains("refusing to switch"));
        let dir_error = init_logging("info", &second_dir).unwrap_err();
        assert!(dir_error.contains("refusing to switch"));

        let active = ACTIVE.get().unwrap();
        assert_eq!(active.level, "info");
        assert_eq!(active.log_dir, first.path());
    }
}
