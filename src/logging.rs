// src/logging.rs

//! Logging setup for `predictor-scheduler` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `PREDICTOR_SCHEDULER_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `debug`
//!
//! Every event is written twice: to stdout, and without colours to a log
//! file (`debug.log` in the working directory by default).
//!
//! Nothing here installs a global subscriber. [`build_dispatch`] returns a
//! [`Dispatch`] that callers scope explicitly, and [`init_logging`] makes it
//! the default for the current thread only.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::Dispatch;
use tracing::dispatcher::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, Layer};

use crate::cli::LogLevel;

pub const DEFAULT_LOG_FILE: &str = "debug.log";
pub const LOG_ENV_VAR: &str = "PREDICTOR_SCHEDULER_LOG";

/// Keeps logging alive; dropping it flushes the file writer.
#[must_use = "logging stops when the guard is dropped"]
pub struct LoggingGuard {
    _default: DefaultGuard,
    _file: WorkerGuard,
}

/// Build the console + file dispatcher and make it the default for the
/// current thread.
///
/// Intended for a current-thread runtime, where every task runs on the
/// thread that installed it.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<LoggingGuard> {
    let level = resolve_level(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref());
    let (dispatch, file_guard) = build_dispatch(level, Path::new(DEFAULT_LOG_FILE))?;
    let default_guard = tracing::dispatcher::set_default(&dispatch);

    Ok(LoggingGuard {
        _default: default_guard,
        _file: file_guard,
    })
}

/// Build a dispatcher writing to stdout and to `log_file`.
pub fn build_dispatch(level: tracing::Level, log_file: &Path) -> Result<(Dispatch, WorkerGuard)> {
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = log_file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE);

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .with_context(|| format!("opening log file {}", log_file.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = LevelFilter::from_level(level);
    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stdout)
                .with_filter(filter),
        )
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(filter),
        );

    Ok((Dispatch::new(subscriber), guard))
}

fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> tracing::Level {
    match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => env_value
            .and_then(parse_level_str)
            .unwrap_or(tracing::Level::DEBUG),
    }
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" | "all" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
