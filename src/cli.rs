// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `predictor-scheduler`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "predictor-scheduler",
    version,
    about = "Scheduler to execute predictors on multiple instances.",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file (JSON).
    #[arg(short, long, value_name = "PATH")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PREDICTOR_SCHEDULER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_flag_is_required() {
        assert!(CliArgs::try_parse_from(["predictor-scheduler"]).is_err());
    }

    #[test]
    fn short_and_long_config_flags() {
        let short = CliArgs::try_parse_from(["predictor-scheduler", "-c", "a.json"]).unwrap();
        let long = CliArgs::try_parse_from(["predictor-scheduler", "--config", "b.json"]).unwrap();
        assert_eq!(short.config, "a.json");
        assert_eq!(long.config, "b.json");
        assert!(long.log_level.is_none());
    }
}
