// src/lib.rs

pub mod cli;
pub mod config;
pub mod d2;
pub mod domain;
pub mod errors;
pub mod fanout;
pub mod fs;
pub mod future;
pub mod gate;
pub mod logging;
pub mod metadata;
pub mod ordering;
pub mod repository;
pub mod scheduler;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::d2::D2ServicesFactory;
use crate::errors::Result;
use crate::scheduler::{BatchReport, Scheduler, log_report};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (any failure here is fatal and returned)
/// - HTTP collaborators per instance
/// - the scheduler fan-out over every instance
///
/// Once the config is loaded the run always completes; per-instance failures
/// end up in the returned report, never in the `Err` variant.
pub async fn run(args: CliArgs) -> Result<BatchReport> {
    let config_path = PathBuf::from(&args.config);
    let config = load_and_validate(&config_path)?;

    info!(
        config = %config_path.display(),
        instances = config.instances().len(),
        "configuration loaded"
    );

    let scheduler = Scheduler::new(config, Arc::new(D2ServicesFactory));

    let report = match scheduler.run().await {
        Ok(report) => report,
        Err(never) => match never {},
    };

    log_report(&report);
    Ok(report)
}
