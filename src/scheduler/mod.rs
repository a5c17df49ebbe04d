// src/scheduler/mod.rs

//! Multi-instance scheduler driver.
//!
//! - [`pipeline`] builds the per-instance pipeline.
//! - [`outcome`] holds per-instance outcomes and the aggregated report.
//! - [`window`] defines the execution window passed to predictor runs.
//!
//! The driver fans the pipeline out over every configured instance. A
//! failing instance is logged and recorded as a failure outcome; it never
//! stops the remaining instances, and every instance gets exactly one
//! outcome in the report.

pub mod outcome;
pub mod pipeline;
pub mod window;

use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{error, info};

use crate::config::{InstanceConfig, SchedulerConfig};
use crate::fanout::FanOut;
use crate::future::AsyncResult;
use crate::repository::ServicesFactory;

pub use outcome::{BatchReport, InstanceFailure, RunOutcome};
pub use pipeline::run_instance;
pub use window::ExecutionWindow;

pub struct Scheduler {
    config: SchedulerConfig,
    factory: Arc<dyn ServicesFactory>,
    window: ExecutionWindow,
    fan_out: FanOut,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("instances", &self.config.instances().len())
            .field("window", &self.window)
            .field("fan_out", &self.fan_out)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, factory: Arc<dyn ServicesFactory>) -> Self {
        Self {
            config,
            factory,
            window: ExecutionWindow::fixed(),
            fan_out: FanOut::new(),
        }
    }

    /// Limit how many instances are processed at the same time.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.fan_out = self.fan_out.max_concurrency(limit);
        self
    }

    /// Build the run over all instances. Nothing happens until it is run.
    pub fn run(&self) -> AsyncResult<BatchReport, Infallible> {
        let items: Vec<(usize, InstanceConfig)> =
            self.config.instances().iter().cloned().enumerate().collect();

        let factory = Arc::clone(&self.factory);
        let window = self.window;

        let failures: Arc<Mutex<Vec<InstanceFailure>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&failures);

        self.fan_out
            .run(
                items,
                move |(index, instance)| match factory.for_instance(&instance) {
                    Ok(services) => run_instance(index, &instance, services, window),
                    Err(err) => AsyncResult::error(InstanceFailure::new(
                        index,
                        instance.address(),
                        err.to_string(),
                    )),
                },
                move |failure: InstanceFailure| {
                    error!(instance = %failure.instance, "{failure}");
                    sink.lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .push(failure);
                },
            )
            .map(move |successes| {
                let failures = std::mem::take(
                    &mut *failures
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner()),
                );
                collect_report(successes, failures)
            })
    }
}

fn collect_report(successes: Vec<(usize, RunOutcome)>, failures: Vec<InstanceFailure>) -> BatchReport {
    let mut indexed: Vec<(usize, RunOutcome)> = successes;
    indexed.extend(failures.into_iter().map(|f| (f.index, f.into())));
    indexed.sort_by_key(|(index, _)| *index);

    BatchReport {
        outcomes: indexed.into_iter().map(|(_, outcome)| outcome).collect(),
    }
}

/// Log the aggregated report as a single JSON line.
pub fn log_report(report: &BatchReport) {
    match serde_json::to_string(report) {
        Ok(result) => info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            %result,
            "scheduler run finished"
        ),
        Err(err) => error!(error = %err, ?report, "failed to serialize scheduler report"),
    }
}
