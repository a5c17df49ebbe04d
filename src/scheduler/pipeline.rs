// src/scheduler/pipeline.rs

//! The per-instance pipeline:
//!
//! 1. gate on pending migrations
//! 2. fetch settings and the predictor list concurrently
//! 3. order the predictors
//! 4. run them over the execution window
//! 5. record the last successful execution
//!
//! Any failure short-circuits the remaining steps and is turned into an
//! [`InstanceFailure`] carrying the instance address.

use chrono::Utc;
use tracing::{debug, info, info_span};

use crate::config::InstanceConfig;
use crate::domain::{Page, Predictor, PredictorId, SchedulerExecution, Settings};
use crate::errors::SchedulerError;
use crate::future::AsyncResult;
use crate::gate::check_ready;
use crate::ordering::order_predictors;
use crate::repository::{InstanceServices, ListPredictorsOptions};
use crate::scheduler::outcome::{InstanceFailure, RunOutcome};
use crate::scheduler::window::ExecutionWindow;

/// Build (without starting) the pipeline for the instance at `index`.
pub fn run_instance(
    index: usize,
    instance: &InstanceConfig,
    services: InstanceServices,
    window: ExecutionWindow,
) -> AsyncResult<(usize, RunOutcome), InstanceFailure> {
    let address = instance.address();
    let span = info_span!("instance", index, url = %address);

    let fetch_services = services.clone();
    let run_services = services.clone();
    let record_address = address.clone();

    check_ready(services.migrations.clone())
        .flat_map(move |_| fetch_snapshot(&fetch_services))
        .flat_map(move |(settings, page)| execute(&run_services, settings, page, window))
        .flat_map(move |order| record_execution(&services, record_address, order))
        .map(move |outcome| (index, outcome))
        .map_err(move |reason| InstanceFailure::new(index, address, reason))
        .in_span(span)
}

fn fetch_snapshot(services: &InstanceServices) -> AsyncResult<(Settings, Page<Predictor>)> {
    let settings = {
        let repo = services.settings.clone();
        AsyncResult::attempt(async move { repo.get().await })
    };
    let predictors = {
        let repo = services.predictors.clone();
        AsyncResult::attempt(async move { repo.list(ListPredictorsOptions::unpaginated()).await })
    };

    settings.join(predictors)
}

fn execute(
    services: &InstanceServices,
    settings: Settings,
    page: Page<Predictor>,
    window: ExecutionWindow,
) -> AsyncResult<Vec<PredictorId>> {
    let ordered = order_predictors(page.objects);
    let order: Vec<PredictorId> = ordered.into_iter().map(|p| p.id).collect();

    debug!(settings = %settings.0, ?order, "ordered predictors");

    if order.is_empty() {
        info!("no predictors to run");
        return AsyncResult::success(order);
    }

    let repo = services.predictors.clone();
    AsyncResult::attempt(async move {
        let responses = repo.run(&order, window).await?;
        info!(executed = order.len(), responses = responses.len(), "predictors executed");
        Ok::<_, SchedulerError>(order)
    })
}

fn record_execution(
    services: &InstanceServices,
    instance: String,
    order: Vec<PredictorId>,
) -> AsyncResult<RunOutcome> {
    let repo = services.scheduler.clone();
    AsyncResult::attempt(async move {
        let execution = SchedulerExecution {
            instance: instance.clone(),
            last_execution: Utc::now(),
        };
        repo.update_last_execution(&execution).await?;

        Ok::<_, SchedulerError>(RunOutcome::Success {
            instance,
            executed: order.len(),
            order,
        })
    })
}
