// src/repository/mod.rs

//! Collaborator interfaces consumed by the scheduler.
//!
//! Each trait is a narrow view of one remote concern. Production code wires
//! the HTTP implementations from [`crate::d2`]; tests provide fakes through a
//! custom [`ServicesFactory`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::InstanceConfig;
use crate::domain::{
    Page, Predictor, PredictorId, RunPredictorsResponse, SchedulerExecution, Settings,
};
use crate::errors::Result;
use crate::scheduler::window::ExecutionWindow;

#[async_trait]
pub trait MigrationsRepository: Send + Sync {
    /// Whether the instance has structural migrations not yet applied.
    async fn has_pending(&self) -> Result<bool>;
}

/// Options for listing predictors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListPredictorsOptions {
    /// `false` fetches every predictor in one response.
    pub paging: bool,
    pub page: u32,
    pub page_size: u32,
}

impl ListPredictorsOptions {
    pub fn unpaginated() -> Self {
        Self {
            paging: false,
            ..Self::default()
        }
    }
}

impl Default for ListPredictorsOptions {
    fn default() -> Self {
        Self {
            paging: true,
            page: 1,
            page_size: 25,
        }
    }
}

#[async_trait]
pub trait PredictorRepository: Send + Sync {
    async fn list(&self, options: ListPredictorsOptions) -> Result<Page<Predictor>>;

    /// Run the given predictors, in order, over `window`.
    async fn run(
        &self,
        ids: &[PredictorId],
        window: ExecutionWindow,
    ) -> Result<Vec<RunPredictorsResponse>>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self) -> Result<Settings>;
}

#[async_trait]
pub trait SchedulerRepository: Send + Sync {
    async fn update_last_execution(&self, execution: &SchedulerExecution) -> Result<()>;
}

/// Every collaborator one instance pipeline needs.
#[derive(Clone)]
pub struct InstanceServices {
    pub migrations: Arc<dyn MigrationsRepository>,
    pub predictors: Arc<dyn PredictorRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub scheduler: Arc<dyn SchedulerRepository>,
}

impl fmt::Debug for InstanceServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceServices").finish_non_exhaustive()
    }
}

/// Builds the collaborators for a configured instance.
pub trait ServicesFactory: Send + Sync {
    fn for_instance(&self, instance: &InstanceConfig) -> Result<InstanceServices>;
}
