#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use predictor_scheduler::config::InstanceConfig;
use predictor_scheduler::domain::{
    Page, Predictor, PredictorId, RunPredictorsResponse, SchedulerExecution, Settings,
};
use predictor_scheduler::errors::{Result, SchedulerError};
use predictor_scheduler::metadata::{
    IdentifiableFilter, ListOptions, Metadata, MetadataApi, MetadataKind, PackageFilter,
    RawMetadataPackage,
};
use predictor_scheduler::repository::{
    InstanceServices, ListPredictorsOptions, MigrationsRepository, PredictorRepository,
    SchedulerRepository, ServicesFactory, SettingsRepository,
};
use predictor_scheduler::scheduler::ExecutionWindow;

fn failure(message: &str) -> SchedulerError {
    SchedulerError::Other(anyhow!(message.to_string()))
}

/// Counts every collaborator call made against a [`FakeInstance`].
#[derive(Debug, Default)]
pub struct CallLog {
    pub migrations: AtomicUsize,
    pub list: AtomicUsize,
    pub settings: AtomicUsize,
    pub run: AtomicUsize,
    pub last_execution: AtomicUsize,
    pub run_orders: Mutex<Vec<Vec<PredictorId>>>,
    pub windows: Mutex<Vec<ExecutionWindow>>,
}

impl CallLog {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        Self::count(&self.list) + Self::count(&self.settings)
    }
}

/// In-memory instance implementing every scheduler collaborator.
#[derive(Debug, Default)]
pub struct FakeInstance {
    pub pending_migrations: bool,
    pub predictors: Vec<Predictor>,
    pub settings: Settings,
    pub listing_error: Option<String>,
    pub run_error: Option<String>,
    pub record_error: Option<String>,
    /// Artificial latency applied to the predictor listing.
    pub listing_delay: Option<Duration>,
    pub calls: CallLog,
}

impl FakeInstance {
    pub fn ready(predictors: Vec<Predictor>) -> Self {
        Self {
            predictors,
            ..Self::default()
        }
    }

    pub fn pending() -> Self {
        Self {
            pending_migrations: true,
            ..Self::default()
        }
    }

    pub fn failing_listing(mut self, message: &str) -> Self {
        self.listing_error = Some(message.to_string());
        self
    }

    pub fn failing_run(mut self, message: &str) -> Self {
        self.run_error = Some(message.to_string());
        self
    }

    pub fn failing_record(mut self, message: &str) -> Self {
        self.record_error = Some(message.to_string());
        self
    }

    pub fn with_listing_delay(mut self, delay: Duration) -> Self {
        self.listing_delay = Some(delay);
        self
    }

    pub fn services(self: &Arc<Self>) -> InstanceServices {
        InstanceServices {
            migrations: Arc::clone(self) as Arc<dyn MigrationsRepository>,
            predictors: Arc::clone(self) as Arc<dyn PredictorRepository>,
            settings: Arc::clone(self) as Arc<dyn SettingsRepository>,
            scheduler: Arc::clone(self) as Arc<dyn SchedulerRepository>,
        }
    }

    pub fn run_orders(&self) -> Vec<Vec<PredictorId>> {
        self.calls.run_orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl MigrationsRepository for FakeInstance {
    async fn has_pending(&self) -> Result<bool> {
        self.calls.migrations.fetch_add(1, Ordering::SeqCst);
        Ok(self.pending_migrations)
    }
}

#[async_trait]
impl PredictorRepository for FakeInstance {
    async fn list(&self, _options: ListPredictorsOptions) -> Result<Page<Predictor>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.listing_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.listing_error {
            Some(message) => Err(failure(message)),
            None => Ok(Page {
                pager: None,
                objects: self.predictors.clone(),
            }),
        }
    }

    async fn run(&self, ids: &[PredictorId], window: ExecutionWindow) -> Result<Vec<RunPredictorsResponse>> {
        self.calls.run.fetch_add(1, Ordering::SeqCst);
        self.calls.run_orders.lock().unwrap().push(ids.to_vec());
        self.calls.windows.lock().unwrap().push(window);

        if let Some(message) = &self.run_error {
            return Err(failure(message));
        }

        Ok(ids
            .iter()
            .map(|id| RunPredictorsResponse {
                predictor: id.clone(),
                status: "OK".to_string(),
                description: None,
            })
            .collect())
    }
}

#[async_trait]
impl SettingsRepository for FakeInstance {
    async fn get(&self) -> Result<Settings> {
        self.calls.settings.fetch_add(1, Ordering::SeqCst);
        Ok(self.settings.clone())
    }
}

#[async_trait]
impl SchedulerRepository for FakeInstance {
    async fn update_last_execution(&self, _execution: &SchedulerExecution) -> Result<()> {
        self.calls.last_execution.fetch_add(1, Ordering::SeqCst);
        match &self.record_error {
            Some(message) => Err(failure(message)),
            None => Ok(()),
        }
    }
}

/// Hands out [`FakeInstance`]s by instance address.
///
/// Addresses without a registered fake fail to build, like an instance
/// whose client cannot be constructed.
#[derive(Debug, Default)]
pub struct FakeServicesFactory {
    instances: HashMap<String, Arc<FakeInstance>>,
}

impl FakeServicesFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, instance: FakeInstance) -> Self {
        self.instances
            .insert(address.trim_end_matches('/').to_string(), Arc::new(instance));
        self
    }

    pub fn instance(&self, address: &str) -> Arc<FakeInstance> {
        Arc::clone(&self.instances[address.trim_end_matches('/')])
    }
}

impl ServicesFactory for FakeServicesFactory {
    fn for_instance(&self, instance: &InstanceConfig) -> Result<InstanceServices> {
        let address = instance.address();
        self.instances
            .get(&address)
            .map(|fake| fake.services())
            .ok_or_else(|| failure(&format!("no client for {address}")))
    }
}

/// In-memory metadata endpoints with call counters.
#[derive(Debug, Default)]
pub struct FakeMetadataApi {
    pub exact: HashMap<(String, String), Vec<Metadata>>,
    pub token: HashMap<(String, String), Vec<Metadata>>,
    pub by_code: RawMetadataPackage,
    pub by_name: RawMetadataPackage,
    pub listing: HashMap<String, Vec<Metadata>>,
    pub all: RawMetadataPackage,
    pub fail_packages: bool,

    pub exact_calls: AtomicUsize,
    pub token_calls: AtomicUsize,
    pub package_calls: AtomicUsize,
    pub list_options: Mutex<Vec<ListOptions>>,
}

impl FakeMetadataApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exact(mut self, kind: &str, query: &str, items: Vec<Metadata>) -> Self {
        self.exact.insert((kind.to_string(), query.to_string()), items);
        self
    }

    pub fn with_token(mut self, kind: &str, query: &str, items: Vec<Metadata>) -> Self {
        self.token.insert((kind.to_string(), query.to_string()), items);
        self
    }

    pub fn with_packages(mut self, by_code: RawMetadataPackage, by_name: RawMetadataPackage) -> Self {
        self.by_code = by_code;
        self.by_name = by_name;
        self
    }

    pub fn with_listing(mut self, kind: &str, items: Vec<Metadata>) -> Self {
        self.listing.insert(kind.to_string(), items);
        self
    }

    pub fn with_all(mut self, all: RawMetadataPackage) -> Self {
        self.all = all;
        self
    }

    pub fn failing_packages(mut self) -> Self {
        self.fail_packages = true;
        self
    }

    pub fn exact_calls(&self) -> usize {
        self.exact_calls.load(Ordering::SeqCst)
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn package_calls(&self) -> usize {
        self.package_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataApi for FakeMetadataApi {
    async fn list(&self, kind: &str, options: &ListOptions) -> Result<Page<Metadata>> {
        self.list_options.lock().unwrap().push(options.clone());
        Ok(Page {
            pager: None,
            objects: self.listing.get(kind).cloned().unwrap_or_default(),
        })
    }

    async fn list_all(&self, _kinds: &[MetadataKind], _filter: Option<&str>) -> Result<RawMetadataPackage> {
        Ok(self.all.clone())
    }

    async fn find(&self, kind: &str, filter: &IdentifiableFilter) -> Result<Vec<Metadata>> {
        let (table, counter, query) = match filter {
            IdentifiableFilter::Exact(query) => (&self.exact, &self.exact_calls, query),
            IdentifiableFilter::Token(query) => (&self.token, &self.token_calls, query),
        };
        counter.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        Ok(table
            .get(&(kind.to_string(), query.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn find_package(&self, filter: &PackageFilter) -> Result<RawMetadataPackage> {
        self.package_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_packages {
            return Err(failure("metadata endpoint unavailable"));
        }
        Ok(match filter {
            PackageFilter::CodeIn(_) => self.by_code.clone(),
            PackageFilter::NameIn(_) => self.by_name.clone(),
        })
    }
}
