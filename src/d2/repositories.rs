// src/d2/repositories.rs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::d2::{D2Api, DataStore, Query};
use crate::domain::{
    Page, Pager, Predictor, PredictorId, RunPredictorsResponse, SchedulerExecution, Scheduling,
    Settings,
};
use crate::errors::Result;
use crate::repository::{
    ListPredictorsOptions, MigrationsRepository, PredictorRepository, SchedulerRepository,
    SettingsRepository,
};
use crate::scheduler::window::ExecutionWindow;

/// Structural version this scheduler expects instances to be migrated to.
pub const MIGRATIONS_VERSION: u32 = 1;

const CONFIG_KEY: &str = "config";
const SCHEDULING_KEY: &str = "scheduling";
const SETTINGS_KEY: &str = "settings";
const EXECUTION_KEY: &str = "scheduler-execution";

const PREDICTOR_FIELDS: &str = "id,name,code,description,output,generator,sampleSkipTest,periodType,\
organisationUnitLevels,sequentialSampleCount,annualSampleCount,predictorGroups";

#[derive(Debug, Default, Deserialize)]
struct StoredConfig {
    #[serde(default)]
    version: u32,
}

#[derive(Debug)]
pub struct D2MigrationsRepository {
    store: DataStore,
}

impl D2MigrationsRepository {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MigrationsRepository for D2MigrationsRepository {
    async fn has_pending(&self) -> Result<bool> {
        let stored: StoredConfig = self.store.get(CONFIG_KEY).await?.unwrap_or_default();
        debug!(stored = stored.version, expected = MIGRATIONS_VERSION, "migration version");
        Ok(stored.version < MIGRATIONS_VERSION)
    }
}

/// Raw `GET /api/predictors` response.
#[derive(Debug, Deserialize)]
pub(crate) struct PredictorListing {
    #[serde(default)]
    pager: Option<Pager>,
    #[serde(default)]
    predictors: Vec<Map<String, Value>>,
}

#[derive(Debug)]
pub struct D2PredictorRepository {
    api: Arc<D2Api>,
    store: DataStore,
}

impl D2PredictorRepository {
    pub fn new(api: Arc<D2Api>, store: DataStore) -> Self {
        Self { api, store }
    }
}

#[async_trait]
impl PredictorRepository for D2PredictorRepository {
    async fn list(&self, options: ListPredictorsOptions) -> Result<Page<Predictor>> {
        let query = list_query(options);
        let listing: PredictorListing = self.api.get_json("api/predictors", &query).await?;
        let scheduling: HashMap<PredictorId, Scheduling> =
            self.store.get(SCHEDULING_KEY).await?.unwrap_or_default();

        Ok(into_page(listing, &scheduling))
    }

    async fn run(&self, ids: &[PredictorId], window: ExecutionWindow) -> Result<Vec<RunPredictorsResponse>> {
        let (start_date, end_date) = window.as_query_dates();
        let mut responses = Vec::with_capacity(ids.len());

        // One request at a time, in run order.
        for id in ids {
            let query: Query = vec![("startDate", start_date.clone()), ("endDate", end_date.clone())];
            let body: Value = self
                .api
                .post_json(&format!("api/predictors/{id}/run"), &query)
                .await?;
            responses.push(run_response(id, &body));
        }

        Ok(responses)
    }
}

pub(crate) fn list_query(options: ListPredictorsOptions) -> Query {
    let mut query: Query = vec![
        ("fields", PREDICTOR_FIELDS.to_string()),
        ("paging", options.paging.to_string()),
    ];
    if options.paging {
        query.push(("page", options.page.to_string()));
        query.push(("pageSize", options.page_size.to_string()));
    }
    query
}

/// Attach stored scheduling descriptors; predictors without one use
/// sequence 0 and an empty group.
pub(crate) fn into_page(listing: PredictorListing, scheduling: &HashMap<PredictorId, Scheduling>) -> Page<Predictor> {
    let objects = listing
        .predictors
        .into_iter()
        .filter_map(|object| {
            let id = object.get("id").and_then(Value::as_str)?.to_string();
            let name = object
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            if !scheduling.contains_key(&id) {
                warn!(predictor = %id, "no scheduling descriptor stored; using defaults");
            }

            Some(Predictor {
                scheduling: scheduling.get(&id).cloned().unwrap_or_default(),
                id,
                name,
                payload: Value::Object(object),
            })
        })
        .collect();

    Page {
        pager: listing.pager,
        objects,
    }
}

fn run_response(id: &str, body: &Value) -> RunPredictorsResponse {
    let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);

    RunPredictorsResponse {
        predictor: id.to_string(),
        status: text("status").unwrap_or_else(|| "OK".to_string()),
        description: text("description").or_else(|| text("message")),
    }
}

#[derive(Debug)]
pub struct D2SettingsRepository {
    store: DataStore,
}

impl D2SettingsRepository {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsRepository for D2SettingsRepository {
    async fn get(&self) -> Result<Settings> {
        Ok(self.store.get(SETTINGS_KEY).await?.unwrap_or_default())
    }
}

#[derive(Debug)]
pub struct D2SchedulerRepository {
    store: DataStore,
}

impl D2SchedulerRepository {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SchedulerRepository for D2SchedulerRepository {
    async fn update_last_execution(&self, execution: &SchedulerExecution) -> Result<()> {
        self.store.set(EXECUTION_KEY, execution).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unpaginated_listing_omits_page_params() {
        let query = list_query(ListPredictorsOptions::unpaginated());
        assert!(query.contains(&("paging", "false".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "page" || *k == "pageSize"));
    }

    #[test]
    fn listing_gets_scheduling_attached() {
        let listing: PredictorListing = serde_json::from_value(json!({
            "predictors": [
                { "id": "p1", "name": "First", "periodType": "Monthly" },
                { "id": "p2", "name": "Second" },
                { "name": "missing id" }
            ]
        }))
        .unwrap();

        let mut scheduling = HashMap::new();
        scheduling.insert(
            "p1".to_string(),
            Scheduling {
                sequence: 3,
                group_key: "g".into(),
            },
        );

        let page = into_page(listing, &scheduling);

        assert_eq!(page.objects.len(), 2);
        assert_eq!(page.objects[0].scheduling.sequence, 3);
        assert_eq!(page.objects[0].payload["periodType"], "Monthly");
        assert_eq!(page.objects[1].scheduling, Scheduling::default());
        assert!(page.pager.is_none());
    }

    #[test]
    fn run_response_falls_back_to_message() {
        let response = run_response("p1", &json!({ "status": "ERROR", "message": "no data" }));
        assert_eq!(response.status, "ERROR");
        assert_eq!(response.description.as_deref(), Some("no data"));
    }
}
