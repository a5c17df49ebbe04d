// src/d2/mod.rs

//! HTTP implementations of the collaborator traits.
//!
//! One [`D2Api`] client is built per instance and shared by every repository
//! of that instance. Non-2xx responses become [`SchedulerError::ApiError`].

pub mod data_store;
pub mod metadata;
pub mod repositories;

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::InstanceConfig;
use crate::errors::{Result, SchedulerError};
use crate::metadata::MetadataRepository;
use crate::repository::{InstanceServices, ServicesFactory};

pub use data_store::DataStore;
pub use metadata::D2MetadataApi;
pub use repositories::{
    D2MigrationsRepository, D2PredictorRepository, D2SchedulerRepository, D2SettingsRepository,
};

/// Data-store namespace holding the scheduler's own keys.
pub const APP_NAMESPACE: &str = "predictor-extended";

/// Query parameters as `(name, value)` pairs.
pub type Query = Vec<(&'static str, String)>;

/// Thin authenticated client for one instance.
#[derive(Debug, Clone)]
pub struct D2Api {
    client: Client,
    instance: InstanceConfig,
}

impl D2Api {
    pub fn new(instance: &InstanceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("predictor-scheduler/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            instance: instance.clone(),
        })
    }

    fn request<Q: Serialize + ?Sized>(&self, method: Method, path: &str, query: &Q) -> RequestBuilder {
        let url = self.instance.endpoint(path);
        debug!(%method, %url, "request");

        let request = self.client.request(method, url).query(query);
        match &self.instance.credentials {
            Some(c) => request.basic_auth(&c.username, Some(&c.password)),
            None => request,
        }
    }

    pub async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        let response = self.request(Method::GET, path, query).send().await?;
        Ok(check(response)?.json().await?)
    }

    /// Like [`D2Api::get_json`], mapping `404 Not Found` to `None`.
    pub async fn get_optional_json<T, Q>(&self, path: &str, query: &Q) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        let response = self.request(Method::GET, path, query).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(response)?.json().await?))
    }

    pub async fn post_json<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        let response = self.request(Method::POST, path, query).send().await?;
        Ok(check(response)?.json().await?)
    }

    pub async fn put_json<B: Serialize + ?Sized + Sync>(&self, path: &str, body: &B) -> Result<()> {
        let response = self
            .request(Method::PUT, path, &Query::new())
            .json(body)
            .send()
            .await?;
        check(response)?;
        Ok(())
    }

    pub async fn post_body<B: Serialize + ?Sized + Sync>(&self, path: &str, body: &B) -> Result<()> {
        let response = self
            .request(Method::POST, path, &Query::new())
            .json(body)
            .send()
            .await?;
        check(response)?;
        Ok(())
    }
}

fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(SchedulerError::ApiError {
        status: status.as_u16(),
        url: response.url().to_string(),
    })
}

/// Builds HTTP-backed collaborators for each configured instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct D2ServicesFactory;

impl ServicesFactory for D2ServicesFactory {
    fn for_instance(&self, instance: &InstanceConfig) -> Result<InstanceServices> {
        let api = Arc::new(D2Api::new(instance)?);
        let store = DataStore::new(Arc::clone(&api), APP_NAMESPACE);

        Ok(InstanceServices {
            migrations: Arc::new(D2MigrationsRepository::new(store.clone())),
            predictors: Arc::new(D2PredictorRepository::new(Arc::clone(&api), store.clone())),
            settings: Arc::new(D2SettingsRepository::new(store.clone())),
            scheduler: Arc::new(D2SchedulerRepository::new(store)),
        })
    }
}

/// Metadata search/lookup backed by the given instance.
pub fn metadata_repository(instance: &InstanceConfig) -> Result<MetadataRepository> {
    let api = Arc::new(D2Api::new(instance)?);
    Ok(MetadataRepository::new(Arc::new(D2MetadataApi::new(api))))
}
