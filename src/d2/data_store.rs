// src/d2/data_store.rs

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::d2::{D2Api, Query};
use crate::errors::Result;

/// Key/value access to one data-store namespace.
#[derive(Debug, Clone)]
pub struct DataStore {
    api: Arc<D2Api>,
    namespace: String,
}

impl DataStore {
    pub fn new(api: Arc<D2Api>, namespace: impl Into<String>) -> Self {
        Self {
            api,
            namespace: namespace.into(),
        }
    }

    pub fn key_path(&self, key: &str) -> String {
        format!("api/dataStore/{}/{}", self.namespace, key)
    }

    /// Read a key; `None` when it has never been written.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.api
            .get_optional_json(&self.key_path(key), &Query::new())
            .await
    }

    /// Write a key, creating it on first use.
    pub async fn set<T: Serialize + ?Sized + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.key_path(key);
        let exists = self
            .api
            .get_optional_json::<serde_json::Value, _>(&path, &Query::new())
            .await?
            .is_some();

        if exists {
            self.api.put_json(&path, value).await
        } else {
            self.api.post_body(&path, value).await
        }
    }
}
