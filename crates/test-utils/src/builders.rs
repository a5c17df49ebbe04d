#![allow(dead_code)]

use predictor_scheduler::config::{RawInstanceConfig, RawSchedulerConfig, SchedulerConfig};
use predictor_scheduler::domain::{Predictor, Scheduling};

/// Builder for `SchedulerConfig` to simplify test setup.
pub struct SchedulerConfigBuilder {
    config: RawSchedulerConfig,
}

impl SchedulerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawSchedulerConfig {
                instances: Vec::new(),
            },
        }
    }

    pub fn with_instance(mut self, url: &str) -> Self {
        self.config.instances.push(RawInstanceConfig {
            url: url.to_string(),
            username: None,
            password: None,
        });
        self
    }

    pub fn with_authenticated_instance(mut self, url: &str, username: &str, password: &str) -> Self {
        self.config.instances.push(RawInstanceConfig {
            url: url.to_string(),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        });
        self
    }

    pub fn build(self) -> SchedulerConfig {
        SchedulerConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for SchedulerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Predictor`.
pub struct PredictorBuilder {
    predictor: Predictor,
}

impl PredictorBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            predictor: Predictor {
                id: id.to_string(),
                name: format!("Predictor {id}"),
                scheduling: Scheduling::default(),
                payload: serde_json::Value::Null,
            },
        }
    }

    pub fn sequence(mut self, sequence: i64) -> Self {
        self.predictor.scheduling.sequence = sequence;
        self
    }

    pub fn group(mut self, group_key: &str) -> Self {
        self.predictor.scheduling.group_key = group_key.to_string();
        self
    }

    pub fn build(self) -> Predictor {
        self.predictor
    }
}
