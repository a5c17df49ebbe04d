// src/domain.rs

//! Entities exchanged between the scheduler and its collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a predictor (work item) on a remote instance.
pub type PredictorId = String;

/// Ordering metadata attached to each predictor.
///
/// Only used to decide run order; the scheduler never interprets the
/// predictor payload itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheduling {
    #[serde(default)]
    pub sequence: i64,

    /// Grouping variable; predictors sharing it run next to each other.
    #[serde(default, alias = "variable")]
    pub group_key: String,
}

/// A unit of scheduled computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predictor {
    pub id: PredictorId,
    pub name: String,
    #[serde(default)]
    pub scheduling: Scheduling,
    /// Execution payload, passed through untouched.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Instance-level settings consumed alongside the work list.
///
/// Opaque to the scheduler: logged, never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub serde_json::Value);

/// Record of the last successful run on an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerExecution {
    #[serde(skip)]
    pub instance: String,
    pub last_execution: DateTime<Utc>,
}

/// Per-predictor response of a run request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPredictorsResponse {
    pub predictor: PredictorId,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Paging information returned by paged listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager {
    pub page: u32,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub total: u32,
    pub page_size: u32,
}

/// One page of objects, or all of them when paging was disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub pager: Option<Pager>,
    pub objects: Vec<T>,
}
