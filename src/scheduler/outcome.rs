// src/scheduler/outcome.rs

use std::fmt;

use serde::Serialize;

use crate::domain::PredictorId;

/// Result of one instance's pipeline in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RunOutcome {
    #[serde(rename_all = "camelCase")]
    Success {
        instance: String,
        executed: usize,
        order: Vec<PredictorId>,
    },
    #[serde(rename_all = "camelCase")]
    Failure { instance: String, reason: String },
}

impl RunOutcome {
    pub fn instance(&self) -> &str {
        match self {
            RunOutcome::Success { instance, .. } | RunOutcome::Failure { instance, .. } => instance,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success { .. })
    }
}

/// A scoped failure, attributed to the instance at `index` in the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceFailure {
    pub index: usize,
    pub instance: String,
    pub reason: String,
}

impl InstanceFailure {
    pub fn new(index: usize, instance: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            index,
            instance: instance.into(),
            reason: reason.into(),
        }
    }
}

/// Instance-qualified message, e.g. `[https://host] There are pending migrations`.
impl fmt::Display for InstanceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.instance, self.reason)
    }
}

impl From<InstanceFailure> for RunOutcome {
    fn from(failure: InstanceFailure) -> Self {
        RunOutcome::Failure {
            instance: failure.instance,
            reason: failure.reason,
        }
    }
}

/// Aggregated result of a run: one outcome per configured instance, in
/// configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<RunOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_is_instance_qualified() {
        let failure = InstanceFailure::new(0, "https://b.example.org", "boom");
        assert_eq!(failure.to_string(), "[https://b.example.org] boom");
    }

    #[test]
    fn report_serializes_with_status_tags() {
        let report = BatchReport {
            outcomes: vec![
                RunOutcome::Success {
                    instance: "a".into(),
                    executed: 1,
                    order: vec!["p1".into()],
                },
                InstanceFailure::new(1, "b", "nope").into(),
            ],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["status"], "success");
        assert_eq!(json["outcomes"][0]["executed"], 1);
        assert_eq!(json["outcomes"][1]["status"], "failure");
        assert_eq!(json["outcomes"][1]["reason"], "nope");
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
    }
}
