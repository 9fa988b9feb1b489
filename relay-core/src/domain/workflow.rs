//! Workflow domain types

use std::fmt;

use serde::{Deserialize, Serialize};

/// One named workflow inside a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    pub status: WorkflowStatus,
}

/// Workflow status as reported by the CI API
///
/// Values the API may add later deserialize into `Unrecognized` instead of
/// failing the whole page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkflowStatus {
    Success,
    Running,
    NotRun,
    Failed,
    Error,
    Failing,
    OnHold,
    Canceled,
    Unauthorized,
    Unrecognized(String),
}

/// How a status affects the wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Still going; another round is needed
    InFlight,
    Succeeded,
    Failed,
    Unrecognized,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowStatus::Success => "success",
            WorkflowStatus::Running => "running",
            WorkflowStatus::NotRun => "not_run",
            WorkflowStatus::Failed => "failed",
            WorkflowStatus::Error => "error",
            WorkflowStatus::Failing => "failing",
            WorkflowStatus::OnHold => "on_hold",
            WorkflowStatus::Canceled => "canceled",
            WorkflowStatus::Unauthorized => "unauthorized",
            WorkflowStatus::Unrecognized(raw) => raw.as_str(),
        }
    }

    /// `failing` is in flight: the workflow has failing jobs but others may
    /// still be running, so it is not final yet.
    pub fn class(&self) -> StatusClass {
        match self {
            WorkflowStatus::Running | WorkflowStatus::OnHold | WorkflowStatus::Failing => {
                StatusClass::InFlight
            }
            WorkflowStatus::Failed
            | WorkflowStatus::NotRun
            | WorkflowStatus::Error
            | WorkflowStatus::Unauthorized
            | WorkflowStatus::Canceled => StatusClass::Failed,
            WorkflowStatus::Success => StatusClass::Succeeded,
            WorkflowStatus::Unrecognized(_) => StatusClass::Unrecognized,
        }
    }
}

impl From<String> for WorkflowStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => WorkflowStatus::Success,
            "running" => WorkflowStatus::Running,
            "not_run" => WorkflowStatus::NotRun,
            "failed" => WorkflowStatus::Failed,
            "error" => WorkflowStatus::Error,
            "failing" => WorkflowStatus::Failing,
            "on_hold" => WorkflowStatus::OnHold,
            "canceled" => WorkflowStatus::Canceled,
            "unauthorized" => WorkflowStatus::Unauthorized,
            _ => WorkflowStatus::Unrecognized(value),
        }
    }
}

impl From<&str> for WorkflowStatus {
    fn from(value: &str) -> Self {
        WorkflowStatus::from(value.to_string())
    }
}

impl From<WorkflowStatus> for String {
    fn from(status: WorkflowStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_statuses() {
        for raw in ["running", "on_hold", "failing"] {
            let status = WorkflowStatus::from(raw);
            assert_eq!(status.class(), StatusClass::InFlight, "{}", raw);
        }
    }

    #[test]
    fn test_failed_statuses() {
        for raw in ["failed", "not_run", "error", "unauthorized", "canceled"] {
            let status = WorkflowStatus::from(raw);
            assert_eq!(status.class(), StatusClass::Failed, "{}", raw);
        }
    }

    #[test]
    fn test_success_status() {
        assert_eq!(WorkflowStatus::from("success"), WorkflowStatus::Success);
        assert_eq!(WorkflowStatus::Success.class(), StatusClass::Succeeded);
    }

    #[test]
    fn test_unrecognized_status_keeps_raw_value() {
        let status = WorkflowStatus::from("exploded");
        assert_eq!(status, WorkflowStatus::Unrecognized("exploded".to_string()));
        assert_eq!(status.class(), StatusClass::Unrecognized);
        assert_eq!(status.to_string(), "exploded");
    }

    #[test]
    fn test_workflow_deserializes_status() {
        let workflow: Workflow =
            serde_json::from_str(r#"{"name":"build","status":"on_hold","id":"abc"}"#).unwrap();
        assert_eq!(workflow.name, "build");
        assert_eq!(workflow.status, WorkflowStatus::OnHold);
    }
}
