//! Pipeline domain types

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A pipeline the CI system accepted
///
/// Returned by a successful trigger. The `id` is opaque and is only used to
/// look up the pipeline's workflows. The other fields are passed through to
/// the step outputs exactly as the API sent them; a response missing one of
/// them still yields a handle, since the pipeline exists at that point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineHandle {
    pub id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub state: String,
}

impl PipelineHandle {
    /// Values surfaced to the calling automation as step outputs
    pub fn outputs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("created_at", self.created_at.clone()),
            ("id", self.id.clone()),
            (
                "number",
                self.number.map(|n| n.to_string()).unwrap_or_default(),
            ),
            ("state", self.state.clone()),
        ]
    }
}

/// Whether and how long to wait for a triggered pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub enabled: bool,
    /// Hard limit for the whole wait
    pub timeout: Duration,
    /// Delay between two status rounds
    pub interval: Duration,
}

impl WaitPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            timeout: Duration::ZERO,
            interval: Duration::ZERO,
        }
    }

    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            enabled: true,
            timeout,
            interval,
        }
    }
}
