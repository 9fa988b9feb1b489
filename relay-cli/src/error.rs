//! Run failures
//!
//! Non-fatal problems seen while waiting for a pipeline. They do not stop the
//! wait by themselves but each one makes the run fail.

use thiserror::Error;
use tracing::error;

/// A failure signal raised during the wait
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunFailure {
    /// A workflow ended in a failing terminal state
    #[error("Failed workflow: {name} as {status}")]
    WorkflowFailed { name: String, status: String },

    /// The API reported a status this tool does not know
    #[error("Unrecognized workflow state: {status} (workflow: {name})")]
    UnrecognizedStatus { name: String, status: String },

    /// Listing workflows failed; the wait stops without a verdict
    #[error("Failed to fetch workflows: {0}")]
    WorkflowFetch(String),

    /// No finished verdict before the deadline
    #[error("Pipeline did not finish in {0} (s)")]
    PollTimeout(u64),
}

/// Accumulated failures of one run
///
/// Only grows. The same failure seen in several rounds is kept once.
#[derive(Debug, Default)]
pub struct Failures {
    entries: Vec<RunFailure>,
}

impl Failures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure and logs it the first time it is seen
    pub fn report(&mut self, failure: RunFailure) {
        if self.entries.contains(&failure) {
            return;
        }

        error!("{}", failure);
        self.entries.push(failure);
    }

    pub fn into_vec(self) -> Vec<RunFailure> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        let failure = RunFailure::WorkflowFailed {
            name: "build".to_string(),
            status: "failed".to_string(),
        };
        assert_eq!(failure.to_string(), "Failed workflow: build as failed");
        assert_eq!(
            RunFailure::PollTimeout(30).to_string(),
            "Pipeline did not finish in 30 (s)"
        );
    }

    #[test]
    fn test_report_keeps_each_failure_once() {
        let mut failures = Failures::new();

        let failure = RunFailure::WorkflowFailed {
            name: "build".to_string(),
            status: "canceled".to_string(),
        };
        failures.report(failure.clone());
        failures.report(failure.clone());
        failures.report(RunFailure::PollTimeout(10));

        assert_eq!(failures.into_vec(), vec![failure, RunFailure::PollTimeout(10)]);
    }
}
