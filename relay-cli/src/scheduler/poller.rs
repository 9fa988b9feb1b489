//! Workflow poller
//!
//! Runs one status round per interval. A round walks every page of the
//! pipeline's workflows and decides whether all of them are terminal.
//! The whole loop runs under a single deadline: when it expires the loop
//! future is dropped, which cancels the interval and any round in flight.

use std::sync::Arc;

use relay_core::domain::pipeline::WaitPolicy;
use relay_core::domain::workflow::StatusClass;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{Failures, RunFailure};
use crate::repository::WorkflowRepository;

/// Result of one status round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundVerdict {
    /// Every workflow on every page is terminal, or fetching failed
    Finished,
    /// At least one workflow is still in flight
    Pending,
}

/// How the wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Finished { rounds: u32 },
    TimedOut,
}

/// Polls a pipeline's workflows until they finish
pub struct WorkflowPoller {
    repository: Arc<dyn WorkflowRepository>,
    policy: WaitPolicy,
}

impl WorkflowPoller {
    /// Creates a new poller
    pub fn new(repository: Arc<dyn WorkflowRepository>, policy: WaitPolicy) -> Self {
        Self { repository, policy }
    }

    /// Waits for the pipeline to finish
    ///
    /// The first round runs one interval after the call. Failures found by a
    /// round that is cut short by the timeout stay recorded.
    pub async fn wait(&self, pipeline_id: &str, failures: &mut Failures) -> WaitOutcome {
        info!(
            "Waiting for pipeline {} (timeout: {:?}, interval: {:?})",
            pipeline_id, self.policy.timeout, self.policy.interval
        );

        let rounds = async {
            let mut ticker = time::interval_at(
                Instant::now() + self.policy.interval,
                self.policy.interval,
            );
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut round: u32 = 0;

            loop {
                ticker.tick().await;
                round += 1;
                debug!("Checking workflows of pipeline {} (round {})", pipeline_id, round);

                if self.check_round(pipeline_id, failures).await == RoundVerdict::Finished {
                    return round;
                }
            }
        };

        let result = time::timeout(self.policy.timeout, rounds).await;
        match result {
            Ok(rounds) => {
                info!("Pipeline {} finished after {} round(s)", pipeline_id, rounds);
                WaitOutcome::Finished { rounds }
            }
            Err(_) => {
                failures.report(RunFailure::PollTimeout(self.policy.timeout.as_secs()));
                WaitOutcome::TimedOut
            }
        }
    }

    /// Runs a single status round
    ///
    /// Every page is walked even once an in-flight workflow has been seen, so
    /// that all failed workflows get reported. A fetch error ends the round
    /// as finished.
    pub async fn check_round(&self, pipeline_id: &str, failures: &mut Failures) -> RoundVerdict {
        let mut finished = true;
        let mut page_token: Option<String> = None;

        loop {
            let page = match self
                .repository
                .fetch_workflows(pipeline_id, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    failures.report(RunFailure::WorkflowFetch(format!("{:#}", e)));
                    return RoundVerdict::Finished;
                }
            };

            for workflow in &page.items {
                debug!("Workflow {}: {}", workflow.name, workflow.status);

                match workflow.status.class() {
                    StatusClass::InFlight => finished = false,
                    StatusClass::Succeeded => {}
                    StatusClass::Failed => failures.report(RunFailure::WorkflowFailed {
                        name: workflow.name.clone(),
                        status: workflow.status.to_string(),
                    }),
                    StatusClass::Unrecognized => failures.report(RunFailure::UnrecognizedStatus {
                        name: workflow.name.clone(),
                        status: workflow.status.to_string(),
                    }),
                }
            }

            match page.next_token() {
                Some(token) => page_token = Some(token.to_string()),
                None => break,
            }
        }

        if finished {
            RoundVerdict::Finished
        } else {
            RoundVerdict::Pending
        }
    }
}
