//! Run coordinator
//!
//! Resolves the target, triggers the pipeline and, when asked to, waits for
//! it. Resolution and trigger errors abort the run; everything found while
//! waiting is collected into the [`RunOutcome`].

use std::sync::Arc;

use anyhow::{Context, Result};
use relay_core::domain::pipeline::PipelineHandle;
use relay_core::domain::target::{self, TargetRef};
use relay_core::dto::pipeline::TriggerRequest;
use tracing::info;

use crate::actions::{LogGroup, OutputWriter};
use crate::config::Config;
use crate::error::{Failures, RunFailure};
use crate::repository::{PipelineRepository, WorkflowRepository};
use crate::scheduler::{WaitOutcome, WorkflowPoller};

/// Result of a run that got as far as triggering
#[derive(Debug)]
pub struct RunOutcome {
    pub handle: PipelineHandle,
    /// `None` when waiting was not requested
    pub wait: Option<WaitOutcome>,
    pub failures: Vec<RunFailure>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sequences trigger and wait for one invocation
pub struct Coordinator {
    config: Config,
    pipelines: Arc<dyn PipelineRepository>,
    workflows: Arc<dyn WorkflowRepository>,
    outputs: OutputWriter,
}

impl Coordinator {
    pub fn new(
        config: Config,
        pipelines: Arc<dyn PipelineRepository>,
        workflows: Arc<dyn WorkflowRepository>,
    ) -> Self {
        let outputs = OutputWriter::new(config.github_output.clone());
        Self {
            config,
            pipelines,
            workflows,
            outputs,
        }
    }

    /// Runs the whole invocation
    pub async fn run(&self) -> Result<RunOutcome> {
        let handle = {
            let _group = LogGroup::start("Preparing CircleCI Pipeline Trigger");
            let (target, request) = self.prepare()?;
            self.pipelines.trigger(&target.slug, &request).await?
        };

        self.report_trigger(&handle)?;

        if !self.config.wait.enabled {
            return Ok(RunOutcome {
                handle,
                wait: None,
                failures: Vec::new(),
            });
        }

        let _group = LogGroup::start("Waiting for pipeline to finish");
        let mut failures = Failures::new();
        let poller = WorkflowPoller::new(Arc::clone(&self.workflows), self.config.wait);
        let wait = poller.wait(&handle.id, &mut failures).await;

        Ok(RunOutcome {
            handle,
            wait: Some(wait),
            failures: failures.into_vec(),
        })
    }

    /// Resolves the target and builds the trigger body
    fn prepare(&self) -> Result<(TargetRef, TriggerRequest)> {
        let target = target::resolve(&self.config.context, &self.config.overrides)
            .context("Failed to resolve the pipeline target")?;

        info!("Org: {}", target.owner());
        info!("Repo: {}", target.repo());
        if self.config.context.git_ref.starts_with("refs/pull/")
            && target.branch().is_some_and(|b| b.starts_with("pull/"))
        {
            info!("This is a PR. Using head PR branch");
        }

        let request = TriggerRequest::new(&target, &self.config.context, self.config.meta.as_deref());

        info!(
            "Triggering CircleCI Pipeline for {}/{}",
            target.owner(),
            target.repo()
        );
        info!("  Triggering {}", target.target);
        info!(
            "    Parameters:\n{}",
            serde_json::to_string(&request.parameters)?
        );

        Ok((target, request))
    }

    fn report_trigger(&self, handle: &PipelineHandle) -> Result<()> {
        let _group = LogGroup::start("Successfully triggered CircleCI Pipeline");
        info!(
            "Pipeline {} created (number: {}, state: {})",
            handle.id,
            handle.number.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            handle.state
        );
        self.outputs.write(&handle.outputs())
    }
}
