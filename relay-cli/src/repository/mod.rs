//! Repository layer
//!
//! Thin trait seams over the CI API so the coordinator and the poller can be
//! driven by in-memory fakes in tests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use relay_client::CircleClient;
use relay_core::domain::pipeline::PipelineHandle;
use relay_core::domain::target::ProjectSlug;
use relay_core::dto::pipeline::TriggerRequest;
use relay_core::dto::workflow::WorkflowPage;
use tracing::{info, warn};

/// Submits trigger requests
#[async_trait]
pub trait PipelineRepository: Send + Sync {
    /// Triggers a pipeline for a project
    ///
    /// # Arguments
    /// * `slug` - The project to trigger
    /// * `req` - The trigger body
    async fn trigger(&self, slug: &ProjectSlug, req: &TriggerRequest) -> Result<PipelineHandle>;
}

/// Reads workflow status pages
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Fetches one page of a pipeline's workflows
    ///
    /// # Arguments
    /// * `pipeline_id` - The pipeline id returned by the trigger
    /// * `page_token` - Token of the page to fetch, `None` for the first one
    async fn fetch_workflows(
        &self,
        pipeline_id: &str,
        page_token: Option<&str>,
    ) -> Result<WorkflowPage>;
}

#[async_trait]
impl PipelineRepository for CircleClient {
    async fn trigger(&self, slug: &ProjectSlug, req: &TriggerRequest) -> Result<PipelineHandle> {
        info!("  Triggering URL: {}", self.pipeline_url(slug));

        match self.trigger_pipeline(slug, req).await {
            Ok(handle) => Ok(handle),
            Err(e) => {
                if e.is_unauthorized() {
                    warn!("CircleCI rejected the credentials; check CCI_TOKEN");
                }
                Err(e).context("Failed to trigger CircleCI pipeline")
            }
        }
    }
}

#[async_trait]
impl WorkflowRepository for CircleClient {
    async fn fetch_workflows(
        &self,
        pipeline_id: &str,
        page_token: Option<&str>,
    ) -> Result<WorkflowPage> {
        self.list_workflows(pipeline_id, page_token)
            .await
            .with_context(|| format!("Failed to list workflows of pipeline {}", pipeline_id))
    }
}
