//! Pipeline trigger endpoint

use relay_core::domain::pipeline::PipelineHandle;
use relay_core::domain::target::ProjectSlug;
use relay_core::dto::pipeline::TriggerRequest;
use reqwest::Method;
use tracing::{debug, info};

use crate::{CircleClient, parse_body};
use crate::error::Result;

impl CircleClient {
    // =============================================================================
    // Pipeline Trigger
    // =============================================================================

    /// URL of the trigger endpoint for a project
    pub fn pipeline_url(&self, slug: &ProjectSlug) -> String {
        format!(
            "{}/project/{}/{}/{}/pipeline",
            self.base_url, slug.vcs, slug.owner, slug.repo
        )
    }

    /// Trigger a new pipeline
    ///
    /// Issues a single POST; there is no retry. The response body is logged
    /// as received before it is parsed.
    ///
    /// # Arguments
    /// * `slug` - The project to trigger
    /// * `req` - The trigger body (parameters plus branch or tag)
    ///
    /// # Returns
    /// The handle of the created pipeline
    pub async fn trigger_pipeline(
        &self,
        slug: &ProjectSlug,
        req: &TriggerRequest,
    ) -> Result<PipelineHandle> {
        let url = self.pipeline_url(slug);
        debug!("POST {}", url);

        let response = self.request(Method::POST, &url).json(req).send().await?;
        let body = self.response_body(response).await?;
        info!("CircleCI API Response: {}", body);

        parse_body(&body)
    }
}
