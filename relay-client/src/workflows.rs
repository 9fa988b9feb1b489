//! Workflow listing endpoint

use relay_core::dto::workflow::WorkflowPage;
use reqwest::{Method, RequestBuilder};
use tracing::debug;

use crate::CircleClient;
use crate::error::Result;

impl CircleClient {
    // =============================================================================
    // Workflows
    // =============================================================================

    /// URL listing the workflows of a pipeline
    pub fn workflow_url(&self, pipeline_id: &str) -> String {
        format!("{}/pipeline/{}/workflow", self.base_url, pipeline_id)
    }

    fn workflow_request(&self, pipeline_id: &str, page_token: Option<&str>) -> RequestBuilder {
        let request = self.request(Method::GET, &self.workflow_url(pipeline_id));
        match page_token {
            Some(token) => request.query(&[("next_page_token", token)]),
            None => request,
        }
    }

    /// Fetch one page of a pipeline's workflows
    ///
    /// # Arguments
    /// * `pipeline_id` - The pipeline id returned by the trigger
    /// * `page_token` - `next_page_token` of the previous page, `None` for the first
    pub async fn list_workflows(
        &self,
        pipeline_id: &str,
        page_token: Option<&str>,
    ) -> Result<WorkflowPage> {
        debug!(
            "GET {} (page token: {})",
            self.workflow_url(pipeline_id),
            page_token.unwrap_or("-")
        );

        let response = self.workflow_request(pipeline_id, page_token).send().await?;

        self.handle_response(response).await
    }
}
