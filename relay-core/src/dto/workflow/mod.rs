//! Workflow DTOs

use serde::{Deserialize, Serialize};

use crate::domain::workflow::Workflow;

/// One page of `GET /pipeline/{id}/workflow`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPage {
    pub items: Vec<Workflow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl WorkflowPage {
    /// Token of the following page, if there is one
    ///
    /// An empty token is treated as the end of the listing.
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}
