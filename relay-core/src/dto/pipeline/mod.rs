//! Pipeline DTOs
//!
//! Body of the trigger request sent to the CI API.

use serde::{Deserialize, Serialize};

use crate::domain::target::{EventContext, TargetRef, TriggerTarget};

/// Pipeline parameters forwarded with every trigger
///
/// Key names are fixed by the pipeline configuration on the CI side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineParameters {
    #[serde(rename = "GHA_Actor")]
    pub actor: String,
    #[serde(rename = "GHA_Action")]
    pub action: String,
    #[serde(rename = "GHA_Event")]
    pub event: String,
    #[serde(rename = "GHA_Meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
}

/// Request to trigger a new pipeline
///
/// Exactly one of `branch` / `tag` is set when built through [`TriggerRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub parameters: PipelineParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl TriggerRequest {
    /// Builds the trigger body for a resolved target
    ///
    /// # Arguments
    /// * `target` - The resolved target (decides branch vs tag)
    /// * `context` - Event context supplying actor, action and event name
    /// * `meta` - Free-form metadata; omitted when `None` or empty
    pub fn new(target: &TargetRef, context: &EventContext, meta: Option<&str>) -> Self {
        let parameters = PipelineParameters {
            actor: context.actor.clone(),
            action: context.action.clone(),
            event: context.event_name.clone(),
            meta: meta.filter(|m| !m.is_empty()).map(str::to_string),
        };

        let (branch, tag) = match &target.target {
            TriggerTarget::Branch(branch) => (Some(branch.clone()), None),
            TriggerTarget::Tag(tag) => (None, Some(tag.clone())),
        };

        Self {
            parameters,
            branch,
            tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::target::ProjectSlug;
    use serde_json::json;

    fn context() -> EventContext {
        EventContext {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            git_ref: "refs/heads/main".to_string(),
            actor: "octocat".to_string(),
            action: "trigger-circleci".to_string(),
            event_name: "push".to_string(),
        }
    }

    fn target(target: TriggerTarget) -> TargetRef {
        TargetRef {
            slug: ProjectSlug {
                vcs: "gh".to_string(),
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
            },
            target,
        }
    }

    #[test]
    fn test_branch_request_body() {
        let req = TriggerRequest::new(
            &target(TriggerTarget::Branch("main".to_string())),
            &context(),
            None,
        );

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "parameters": {
                    "GHA_Actor": "octocat",
                    "GHA_Action": "trigger-circleci",
                    "GHA_Event": "push"
                },
                "branch": "main"
            })
        );
    }

    #[test]
    fn test_tag_request_body_with_meta() {
        let req = TriggerRequest::new(
            &target(TriggerTarget::Tag("v1.0.0".to_string())),
            &context(),
            Some("deploy=true"),
        );

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["tag"], "v1.0.0");
        assert!(body.get("branch").is_none());
        assert_eq!(body["parameters"]["GHA_Meta"], "deploy=true");
    }

    #[test]
    fn test_empty_meta_is_omitted() {
        let req = TriggerRequest::new(
            &target(TriggerTarget::Branch("main".to_string())),
            &context(),
            Some(""),
        );

        let body = serde_json::to_value(&req).unwrap();
        assert!(body["parameters"].get("GHA_Meta").is_none());
    }
}
