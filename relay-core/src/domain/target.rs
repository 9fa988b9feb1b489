//! Trigger target resolution
//!
//! Works out which project and which branch or tag a pipeline should be
//! triggered for. The event context supplies the defaults, explicit overrides
//! replace them.

use std::fmt;

use thiserror::Error;

/// VCS provider assumed when no slug override is given
pub const DEFAULT_VCS: &str = "gh";

const BRANCH_REF_PREFIX: &str = "refs/heads/";
const TAG_REF_PREFIX: &str = "refs/tags/";
const PULL_REF_PREFIX: &str = "refs/pull/";

/// Errors raised while resolving a trigger target
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Slug override does not split into `vcs/owner/repo`
    #[error("Invalid target-slug: {0}")]
    InvalidSlug(String),

    /// Event context carries no owner or repository name
    #[error("Repository owner and name must not be empty (got '{owner}/{repo}')")]
    MissingRepository { owner: String, repo: String },

    /// Neither an override nor the event ref names anything to build
    #[error("Cannot determine a branch or tag: event ref is empty and no override was given")]
    EmptyRef,

    /// A branch, tag or pull-request ref with nothing after its prefix
    #[error("Cannot determine a branch or tag from ref '{0}'")]
    UnparseableRef(String),
}

/// Event data the resolver and request builder need
///
/// Built once at the process boundary from the automation environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventContext {
    pub owner: String,
    pub repo: String,
    /// Full ref that triggered the event (e.g. `refs/heads/main`)
    pub git_ref: String,
    pub actor: String,
    pub action: String,
    pub event_name: String,
}

impl EventContext {
    /// Splits an `owner/repo` string into the owner and repo fields
    ///
    /// Returns `None` when the value has no `/`.
    pub fn split_repository(repository: &str) -> Option<(String, String)> {
        let (owner, repo) = repository.split_once('/')?;
        Some((owner.to_string(), repo.to_string()))
    }
}

/// Explicit overrides, already merged from inputs and environment
///
/// Empty strings count as "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub slug: Option<String>,
    pub branch: Option<String>,
    pub tag: Option<String>,
}

impl Overrides {
    fn slug(&self) -> Option<&str> {
        non_empty(&self.slug)
    }

    fn branch(&self) -> Option<&str> {
        non_empty(&self.branch)
    }

    fn tag(&self) -> Option<&str> {
        non_empty(&self.tag)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// `vcs/owner/repo` triple identifying a project to the CI system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSlug {
    pub vcs: String,
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for ProjectSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.vcs, self.owner, self.repo)
    }
}

/// Parses a `vcs/owner/repo` slug
///
/// Exactly three non-empty segments are required.
pub fn parse_slug(slug: &str) -> Result<ProjectSlug, ResolveError> {
    let segments: Vec<&str> = slug.split('/').collect();
    match segments.as_slice() {
        [vcs, owner, repo] if !vcs.is_empty() && !owner.is_empty() && !repo.is_empty() => {
            Ok(ProjectSlug {
                vcs: vcs.to_string(),
                owner: owner.to_string(),
                repo: repo.to_string(),
            })
        }
        _ => Err(ResolveError::InvalidSlug(slug.to_string())),
    }
}

/// What the pipeline builds: a branch or a tag, never both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerTarget {
    Branch(String),
    Tag(String),
}

impl fmt::Display for TriggerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerTarget::Branch(branch) => write!(f, "branch: {}", branch),
            TriggerTarget::Tag(tag) => write!(f, "tag: {}", tag),
        }
    }
}

/// Fully resolved addressing information for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    pub slug: ProjectSlug,
    pub target: TriggerTarget,
}

impl TargetRef {
    pub fn vcs(&self) -> &str {
        &self.slug.vcs
    }

    pub fn owner(&self) -> &str {
        &self.slug.owner
    }

    pub fn repo(&self) -> &str {
        &self.slug.repo
    }

    pub fn branch(&self) -> Option<&str> {
        match &self.target {
            TriggerTarget::Branch(branch) => Some(branch),
            TriggerTarget::Tag(_) => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.target {
            TriggerTarget::Tag(tag) => Some(tag),
            TriggerTarget::Branch(_) => None,
        }
    }
}

/// Resolves the trigger target from the event context and overrides
///
/// Precedence, highest first:
/// 1. explicit tag override
/// 2. explicit branch override
/// 3. tag from a `refs/tags/` ref
/// 4. branch from a `refs/heads/` ref, or `pull/<id>/head` for a PR ref
/// 5. the raw ref as a branch
pub fn resolve(context: &EventContext, overrides: &Overrides) -> Result<TargetRef, ResolveError> {
    let slug = match overrides.slug() {
        Some(raw) => parse_slug(raw)?,
        None => default_slug(context)?,
    };

    let target = resolve_target(&context.git_ref, overrides)?;

    Ok(TargetRef { slug, target })
}

fn default_slug(context: &EventContext) -> Result<ProjectSlug, ResolveError> {
    if context.owner.is_empty() || context.repo.is_empty() {
        return Err(ResolveError::MissingRepository {
            owner: context.owner.clone(),
            repo: context.repo.clone(),
        });
    }

    Ok(ProjectSlug {
        vcs: DEFAULT_VCS.to_string(),
        owner: context.owner.clone(),
        repo: context.repo.clone(),
    })
}

fn resolve_target(git_ref: &str, overrides: &Overrides) -> Result<TriggerTarget, ResolveError> {
    if let Some(tag) = overrides.tag() {
        return Ok(TriggerTarget::Tag(tag.to_string()));
    }
    if let Some(branch) = overrides.branch() {
        return Ok(TriggerTarget::Branch(branch.to_string()));
    }
    if let Some(tag) = tag_from_ref(git_ref) {
        return Ok(TriggerTarget::Tag(tag.to_string()));
    }
    if let Some(branch) = branch_from_ref(git_ref) {
        return Ok(TriggerTarget::Branch(branch));
    }
    if git_ref.is_empty() {
        return Err(ResolveError::EmptyRef);
    }
    if has_known_prefix(git_ref) {
        return Err(ResolveError::UnparseableRef(git_ref.to_string()));
    }

    Ok(TriggerTarget::Branch(git_ref.to_string()))
}

/// True for refs shaped like a branch, tag or PR ref but missing their name
fn has_known_prefix(git_ref: &str) -> bool {
    [BRANCH_REF_PREFIX, TAG_REF_PREFIX, PULL_REF_PREFIX]
        .iter()
        .filter_map(|prefix| git_ref.strip_prefix(prefix))
        .any(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Returns the tag name of a `refs/tags/` ref
pub fn tag_from_ref(git_ref: &str) -> Option<&str> {
    git_ref
        .strip_prefix(TAG_REF_PREFIX)
        .filter(|tag| !tag.is_empty())
}

/// Returns the branch to build for a branch or pull-request ref
///
/// Pull-request refs (`refs/pull/<id>/merge`) are not addressable by the CI
/// system, so they are rewritten to the PR head: `pull/<id>/head`.
pub fn branch_from_ref(git_ref: &str) -> Option<String> {
    if let Some(branch) = git_ref.strip_prefix(BRANCH_REF_PREFIX) {
        return Some(branch.to_string()).filter(|b| !b.is_empty());
    }

    let rest = git_ref.strip_prefix(PULL_REF_PREFIX)?;
    let number = rest.split('/').next()?;
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(format!("pull/{}/head", number))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(git_ref: &str) -> EventContext {
        EventContext {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            git_ref: git_ref.to_string(),
            actor: "octocat".to_string(),
            action: "__run".to_string(),
            event_name: "push".to_string(),
        }
    }

    #[test]
    fn test_parse_slug() {
        let slug = parse_slug("gh/ownerX/repoY").unwrap();
        assert_eq!(slug.vcs, "gh");
        assert_eq!(slug.owner, "ownerX");
        assert_eq!(slug.repo, "repoY");
        assert_eq!(slug.to_string(), "gh/ownerX/repoY");
    }

    #[test]
    fn test_parse_slug_rejects_malformed() {
        for bad in ["bad", "gh/owner", "gh//repo", "/owner/repo", "gh/owner/", "gh/a/b/c", ""] {
            assert_eq!(
                parse_slug(bad),
                Err(ResolveError::InvalidSlug(bad.to_string())),
                "slug {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_branch_ref() {
        let target = resolve(&context("refs/heads/main"), &Overrides::default()).unwrap();
        assert_eq!(target.branch(), Some("main"));
        assert_eq!(target.tag(), None);
        assert_eq!(target.vcs(), "gh");
        assert_eq!(target.owner(), "acme");
        assert_eq!(target.repo(), "widgets");
    }

    #[test]
    fn test_branch_ref_keeps_nested_segments() {
        let target = resolve(&context("refs/heads/feature/login"), &Overrides::default()).unwrap();
        assert_eq!(target.branch(), Some("feature/login"));
    }

    #[test]
    fn test_tag_ref() {
        let target = resolve(&context("refs/tags/v1.0.0"), &Overrides::default()).unwrap();
        assert_eq!(target.tag(), Some("v1.0.0"));
        assert_eq!(target.branch(), None);
    }

    #[test]
    fn test_pull_request_ref_is_rewritten() {
        let target = resolve(&context("refs/pull/42/merge"), &Overrides::default()).unwrap();
        assert_eq!(target.target, TriggerTarget::Branch("pull/42/head".to_string()));

        let target = resolve(&context("refs/pull/7/head"), &Overrides::default()).unwrap();
        assert_eq!(target.branch(), Some("pull/7/head"));
    }

    #[test]
    fn test_unknown_ref_falls_back_to_raw_ref() {
        let target = resolve(&context("refs/notes/commits"), &Overrides::default()).unwrap();
        assert_eq!(target.branch(), Some("refs/notes/commits"));

        // Non-numeric PR id is not a recognizable pull ref either
        let target = resolve(&context("refs/pull/abc/merge"), &Overrides::default()).unwrap();
        assert_eq!(target.branch(), Some("refs/pull/abc/merge"));
    }

    #[test]
    fn test_empty_ref_without_override_is_an_error() {
        assert_eq!(
            resolve(&context(""), &Overrides::default()),
            Err(ResolveError::EmptyRef)
        );
    }

    #[test]
    fn test_bare_prefix_ref_is_an_error() {
        for git_ref in ["refs/heads/", "refs/tags/", "refs/pull/", "refs/pull//merge"] {
            assert_eq!(
                resolve(&context(git_ref), &Overrides::default()),
                Err(ResolveError::UnparseableRef(git_ref.to_string())),
                "ref {:?} should be rejected",
                git_ref
            );
        }

        // An explicit override still resolves
        let overrides = Overrides {
            branch: Some("main".to_string()),
            ..Default::default()
        };
        let target = resolve(&context("refs/tags/"), &overrides).unwrap();
        assert_eq!(target.branch(), Some("main"));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = Overrides {
            slug: Some("bb/other/project".to_string()),
            branch: Some("release".to_string()),
            tag: None,
        };
        let target = resolve(&context("refs/heads/main"), &overrides).unwrap();
        assert_eq!(target.slug.to_string(), "bb/other/project");
        assert_eq!(target.branch(), Some("release"));

        // A branch override also beats a tag derived from the ref
        let target = resolve(&context("refs/tags/v2"), &overrides).unwrap();
        assert_eq!(target.branch(), Some("release"));
        assert_eq!(target.tag(), None);

        let overrides = Overrides {
            tag: Some("v9".to_string()),
            ..Default::default()
        };
        let target = resolve(&context("refs/heads/main"), &overrides).unwrap();
        assert_eq!(target.tag(), Some("v9"));
    }

    #[test]
    fn test_tag_override_wins_over_branch_override() {
        let overrides = Overrides {
            slug: None,
            branch: Some("main".to_string()),
            tag: Some("v3".to_string()),
        };
        let target = resolve(&context("refs/heads/dev"), &overrides).unwrap();
        assert_eq!(target.target, TriggerTarget::Tag("v3".to_string()));
    }

    #[test]
    fn test_empty_overrides_are_ignored() {
        let overrides = Overrides {
            slug: Some(String::new()),
            branch: Some(String::new()),
            tag: Some(String::new()),
        };
        let target = resolve(&context("refs/heads/main"), &overrides).unwrap();
        assert_eq!(target.slug.to_string(), "gh/acme/widgets");
        assert_eq!(target.branch(), Some("main"));
    }

    #[test]
    fn test_invalid_slug_override_fails() {
        let overrides = Overrides {
            slug: Some("bad".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve(&context("refs/heads/main"), &overrides),
            Err(ResolveError::InvalidSlug("bad".to_string()))
        );
    }

    #[test]
    fn test_missing_repository() {
        let mut ctx = context("refs/heads/main");
        ctx.repo = String::new();
        assert!(matches!(
            resolve(&ctx, &Overrides::default()),
            Err(ResolveError::MissingRepository { .. })
        ));
    }

    #[test]
    fn test_split_repository() {
        assert_eq!(
            EventContext::split_repository("acme/widgets"),
            Some(("acme".to_string(), "widgets".to_string()))
        );
        assert_eq!(EventContext::split_repository("widgets"), None);
    }
}
