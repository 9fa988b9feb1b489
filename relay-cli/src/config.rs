//! Configuration module
//!
//! Everything the run needs is read here, once, from command-line flags and
//! the GitHub Actions environment. The rest of the program only sees the
//! resulting [`Config`].

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::builder::FalseyValueParser;
use relay_client::DEFAULT_HOST;
use relay_core::domain::pipeline::WaitPolicy;
use relay_core::domain::target::{EventContext, Overrides};

/// Command-line interface
///
/// Action inputs arrive as `INPUT_<NAME>` variables, so each input-backed
/// flag reads the matching variable. The `TARGET_*` variables are a second,
/// lower-priority override layer.
#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(about = "Trigger a CircleCI pipeline and optionally wait for it", long_about = None)]
pub struct Cli {
    /// CircleCI host (bare hostname or full http(s) URL)
    #[arg(long, env = "CCI_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// CircleCI API token
    #[arg(long, env = "CCI_TOKEN", hide_env_values = true)]
    token: String,

    /// Project slug override (vcs/owner/repo)
    #[arg(long, env = "INPUT_TARGET-SLUG")]
    target_slug: Option<String>,

    #[arg(long, env = "TARGET_SLUG", hide = true)]
    env_target_slug: Option<String>,

    /// Branch override
    #[arg(long, env = "INPUT_TARGET-BRANCH")]
    target_branch: Option<String>,

    #[arg(long, env = "TARGET_BRANCH", hide = true)]
    env_target_branch: Option<String>,

    /// Tag override
    #[arg(long, env = "INPUT_TARGET-TAG")]
    target_tag: Option<String>,

    #[arg(long, env = "TARGET_TAG", hide = true)]
    env_target_tag: Option<String>,

    /// Free-form metadata forwarded as the GHA_Meta pipeline parameter
    #[arg(long, env = "INPUT_GHA_META")]
    meta: Option<String>,

    /// Block until the pipeline's workflows finish
    #[arg(long, env = "INPUT_WAIT-FOR-PIPELINE", value_parser = FalseyValueParser::new())]
    wait_for_pipeline: bool,

    /// Give up waiting after this many seconds
    #[arg(long, env = "INPUT_WAIT-FOR-PIPELINE-TIMEOUT", default_value_t = 300)]
    wait_for_pipeline_timeout: u64,

    /// Seconds between two status checks
    #[arg(long, env = "INPUT_WAIT-FOR-PIPELINE-INTERVAL", default_value_t = 10)]
    wait_for_pipeline_interval: u64,

    /// Repository of the triggering event (owner/repo)
    #[arg(long, env = "GITHUB_REPOSITORY", default_value = "")]
    repository: String,

    /// Ref of the triggering event
    #[arg(long = "ref", env = "GITHUB_REF", default_value = "")]
    git_ref: String,

    #[arg(long, env = "GITHUB_ACTOR", default_value = "")]
    actor: String,

    #[arg(long, env = "GITHUB_ACTION", default_value = "")]
    action: String,

    #[arg(long, env = "GITHUB_EVENT_NAME", default_value = "")]
    event_name: String,

    /// File receiving the step outputs
    #[arg(long, env = "GITHUB_OUTPUT")]
    github_output: Option<PathBuf>,
}

/// Run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// CircleCI host
    pub host: String,

    /// API token
    pub token: String,

    /// Data of the triggering event
    pub context: EventContext,

    /// Explicit slug/branch/tag overrides
    pub overrides: Overrides,

    /// GHA_Meta parameter
    pub meta: Option<String>,

    /// Wait behaviour after the trigger
    pub wait: WaitPolicy,

    /// Step outputs file, when running inside Actions
    pub github_output: Option<PathBuf>,
}

impl Config {
    /// Builds and validates the configuration from parsed arguments
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let (owner, repo) = EventContext::split_repository(&cli.repository).unwrap_or_default();

        let wait = if cli.wait_for_pipeline {
            WaitPolicy::new(
                Duration::from_secs(cli.wait_for_pipeline_timeout),
                Duration::from_secs(cli.wait_for_pipeline_interval),
            )
        } else {
            WaitPolicy::disabled()
        };

        let config = Self {
            host: cli.host,
            token: cli.token,
            context: EventContext {
                owner,
                repo,
                git_ref: cli.git_ref,
                actor: cli.actor,
                action: cli.action,
                event_name: cli.event_name,
            },
            overrides: Overrides {
                slug: first_set(cli.target_slug, cli.env_target_slug),
                branch: first_set(cli.target_branch, cli.env_target_branch),
                tag: first_set(cli.target_tag, cli.env_target_tag),
            },
            meta: cli.meta.filter(|m| !m.is_empty()),
            wait,
            github_output: cli.github_output.filter(|p| !p.as_os_str().is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.token.trim().is_empty() {
            anyhow::bail!("CCI_TOKEN cannot be empty");
        }

        if self.wait.enabled {
            if self.wait.interval.is_zero() {
                anyhow::bail!("wait-for-pipeline-interval must be greater than 0");
            }

            if self.wait.timeout.is_zero() {
                anyhow::bail!("wait-for-pipeline-timeout must be greater than 0");
            }
        }

        Ok(())
    }
}

/// First non-empty value of two override layers
fn first_set(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .filter(|v| !v.is_empty())
        .or_else(|| fallback.filter(|v| !v.is_empty()))
}
