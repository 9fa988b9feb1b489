//! Relay
//!
//! Triggers a CircleCI pipeline from a GitHub Actions step and optionally
//! waits for its workflows to finish.
//!
//! Architecture:
//! - Configuration: flags and Actions environment, read once at startup
//! - Repositories: trait seams over the CircleCI client
//! - Scheduler: workflow polling under a single deadline
//! - Coordinator: trigger, then wait, then report

mod actions;
mod config;
mod coordinator;
mod error;
mod repository;
mod scheduler;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::*;
use relay_client::CircleClient;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Cli, Config};
use crate::coordinator::{Coordinator, RunOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay=info,relay_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_cli(cli)?;

    let client = Arc::new(CircleClient::new(
        &config.host,
        config.token.clone(),
        config.context.actor.clone(),
    ));
    info!("CircleCI API: {}", client.base_url());

    let coordinator = Coordinator::new(config, client.clone(), client);

    match coordinator.run().await {
        Ok(outcome) => report(outcome),
        Err(e) => {
            error!("{:#}", e);
            actions::annotate_error(&format!("{:#}", e));
            Err(e)
        }
    }
}

/// Prints the run summary and turns accumulated failures into an error
fn report(outcome: RunOutcome) -> Result<()> {
    if outcome.is_success() {
        let message = match outcome.wait {
            Some(_) => format!("✓ Pipeline {} finished successfully", outcome.handle.id),
            None => format!("✓ Pipeline {} triggered", outcome.handle.id),
        };
        println!("{}", message.green().bold());
        return Ok(());
    }

    println!(
        "{}",
        format!("✗ Pipeline {} failed", outcome.handle.id)
            .red()
            .bold()
    );
    for failure in &outcome.failures {
        println!("  {} {}", "-".red(), failure);
        actions::annotate_error(&failure.to_string());
    }

    anyhow::bail!(
        "{} failure(s) while waiting for pipeline {}",
        outcome.failures.len(),
        outcome.handle.id
    )
}
