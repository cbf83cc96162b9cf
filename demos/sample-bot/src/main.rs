//! Sample Bot
//!
//! Runs the Spaceport ingress server with a handful of sample handlers:
//!
//! - DEBUG loggers on the event, command and nonslack chains
//! - an immediate acknowledgement for `/sample`, followed by a Block Kit
//!   message posted from the command chain
//! - a diagnostics report when the app is mentioned with "diag"
//!
//! # Usage
//!
//! ```bash
//! SLACK_SIGNING_SECRET=... SLACK_BOT_ACCESS_TOKEN=... \
//!     cargo run --package sample-bot -- --profile development
//! ```

mod handlers;

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use clap::Parser;
use spaceport::prelude::*;
use tracing::info;

use crate::handlers::{HandlerCounts, SAMPLE_COMMAND, diagnostics, sample_command};

#[derive(Debug, Parser)]
#[command(version, about = "Sample handlers for the Spaceport webhook engine")]
struct Args {
    /// Configuration file; searched for in the working directory when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. `development` or `production`.
    #[arg(short, long)]
    profile: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = SpaceportRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = args.profile {
        builder = builder.profile(profile);
    }
    let runtime = builder.build()?;

    // Statically declared handlers come first, in declaration order.
    let mut registry = Registry::import()?;

    let web = runtime.slack_web().clone();
    let counts: HandlerCounts = Arc::new(OnceLock::new());
    registry.register(Category::Event, Some("Request - diagnostics"), {
        let counts = counts.clone();
        move |event: Arc<NormalizedEvent>, control: Control| {
            diagnostics(event, control, web.clone(), counts.clone())
        }
    })?;

    let web = runtime.slack_web().clone();
    let sample_name = format!("Request - {SAMPLE_COMMAND}");
    registry.register(
        Category::Command,
        Some(sample_name.as_str()),
        move |event: Arc<NormalizedEvent>, control: Control| {
            sample_command(event, control, web.clone())
        },
    )?;

    let _ = counts.set(registry.stats());
    info!(handlers = registry.len(), "Sample handlers registered");

    runtime.run(registry).await?;
    Ok(())
}
