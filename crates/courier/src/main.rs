//! Courier - bridges live chat sessions and durable workflow actors.
//!
//! Main entry point for the Courier CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{config, send, start, status};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Courier - bridges live chat sessions and durable workflow actors
#[derive(Parser)]
#[command(name = "courier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ~/.config/courier/config.toml)
    #[arg(short, long, global = true, env = "COURIER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the bridge server
    Start(start::StartArgs),

    /// Publish one input event for a session
    Send(send::SendArgs),

    /// Check the sidecar and a running bridge
    Status(status::StatusArgs),

    /// Configuration inspection
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + rotating JSON file
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "courier=debug,courier_bridge=debug,courier_dapr=debug,courier_server=debug,courier_config=debug,info"
        } else {
            "courier=info,courier_bridge=info,courier_dapr=info,courier_server=info,warn"
        }
        .to_string()
    });

    let log_dir = courier_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "courier.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "courier=trace,courier_bridge=trace,courier_dapr=trace,courier_server=trace,courier_config=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        config_path: cli.config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Start(args) => start::run(args, &ctx).await,
        Commands::Send(args) => send::run(args, &ctx).await,
        Commands::Status(args) => status::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
