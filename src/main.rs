//! Crisis Coach - counseling role-play simulator and trainer
//!
#![doc = "Crisis Coach - counseling role-play simulator and trainer"]
#![doc = "Main entry point for the Crisis Coach application."]

use anyhow::Result;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crisis_coach::cli::{Cli, Commands};
use crisis_coach::commands;
use crisis_coach::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Serve { .. } => {
            tracing::info!("Starting HTTP API");
            commands::serve::run_serve(config).await
        }
        Commands::Cases { json } => {
            tracing::debug!("Listing cases (json: {})", json);
            commands::cases::list_cases(json)
        }
        Commands::Practice { case_id } => {
            if let Some(id) = &case_id {
                tracing::debug!("Practicing case: {}", id);
            }
            commands::practice::run_practice(config, case_id).await
        }
    }
}

/// Logs go to stderr so `cases --json` output stays machine-readable
fn init_tracing(verbose: bool, json_logs: bool) {
    let default_filter = if verbose {
        "crisis_coach=debug"
    } else {
        "crisis_coach=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
