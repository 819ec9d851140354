//! Command-line interface definition for Crisis Coach
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for serving the HTTP API, browsing the case catalog,
//! and running a practice session in the terminal.

use clap::{Parser, Subcommand};

/// Crisis Coach - counseling role-play simulator and trainer
///
/// Role-plays a crisis-line client through an LLM and coaches the trainee
/// counselor turn by turn.
#[derive(Parser, Debug, Clone)]
#[command(name = "crisis-coach")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Crisis Coach
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP API consumed by the browser client
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the built-in training cases
    Cases {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an interactive practice session in the terminal
    Practice {
        /// Case id to practice (random when omitted)
        #[arg(long = "case")]
        case_id: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            command: Commands::Cases { json: false },
        }
    }
}
