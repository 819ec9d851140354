//! Crisis Coach - counseling role-play simulator and trainer library
//!
//! This library provides the backend for a crisis-line training simulator:
//! an LLM plays a client in crisis, and every counselor turn is coached,
//! polished, or rolled into a session report.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `providers`: Chat-completions client abstraction and the BigModel client
//! - `pipeline`: Tiered retry engine, JSON extraction, sanitizers, formatters
//! - `prompts`: Prompt builders for each task at three verbosity tiers
//! - `tasks`: Role-play, round coaching, polish, quick feedback, report
//! - `session`: In-memory practice session with background coaching
//! - `server`: axum HTTP API consumed by the browser client
//! - `cases`: Built-in training case catalog
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use crisis_coach::providers::create_client;
//! use crisis_coach::tasks::{client_reply, RoleplayRequest};
//! use crisis_coach::transcript::Message;
//! use crisis_coach::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let client = create_client(&config.model)?;
//!     let request = RoleplayRequest {
//!         messages: vec![Message::counselor("I'm here to listen. What's going on?")],
//!         ..Default::default()
//!     };
//!     let response = client_reply(client.as_ref(), &request).await?;
//!     println!("{}", response.reply);
//!     Ok(())
//! }
//! ```

pub mod cases;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod schema;
pub mod server;
pub mod session;
pub mod tasks;
pub mod transcript;

// Re-export commonly used types
pub use cases::{CaseProfile, CaseTemplate, CASES};
pub use config::Config;
pub use error::{CoachError, Result};
pub use schema::{CrisisLevel, RoundCoach, Technique};
pub use session::{CoachingDispatcher, CoachingEvent, Session};

#[cfg(test)]
pub mod test_utils;
