//! Slash-command parser for the terminal practice session
//!
//! Anything not starting with `/` is a counselor turn. Commands are
//! case-insensitive; `/polish` keeps the rest of the line as the draft.

use thiserror::Error;

/// Errors that can occur when parsing practice commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// One line of practice-session input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeCommand {
    /// Counselor message sent to the simulated client
    Turn(String),
    /// Rewrite a draft without sending it
    Polish(String),
    /// Quick mid-session feedback
    Feedback,
    /// Full end-of-session report
    Report,
    /// Print the coaching received so far
    Rounds,
    /// Print the case brief again
    Brief,
    /// Show available commands
    Help,
    /// End the session
    Quit,
}

/// Parses a trimmed, non-empty input line
///
/// # Examples
///
/// ```
/// use crisis_coach::commands::practice_commands::{parse_practice_command, PracticeCommand};
///
/// assert_eq!(
///     parse_practice_command("/polish are u ok").unwrap(),
///     PracticeCommand::Polish("are u ok".to_string())
/// );
/// assert_eq!(
///     parse_practice_command("How are you feeling?").unwrap(),
///     PracticeCommand::Turn("How are you feeling?".to_string())
/// );
/// ```
pub fn parse_practice_command(input: &str) -> Result<PracticeCommand, CommandError> {
    let input = input.trim();
    if !input.starts_with('/') {
        return Ok(PracticeCommand::Turn(input.to_string()));
    }

    let (name, rest) = match input.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (input, ""),
    };

    match name.to_lowercase().as_str() {
        "/polish" => {
            if rest.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/polish".to_string(),
                    usage: "/polish <draft>".to_string(),
                })
            } else {
                Ok(PracticeCommand::Polish(rest.to_string()))
            }
        }
        "/feedback" => Ok(PracticeCommand::Feedback),
        "/report" => Ok(PracticeCommand::Report),
        "/rounds" => Ok(PracticeCommand::Rounds),
        "/brief" | "/case" => Ok(PracticeCommand::Brief),
        "/help" | "/?" => Ok(PracticeCommand::Help),
        "/quit" | "/exit" => Ok(PracticeCommand::Quit),
        _ => Err(CommandError::UnknownCommand(name.to_string())),
    }
}

/// Prints the command reference
pub fn print_help() {
    println!(
        r#"
Practice Session Commands
=========================

  <message>         - Say this to the client (one counselor turn)
  /polish <draft>   - Rewrite a draft without sending it
  /feedback         - Quick feedback (needs 2 full rounds)
  /report           - Full session report
  /rounds           - Show coaching received so far
  /brief            - Show the case brief again
  /help             - Show this help
  /quit             - End the session

Round coaching runs in the background and is printed when it lands.
"#
    );
}
