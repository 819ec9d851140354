/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `serve`:    HTTP API for the browser client
- `cases`:    Print the training case catalog
- `practice`: Interactive practice session in the terminal
*/

use crate::cases::{find_case, random_case, CaseTemplate, CASES};
use crate::config::Config;
use crate::error::{CoachError, Result};
use std::sync::Arc;

// Slash commands understood by the practice session
pub mod practice_commands;

// HTTP server command handler
pub mod serve {
    use super::*;

    /// Start the HTTP API and block until shutdown
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    pub async fn run_serve(config: Config) -> Result<()> {
        tracing::info!(
            model = %config.model.name,
            endpoint = %config.model.completions_endpoint(),
            "Starting Crisis Coach API"
        );
        crate::server::serve(&config).await
    }
}

// Case catalog command handler
pub mod cases {
    use super::*;
    use prettytable::{cell, row, Table};

    /// Print the built-in case catalog
    ///
    /// # Arguments
    ///
    /// * `json` - Print the full templates as pretty JSON instead of a table
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Serialization` if serialization fails
    pub fn list_cases(json: bool) -> Result<()> {
        if json {
            println!("{}", render_cases_json()?);
        } else {
            output_cases_table(CASES);
        }
        Ok(())
    }

    /// Full catalog as pretty JSON
    pub fn render_cases_json() -> Result<String> {
        serde_json::to_string_pretty(CASES).map_err(|e| CoachError::Serialization(e).into())
    }

    fn output_cases_table(cases: &[CaseTemplate]) {
        let mut table = Table::new();
        table.add_row(row!["Case ID", "Title", "Risk", "Description"]);
        for case in cases {
            table.add_row(row![case.id, case.title, case.risk_tag.as_str(), case.description]);
        }

        println!("\nTraining cases:\n");
        table.printstd();
        println!("\nStart one with: crisis-coach practice --case <CASE ID>\n");
    }
}

// Practice session command handler
pub mod practice {
    //! Interactive practice session.
    //!
    //! Each input line is a counselor turn sent to the simulated client.
    //! After every reply the round is coached in the background; coaching
    //! that has landed is printed before the next prompt.

    use super::practice_commands::{parse_practice_command, print_help, PracticeCommand};
    use super::*;
    use crate::providers::{create_client, CompletionClient, MISSING_API_KEY_MESSAGE};
    use crate::schema::CrisisLevel;
    use crate::session::{CoachingDispatcher, CoachingEvent, RoundSnapshot, Session};
    use crate::tasks::{client_reply, polish_draft, quick_feedback, session_report};
    use colored::{ColoredString, Colorize};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Run a practice session until `/quit`, Ctrl-C or Ctrl-D
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `case_id` - Case to practice; a random case when `None`
    ///
    /// # Errors
    ///
    /// Returns error if the case id is unknown, no API key is configured, or
    /// the line editor cannot be initialized
    pub async fn run_practice(config: Config, case_id: Option<String>) -> Result<()> {
        let case = resolve_case(case_id.as_deref())?;
        let client = create_client(&config.model)?;
        if !client.is_configured() {
            return Err(CoachError::Configuration(MISSING_API_KEY_MESSAGE.to_string()).into());
        }

        let (dispatcher, mut events) = CoachingDispatcher::new(Arc::clone(&client));
        let mut session = Session::start(case);
        let mut rl = DefaultEditor::new()?;

        print_brief(case);
        println!("{} {}\n", "Client:".cyan().bold(), case.opening);

        loop {
            drain_events(&mut session, &mut events);

            let prompt = format!("{} ", "Counselor>".green().bold());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_practice_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e);
                            continue;
                        }
                    };

                    match command {
                        PracticeCommand::Turn(text) => {
                            let request = session.roleplay_request(&text);
                            match client_reply(client.as_ref(), &request).await {
                                Ok(response) => {
                                    println!("\n{} {}\n", "Client:".cyan().bold(), response.reply);
                                    let ticket = session.record_reply(&text, &response.reply);
                                    let _ = dispatcher.spawn(&mut session, ticket);
                                }
                                Err(e) => print_error(&e),
                            }
                        }
                        PracticeCommand::Polish(draft) => {
                            let request = session.polish_request(&draft);
                            match polish_draft(client.as_ref(), &request).await {
                                Ok(response) => {
                                    println!("\n{}\n{}\n", "Polished draft:".bold(), response.polished)
                                }
                                Err(e) => print_error(&e),
                            }
                        }
                        PracticeCommand::Feedback => {
                            let request = session.feedback_request();
                            match quick_feedback(client.as_ref(), &request).await {
                                Ok(response) => println!("\n{}\n", response.feedback),
                                Err(e) => print_error(&e),
                            }
                        }
                        PracticeCommand::Report => {
                            settle(&mut session, &mut events).await;
                            println!("{}", "Generating session report...".dimmed());
                            let request = session.report_request();
                            match session_report(client.as_ref(), &request).await {
                                Ok(response) => println!("\n{}\n", response.report),
                                Err(e) => print_error(&e),
                            }
                        }
                        PracticeCommand::Rounds => print_rounds(&session),
                        PracticeCommand::Brief => print_brief(session.case()),
                        PracticeCommand::Help => print_help(),
                        PracticeCommand::Quit => break,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!(
            "Session ended after {} coached round(s).",
            session.rounds().len()
        );
        Ok(())
    }

    /// Looks up `case_id`, or picks a random case
    pub fn resolve_case(case_id: Option<&str>) -> Result<&'static CaseTemplate> {
        match case_id {
            Some(id) => find_case(id).ok_or_else(|| {
                CoachError::InvalidRequest(format!(
                    "Unknown case id: {}. Run `crisis-coach cases` to list them.",
                    id
                ))
                .into()
            }),
            None => Ok(random_case()),
        }
    }

    /// Applies coaching that has already landed without waiting
    fn drain_events(session: &mut Session, events: &mut UnboundedReceiver<CoachingEvent>) {
        while let Ok(event) = events.try_recv() {
            show_event(&event);
            session.apply(event);
        }
    }

    /// Waits for every in-flight coaching run
    async fn settle(session: &mut Session, events: &mut UnboundedReceiver<CoachingEvent>) {
        if session.coaching_in_flight() > 0 {
            println!("{}", "Waiting for round coaching to finish...".dimmed());
        }
        while session.coaching_in_flight() > 0 {
            match events.recv().await {
                Some(event) => {
                    show_event(&event);
                    session.apply(event);
                }
                None => break,
            }
        }
    }

    fn show_event(event: &CoachingEvent) {
        match event {
            CoachingEvent::Completed(snapshot) => print_round(snapshot),
            CoachingEvent::Failed { round, error } => {
                eprintln!(
                    "{} {}\n",
                    format!("Round {} coaching failed:", round).red().bold(),
                    error
                );
            }
        }
    }

    fn print_error(err: &anyhow::Error) {
        eprintln!("{} {}\n", "Error:".red().bold(), err);
    }

    fn level_tag(level: CrisisLevel) -> ColoredString {
        match level {
            CrisisLevel::Low => level.as_str().green(),
            CrisisLevel::Medium => level.as_str().yellow(),
            CrisisLevel::High => level.as_str().red(),
            CrisisLevel::Imminent => level.as_str().red().bold(),
        }
    }

    fn print_brief(case: &CaseTemplate) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              Crisis Coach Practice Session                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Case:  {} ({})", case.title.bold(), case.id);
        println!("Risk:  {}", case.profile.risk_level);
        println!("Brief: {}\n", case.brief);
        println!("Type '/help' for available commands, '/quit' to end\n");
    }

    fn print_round(snapshot: &RoundSnapshot) {
        let coach = &snapshot.coach;
        println!(
            "\n{}",
            format!("── Round {} coaching ──", snapshot.round).yellow().bold()
        );
        println!("Summary:      {}", coach.summary);
        println!("Suggestion:   {}", coach.suggestion);
        println!(
            "Emotion:      {}  |  Crisis level: {}  |  Technique: {}",
            coach.emotion,
            level_tag(coach.crisis_level),
            coach.technique_used
        );
        println!("Did well:     {}", coach.current_turn_feedback.did_well);
        println!("To improve:   {}", coach.current_turn_feedback.needs_improvement);
        for (index, option) in coach.recommended_options.iter().enumerate() {
            println!("Option {}:     {}", index + 1, option);
        }
        let scores = &coach.skill_scores;
        println!(
            "Scores:       empathy {} · listening {} · risk {} · safety {} · problem solving {}\n",
            scores.empathy,
            scores.active_listening,
            scores.risk_assessment,
            scores.safety_planning,
            scores.problem_solving
        );
    }

    fn print_rounds(session: &Session) {
        if session.rounds().is_empty() {
            println!("\nNo coached rounds yet.\n");
        }
        for snapshot in session.rounds() {
            println!("\n{} {}", "Counselor:".green(), snapshot.counselor_message);
            println!("{} {}", "Client:".cyan(), snapshot.client_message);
            print_round(snapshot);
        }
        if let Some(error) = session.round_error() {
            eprintln!("{} {}\n", "Last coaching error:".red(), error);
        }
        if session.coaching_in_flight() > 0 {
            println!("{} round(s) still being coached.\n", session.coaching_in_flight());
        }
    }

}
