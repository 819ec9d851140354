//! In-memory practice session and background round coaching
//!
//! A [`Session`] owns the transcript and the per-round coaching history for
//! one practice run. Round coaching is slow relative to the client reply, so
//! [`CoachingDispatcher`] runs it on a spawned task and hands the result back
//! as a [`CoachingEvent`] over a channel; the session applies events in
//! whatever order they arrive.

use crate::cases::{CaseProfile, CaseTemplate};
use crate::providers::CompletionClient;
use crate::schema::RoundCoach;
use crate::tasks::coach::{coach_round, CoachRequest, SESSION_START_FEEDBACK};
use crate::tasks::{FeedbackRequest, PolishRequest, ReportRequest, RoleplayRequest};
use crate::transcript::{counselor_turns, Message};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Coaching result for one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    /// 1-based round number (counselor turn count)
    pub round: usize,
    pub counselor_message: String,
    pub client_message: String,
    pub coach: RoundCoach,
}

/// Identifies the exchange a coaching request belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTicket {
    pub round: usize,
    pub counselor_message: String,
    pub client_message: String,
}

/// Outcome of a background coaching run
#[derive(Debug, Clone)]
pub enum CoachingEvent {
    /// Coaching finished for a round
    Completed(RoundSnapshot),
    /// Coaching failed; the transcript is unaffected
    Failed { round: usize, error: String },
}

/// One practice run
#[derive(Debug, Clone)]
pub struct Session {
    case: &'static CaseTemplate,
    profile: CaseProfile,
    messages: Vec<Message>,
    rounds: Vec<RoundSnapshot>,
    round_error: Option<String>,
    coaching_in_flight: usize,
}

impl Session {
    /// Starts a session seeded with the case's opening line
    pub fn start(case: &'static CaseTemplate) -> Self {
        tracing::info!(case = case.id, "Starting practice session");
        Self {
            case,
            profile: case.profile.to_profile(),
            messages: vec![Message::client(case.opening)],
            rounds: Vec::new(),
            round_error: None,
            coaching_in_flight: 0,
        }
    }

    /// Case being practiced
    pub fn case(&self) -> &'static CaseTemplate {
        self.case
    }

    /// Transcript so far
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Coached rounds, sorted by round number
    pub fn rounds(&self) -> &[RoundSnapshot] {
        &self.rounds
    }

    /// Coaching for round `n`, if it has landed
    pub fn round(&self, n: usize) -> Option<&RoundSnapshot> {
        self.rounds.iter().find(|snapshot| snapshot.round == n)
    }

    /// Most recent coaching error, cleared when the next run starts
    pub fn round_error(&self) -> Option<&str> {
        self.round_error.as_deref()
    }

    /// Number of coaching runs not yet applied
    pub fn coaching_in_flight(&self) -> usize {
        self.coaching_in_flight
    }

    /// Coaching of the highest round, or the session-start placeholder
    pub fn latest_coach(&self) -> RoundCoach {
        self.rounds
            .last()
            .map(|snapshot| snapshot.coach.clone())
            .unwrap_or_else(RoundCoach::session_start)
    }

    /// Role-play request for a counselor turn that has not been recorded yet
    pub fn roleplay_request(&self, counselor_message: &str) -> RoleplayRequest {
        let mut messages = self.messages.clone();
        messages.push(Message::counselor(counselor_message));
        RoleplayRequest {
            messages,
            case_profile: self.profile.clone(),
        }
    }

    /// Appends a completed exchange and returns its round ticket
    pub fn record_reply(&mut self, counselor_message: &str, reply: &str) -> RoundTicket {
        self.messages.push(Message::counselor(counselor_message));
        self.messages.push(Message::client(reply));
        RoundTicket {
            round: counselor_turns(&self.messages),
            counselor_message: counselor_message.to_string(),
            client_message: reply.to_string(),
        }
    }

    /// Coaching request for the current transcript
    ///
    /// The previous feedback is the latest coached summary, or the
    /// session-start marker before any round has landed.
    pub fn coach_request(&self) -> CoachRequest {
        let previous_feedback = match self.rounds.last() {
            Some(snapshot) => snapshot.coach.summary.clone(),
            None => SESSION_START_FEEDBACK.to_string(),
        };
        CoachRequest {
            messages: self.messages.clone(),
            case_profile: self.profile.clone(),
            previous_feedback,
        }
    }

    /// Polish request for a draft
    pub fn polish_request(&self, draft: &str) -> PolishRequest {
        PolishRequest {
            draft: draft.to_string(),
            messages: self.messages.clone(),
            case_profile: self.profile.clone(),
        }
    }

    /// Quick-feedback request
    pub fn feedback_request(&self) -> FeedbackRequest {
        FeedbackRequest {
            messages: self.messages.clone(),
            case_profile: self.profile.clone(),
        }
    }

    /// Report request carrying the latest coach note
    pub fn report_request(&self) -> ReportRequest {
        ReportRequest {
            messages: self.messages.clone(),
            case_profile: self.profile.clone(),
            quick_feedback: self.latest_coach().headline(),
        }
    }

    /// Inserts or replaces the snapshot for its round, keeping rounds sorted
    pub fn upsert_round(&mut self, snapshot: RoundSnapshot) {
        self.rounds.retain(|existing| existing.round != snapshot.round);
        self.rounds.push(snapshot);
        self.rounds.sort_by_key(|existing| existing.round);
    }

    /// Applies a background coaching result
    pub fn apply(&mut self, event: CoachingEvent) {
        self.coaching_in_flight = self.coaching_in_flight.saturating_sub(1);
        match event {
            CoachingEvent::Completed(snapshot) => {
                tracing::debug!(round = snapshot.round, "Round coaching applied");
                self.upsert_round(snapshot);
            }
            CoachingEvent::Failed { round, error } => {
                tracing::warn!(round, "Round coaching failed: {}", error);
                self.round_error = Some(error);
            }
        }
    }
}

/// Runs round coaching in the background
pub struct CoachingDispatcher {
    client: Arc<dyn CompletionClient>,
    events: mpsc::UnboundedSender<CoachingEvent>,
}

impl CoachingDispatcher {
    /// Creates a dispatcher and the receiver its events arrive on
    pub fn new(client: Arc<dyn CompletionClient>) -> (Self, mpsc::UnboundedReceiver<CoachingEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (Self { client, events }, receiver)
    }

    /// Starts coaching the round described by `ticket`
    ///
    /// Clears the session's previous coaching error and counts the run as in
    /// flight until its event is applied.
    pub fn spawn(&self, session: &mut Session, ticket: RoundTicket) -> JoinHandle<()> {
        let request = session.coach_request();
        session.round_error = None;
        session.coaching_in_flight += 1;

        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = match coach_round(client.as_ref(), &request).await {
                Ok(response) => CoachingEvent::Completed(RoundSnapshot {
                    round: ticket.round,
                    counselor_message: ticket.counselor_message,
                    client_message: ticket.client_message,
                    coach: response.coach,
                }),
                Err(e) => CoachingEvent::Failed {
                    round: ticket.round,
                    error: e.to_string(),
                },
            };
            if events.send(event).is_err() {
                tracing::debug!("Coaching result dropped: session closed");
            }
        })
    }
}
