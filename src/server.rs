//! HTTP API for the browser client
//!
//! Every task route checks for a model credential before touching the
//! request body, so a misconfigured deployment answers each call with the
//! same 500 message instead of failing somewhere inside a pipeline.

use crate::cases::CASES;
use crate::config::Config;
use crate::error::{CoachError, Result};
use crate::providers::{create_client, CompletionClient, MISSING_API_KEY_MESSAGE};
use crate::tasks;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

/// Shared, immutable handler state
#[derive(Clone)]
pub struct AppState {
    client: Arc<dyn CompletionClient>,
}

impl AppState {
    /// Wraps a completion client for the handlers
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

/// Error returned by handlers, rendered as `{"error": "..."}`
///
/// Invalid requests map to 400; everything else is a 500 carrying the
/// upstream message verbatim.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<CoachError>() {
            Some(CoachError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Rejected request: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Builds the API router
///
/// # Examples
///
/// ```
/// use crisis_coach::config::ModelConfig;
/// use crisis_coach::providers::create_client;
/// use crisis_coach::server::{router, AppState};
///
/// let client = create_client(&ModelConfig::default()).unwrap();
/// let app = router(AppState::new(client));
/// ```
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/roleplay", post(roleplay))
        .route("/api/round-feedback", post(round_feedback))
        .route("/api/polish", post(polish))
        .route("/api/feedback", post(feedback))
        .route("/api/report", post(report))
        .route("/api/cases", get(list_cases))
        .route("/health", get(health))
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C
///
/// # Errors
///
/// Returns error if the client cannot be built or the address cannot be
/// bound
pub async fn serve(config: &Config) -> Result<()> {
    let client = create_client(&config.model)?;
    if !client.is_configured() {
        tracing::warn!("{}", MISSING_API_KEY_MESSAGE);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(CoachError::Io)?;
    tracing::info!("Crisis Coach API listening on http://{}", addr);

    axum::serve(listener, router(AppState::new(client)))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
        })
        .await
        .map_err(CoachError::Io)?;
    Ok(())
}

/// Credential check, then body decoding
fn accept<T: DeserializeOwned>(
    state: &AppState,
    body: std::result::Result<Json<T>, JsonRejection>,
) -> std::result::Result<T, ApiError> {
    if !state.client.is_configured() {
        return Err(CoachError::Configuration(MISSING_API_KEY_MESSAGE.to_string()).into());
    }
    let Json(request) = body.map_err(|rejection| {
        CoachError::InvalidRequest(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    Ok(request)
}

async fn roleplay(
    State(state): State<AppState>,
    body: std::result::Result<Json<tasks::RoleplayRequest>, JsonRejection>,
) -> ApiResult<tasks::RoleplayResponse> {
    let request = accept(&state, body)?;
    Ok(Json(tasks::client_reply(state.client.as_ref(), &request).await?))
}

async fn round_feedback(
    State(state): State<AppState>,
    body: std::result::Result<Json<tasks::CoachRequest>, JsonRejection>,
) -> ApiResult<tasks::CoachResponse> {
    let request = accept(&state, body)?;
    Ok(Json(tasks::coach_round(state.client.as_ref(), &request).await?))
}

async fn polish(
    State(state): State<AppState>,
    body: std::result::Result<Json<tasks::PolishRequest>, JsonRejection>,
) -> ApiResult<tasks::PolishResponse> {
    let request = accept(&state, body)?;
    Ok(Json(tasks::polish_draft(state.client.as_ref(), &request).await?))
}

async fn feedback(
    State(state): State<AppState>,
    body: std::result::Result<Json<tasks::FeedbackRequest>, JsonRejection>,
) -> ApiResult<tasks::FeedbackResponse> {
    let request = accept(&state, body)?;
    Ok(Json(tasks::quick_feedback(state.client.as_ref(), &request).await?))
}

async fn report(
    State(state): State<AppState>,
    body: std::result::Result<Json<tasks::ReportRequest>, JsonRejection>,
) -> ApiResult<tasks::ReportResponse> {
    let request = accept(&state, body)?;
    Ok(Json(tasks::session_report(state.client.as_ref(), &request).await?))
}

async fn list_cases() -> Json<&'static [crate::cases::CaseTemplate]> {
    Json(CASES)
}

async fn health() -> &'static str {
    "OK"
}
