//! Axum route handlers for the summary endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::{ApiError, AppError};
use crate::state::AppState;
use crate::summary::prompts::build_messages;
use crate::summary::request::SummaryRequest;

pub const ROUTE_NAME: &str = "ai-summary";

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// GET /api/ai-summary
///
/// Static liveness payload for the route.
pub async fn handle_summary_status() -> Json<Value> {
    Json(json!({ "ok": true, "route": ROUTE_NAME }))
}

/// OPTIONS /api/ai-summary
///
/// CORS preflight. Headers are added by the CORS middleware.
pub async fn handle_summary_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Any other method on /api/ai-summary.
pub async fn handle_summary_method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}

/// POST /api/ai-summary
///
/// Validates the body, renders the prompt, and relays the model's summary.
/// Validation failures never reach the completion API.
pub async fn handle_summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    summarize(&state, payload, request_id)
        .await
        .map(Json)
        .map_err(|e| e.with_request_id(request_id))
}

#[tracing::instrument(name = "ai_summary", skip(state, payload))]
async fn summarize(
    state: &AppState,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
    request_id: Uuid,
) -> Result<SummaryResponse, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let input = request.validate()?;

    let messages = build_messages(&input);
    let completion = state
        .llm
        .complete(
            &messages,
            &state.config.ai_model,
            state.config.ai_fallback_model.as_deref(),
        )
        .await?;

    info!(
        "Summary generated: role={}, model={}, chars={}",
        input.role,
        completion.model,
        completion.text.len()
    );

    Ok(SummaryResponse {
        summary: completion.text,
    })
}
