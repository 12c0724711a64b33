//! Triage Conversation Routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use case_queue::NewCase;
use chrono::{DateTime, Utc};
use genai_client::Turn;
use serde::{Deserialize, Serialize};
use severity_classifier::Language;
use tracing::debug;
use uuid::Uuid;

use super::{badges, IdiomBadge, SeverityView};
use crate::{ApiError, SharedState};

/// Response for a new conversation
#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub welcome: String,
}

/// Conversation transcript
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub severity: SeverityView,
    pub peak_severity: SeverityView,
    pub turns: Vec<Turn>,
}

/// Patient message
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
    /// Display name for the health-worker queue
    pub patient: Option<String>,
}

/// Assistant reply with triage signals
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub reply: String,
    /// "generated" or "fallback"
    pub source: &'static str,
    pub severity: SeverityView,
    /// Present when the reply is a fallback
    pub fallback_notice: Option<&'static str>,
    pub language: Language,
    pub idioms: Vec<IdiomBadge>,
    /// Present for critical messages
    pub emergency_number: Option<String>,
    /// Present when the message was escalated to a health worker
    pub case_id: Option<Uuid>,
}

/// Start a conversation
pub async fn create_session(
    State(state): State<SharedState>,
) -> (StatusCode, Json<SessionCreated>) {
    let (session_id, handle) = state.sessions.create(state.engine.clone()).await;
    let welcome = handle
        .lock()
        .await
        .turns()
        .first()
        .map(|turn| turn.text.clone())
        .unwrap_or_default();

    (StatusCode::CREATED, Json(SessionCreated { session_id, welcome }))
}

/// Get a conversation transcript
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let handle = state
        .sessions
        .get(id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;
    let conversation = handle.lock().await;

    Ok(Json(SessionView {
        session_id: id,
        started_at: conversation.started_at(),
        severity: conversation.severity().into(),
        peak_severity: conversation.peak_severity().into(),
        turns: conversation.turns().to_vec(),
    }))
}

/// Send a patient message and get the assistant's reply
pub async fn send_message(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let handle = state
        .sessions
        .get(id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;

    // Held across the model call so turns stay in order.
    let outcome = handle.lock().await.send(&request.text).await?;

    let severity = outcome.reply.severity();
    let case = state.queue.submit(NewCase {
        session_id: id,
        patient: request.patient,
        message: request.text,
        language: outcome.assessment.language,
        idioms: outcome.assessment.idioms.clone(),
        severity,
    })?;
    if let Some(case) = &case {
        debug!("Session {} escalated as case {}", id, case.id);
    }

    Ok(Json(MessageResponse {
        reply: outcome.reply.text().to_string(),
        source: outcome.reply.source(),
        severity: severity.into(),
        fallback_notice: outcome.reply.fallback_reason().map(|r| r.notice()),
        language: outcome.assessment.language,
        idioms: badges(&outcome.assessment.idioms),
        emergency_number: severity
            .requires_emergency()
            .then(|| state.emergency_number.clone()),
        case_id: case.map(|c| c.id),
    }))
}
