//! Health-Worker Queue Routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use case_queue::{Case, CaseFilter, TierCounts};
use serde::Serialize;
use uuid::Uuid;

use crate::{ApiError, SharedState};

const MAX_LIMIT: usize = 500;

/// Response for queue listing
#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub data: Vec<Case>,
    pub count: usize,
    pub pending: TierCounts,
}

/// List cases, most urgent first
pub async fn list_cases(
    State(state): State<SharedState>,
    Query(mut filter): Query<CaseFilter>,
) -> Result<Json<QueueResponse>, ApiError> {
    filter.limit = Some(filter.limit.unwrap_or(50).min(MAX_LIMIT));

    let data = state.queue.list(&filter)?;
    let pending = state.queue.pending_counts()?;

    Ok(Json(QueueResponse {
        count: data.len(),
        pending,
        data,
    }))
}

/// Mark a case as seen
pub async fn acknowledge_case(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Case>, ApiError> {
    Ok(Json(state.queue.acknowledge(id)?))
}
