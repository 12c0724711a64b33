//! Classification Route

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use severity_classifier::Language;

use super::{badges, IdiomBadge, SeverityView};
use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub severity: SeverityView,
    pub matched_keyword: Option<String>,
    pub language: Language,
    pub idioms: Vec<IdiomBadge>,
}

/// Classify text without starting a conversation
pub async fn classify(
    State(state): State<SharedState>,
    Json(request): Json<ClassifyRequest>,
) -> Json<ClassifyResponse> {
    let assessment = state.engine.assess(&request.text);

    Json(ClassifyResponse {
        severity: assessment.severity().into(),
        matched_keyword: assessment.classification.matched_keyword,
        language: assessment.language,
        idioms: badges(&assessment.idioms),
    })
}
