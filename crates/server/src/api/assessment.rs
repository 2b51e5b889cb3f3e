//! Learning-style self-assessment endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use studymorph_core::LearningStyle;
use studymorph_quiz::{score_answers, Answer, QuizQuestion, StyleScores};

use crate::state::AppState;

use super::{bad_request, ApiError};

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionsResponse {
    #[schema(value_type = Vec<Object>)]
    pub questions: Vec<QuizQuestion>,
}

/// Fetch the self-assessment question bank
///
/// Questions include each option's style tag so clients can score
/// locally if they prefer; `/assessment/score` is the canonical path.
#[utoipa::path(
    get,
    path = "/assessment/questions",
    tag = "Assessment",
    responses((status = 200, description = "The question bank", body = QuestionsResponse))
)]
pub async fn assessment_questions(State(state): State<Arc<AppState>>) -> Json<QuestionsResponse> {
    Json(QuestionsResponse {
        questions: state.question_bank.questions.clone(),
    })
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ScoreRequest {
    /// `{ question, choice }` index pairs into the question bank.
    #[schema(value_type = Vec<Object>)]
    pub answers: Vec<Answer>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    /// Per-style tallies, one point per answer.
    #[schema(value_type = Object)]
    pub scores: StyleScores,
    #[schema(value_type = String)]
    pub dominant_style: LearningStyle,
    pub total: u32,
}

/// Score submitted self-assessment answers
#[utoipa::path(
    post,
    path = "/assessment/score",
    tag = "Assessment",
    request_body = ScoreRequest,
    responses(
        (status = 200, description = "Style tallies and dominant style", body = ScoreResponse),
        (status = 400, description = "Empty or out-of-range answers", body = super::ErrorResponse)
    )
)]
pub async fn assessment_score(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, ApiError> {
    if req.answers.is_empty() {
        return Err(bad_request("answers must not be empty"));
    }
    let scores = score_answers(&state.question_bank, &req.answers)
        .map_err(|e| bad_request(e.to_string()))?;
    Ok(Json(ScoreResponse {
        scores,
        dominant_style: scores.dominant(),
        total: scores.total(),
    }))
}
