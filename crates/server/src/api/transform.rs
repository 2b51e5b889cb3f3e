//! AI transformation endpoints: flashcards, quiz, enhanced notes, audio.
//!
//! Thin HTTP shells over `ContentTransformer`; all prompt and parsing
//! logic lives in the transform crate.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use studymorph_core::LearningStyle;
use studymorph_transform::{Flashcard, QuizItem, TransformOutput, TransformRequest};

use crate::state::AppState;

use super::{error, require_transformer, speech_error, transform_error, ApiError};

fn default_flashcard_count() -> usize {
    10
}

fn default_question_count() -> usize {
    5
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct FlashcardsRequest {
    pub content: String,
    #[serde(default = "default_flashcard_count")]
    pub count: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FlashcardsResponse {
    #[schema(value_type = Vec<Object>)]
    pub flashcards: Vec<Flashcard>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub content: String,
    #[serde(default = "default_question_count")]
    pub question_count: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizResponse {
    #[schema(value_type = Vec<Object>)]
    pub questions: Vec<QuizItem>,
}

/// Body for the two style-keyed routes (`/transform/notes`, `/transform/audio`).
#[derive(Deserialize, utoipa::ToSchema)]
pub struct StyledRequest {
    pub content: String,
    /// One of `visual`, `auditory`, `kinesthetic`, `reading`.
    #[schema(value_type = String)]
    pub style: LearningStyle,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NotesResponse {
    /// Markdown notes rewritten for the requested learning style.
    pub content: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudioResponse {
    /// The narration script, always present.
    pub script: String,
    /// Base64 MP3, present only when a speech provider is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_format: Option<&'static str>,
}

/// Generate flashcards from study content
#[utoipa::path(
    post,
    path = "/transform/flashcards",
    tag = "Transform",
    request_body = FlashcardsRequest,
    responses(
        (status = 200, description = "Generated flashcards", body = FlashcardsResponse),
        (status = 400, description = "Empty content", body = super::ErrorResponse),
        (status = 503, description = "LLM provider not configured", body = super::ErrorResponse)
    )
)]
pub async fn transform_flashcards(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FlashcardsRequest>,
) -> Result<Json<FlashcardsResponse>, ApiError> {
    let transformer = require_transformer(&state)?;
    let output = transformer
        .transform(TransformRequest::Flashcards {
            content: req.content,
            count: req.count,
        })
        .await
        .map_err(transform_error)?;
    let TransformOutput::Flashcards(flashcards) = output else {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "unexpected transform output"));
    };
    Ok(Json(FlashcardsResponse { flashcards }))
}

/// Generate a practice quiz from study content
#[utoipa::path(
    post,
    path = "/transform/quiz",
    tag = "Transform",
    request_body = QuizRequest,
    responses(
        (status = 200, description = "Generated quiz questions", body = QuizResponse),
        (status = 400, description = "Empty content", body = super::ErrorResponse),
        (status = 503, description = "LLM provider not configured", body = super::ErrorResponse)
    )
)]
pub async fn transform_quiz(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuizRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    let transformer = require_transformer(&state)?;
    let output = transformer
        .transform(TransformRequest::Quiz {
            content: req.content,
            question_count: req.question_count,
        })
        .await
        .map_err(transform_error)?;
    let TransformOutput::Quiz(questions) = output else {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "unexpected transform output"));
    };
    Ok(Json(QuizResponse { questions }))
}

/// Rewrite notes for a learning style
#[utoipa::path(
    post,
    path = "/transform/notes",
    tag = "Transform",
    request_body = StyledRequest,
    responses(
        (status = 200, description = "Style-enhanced notes", body = NotesResponse),
        (status = 400, description = "Empty content", body = super::ErrorResponse),
        (status = 503, description = "LLM provider not configured", body = super::ErrorResponse)
    )
)]
pub async fn transform_notes(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StyledRequest>,
) -> Result<Json<NotesResponse>, ApiError> {
    let transformer = require_transformer(&state)?;
    let output = transformer
        .transform(TransformRequest::EnhancedNotes {
            content: req.content,
            style: req.style,
        })
        .await
        .map_err(transform_error)?;
    let TransformOutput::EnhancedNotes(content) = output else {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "unexpected transform output"));
    };
    Ok(Json(NotesResponse { content }))
}

/// Narrate notes as audio
///
/// Always produces the narration script. When a speech provider is
/// configured the synthesized MP3 rides along base64-encoded; a
/// configured provider that fails surfaces its upstream status instead
/// of silently degrading to script-only.
#[utoipa::path(
    post,
    path = "/transform/audio",
    tag = "Transform",
    request_body = StyledRequest,
    responses(
        (status = 200, description = "Narration script, with audio when available", body = AudioResponse),
        (status = 400, description = "Empty content", body = super::ErrorResponse),
        (status = 503, description = "LLM provider not configured", body = super::ErrorResponse)
    )
)]
pub async fn transform_audio(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StyledRequest>,
) -> Result<Json<AudioResponse>, ApiError> {
    let transformer = require_transformer(&state)?;
    let output = transformer
        .transform(TransformRequest::AudioScript {
            content: req.content,
            style: req.style,
        })
        .await
        .map_err(transform_error)?;
    let TransformOutput::AudioScript(script) = output else {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "unexpected transform output"));
    };

    let (audio_data, audio_format) = match &state.speech {
        Some(speech) => {
            let bytes = speech.synthesize(&script).await.map_err(speech_error)?;
            (Some(BASE64.encode(&bytes)), Some("mp3"))
        }
        None => (None, None),
    };

    Ok(Json(AudioResponse {
        script,
        audio_data,
        audio_format,
    }))
}
