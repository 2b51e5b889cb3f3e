//! Domain-focused API endpoint modules.
//!
//! Each sub-module owns a single responsibility area.
//! Shared error types and upstream status mapping live here in mod.rs.

pub mod assessment;
pub mod doc;
pub mod extract;
pub mod health;
pub mod notes;
pub mod transform;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use studymorph_store::StoreError;
use studymorph_transform::{ContentTransformer, SpeechError, TransformError};

use crate::state::AppState;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub(crate) fn bad_request(message: impl Into<String>) -> ApiError {
    error(StatusCode::BAD_REQUEST, message)
}

pub(crate) fn not_found(message: impl Into<String>) -> ApiError {
    error(StatusCode::NOT_FOUND, message)
}

// ── Subsystem guard ──────────────────────────────────────────────

/// Return 503 when no LLM provider is configured.
pub(crate) fn require_transformer(state: &AppState) -> Result<&ContentTransformer, ApiError> {
    state.transformer.as_ref().ok_or_else(|| {
        error(
            StatusCode::SERVICE_UNAVAILABLE,
            "LLM provider not configured. Set LLM_PROVIDER and API keys.",
        )
    })
}

// ── Upstream status mapping ──────────────────────────────────────

/// Provider failures keep 402 (payment required) and 429 (rate limited) so
/// the client can react to them; every other upstream status is a plain 500.
fn upstream_status(status: u16) -> StatusCode {
    match status {
        402 => StatusCode::PAYMENT_REQUIRED,
        429 => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn transform_error(e: TransformError) -> ApiError {
    let status = match &e {
        TransformError::EmptyContent => StatusCode::BAD_REQUEST,
        TransformError::Llm(llm) => llm
            .upstream_status()
            .map(upstream_status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        TransformError::InvalidResponse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error(status, e.to_string())
}

pub(crate) fn speech_error(e: SpeechError) -> ApiError {
    let status = e
        .upstream_status()
        .map(upstream_status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error(status, e.to_string())
}

pub(crate) fn store_error(e: StoreError) -> ApiError {
    match e {
        StoreError::Remote { status, body } => error(
            upstream_status(status),
            format!("notes API error: {}", body),
        ),
        other => error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

// ── Re-exports ───────────────────────────────────────────────────
// Preserves flat `api::foo` import paths used by router.rs registration.

pub use assessment::{assessment_questions, assessment_score};
pub use extract::extract_document;
pub use health::{config_summary, health};
pub use notes::{
    notes_consolidate, notes_create, notes_delete, notes_extract, notes_get, notes_list,
    notes_update,
};
pub use transform::{transform_audio, transform_flashcards, transform_notes, transform_quiz};
