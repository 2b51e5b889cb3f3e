//! Health and configuration introspection endpoints.
//!
//! SRP: server readiness and redacted configuration.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store_backend: String,
    pub extractor: &'static str,
    pub transformer_ready: bool,
    pub speech_ready: bool,
    pub question_count: usize,
}

/// Service health and subsystem readiness
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: "0.1.0",
        store_backend: state.config.store.backend.clone(),
        extractor: if state.config.extraction.extractor_url.is_some() {
            "remote"
        } else {
            "embedded"
        },
        transformer_ready: state.transformer.is_some(),
        speech_ready: state.speech.is_some(),
        question_count: state.question_bank.len(),
    })
}

/// Redacted configuration summary
///
/// Returns the active configuration with API keys removed.
#[utoipa::path(
    get,
    path = "/config",
    tag = "Health",
    responses(
        (status = 200, description = "Active configuration, secrets redacted")
    )
)]
pub async fn config_summary(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.config.redacted_summary())
}
