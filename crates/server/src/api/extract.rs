//! Stateless extraction contract endpoint.
//!
//! The same JSON contract the pipeline's remote stage speaks, so one
//! instance can serve as the `EXTRACTOR_URL` backend of another.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use studymorph_core::FileRef;
use studymorph_extract::{extract_bytes, ExtractionJob, FetchError, FileKind};

use crate::state::AppState;

use super::{bad_request, error, ApiError};

#[derive(Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractRequest {
    /// `data:` or http(s) URL of the document.
    pub file_url: Option<String>,
    /// Server-local path, for same-host callers.
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    /// Extracted text, or a sentinel marker when no text was found.
    pub extracted_text: String,
}

/// Extract text from a document
///
/// Accepts the document either as `fileUrl` (data URL or fetchable http
/// URL) or as a server-local `filePath`. Outcomes that find no text
/// answer 200 with a sentinel marker in `extractedText`, never an error.
#[utoipa::path(
    post,
    path = "/extract",
    tag = "Extraction",
    request_body = ExtractRequest,
    responses(
        (status = 200, description = "Extraction result", body = ExtractResponse),
        (status = 400, description = "Missing or unreadable input", body = super::ErrorResponse),
        (status = 500, description = "Fetch failure", body = super::ErrorResponse)
    )
)]
pub async fn extract_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let job = if let Some(url) = req.file_url {
        let file_ref = FileRef::from(url);
        ExtractionJob::resolve(
            &state.http,
            &file_ref,
            req.file_type.as_deref(),
            req.file_name.as_deref(),
        )
        .await
        .map_err(|e| match e {
            FetchError::DataUrl(msg) => bad_request(format!("invalid data URL: {msg}")),
            FetchError::Http(err) => error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to fetch file: {err}"),
            ),
        })?
    } else if let Some(path) = req.file_path {
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| bad_request(format!("failed to read {path}: {e}")))?;
        let file_name = req.file_name.or_else(|| {
            FsPath::new(&path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        });
        let kind = FileKind::detect(req.file_type.as_deref(), file_name.as_deref());
        ExtractionJob::from_bytes(kind, file_name.as_deref(), bytes)
    } else {
        return Err(bad_request("fileUrl or filePath is required"));
    };

    let extracted_text = extract_bytes(job.kind, &job.bytes, job.file_name.as_deref());
    Ok(Json(ExtractResponse { extracted_text }))
}
