//! Note CRUD, file upload, manual extraction retry, and consolidation.
//!
//! SRP: everything that reads or mutates the notes repository.

use std::sync::Arc;

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use studymorph_core::{FileRef, NewNote, Note, NoteId, NoteUpdate};
use studymorph_extract::ExtractionOutcome;
use studymorph_transform::{NoteSection, TransformOutput, TransformRequest};

use crate::state::AppState;

use super::{
    bad_request, error, not_found, require_transformer, store_error, transform_error, ApiError,
};

// ── CRUD ─────────────────────────────────────────────────────────

/// List all notes
#[utoipa::path(
    get,
    path = "/notes",
    tag = "Notes",
    responses(
        (status = 200, description = "All stored notes"),
        (status = 500, description = "Store failure", body = super::ErrorResponse)
    )
)]
pub async fn notes_list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Note>>, ApiError> {
    state.store.list().await.map(Json).map_err(store_error)
}

/// Create a note
///
/// Accepts either a JSON note body or multipart/form-data with a `file`
/// field (and optional `title`). Uploaded files are embedded as data URLs.
/// When the new note has a file and no usable text, the extraction
/// pipeline runs inline and the extracted text is persisted with the note.
#[utoipa::path(
    post,
    path = "/notes",
    tag = "Notes",
    responses(
        (status = 201, description = "Note created, extraction applied when possible"),
        (status = 400, description = "Invalid body or missing title", body = super::ErrorResponse)
    )
)]
pub async fn notes_create(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let new = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| bad_request(format!("multipart error: {e}")))?;
        new_note_from_multipart(multipart).await?
    } else {
        let Json(new) = Json::<NewNote>::from_request(req, &())
            .await
            .map_err(|e| bad_request(format!("invalid JSON body: {e}")))?;
        if new.title.trim().is_empty() {
            return Err(bad_request("title is required"));
        }
        new
    };

    let mut note = state.store.add(new).await.map_err(store_error)?;
    if note.needs_extraction() {
        (note, _) = run_extraction(&state, note).await?;
    }
    Ok((StatusCode::CREATED, Json(note)))
}

/// Get a single note
#[utoipa::path(
    get,
    path = "/notes/{id}",
    tag = "Notes",
    params(("id" = String, Path, description = "Note UUID")),
    responses(
        (status = 200, description = "The note"),
        (status = 404, description = "Not found", body = super::ErrorResponse)
    )
)]
pub async fn notes_get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<NoteId>,
) -> Result<Json<Note>, ApiError> {
    state
        .store
        .get(id)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(|| not_found("note not found"))
}

/// Update a note
///
/// Partial update: only supplied fields change.
#[utoipa::path(
    put,
    path = "/notes/{id}",
    tag = "Notes",
    params(("id" = String, Path, description = "Note UUID")),
    request_body = Object,
    responses(
        (status = 200, description = "Updated note"),
        (status = 404, description = "Not found", body = super::ErrorResponse)
    )
)]
pub async fn notes_update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<NoteId>,
    Json(update): Json<NoteUpdate>,
) -> Result<Json<Note>, ApiError> {
    state
        .store
        .update(id, update)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(|| not_found("note not found"))
}

/// Delete a note
#[utoipa::path(
    delete,
    path = "/notes/{id}",
    tag = "Notes",
    params(("id" = String, Path, description = "Note UUID")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 404, description = "Not found", body = super::ErrorResponse)
    )
)]
pub async fn notes_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<NoteId>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(id).await.map_err(store_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("note not found"))
    }
}

// ── Extraction retry ─────────────────────────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct ExtractRetryResponse {
    /// Whether this call stored newly extracted text.
    pub extracted: bool,
    #[schema(value_type = Object)]
    pub note: Note,
}

/// Retry text extraction for a note
///
/// Runs only when the note's content is absent or a sentinel; a note with
/// usable text is returned unchanged. A pipeline run that finds no text
/// leaves the note untouched and reports `extracted: false`.
#[utoipa::path(
    post,
    path = "/notes/{id}/extract",
    tag = "Notes",
    params(("id" = String, Path, description = "Note UUID")),
    responses(
        (status = 200, description = "Extraction attempted", body = ExtractRetryResponse),
        (status = 404, description = "Not found", body = super::ErrorResponse)
    )
)]
pub async fn notes_extract(
    State(state): State<Arc<AppState>>,
    Path(id): Path<NoteId>,
) -> Result<Json<ExtractRetryResponse>, ApiError> {
    let note = state
        .store
        .get(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| not_found("note not found"))?;

    // Usable content is authoritative; never extract over it.
    if !note.needs_extraction() {
        return Ok(Json(ExtractRetryResponse {
            extracted: false,
            note,
        }));
    }

    let (note, extracted) = run_extraction(&state, note).await?;
    Ok(Json(ExtractRetryResponse { extracted, note }))
}

/// Run the pipeline for a note that needs text, persisting the result.
/// A `NoText` outcome leaves the note untouched.
async fn run_extraction(state: &AppState, note: Note) -> Result<(Note, bool), ApiError> {
    let Some(file_ref) = note.file_ref.clone() else {
        return Ok((note, false));
    };

    let outcome = state
        .pipeline
        .run(&file_ref, note.file_type.as_deref(), note.file_name.as_deref())
        .await;

    match outcome {
        ExtractionOutcome::Text { text, stage } => {
            info!(note = %note.id, stage, "storing extracted text");
            let updated = state
                .store
                .update(
                    note.id,
                    NoteUpdate {
                        text_content: Some(text),
                        ..Default::default()
                    },
                )
                .await
                .map_err(store_error)?
                .ok_or_else(|| not_found("note not found"))?;
            Ok((updated, true))
        }
        ExtractionOutcome::NoText => Ok((note, false)),
    }
}

// ── Consolidation ────────────────────────────────────────────────

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidateRequest {
    #[schema(value_type = Vec<String>)]
    pub note_ids: Vec<NoteId>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidateResponse {
    /// Markdown study guide merged from the selected notes.
    pub content: String,
    /// How many notes actually contributed content.
    pub note_count: usize,
}

/// Consolidate several notes into one study guide
///
/// Collects the referenced notes' usable content (sentinel and empty text
/// excluded) and merges it through the LLM. 400 when nothing usable remains.
#[utoipa::path(
    post,
    path = "/notes/consolidate",
    tag = "Notes",
    request_body = ConsolidateRequest,
    responses(
        (status = 200, description = "Consolidated study guide", body = ConsolidateResponse),
        (status = 400, description = "No usable content in the selection", body = super::ErrorResponse),
        (status = 404, description = "A referenced note does not exist", body = super::ErrorResponse),
        (status = 503, description = "LLM provider not configured", body = super::ErrorResponse)
    )
)]
pub async fn notes_consolidate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConsolidateRequest>,
) -> Result<Json<ConsolidateResponse>, ApiError> {
    if req.note_ids.is_empty() {
        return Err(bad_request("noteIds must not be empty"));
    }
    let transformer = require_transformer(&state)?;

    let mut sections = Vec::new();
    for id in &req.note_ids {
        let note = state
            .store
            .get(*id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| not_found(format!("note {} not found", id)))?;
        // Sentinel and empty content never reaches the transformer.
        if note.has_content() {
            if let Some(text) = note.text_content {
                sections.push(NoteSection {
                    title: note.title,
                    content: text,
                });
            }
        }
    }

    let note_count = sections.len();
    if note_count == 0 {
        return Err(bad_request("none of the selected notes have usable content"));
    }

    let output = transformer
        .transform(TransformRequest::Consolidate { sections })
        .await
        .map_err(transform_error)?;
    let TransformOutput::Consolidated(content) = output else {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "unexpected transform output"));
    };

    Ok(Json(ConsolidateResponse {
        content,
        note_count,
    }))
}

// ── Multipart upload ─────────────────────────────────────────────

/// Build a note from a multipart upload: a `file` part (any field carrying
/// a filename) embedded as a data URL, plus an optional `title` part.
async fn new_note_from_multipart(mut multipart: Multipart) -> Result<NewNote, ApiError> {
    let mut title: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("multipart error: {e}")))?
    {
        let field_name = field.name().map(str::to_string);
        if field_name.as_deref() == Some("title") {
            let text = field
                .text()
                .await
                .map_err(|e| bad_request(format!("multipart error: {e}")))?;
            title = Some(text);
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("failed to read upload: {e}")))?;
        file = Some((file_name, media_type, bytes.to_vec()));
    }

    let (file_name, media_type, bytes) = file.ok_or_else(|| bad_request("no file provided"))?;
    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| file_name.clone());

    Ok(NewNote {
        title,
        text_content: None,
        file_ref: Some(FileRef::from_bytes(&media_type, &bytes)),
        file_name: Some(file_name),
        file_type: Some(media_type),
    })
}
