//! OpenAPI document served at /docs.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "studymorph API",
        version = "0.1.0",
        description = "Study-note storage, text extraction, and AI-powered \
                       transformation into flashcards, quizzes, enhanced notes, \
                       and narrated audio."
    ),
    paths(
        crate::api::health::health,
        crate::api::health::config_summary,
        crate::api::notes::notes_list,
        crate::api::notes::notes_create,
        crate::api::notes::notes_get,
        crate::api::notes::notes_update,
        crate::api::notes::notes_delete,
        crate::api::notes::notes_extract,
        crate::api::notes::notes_consolidate,
        crate::api::extract::extract_document,
        crate::api::transform::transform_flashcards,
        crate::api::transform::transform_quiz,
        crate::api::transform::transform_notes,
        crate::api::transform::transform_audio,
        crate::api::assessment::assessment_questions,
        crate::api::assessment::assessment_score,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::health::HealthResponse,
        crate::api::notes::ExtractRetryResponse,
        crate::api::notes::ConsolidateRequest,
        crate::api::notes::ConsolidateResponse,
        crate::api::extract::ExtractRequest,
        crate::api::extract::ExtractResponse,
        crate::api::transform::FlashcardsRequest,
        crate::api::transform::FlashcardsResponse,
        crate::api::transform::QuizRequest,
        crate::api::transform::QuizResponse,
        crate::api::transform::StyledRequest,
        crate::api::transform::NotesResponse,
        crate::api::transform::AudioResponse,
        crate::api::assessment::QuestionsResponse,
        crate::api::assessment::ScoreRequest,
        crate::api::assessment::ScoreResponse,
    )),
    tags(
        (name = "Health", description = "Service status and configuration"),
        (name = "Notes", description = "Note storage, upload, and consolidation"),
        (name = "Extraction", description = "Document text extraction"),
        (name = "Transform", description = "AI study-format transformations"),
        (name = "Assessment", description = "Learning-style self-assessment")
    )
)]
pub struct ApiDoc;
