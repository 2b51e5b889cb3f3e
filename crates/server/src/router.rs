//! Route registration: flat handler list plus CORS and body limits.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Uploads arrive base64-embedded in data URLs, so the limit is well above
/// the raw file sizes clients send.
const UPLOAD_BODY_LIMIT: usize = 50 * 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/health", get(api::health))
        .route("/config", get(api::config_summary))
        .route(
            "/notes",
            get(api::notes_list)
                .post(api::notes_create)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // /notes/consolidate MUST precede /notes/{id} so "consolidate" is not
        // captured as a note id.
        .route("/notes/consolidate", post(api::notes_consolidate))
        .route(
            "/notes/{id}",
            get(api::notes_get)
                .put(api::notes_update)
                .delete(api::notes_delete),
        )
        .route("/notes/{id}/extract", post(api::notes_extract))
        .route(
            "/extract",
            post(api::extract_document).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/transform/flashcards", post(api::transform_flashcards))
        .route("/transform/quiz", post(api::transform_quiz))
        .route("/transform/notes", post(api::transform_notes))
        .route("/transform/audio", post(api::transform_audio))
        .route("/assessment/questions", get(api::assessment_questions))
        .route("/assessment/score", post(api::assessment_score))
        .layer(cors)
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

/// CORS from config: `*` (the default) is fully permissive, anything else
/// restricts to the one configured origin.
fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!("Invalid CORS_ORIGIN {origin:?}, falling back to permissive CORS");
            CorsLayer::permissive()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use studymorph_core::sentinel::SENTINEL_PDF_ERROR;
    use studymorph_core::{Config, FileRef, LearningStyle, NewNote};
    use studymorph_extract::ExtractionPipeline;
    use studymorph_quiz::QuestionBank;
    use studymorph_transform::{ContentTransformer, LlmError, LlmProvider, Message};

    use crate::state::AppState;

    use super::build_router;

    /// Canned-response provider so transform routes run without a network.
    #[derive(Debug)]
    struct StubLlm(&'static str);

    #[async_trait::async_trait]
    impl LlmProvider for StubLlm {
        async fn complete(
            &self,
            _messages: Vec<Message>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    fn test_config(dir: &std::path::Path) -> Config {
        let mut config = Config::for_profile("");
        // Pin everything ambient so host env vars cannot leak in.
        config.server.cors_origin = "*".into();
        config.storage.data_dir = dir.to_path_buf();
        config.store.backend = "local".into();
        config.store.notes_api_url = None;
        config.extraction.extractor_url = None;
        config.ocr.command = None;
        config.llm.provider = "unconfigured".into();
        config.speech.api_key = None;
        config.quiz.file = None;
        config
    }

    /// App state over a tempdir-backed local store. `stub` installs a
    /// canned LLM reply; `None` leaves the transformer unconfigured.
    fn test_state(dir: &std::path::Path, stub: Option<&'static str>) -> Arc<AppState> {
        let config = test_config(dir);
        let store = studymorph_store::create_store(&config.store, &config.storage.data_dir)
            .expect("local store");
        let pipeline = ExtractionPipeline::standard(&config);
        let transformer =
            stub.map(|reply| ContentTransformer::new(Box::new(StubLlm(reply)), 0.0, 1024));
        Arc::new(AppState {
            store,
            pipeline,
            transformer,
            speech: None,
            question_bank: QuestionBank::embedded(),
            http: reqwest::Client::new(),
            config,
        })
    }

    fn test_app(state: Arc<AppState>) -> Router {
        build_router(state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn text_data_url(text: &str) -> String {
        format!("data:text/plain;base64,{}", BASE64.encode(text))
    }

    #[tokio::test]
    async fn health_reports_subsystem_readiness() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        let (status, body) = send(app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store_backend"], "local");
        assert_eq!(body["extractor"], "embedded");
        assert_eq!(body["transformer_ready"], false);
        assert_eq!(body["speech_ready"], false);
        assert_eq!(body["question_count"], 8);
    }

    #[tokio::test]
    async fn config_endpoint_redacts_secrets() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        let (status, body) = send(app, get_request("/config")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store"]["backend"], "local");
        // Keys never appear, only a configured flag.
        assert!(body["llm"].get("openai_api_key").is_none());
        assert!(body["llm"].get("configured").is_some());
    }

    #[tokio::test]
    async fn note_crud_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        let (status, created) = send(
            app.clone(),
            json_request(
                Method::POST,
                "/notes",
                json!({"title": "Biology", "textContent": "mitochondria divide"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().expect("id").to_string();

        let (status, fetched) = send(app.clone(), get_request(&format!("/notes/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["title"], "Biology");

        let (status, updated) = send(
            app.clone(),
            json_request(
                Method::PUT,
                &format!("/notes/{id}"),
                json!({"title": "Cell biology"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Cell biology");
        assert_eq!(updated["textContent"], "mitochondria divide");

        let (status, listed) = send(app.clone(), get_request("/notes")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().expect("array").len(), 1);

        let (status, _) = send(
            app.clone(),
            empty_request(Method::DELETE, &format!("/notes/{id}")),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(app, get_request(&format!("/notes/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        let (status, body) = send(
            app,
            json_request(Method::POST, "/notes", json!({"title": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "title is required");
    }

    #[tokio::test]
    async fn upload_extracts_text_inline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        let boundary = "studymorph-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             Photosynthesis\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"photo.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             light reactions and the Calvin cycle\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/notes")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .expect("request");

        let (status, note) = send(app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(note["title"], "Photosynthesis");
        assert_eq!(note["fileName"], "photo.txt");
        assert_eq!(note["fileType"], "text/plain");
        assert_eq!(note["textContent"], "light reactions and the Calvin cycle");
        let file_ref = note["fileReference"].as_str().expect("data url");
        assert!(file_ref.starts_with("data:text/plain;base64,"));
    }

    #[tokio::test]
    async fn upload_without_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        let boundary = "studymorph-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             No file here\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/notes")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .expect("request");

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no file provided");
    }

    #[tokio::test]
    async fn extract_retry_leaves_usable_content_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path(), None);
        let app = test_app(state.clone());

        let note = state
            .store
            .add(NewNote {
                title: "Typed".into(),
                text_content: Some("typed by hand".into()),
                file_ref: Some(FileRef::from(text_data_url("ignored"))),
                file_name: Some("typed.txt".into()),
                file_type: Some("text/plain".into()),
            })
            .await
            .expect("seed note");

        let (status, body) = send(
            app,
            empty_request(Method::POST, &format!("/notes/{}/extract", note.id)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extracted"], false);
        assert_eq!(body["note"]["textContent"], "typed by hand");
    }

    #[tokio::test]
    async fn extract_retry_replaces_sentinel_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path(), None);
        let app = test_app(state.clone());

        // A note whose first extraction attempt failed and stored a sentinel.
        let note = state
            .store
            .add(NewNote {
                title: "Scanned".into(),
                text_content: Some(SENTINEL_PDF_ERROR.into()),
                file_ref: Some(FileRef::from(text_data_url("recovered page text"))),
                file_name: Some("scan.txt".into()),
                file_type: Some("text/plain".into()),
            })
            .await
            .expect("seed note");

        let (status, body) = send(
            app,
            empty_request(Method::POST, &format!("/notes/{}/extract", note.id)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extracted"], true);
        assert_eq!(body["note"]["textContent"], "recovered page text");
    }

    #[tokio::test]
    async fn consolidate_requires_note_ids() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        let (status, body) = send(
            app,
            json_request(Method::POST, "/notes/consolidate", json!({"noteIds": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "noteIds must not be empty");
    }

    #[tokio::test]
    async fn consolidate_answers_503_without_provider() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path(), None);
        let app = test_app(state.clone());

        let note = state
            .store
            .add(NewNote {
                title: "Notes".into(),
                text_content: Some("cells divide by mitosis".into()),
                ..Default::default()
            })
            .await
            .expect("seed note");

        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/notes/consolidate",
                json!({"noteIds": [note.id]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"]
            .as_str()
            .expect("error")
            .contains("LLM provider not configured"));
    }

    #[tokio::test]
    async fn consolidate_skips_unusable_notes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path(), Some("# Merged study guide"));
        let app = test_app(state.clone());

        let usable = state
            .store
            .add(NewNote {
                title: "Mitosis".into(),
                text_content: Some("cells divide by mitosis".into()),
                ..Default::default()
            })
            .await
            .expect("seed note");
        let sentinel = state
            .store
            .add(NewNote {
                title: "Broken scan".into(),
                text_content: Some(SENTINEL_PDF_ERROR.into()),
                ..Default::default()
            })
            .await
            .expect("seed note");

        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/notes/consolidate",
                json!({"noteIds": [usable.id, sentinel.id]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "# Merged study guide");
        assert_eq!(body["noteCount"], 1);
    }

    #[tokio::test]
    async fn consolidate_unknown_note_is_404() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), Some("unused")));

        let (status, _) = send(
            app,
            json_request(
                Method::POST,
                "/notes/consolidate",
                json!({"noteIds": ["00000000-0000-0000-0000-000000000000"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn transform_routes_answer_503_without_provider() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/transform/flashcards",
                json!({"content": "ATP is energy currency"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"]
            .as_str()
            .expect("error")
            .contains("LLM provider not configured"));
    }

    #[tokio::test]
    async fn empty_content_rejected_before_provider_call() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), Some("unused")));

        let (status, _) = send(
            app,
            json_request(Method::POST, "/transform/quiz", json!({"content": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn flashcards_come_from_provider_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(
            dir.path(),
            Some(r#"[{"front": "What is ATP?", "back": "The cell's energy currency"}]"#),
        ));

        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/transform/flashcards",
                json!({"content": "ATP notes", "count": 1}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["flashcards"][0]["front"], "What is ATP?");
    }

    #[tokio::test]
    async fn quiz_round_trips_provider_questions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(
            dir.path(),
            Some(
                r#"[{"question": "Which organelle makes ATP?",
                     "options": ["Nucleus", "Mitochondrion", "Ribosome", "Golgi"],
                     "correct_index": 1,
                     "explanation": "Oxidative phosphorylation happens there."}]"#,
            ),
        ));

        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/transform/quiz",
                json!({"content": "organelles", "questionCount": 1}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"][0]["correct_index"], 1);
        assert_eq!(
            body["questions"][0]["options"].as_array().expect("options").len(),
            4
        );
    }

    #[tokio::test]
    async fn audio_without_speech_returns_script_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(
            dir.path(),
            Some("Welcome to your audio notes."),
        ));

        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/transform/audio",
                json!({"content": "cells", "style": "auditory"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["script"], "Welcome to your audio notes.");
        assert!(body.get("audioData").is_none());
        assert!(body.get("audioFormat").is_none());
    }

    #[tokio::test]
    async fn assessment_questions_serve_embedded_bank() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        let (status, body) = send(app, get_request("/assessment/questions")).await;
        assert_eq!(status, StatusCode::OK);
        let questions = body["questions"].as_array().expect("questions");
        assert_eq!(questions.len(), 8);
        assert_eq!(
            questions[0]["options"].as_array().expect("options").len(),
            4
        );
    }

    #[tokio::test]
    async fn scoring_follows_option_style_tags() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        // Pick the visual option of every question; visual must sweep.
        let bank = QuestionBank::embedded();
        let answers: Vec<Value> = bank
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let choice = q
                    .options
                    .iter()
                    .position(|o| o.style == LearningStyle::Visual)
                    .expect("visual option");
                json!({"question": i, "choice": choice})
            })
            .collect();

        let (status, body) = send(
            app,
            json_request(Method::POST, "/assessment/score", json!({"answers": answers})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scores"]["visual"], 8);
        assert_eq!(body["dominantStyle"], "visual");
        assert_eq!(body["total"], 8);
    }

    #[tokio::test]
    async fn out_of_range_answer_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        let (status, _) = send(
            app,
            json_request(
                Method::POST,
                "/assessment/score",
                json!({"answers": [{"question": 99, "choice": 0}]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn extract_endpoint_reads_data_urls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        let (status, body) = send(
            app,
            json_request(
                Method::POST,
                "/extract",
                json!({"fileUrl": text_data_url("hello from a file"), "fileName": "hello.txt"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extractedText"], "hello from a file");
    }

    #[tokio::test]
    async fn extract_endpoint_requires_an_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test_app(test_state(dir.path(), None));

        let (status, body) = send(app, json_request(Method::POST, "/extract", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "fileUrl or filePath is required");
    }
}
