//! studymorph server: note storage, text extraction, and AI study-format
//! transformations behind one HTTP API.

mod api;
mod app_config;
mod router;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use studymorph_core::Config;
use studymorph_extract::{ExtractionJob, ExtractionOutcome, ExtractionPipeline, FileKind};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let config = app_config::load_config();
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("serve") | None => serve(config).await,
        Some("extract") => match args.get(2) {
            Some(path) => extract_file(&config, path).await,
            None => {
                eprintln!("Usage: studymorph-server extract <file>");
                std::process::exit(2);
            }
        },
        Some(other) => {
            print_usage(other);
            std::process::exit(2);
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.log_summary();

    let store = app_config::build_store(&config)?;
    let transformer = app_config::build_transformer(&config);
    let speech = app_config::build_speech(&config);
    let question_bank = app_config::load_question_bank(&config);
    let pipeline = ExtractionPipeline::standard(&config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let port = config.server.port;

    let state = Arc::new(AppState {
        store,
        pipeline,
        transformer,
        speech,
        question_bank,
        http: reqwest::Client::new(),
        config,
    });

    let app = router::build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://localhost:{port}");
    info!("API docs at http://localhost:{port}/docs");
    axum::serve(listener, app).await?;
    Ok(())
}

/// One-shot pipeline run against a local file, printing the extracted text.
async fn extract_file(config: &Config, path: &str) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    let kind = FileKind::detect(None, file_name.as_deref());
    let job = ExtractionJob::from_bytes(kind, file_name.as_deref(), bytes);

    let pipeline = ExtractionPipeline::standard(config);
    match pipeline.run_job(&job).await {
        ExtractionOutcome::Text { text, stage } => {
            info!(stage, chars = text.chars().count(), "extraction succeeded");
            println!("{text}");
            Ok(())
        }
        ExtractionOutcome::NoText => anyhow::bail!("no text could be extracted from {path}"),
    }
}

fn print_usage(command: &str) {
    eprintln!("Unknown command: {command}");
    eprintln!();
    eprintln!("studymorph v0.1.0");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  studymorph-server                  Start the HTTP server (default)");
    eprintln!("  studymorph-server serve            Start the HTTP server");
    eprintln!("  studymorph-server extract <file>   Extract a file's text and print it");
}
