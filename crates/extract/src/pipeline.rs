use async_trait::async_trait;
use studymorph_core::{is_sentinel, Config, FileRef};
use thiserror::Error;

use crate::job::ExtractionJob;
use crate::stages::{DocumentServiceStage, OcrStage, PdfTextLayerStage, PlainTextStage};

/// Results shorter than this (after trimming) are treated as noise and
/// handed to the next stage.
pub const MIN_EXTRACT_LEN: usize = 10;

/// Why a stage produced nothing. None of these abort the pipeline.
#[derive(Debug, Error)]
pub enum StageFailure {
    #[error("not applicable")]
    NotApplicable,
    #[error("no text found")]
    NoText,
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Failed(String),
}

/// One strategy for getting text out of a file.
#[async_trait]
pub trait ExtractionStage: Send + Sync {
    fn name(&self) -> &'static str;
    async fn extract(&self, job: &ExtractionJob) -> Result<String, StageFailure>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// Usable text, plus the stage that produced it.
    Text { text: String, stage: &'static str },
    /// Every stage declined or failed.
    NoText,
}

impl ExtractionOutcome {
    pub fn into_text(self) -> Option<String> {
        match self {
            ExtractionOutcome::Text { text, .. } => Some(text),
            ExtractionOutcome::NoText => None,
        }
    }
}

/// A stage result counts only when it is non-empty, not a sentinel and
/// at least [`MIN_EXTRACT_LEN`] characters after trimming.
pub fn is_usable_extraction(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && !is_sentinel(trimmed) && trimmed.chars().count() >= MIN_EXTRACT_LEN
}

/// Ordered list of extraction strategies. Stages run strictly one after
/// another; the first usable result wins.
pub struct ExtractionPipeline {
    client: reqwest::Client,
    stages: Vec<Box<dyn ExtractionStage>>,
}

impl ExtractionPipeline {
    /// The standard stage order: plain text, PDF text layer, document
    /// service (remote or embedded), OCR fallback.
    pub fn standard(config: &Config) -> Self {
        let client = reqwest::Client::new();
        let stages: Vec<Box<dyn ExtractionStage>> = vec![
            Box::new(PlainTextStage),
            Box::new(PdfTextLayerStage),
            Box::new(DocumentServiceStage::new(
                client.clone(),
                config.extraction.extractor_url.clone(),
            )),
            Box::new(OcrStage::new(config.ocr.command.clone())),
        ];
        Self { client, stages }
    }

    pub fn with_stages(stages: Vec<Box<dyn ExtractionStage>>) -> Self {
        Self {
            client: reqwest::Client::new(),
            stages,
        }
    }

    /// Resolve the file reference and run the stages in order.
    pub async fn run(
        &self,
        file_ref: &FileRef,
        file_type: Option<&str>,
        file_name: Option<&str>,
    ) -> ExtractionOutcome {
        let job = match ExtractionJob::resolve(&self.client, file_ref, file_type, file_name).await
        {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(file = file_name.unwrap_or("(unnamed)"), "fetch failed: {e}");
                return ExtractionOutcome::NoText;
            }
        };
        self.run_job(&job).await
    }

    pub async fn run_job(&self, job: &ExtractionJob) -> ExtractionOutcome {
        for stage in &self.stages {
            match stage.extract(job).await {
                Ok(text) if is_usable_extraction(&text) => {
                    tracing::info!(
                        stage = stage.name(),
                        chars = text.chars().count(),
                        "extraction succeeded"
                    );
                    return ExtractionOutcome::Text {
                        text,
                        stage: stage.name(),
                    };
                }
                Ok(_) => {
                    tracing::debug!(stage = stage.name(), "stage result not usable, continuing");
                }
                Err(StageFailure::NotApplicable) => {}
                Err(e) => {
                    tracing::debug!(stage = stage.name(), "stage failed: {e}");
                }
            }
        }
        tracing::info!(
            file = job.file_name.as_deref().unwrap_or("(unnamed)"),
            "no stage produced usable text"
        );
        ExtractionOutcome::NoText
    }
}
