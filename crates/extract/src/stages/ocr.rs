use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::document::collapse_whitespace;
use crate::job::ExtractionJob;
use crate::kind::FileKind;
use crate::pipeline::{ExtractionStage, StageFailure};

/// Pages rendered per document. OCR is slow, so only the first few pages
/// are scanned.
const OCR_MAX_PAGES: u32 = 3;
/// Render scale. 1.5x makes small fonts legible to the OCR engine.
const OCR_SCALE: &str = "1.5";

/// Last-resort OCR over rendered page bitmaps, for scanned PDFs with no
/// text layer. Delegates to an external helper command that renders each
/// page and emits recognized text as JSON on stdout.
pub struct OcrStage {
    command: Option<String>,
}

#[derive(Deserialize)]
struct OcrPage {
    #[allow(dead_code)]
    page_number: usize,
    text: String,
}

#[derive(Deserialize)]
struct OcrOutput {
    pages: Vec<OcrPage>,
}

impl OcrStage {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl ExtractionStage for OcrStage {
    fn name(&self) -> &'static str {
        "ocr"
    }

    async fn extract(&self, job: &ExtractionJob) -> Result<String, StageFailure> {
        if job.kind != FileKind::Pdf {
            return Err(StageFailure::NotApplicable);
        }
        let command = self
            .command
            .as_deref()
            .ok_or_else(|| StageFailure::Unavailable("OCR_COMMAND not set".into()))?;
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| StageFailure::Unavailable("OCR_COMMAND is empty".into()))?;

        let temp_path = std::env::temp_dir().join(format!("ocr_{}.pdf", uuid::Uuid::new_v4()));
        tokio::fs::write(&temp_path, &job.bytes)
            .await
            .map_err(|e| StageFailure::Failed(format!("failed to write temp pdf: {e}")))?;

        let output = Command::new(program)
            .args(parts)
            .arg(&temp_path)
            .args(["--max-pages", &OCR_MAX_PAGES.to_string()])
            .args(["--scale", OCR_SCALE])
            .output()
            .await;
        let _ = tokio::fs::remove_file(&temp_path).await;

        let output = output.map_err(|e| StageFailure::Failed(format!("failed to run ocr: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StageFailure::Failed(format!("ocr exited non-zero: {stderr}")));
        }

        let parsed: OcrOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| StageFailure::Failed(format!("bad ocr output: {e}")))?;
        let text = parsed
            .pages
            .iter()
            .map(|page| page.text.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        let text = collapse_whitespace(&text);
        if text.is_empty() {
            return Err(StageFailure::NoText);
        }
        Ok(text)
    }
}
