use async_trait::async_trait;

use crate::document::extract_pdf_text;
use crate::job::ExtractionJob;
use crate::kind::FileKind;
use crate::pipeline::{ExtractionStage, StageFailure};

/// Local PDF text-layer read. Only runs for PDFs whose bytes arrived
/// embedded in the request; remote files go through the document service
/// instead.
pub struct PdfTextLayerStage;

#[async_trait]
impl ExtractionStage for PdfTextLayerStage {
    fn name(&self) -> &'static str {
        "pdf-text-layer"
    }

    async fn extract(&self, job: &ExtractionJob) -> Result<String, StageFailure> {
        if job.kind != FileKind::Pdf || !job.file_ref.is_local() {
            return Err(StageFailure::NotApplicable);
        }
        let text =
            extract_pdf_text(&job.bytes).map_err(|e| StageFailure::Failed(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(StageFailure::NoText);
        }
        Ok(text)
    }
}
