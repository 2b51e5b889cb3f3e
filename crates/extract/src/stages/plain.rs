use async_trait::async_trait;

use crate::document::decode_utf8;
use crate::job::ExtractionJob;
use crate::pipeline::{ExtractionStage, StageFailure};

/// Text and markdown files need no extraction at all: the decoded bytes
/// are the content, returned untouched.
pub struct PlainTextStage;

#[async_trait]
impl ExtractionStage for PlainTextStage {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    async fn extract(&self, job: &ExtractionJob) -> Result<String, StageFailure> {
        if !job.kind.is_textual() {
            return Err(StageFailure::NotApplicable);
        }
        Ok(decode_utf8(&job.bytes))
    }
}
