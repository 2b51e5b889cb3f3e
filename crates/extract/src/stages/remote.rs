use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::extract_bytes;
use crate::job::ExtractionJob;
use crate::pipeline::{ExtractionStage, StageFailure};

/// Document extraction over the wire contract
/// `{ fileUrl, fileType, fileName } -> { extractedText } | { error }`.
/// With no extractor URL configured the same logic runs in-process.
pub struct DocumentServiceStage {
    client: reqwest::Client,
    extractor_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    file_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    extracted_text: Option<String>,
    error: Option<String>,
}

impl DocumentServiceStage {
    pub fn new(client: reqwest::Client, extractor_url: Option<String>) -> Self {
        Self {
            client,
            extractor_url,
        }
    }

    async fn call_remote(&self, url: &str, job: &ExtractionJob) -> Result<String, StageFailure> {
        let request = WireRequest {
            file_url: job.file_ref.as_str(),
            file_type: job.file_type.as_deref(),
            file_name: job.file_name.as_deref(),
        };
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| StageFailure::Failed(format!("extractor unreachable: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageFailure::Failed(format!(
                "extractor returned {status}: {body}"
            )));
        }
        let parsed: WireResponse = response
            .json()
            .await
            .map_err(|e| StageFailure::Failed(format!("bad extractor response: {e}")))?;
        if let Some(error) = parsed.error {
            return Err(StageFailure::Failed(error));
        }
        parsed.extracted_text.ok_or(StageFailure::NoText)
    }
}

#[async_trait]
impl ExtractionStage for DocumentServiceStage {
    fn name(&self) -> &'static str {
        "document-service"
    }

    async fn extract(&self, job: &ExtractionJob) -> Result<String, StageFailure> {
        match &self.extractor_url {
            Some(url) => self.call_remote(url, job).await,
            // Embedded mode: same contract, same process. Sentinel results
            // flow back as text and the pipeline treats them as unusable.
            None => Ok(extract_bytes(job.kind, &job.bytes, job.file_name.as_deref())),
        }
    }
}
