use studymorph_core::FileRef;
use thiserror::Error;

use crate::kind::FileKind;

/// Resolved extraction input: the original reference plus its bytes,
/// shared by every stage so a remote file is downloaded at most once.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub file_ref: FileRef,
    pub kind: FileKind,
    pub file_type: Option<String>,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid data URL: {0}")]
    DataUrl(String),
    #[error("fetch failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ExtractionJob {
    /// Decode or download the referenced bytes once, up front.
    pub async fn resolve(
        client: &reqwest::Client,
        file_ref: &FileRef,
        file_type: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<Self, FetchError> {
        let kind = FileKind::detect(file_type, file_name);
        let bytes = match file_ref {
            FileRef::Data(_) => {
                let (_, bytes) = file_ref
                    .decode()
                    .map_err(|e| FetchError::DataUrl(e.to_string()))?;
                bytes
            }
            FileRef::Url(url) => client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?
                .to_vec(),
        };
        Ok(Self {
            file_ref: file_ref.clone(),
            kind,
            file_type: file_type.map(str::to_string),
            file_name: file_name.map(str::to_string),
            bytes,
        })
    }

    /// Build a job from bytes already in hand (tests, embedded extraction).
    pub fn from_bytes(
        kind: FileKind,
        file_name: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        let media_type = match kind {
            FileKind::Pdf => "application/pdf",
            FileKind::Json => "application/json",
            FileKind::Markdown => "text/markdown",
            _ => "text/plain",
        };
        Self {
            file_ref: FileRef::from_bytes(media_type, &bytes),
            kind,
            file_type: Some(media_type.to_string()),
            file_name: file_name.map(str::to_string),
            bytes,
        }
    }
}
