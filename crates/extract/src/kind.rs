use serde::{Deserialize, Serialize};

/// File categories the extraction pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    PlainText,
    Markdown,
    Pdf,
    Docx,
    LegacyDoc,
    Json,
    Other,
}

impl FileKind {
    /// Detect from the declared MIME type, falling back to the file-name
    /// extension when the type is missing or too generic to be useful.
    pub fn detect(file_type: Option<&str>, file_name: Option<&str>) -> Self {
        if let Some(mime) = file_type {
            // Strip parameters such as "; charset=utf-8".
            let mime = mime.split(';').next().unwrap_or(mime).trim().to_ascii_lowercase();
            match mime.as_str() {
                "application/pdf" => return Self::Pdf,
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                    return Self::Docx
                }
                "application/msword" => return Self::LegacyDoc,
                "application/json" => return Self::Json,
                "text/markdown" => return Self::Markdown,
                "text/plain" => return Self::PlainText,
                "" | "application/octet-stream" => {}
                other if other.starts_with("text/") => return Self::PlainText,
                _ => {}
            }
        }

        let ext = file_name
            .and_then(|n| n.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()))
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "doc" => Self::LegacyDoc,
            "json" => Self::Json,
            "md" | "markdown" => Self::Markdown,
            "txt" | "text" | "log" => Self::PlainText,
            _ => Self::Other,
        }
    }

    /// Kinds whose bytes are already readable text.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::PlainText | Self::Markdown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "text",
            Self::Markdown => "markdown",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::LegacyDoc => "doc",
            Self::Json => "json",
            Self::Other => "other",
        }
    }
}
