use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MorphError;
use crate::sentinel::has_usable_content;

/// Unique note identifier.
pub type NoteId = Uuid;

/// Where a note's uploaded file lives: embedded in a data URL (guest uploads)
/// or behind a fetchable remote URL (hosted storage).
///
/// Serialized as the plain string so stored notes keep the original
/// single-field `fileReference` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileRef {
    Data(String),
    Url(String),
}

impl From<String> for FileRef {
    fn from(s: String) -> Self {
        if s.starts_with("data:") {
            FileRef::Data(s)
        } else {
            FileRef::Url(s)
        }
    }
}

impl From<FileRef> for String {
    fn from(r: FileRef) -> Self {
        match r {
            FileRef::Data(s) | FileRef::Url(s) => s,
        }
    }
}

impl FileRef {
    /// Build an embedded reference from raw bytes.
    pub fn from_bytes(media_type: &str, bytes: &[u8]) -> Self {
        FileRef::Data(to_data_url(media_type, bytes))
    }

    pub fn as_str(&self) -> &str {
        match self {
            FileRef::Data(s) | FileRef::Url(s) => s,
        }
    }

    /// True when the bytes are available without a network fetch.
    pub fn is_local(&self) -> bool {
        matches!(self, FileRef::Data(_))
    }

    /// Decode an embedded data URL into (media type, bytes).
    /// Remote references cannot be decoded locally.
    pub fn decode(&self) -> Result<(String, Vec<u8>), MorphError> {
        match self {
            FileRef::Data(s) => parse_data_url(s),
            FileRef::Url(u) => Err(MorphError::InvalidDataUrl(format!(
                "not a data URL: {}",
                u
            ))),
        }
    }
}

/// Parse an RFC 2397 data URL into (media type, bytes). Handles both
/// `;base64` payloads and percent-encoded plain payloads.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>), MorphError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| MorphError::InvalidDataUrl("missing 'data:' scheme".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| MorphError::InvalidDataUrl("missing ',' separator".into()))?;

    let (media_type, is_base64) = match meta.strip_suffix(";base64") {
        Some(mt) => (mt, true),
        None => (meta, false),
    };
    // RFC 2397 default when the media type is omitted.
    let media_type = if media_type.is_empty() {
        "text/plain"
    } else {
        media_type
    };

    let bytes = if is_base64 {
        BASE64
            .decode(payload.trim())
            .map_err(|e| MorphError::InvalidDataUrl(format!("bad base64 payload: {}", e)))?
    } else {
        urlencoding::decode_binary(payload.as_bytes()).into_owned()
    };

    Ok((media_type.to_string(), bytes))
}

/// Encode bytes as a base64 data URL.
pub fn to_data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, BASE64.encode(bytes))
}

/// A study note. `text_content` is null until extraction succeeds; once it
/// holds usable (non-sentinel) text it is authoritative and extraction is
/// never re-attempted automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default, rename = "fileReference")]
    pub file_ref: Option<FileRef>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// True if the note carries real, non-sentinel text.
    pub fn has_content(&self) -> bool {
        has_usable_content(self.text_content.as_deref())
    }

    /// True if the note has a file but no usable text yet — the only state
    /// in which the extraction pipeline may run.
    pub fn needs_extraction(&self) -> bool {
        self.file_ref.is_some() && !self.has_content()
    }
}

/// Creation payload — everything except identity and timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub title: String,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default, rename = "fileReference")]
    pub file_ref: Option<FileRef>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl From<NewNote> for Note {
    fn from(new: NewNote) -> Self {
        let now = Utc::now();
        Note {
            id: Uuid::new_v4(),
            title: new.title,
            text_content: new.text_content,
            file_ref: new.file_ref,
            file_name: new.file_name,
            file_type: new.file_type,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update — only supplied fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default, rename = "fileReference")]
    pub file_ref: Option<FileRef>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl Note {
    /// Apply a partial update in place, bumping `updated_at`.
    pub fn apply(&mut self, update: NoteUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(text) = update.text_content {
            self.text_content = Some(text);
        }
        if let Some(file_ref) = update.file_ref {
            self.file_ref = Some(file_ref);
        }
        if let Some(name) = update.file_name {
            self.file_name = Some(name);
        }
        if let Some(ty) = update.file_type {
            self.file_type = Some(ty);
        }
        self.updated_at = Utc::now();
    }
}
