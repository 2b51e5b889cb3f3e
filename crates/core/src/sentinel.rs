//! Sentinel strings — reserved bracketed values stored in place of real
//! content when extraction is impossible. Every downstream consumer (merge,
//! transform gating, display) must treat them as "no content".

/// Stored when the file type has no extraction path at all.
pub const SENTINEL_UNSUPPORTED: &str =
    "[Unable to extract text from this file type. Supported formats: PDF, DOCX, TXT, MD, JSON.]";

/// Stored when a PDF parser raised or found no text layer.
pub const SENTINEL_PDF_ERROR: &str =
    "[Error extracting text from PDF. The file may be corrupted or image-based.]";

/// Stored for legacy Word binaries, which no stage handles.
pub const SENTINEL_LEGACY_DOC: &str =
    "[Legacy .doc files are not supported. Please convert to .docx or PDF.]";

/// Fixed prefixes that identify a sentinel regardless of the trailing message.
const SENTINEL_PREFIXES: &[&str] = &["[Unable to extract", "[Error extracting", "[Legacy .doc"];

/// True if the text is one of the reserved extraction-failure markers.
pub fn is_sentinel(text: &str) -> bool {
    let trimmed = text.trim_start();
    SENTINEL_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}

/// True if a note's content is real text: present, non-empty after trimming,
/// and not a sentinel. Content passing this gate is authoritative — extraction
/// must not run again for it.
pub fn has_usable_content(text: Option<&str>) -> bool {
    match text {
        Some(t) => !t.trim().is_empty() && !is_sentinel(t),
        None => false,
    }
}
