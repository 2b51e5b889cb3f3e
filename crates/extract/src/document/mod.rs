//! Server-side document extraction: the logic behind the `/extract`
//! endpoint, also run in-process when no remote extractor is configured.

mod docx;
mod pdf;

pub use docx::extract_docx_text;
pub use pdf::{extract_pdf_text, PDF_PAGE_CAP};

use studymorph_core::sentinel::{SENTINEL_LEGACY_DOC, SENTINEL_PDF_ERROR, SENTINEL_UNSUPPORTED};

use crate::kind::FileKind;

/// Extracted text is capped so one huge upload cannot flood the store or
/// an LLM context window.
pub const MAX_EXTRACT_CHARS: usize = 20_000;

/// Extract text from raw bytes according to the detected kind. Never
/// fails: unsupported or broken inputs yield a bracketed sentinel string
/// instead. Output is capped at [`MAX_EXTRACT_CHARS`].
pub fn extract_bytes(kind: FileKind, bytes: &[u8], file_name: Option<&str>) -> String {
    let name = file_name.unwrap_or("(unnamed)");
    let mut text = match kind {
        FileKind::PlainText | FileKind::Markdown => decode_utf8(bytes),
        FileKind::Json => match serde_json::from_slice::<serde_json::Value>(bytes) {
            Ok(value) => serde_json::to_string_pretty(&value)
                .unwrap_or_else(|_| decode_utf8(bytes)),
            Err(_) => decode_utf8(bytes),
        },
        FileKind::Pdf => match pdf::extract_pdf_text(bytes) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::debug!(file = name, "pdf has no text layer");
                SENTINEL_PDF_ERROR.to_string()
            }
            Err(e) => {
                tracing::warn!(file = name, "pdf extraction failed: {e}");
                SENTINEL_PDF_ERROR.to_string()
            }
        },
        FileKind::Docx => match docx::extract_docx_text(bytes) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => SENTINEL_UNSUPPORTED.to_string(),
            Err(e) => {
                tracing::warn!(file = name, "docx extraction failed: {e}");
                SENTINEL_UNSUPPORTED.to_string()
            }
        },
        FileKind::LegacyDoc => SENTINEL_LEGACY_DOC.to_string(),
        FileKind::Other => SENTINEL_UNSUPPORTED.to_string(),
    };
    truncate_chars(&mut text, MAX_EXTRACT_CHARS);
    text
}

pub(crate) fn decode_utf8(bytes: &[u8]) -> String {
    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Truncate in place to at most `max` characters, never splitting a
/// multi-byte character.
pub fn truncate_chars(s: &mut String, max: usize) {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
}

/// Collapse whitespace runs: a run containing a newline becomes one
/// newline, any other run becomes one space. Leading and trailing
/// whitespace is dropped.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run_newline = false;
    let mut in_run = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            in_run = true;
            if ch == '\n' || ch == '\r' {
                run_newline = true;
            }
        } else {
            if in_run && !out.is_empty() {
                out.push(if run_newline { '\n' } else { ' ' });
            }
            in_run = false;
            run_newline = false;
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_fixture(document_xml: &str) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = SimpleFileOptions::default();
            writer
                .start_file("[Content_Types].xml", options)
                .unwrap();
            writer
                .write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
                .unwrap();
            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    const SIMPLE_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Mitochondria are the powerhouse</w:t></w:r></w:p>
    <w:p><w:r><w:t>of the cell.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn docx_paragraphs_become_lines() {
        let bytes = docx_fixture(SIMPLE_DOC);
        let text = extract_bytes(FileKind::Docx, &bytes, Some("bio.docx"));
        assert_eq!(text, "Mitochondria are the powerhouse\nof the cell.");
    }

    #[test]
    fn broken_docx_yields_sentinel() {
        let text = extract_bytes(FileKind::Docx, b"this is not a zip", Some("bad.docx"));
        assert_eq!(text, SENTINEL_UNSUPPORTED);
    }

    #[test]
    fn plain_text_passes_through() {
        let text = extract_bytes(FileKind::PlainText, b"  keep my\nshape  ", Some("a.txt"));
        assert_eq!(text, "  keep my\nshape  ");
    }

    #[test]
    fn json_is_pretty_printed() {
        let text = extract_bytes(FileKind::Json, br#"{"b":1,"a":[2,3]}"#, Some("data.json"));
        assert!(text.contains("\"a\": [\n"));
        assert!(text.contains("\"b\": 1"));
    }

    #[test]
    fn invalid_json_falls_back_to_raw() {
        let text = extract_bytes(FileKind::Json, b"{not json", None);
        assert_eq!(text, "{not json");
    }

    #[test]
    fn legacy_doc_yields_its_sentinel() {
        let text = extract_bytes(FileKind::LegacyDoc, b"\xd0\xcf\x11\xe0", Some("old.doc"));
        assert_eq!(text, SENTINEL_LEGACY_DOC);
    }

    #[test]
    fn unknown_kind_yields_unable_sentinel() {
        let text = extract_bytes(FileKind::Other, b"\x89PNG", Some("img.png"));
        assert_eq!(text, SENTINEL_UNSUPPORTED);
    }

    #[test]
    fn broken_pdf_yields_pdf_sentinel() {
        let text = extract_bytes(FileKind::Pdf, b"%PDF-not-really", Some("scan.pdf"));
        assert_eq!(text, SENTINEL_PDF_ERROR);
    }

    #[test]
    fn output_is_capped() {
        let big = "x".repeat(MAX_EXTRACT_CHARS + 500);
        let text = extract_bytes(FileKind::PlainText, big.as_bytes(), None);
        assert_eq!(text.chars().count(), MAX_EXTRACT_CHARS);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut s = "é".repeat(8);
        truncate_chars(&mut s, 5);
        assert_eq!(s, "é".repeat(5));
        let mut short = String::from("abc");
        truncate_chars(&mut short, 10);
        assert_eq!(short, "abc");
    }

    #[test]
    fn collapse_keeps_line_structure() {
        assert_eq!(
            collapse_whitespace("a   b\t c \n\n  d  "),
            "a b c\nd"
        );
        assert_eq!(collapse_whitespace("   "), "");
    }
}
