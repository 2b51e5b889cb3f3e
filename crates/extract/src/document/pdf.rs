use thiserror::Error;

/// Pages walked per document. Anything beyond the cap is ignored.
pub const PDF_PAGE_CAP: usize = 100;

#[derive(Debug, Error)]
#[error("pdf parse error: {0}")]
pub struct PdfError(String);

/// Pull the text layer out of a PDF. `pdf-extract` returns the whole
/// document as one string with form feeds between pages; walk the pages
/// up to [`PDF_PAGE_CAP`], normalize whitespace per page and join with
/// newlines. A scanned PDF parses fine but yields an empty string.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, PdfError> {
    let raw = pdf_extract::extract_text_from_mem(bytes).map_err(|e| PdfError(e.to_string()))?;
    Ok(join_pages(&raw))
}

fn join_pages(raw: &str) -> String {
    let pages: Vec<String> = raw
        .split('\x0C')
        .take(PDF_PAGE_CAP)
        .map(super::collapse_whitespace)
        .filter(|page| !page.is_empty())
        .collect();
    pages.join("\n")
}
