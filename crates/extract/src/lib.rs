//! Text extraction pipeline: turns an uploaded file reference into plain
//! text via an ordered list of strategies (plain text, PDF text layer,
//! document service, OCR). Stages that fail are skipped, never fatal.

pub mod document;
pub mod job;
pub mod kind;
pub mod pipeline;
pub mod stages;

pub use document::{collapse_whitespace, extract_bytes, truncate_chars, MAX_EXTRACT_CHARS};
pub use job::{ExtractionJob, FetchError};
pub use kind::FileKind;
pub use pipeline::{
    is_usable_extraction, ExtractionOutcome, ExtractionPipeline, ExtractionStage, StageFailure,
    MIN_EXTRACT_LEN,
};
