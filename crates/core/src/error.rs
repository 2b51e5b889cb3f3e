use thiserror::Error;

#[derive(Error, Debug)]
pub enum MorphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}
