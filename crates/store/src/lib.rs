//! Notes repository: a trait over note persistence with a JSON-file
//! implementation for guest mode and a REST client for hosted storage.

pub mod local;
pub mod remote;

use std::path::Path;

use async_trait::async_trait;
use studymorph_core::config::StoreConfig;
use studymorph_core::{NewNote, Note, NoteId, NoteUpdate};
use thiserror::Error;

pub use local::LocalStore;
pub use remote::RemoteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote store error {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("store not configured: {0}")]
    NotConfigured(String),
}

/// The repository every handler talks to. Swapping guest mode for hosted
/// storage is a config change, not a code change.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Note>, StoreError>;
    async fn get(&self, id: NoteId) -> Result<Option<Note>, StoreError>;
    async fn add(&self, new: NewNote) -> Result<Note, StoreError>;
    async fn update(&self, id: NoteId, update: NoteUpdate) -> Result<Option<Note>, StoreError>;
    async fn delete(&self, id: NoteId) -> Result<bool, StoreError>;
}

/// Build the store backend selected by config.
pub fn create_store(
    config: &StoreConfig,
    data_dir: &Path,
) -> Result<Box<dyn NoteStore>, StoreError> {
    match config.backend.as_str() {
        "local" => Ok(Box::new(LocalStore::open(data_dir)?)),
        "remote" => {
            let base_url = config
                .notes_api_url
                .clone()
                .ok_or_else(|| StoreError::NotConfigured("NOTES_API_URL not set".into()))?;
            Ok(Box::new(RemoteStore::new(
                base_url,
                config.notes_api_key.clone(),
            )))
        }
        other => Err(StoreError::NotConfigured(format!(
            "unknown store backend: '{other}'"
        ))),
    }
}
