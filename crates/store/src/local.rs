//! JSON-file note store for guest mode: one array in `{data_dir}/notes.json`,
//! held in memory behind a `RwLock` and written back on every mutation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use studymorph_core::{NewNote, Note, NoteId, NoteUpdate};
use tokio::sync::RwLock;
use tracing::info;

use crate::{NoteStore, StoreError};

const NOTES_FILE: &str = "notes.json";

pub struct LocalStore {
    path: PathBuf,
    notes: RwLock<Vec<Note>>,
}

impl LocalStore {
    /// Open (or create) the store under `data_dir`. A malformed notes file
    /// is an error, never silently replaced.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(NOTES_FILE);
        let notes: Vec<Note> = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };
        info!(path = %path.display(), count = notes.len(), "local note store opened");
        Ok(Self {
            path,
            notes: RwLock::new(notes),
        })
    }

    /// Serialize the full array back to disk. Called with the write lock
    /// held so writers cannot interleave.
    fn persist(&self, notes: &[Note]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(notes)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[async_trait]
impl NoteStore for LocalStore {
    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        Ok(self.notes.read().await.clone())
    }

    async fn get(&self, id: NoteId) -> Result<Option<Note>, StoreError> {
        let notes = self.notes.read().await;
        Ok(notes.iter().find(|n| n.id == id).cloned())
    }

    async fn add(&self, new: NewNote) -> Result<Note, StoreError> {
        let note = Note::from(new);
        let mut notes = self.notes.write().await;
        notes.push(note.clone());
        self.persist(&notes)?;
        info!(note = %note.id, title = %note.title, "note created");
        Ok(note)
    }

    async fn update(&self, id: NoteId, update: NoteUpdate) -> Result<Option<Note>, StoreError> {
        let mut notes = self.notes.write().await;
        let Some(note) = notes.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        note.apply(update);
        let updated = note.clone();
        self.persist(&notes)?;
        info!(note = %id, "note updated");
        Ok(Some(updated))
    }

    async fn delete(&self, id: NoteId) -> Result<bool, StoreError> {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Ok(false);
        }
        self.persist(&notes)?;
        info!(note = %id, "note deleted");
        Ok(true)
    }
}
