//! Storage operations for encrypted therapy notes
//!
//! Directory structure:
//! ```text
//! notes/
//! └── {note-id}.json   # TherapyNote with its envelope, never plaintext
//! ```
//!
//! Every body is sealed with the note ID as associated data, so an
//! envelope copied onto another note fails to open.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use super::models::{Actor, NoteSummary, TherapyNote};
use crate::clock::Clock;
use crate::encryption::{EncryptionError, KeyManager};
use crate::roles::Role;

#[derive(Error, Debug)]
pub enum NoteStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    #[error("Role {0} may not access this note")]
    Forbidden(Role),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),
}

impl NoteStorageError {
    /// The note exists but its envelope failed authentication
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Encryption(e) if e.is_integrity())
    }
}

pub type Result<T> = std::result::Result<T, NoteStorageError>;

/// Storage manager for therapy notes
pub struct NoteStorage<'k, C: Clock> {
    notes_path: PathBuf,
    keys: &'k KeyManager,
    clock: C,
}

impl<'k, C: Clock> NoteStorage<'k, C> {
    pub fn new(notes_path: PathBuf, keys: &'k KeyManager, clock: C) -> Self {
        Self {
            notes_path,
            keys,
            clock,
        }
    }

    fn note_path(&self, note_id: Uuid) -> PathBuf {
        self.notes_path.join(format!("{}.json", note_id))
    }

    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.notes_path)?;
        Ok(())
    }

    fn load(&self, note_id: Uuid) -> Result<TherapyNote> {
        let path = self.note_path(note_id);
        if !path.exists() {
            return Err(NoteStorageError::NoteNotFound(note_id));
        }

        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, note: &TherapyNote) -> Result<()> {
        fs::write(self.note_path(note.id), serde_json::to_string_pretty(note)?)?;
        Ok(())
    }

    /// Create a note for a patient
    pub fn create_note(
        &self,
        author: Actor,
        patient_id: Uuid,
        content: &str,
    ) -> Result<TherapyNote> {
        if !author.can_write() {
            return Err(NoteStorageError::Forbidden(author.role));
        }
        self.init()?;

        let id = Uuid::new_v4();
        let now = self.clock.now();
        let note = TherapyNote {
            id,
            patient_id,
            author_id: author.id,
            envelope: self.keys.seal_bound(content, id.as_bytes())?,
            created_at: now,
            updated_at: now,
        };

        self.save(&note)?;
        log::info!("Created note {} for patient {}", note.id, patient_id);
        Ok(note)
    }

    /// Replace a note's body with a freshly sealed envelope
    pub fn update_note(&self, author: Actor, note_id: Uuid, content: &str) -> Result<TherapyNote> {
        if !author.can_write() {
            return Err(NoteStorageError::Forbidden(author.role));
        }

        let mut note = self.load(note_id)?;
        note.envelope = self.keys.seal_bound(content, note.id.as_bytes())?;
        note.updated_at = self.clock.now();

        self.save(&note)?;
        log::info!("Superseded envelope of note {}", note.id);
        Ok(note)
    }

    /// Decrypt a note's body.
    ///
    /// An envelope that fails to authenticate is returned as an error; what
    /// to show the user is the caller's decision.
    pub fn read_note(&self, reader: Actor, note_id: Uuid) -> Result<String> {
        let note = self.load(note_id)?;
        if !reader.can_read(&note) {
            return Err(NoteStorageError::Forbidden(reader.role));
        }

        self.keys
            .open_bound(&note.envelope, note.id.as_bytes())
            .map_err(|e| {
                log::warn!("Note {} failed integrity check: {}", note.id, e);
                NoteStorageError::from(e)
            })
    }

    /// Get the stored record without decrypting it
    pub fn get_note(&self, note_id: Uuid) -> Result<TherapyNote> {
        self.load(note_id)
    }

    /// List a patient's notes, newest first
    pub fn list_notes(&self, patient_id: Uuid) -> Result<Vec<NoteSummary>> {
        if !self.notes_path.exists() {
            return Ok(Vec::new());
        }

        let mut notes = Vec::new();
        for entry in fs::read_dir(&self.notes_path)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path)?;
                let note: TherapyNote = serde_json::from_str(&content)?;
                if note.patient_id == patient_id {
                    notes.push(NoteSummary::from(&note));
                }
            }
        }

        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    pub fn delete_note(&self, author: Actor, note_id: Uuid) -> Result<()> {
        if !author.can_write() {
            return Err(NoteStorageError::Forbidden(author.role));
        }

        let path = self.note_path(note_id);
        if !path.exists() {
            return Err(NoteStorageError::NoteNotFound(note_id));
        }
        fs::remove_file(&path)?;
        Ok(())
    }
}
