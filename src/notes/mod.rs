//! Encrypted clinical notes
//!
//! Note bodies are sealed on every write and opened on every read; an
//! envelope that does not authenticate is an error, never placeholder text.

pub mod models;
pub mod storage;

pub use models::{Actor, NoteSummary, TherapyNote};
pub use storage::{NoteStorage, NoteStorageError};
