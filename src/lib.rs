//! Core library for the studywell platform: SM-2 flashcard scheduling and
//! AES-256-GCM envelopes for clinical notes.

pub mod clock;
pub mod config;
pub mod encryption;
pub mod flashcards;
pub mod notes;
pub mod roles;
