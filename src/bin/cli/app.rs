use anyhow::{Context, Result};
use uuid::Uuid;

use studywell_lib::clock::SystemClock;
use studywell_lib::config::AppConfig;
use studywell_lib::encryption::KeyManager;
use studywell_lib::flashcards::FlashcardStorage;
use studywell_lib::notes::NoteStorage;

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub learner_id: Uuid,
}

impl App {
    pub fn new(learner: Option<Uuid>) -> Result<Self> {
        let config = AppConfig::load().context("Failed to load configuration")?;
        Ok(Self {
            config,
            learner_id: learner.unwrap_or_else(Uuid::nil),
        })
    }

    pub fn flashcards(&self) -> Result<FlashcardStorage<SystemClock>> {
        let dir = self
            .config
            .learners_dir()
            .context("Failed to get data directory")?;
        Ok(FlashcardStorage::new(dir, SystemClock))
    }

    pub fn notes<'k>(&self, keys: &'k KeyManager) -> Result<NoteStorage<'k, SystemClock>> {
        let dir = self
            .config
            .notes_dir()
            .context("Failed to get data directory")?;
        Ok(NoteStorage::new(dir, keys, SystemClock))
    }
}
