//! Flashcard and spaced repetition system
//!
//! This module provides:
//! - SM-2 spaced repetition scheduling (pure, clock injected)
//! - Due-card selection and study sessions
//! - Deck and card storage with review history

pub mod algorithm;
pub mod errors;
pub mod models;
pub mod session;
pub mod storage;

pub use algorithm::{
    cards_due_for_review, format_interval, preview_intervals, schedule_next_review,
    schedule_with_quality, ui_rating_to_quality, DueCards, Quality,
};
pub use errors::{SchedulerError, SchedulerResult};
pub use models::*;
pub use session::{summarize, SessionSummary, StudySession};
pub use storage::{FlashcardStorage, FlashcardStorageError};
