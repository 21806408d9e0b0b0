//! Storage operations for flashcards
//!
//! Directory structure per learner:
//! ```text
//! learners/{learner-id}/flashcards/
//! ├── decks.json           # Array of all decks
//! ├── cards/
//! │   └── {card-id}.json   # Individual card files
//! ├── states/
//! │   └── {card-id}.json   # Card memory state
//! └── history/
//!     └── {card-id}.json   # Review records for the card
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;
use uuid::Uuid;

use super::algorithm::{cards_due_for_review, schedule_with_quality, Quality};
use super::errors::SchedulerError;
use super::models::*;
use crate::clock::Clock;

#[derive(Error, Debug)]
pub enum FlashcardStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Deck not found: {0}")]
    DeckNotFound(Uuid),

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

pub type Result<T> = std::result::Result<T, FlashcardStorageError>;

/// Storage manager for flashcard operations
pub struct FlashcardStorage<C: Clock> {
    /// Base path for learners (e.g., ~/.local/share/studywell/learners)
    learners_path: PathBuf,
    clock: C,
}

impl<C: Clock> FlashcardStorage<C> {
    pub fn new(learners_path: PathBuf, clock: C) -> Self {
        Self {
            learners_path,
            clock,
        }
    }

    fn flashcards_dir(&self, learner_id: Uuid) -> PathBuf {
        self.learners_path
            .join(learner_id.to_string())
            .join("flashcards")
    }

    fn cards_dir(&self, learner_id: Uuid) -> PathBuf {
        self.flashcards_dir(learner_id).join("cards")
    }

    fn states_dir(&self, learner_id: Uuid) -> PathBuf {
        self.flashcards_dir(learner_id).join("states")
    }

    fn history_dir(&self, learner_id: Uuid) -> PathBuf {
        self.flashcards_dir(learner_id).join("history")
    }

    fn decks_path(&self, learner_id: Uuid) -> PathBuf {
        self.flashcards_dir(learner_id).join("decks.json")
    }

    fn card_path(&self, learner_id: Uuid, card_id: Uuid) -> PathBuf {
        self.cards_dir(learner_id).join(format!("{}.json", card_id))
    }

    fn state_path(&self, learner_id: Uuid, card_id: Uuid) -> PathBuf {
        self.states_dir(learner_id).join(format!("{}.json", card_id))
    }

    fn history_path(&self, learner_id: Uuid, card_id: Uuid) -> PathBuf {
        self.history_dir(learner_id).join(format!("{}.json", card_id))
    }

    /// Initialize flashcard storage for a learner
    pub fn init(&self, learner_id: Uuid) -> Result<()> {
        fs::create_dir_all(self.cards_dir(learner_id))?;
        fs::create_dir_all(self.states_dir(learner_id))?;
        fs::create_dir_all(self.history_dir(learner_id))?;

        let decks_path = self.decks_path(learner_id);
        if !decks_path.exists() {
            let empty_decks: Vec<Deck> = Vec::new();
            fs::write(&decks_path, serde_json::to_string_pretty(&empty_decks)?)?;
        }

        Ok(())
    }

    // ==================== Deck Operations ====================

    /// List all decks for a learner
    pub fn list_decks(&self, learner_id: Uuid) -> Result<Vec<Deck>> {
        let decks_path = self.decks_path(learner_id);
        if !decks_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&decks_path)?;
        let decks: Vec<Deck> = serde_json::from_str(&content)?;
        Ok(decks)
    }

    pub fn get_deck(&self, learner_id: Uuid, deck_id: Uuid) -> Result<Deck> {
        self.list_decks(learner_id)?
            .into_iter()
            .find(|d| d.id == deck_id)
            .ok_or(FlashcardStorageError::DeckNotFound(deck_id))
    }

    pub fn create_deck(
        &self,
        learner_id: Uuid,
        name: String,
        description: Option<String>,
    ) -> Result<Deck> {
        self.init(learner_id)?;

        let mut deck = Deck::new(learner_id, name, self.clock.now());
        deck.description = description;

        let mut decks = self.list_decks(learner_id)?;
        decks.push(deck.clone());
        self.write_decks(learner_id, &decks)?;

        log::info!("Created deck {} for learner {}", deck.id, learner_id);
        Ok(deck)
    }

    pub fn update_deck(&self, learner_id: Uuid, deck: &Deck) -> Result<()> {
        let mut decks = self.list_decks(learner_id)?;
        let pos = decks
            .iter()
            .position(|d| d.id == deck.id)
            .ok_or(FlashcardStorageError::DeckNotFound(deck.id))?;

        decks[pos] = deck.clone();
        self.write_decks(learner_id, &decks)
    }

    /// Delete a deck and all its cards
    pub fn delete_deck(&self, learner_id: Uuid, deck_id: Uuid) -> Result<()> {
        self.get_deck(learner_id, deck_id)?;

        for card in self.list_cards(learner_id, deck_id)? {
            self.remove_card_files(learner_id, card.id)?;
        }

        let mut decks = self.list_decks(learner_id)?;
        decks.retain(|d| d.id != deck_id);
        self.write_decks(learner_id, &decks)?;

        log::info!("Deleted deck {} for learner {}", deck_id, learner_id);
        Ok(())
    }

    fn write_decks(&self, learner_id: Uuid, decks: &[Deck]) -> Result<()> {
        fs::write(
            self.decks_path(learner_id),
            serde_json::to_string_pretty(decks)?,
        )?;
        Ok(())
    }

    fn update_deck_card_count(&self, learner_id: Uuid, deck_id: Uuid) -> Result<()> {
        let cards = self.list_cards(learner_id, deck_id)?;
        let mut deck = self.get_deck(learner_id, deck_id)?;
        deck.card_count = cards.len();
        deck.updated_at = self.clock.now();
        self.update_deck(learner_id, &deck)
    }

    // ==================== Card Operations ====================

    /// List all cards in a deck, in creation order
    pub fn list_cards(&self, learner_id: Uuid, deck_id: Uuid) -> Result<Vec<Flashcard>> {
        let mut cards = self.list_all_cards(learner_id)?;
        cards.retain(|card| card.deck_id == deck_id);
        Ok(cards)
    }

    /// List all cards across all decks, in creation order
    pub fn list_all_cards(&self, learner_id: Uuid) -> Result<Vec<Flashcard>> {
        let cards_dir = self.cards_dir(learner_id);
        if !cards_dir.exists() {
            return Ok(Vec::new());
        }

        let mut cards = Vec::new();
        for entry in fs::read_dir(&cards_dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path)?;
                let card: Flashcard = serde_json::from_str(&content)?;
                cards.push(card);
            }
        }

        cards.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.position.cmp(&b.position))
                .then(a.id.cmp(&b.id))
        });
        Ok(cards)
    }

    pub fn get_card(&self, learner_id: Uuid, card_id: Uuid) -> Result<Flashcard> {
        let card_path = self.card_path(learner_id, card_id);
        if !card_path.exists() {
            return Err(FlashcardStorageError::CardNotFound(card_id));
        }

        let content = fs::read_to_string(&card_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Create a new card together with its initial memory state
    pub fn create_card(
        &self,
        learner_id: Uuid,
        deck_id: Uuid,
        front: String,
        back: String,
        tags: Option<Vec<String>>,
    ) -> Result<Flashcard> {
        self.init(learner_id)?;
        self.get_deck(learner_id, deck_id)?;

        let now = self.clock.now();
        let position = self.list_cards(learner_id, deck_id)?.len() as i32;

        let mut card = Flashcard::new(deck_id, front, back, now);
        card.position = position;
        if let Some(t) = tags {
            card.tags = t;
        }

        fs::write(
            self.card_path(learner_id, card.id),
            serde_json::to_string_pretty(&card)?,
        )?;

        let state = CardMemoryState::new(card.id, now);
        self.update_card_state(learner_id, &state)?;

        self.update_deck_card_count(learner_id, deck_id)?;

        Ok(card)
    }

    /// Update a card's content. The memory state is left alone.
    pub fn update_card(&self, learner_id: Uuid, card: &Flashcard) -> Result<Flashcard> {
        let card_path = self.card_path(learner_id, card.id);
        if !card_path.exists() {
            return Err(FlashcardStorageError::CardNotFound(card.id));
        }

        let mut card = card.clone();
        card.updated_at = self.clock.now();
        fs::write(&card_path, serde_json::to_string_pretty(&card)?)?;
        Ok(card)
    }

    /// Delete a card, its state and its history
    pub fn delete_card(&self, learner_id: Uuid, card_id: Uuid) -> Result<()> {
        let card = self.get_card(learner_id, card_id)?;
        self.remove_card_files(learner_id, card_id)?;
        self.update_deck_card_count(learner_id, card.deck_id)
    }

    fn remove_card_files(&self, learner_id: Uuid, card_id: Uuid) -> Result<()> {
        for path in [
            self.card_path(learner_id, card_id),
            self.state_path(learner_id, card_id),
            self.history_path(learner_id, card_id),
        ] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    // ==================== State Operations ====================

    /// Get the memory state for a card, or a fresh one if none was stored
    pub fn get_card_state(&self, learner_id: Uuid, card_id: Uuid) -> Result<CardMemoryState> {
        let state_path = self.state_path(learner_id, card_id);
        if !state_path.exists() {
            return Ok(CardMemoryState::new(card_id, self.clock.now()));
        }

        let content = fs::read_to_string(&state_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn update_card_state(&self, learner_id: Uuid, state: &CardMemoryState) -> Result<()> {
        fs::write(
            self.state_path(learner_id, state.card_id),
            serde_json::to_string_pretty(state)?,
        )?;
        Ok(())
    }

    pub fn get_review_history(
        &self,
        learner_id: Uuid,
        card_id: Uuid,
    ) -> Result<Vec<ReviewRecord>> {
        let path = self.history_path(learner_id, card_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn append_review(&self, learner_id: Uuid, record: ReviewRecord) -> Result<()> {
        let mut history = self.get_review_history(learner_id, record.card_id)?;
        let path = self.history_path(learner_id, record.card_id);
        history.push(record);
        fs::write(&path, serde_json::to_string_pretty(&history)?)?;
        Ok(())
    }

    // ==================== Review Operations ====================

    fn cards_with_state(
        &self,
        learner_id: Uuid,
        deck_id: Option<Uuid>,
    ) -> Result<Vec<CardWithState>> {
        let cards = match deck_id {
            Some(did) => self.list_cards(learner_id, did)?,
            None => self.list_all_cards(learner_id)?,
        };

        cards
            .into_iter()
            .map(|card| -> Result<CardWithState> {
                let state = self.get_card_state(learner_id, card.id)?;
                Ok(CardWithState { card, state })
            })
            .collect()
    }

    /// Get due cards, oldest due first (optionally filtered by deck).
    ///
    /// Each deck contributes at most `new_cards_per_day` never-reviewed
    /// cards and `reviews_per_day` cards already in rotation.
    pub fn get_due_cards(
        &self,
        learner_id: Uuid,
        deck_id: Option<Uuid>,
    ) -> Result<Vec<CardWithState>> {
        let cards = self.cards_with_state(learner_id, deck_id)?;
        let limits: HashMap<Uuid, (usize, usize)> = self
            .list_decks(learner_id)?
            .iter()
            .map(|deck| (deck.id, (deck.new_card_limit(), deck.review_limit())))
            .collect();

        let mut taken: HashMap<Uuid, (usize, usize)> = HashMap::new();
        let due = cards_due_for_review(cards, self.clock.now())
            .filter(|entry| {
                let Some(&(max_new, max_reviews)) = limits.get(&entry.card.deck_id) else {
                    return true;
                };
                let (new, reviews) = taken.entry(entry.card.deck_id).or_default();
                let (count, max) = match entry.state.status() {
                    CardStatus::New => (new, max_new),
                    _ => (reviews, max_reviews),
                };
                if *count >= max {
                    return false;
                }
                *count += 1;
                true
            })
            .collect();

        Ok(due)
    }

    /// Submit a review for a card and persist the new state
    pub fn submit_review(
        &self,
        learner_id: Uuid,
        card_id: Uuid,
        quality: i32,
    ) -> Result<CardMemoryState> {
        let quality = Quality::new(quality)?;
        self.get_card(learner_id, card_id)?;

        let state = self.get_card_state(learner_id, card_id)?;
        let now = self.clock.now();
        let next = schedule_with_quality(&state, quality, now)?;

        self.update_card_state(learner_id, &next)?;
        let record = ReviewRecord::from_state(quality.value(), &next, now);
        self.append_review(learner_id, record)?;

        log::debug!(
            "Reviewed card {} with quality {}: next review in {} days",
            card_id,
            quality,
            next.interval_days
        );

        Ok(next)
    }

    /// Persist everything a finished study session produced
    pub fn record_session(
        &self,
        learner_id: Uuid,
        reviewed: &[CardWithState],
        records: &[ReviewRecord],
    ) -> Result<()> {
        for entry in reviewed {
            self.update_card_state(learner_id, &entry.state)?;
        }
        for record in records {
            self.append_review(learner_id, record.clone())?;
        }
        Ok(())
    }

    /// Get review statistics (optionally filtered by deck)
    pub fn get_review_stats(
        &self,
        learner_id: Uuid,
        deck_id: Option<Uuid>,
    ) -> Result<ReviewStats> {
        let cards = self.cards_with_state(learner_id, deck_id)?;
        let now = self.clock.now();
        let day_ago = now - Duration::days(1);

        let mut stats = ReviewStats {
            total_cards: cards.len(),
            ..ReviewStats::default()
        };

        for entry in &cards {
            match entry.state.status() {
                CardStatus::New => stats.new_cards += 1,
                CardStatus::Learning => stats.learning_cards += 1,
                CardStatus::Review | CardStatus::Relearning => stats.review_cards += 1,
            }

            if entry.state.is_due(now) {
                stats.due_cards += 1;
            }

            for record in self.get_review_history(learner_id, entry.card.id)? {
                if record.reviewed_at > day_ago {
                    stats.reviews_today += 1;
                    if record.is_correct() {
                        stats.correct_today += 1;
                    }
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn setup() -> (TempDir, FixedClock, Uuid) {
        let dir = TempDir::new().unwrap();
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 2, 10, 7, 0, 0).unwrap());
        (dir, clock, Uuid::new_v4())
    }

    #[test]
    fn test_create_deck_and_cards() {
        let (dir, clock, learner) = setup();
        let storage = FlashcardStorage::new(dir.path().to_path_buf(), &clock);

        let deck = storage
            .create_deck(learner, "Anatomy".to_string(), None)
            .unwrap();
        storage
            .create_card(learner, deck.id, "Femur?".into(), "Thigh bone".into(), None)
            .unwrap();
        clock.advance(Duration::seconds(1));
        storage
            .create_card(
                learner,
                deck.id,
                "Ulna?".into(),
                "Forearm".into(),
                Some(vec!["arm".into()]),
            )
            .unwrap();

        let cards = storage.list_cards(learner, deck.id).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].front, "Femur?");
        assert_eq!(cards[1].position, 1);
        assert_eq!(cards[1].tags, vec!["arm".to_string()]);

        let deck = storage.get_deck(learner, deck.id).unwrap();
        assert_eq!(deck.card_count, 2);
    }

    #[test]
    fn test_create_card_in_missing_deck() {
        let (dir, clock, learner) = setup();
        let storage = FlashcardStorage::new(dir.path().to_path_buf(), &clock);

        let result = storage.create_card(learner, Uuid::new_v4(), "q".into(), "a".into(), None);
        assert!(matches!(result, Err(FlashcardStorageError::DeckNotFound(_))));
    }

    #[test]
    fn test_submit_review_persists_state_and_history() {
        let (dir, clock, learner) = setup();
        let storage = FlashcardStorage::new(dir.path().to_path_buf(), &clock);

        let deck = storage.create_deck(learner, "Pharma".into(), None).unwrap();
        let card = storage
            .create_card(learner, deck.id, "Dose?".into(), "5mg".into(), None)
            .unwrap();

        assert_eq!(storage.get_due_cards(learner, None).unwrap().len(), 1);

        let state = storage.submit_review(learner, card.id, 4).unwrap();
        assert_eq!(state.repetitions, 1);
        assert_eq!(state.interval_days, 1);

        let stored = storage.get_card_state(learner, card.id).unwrap();
        assert_eq!(stored, state);
        assert!(storage.get_due_cards(learner, Some(deck.id)).unwrap().is_empty());

        let history = storage.get_review_history(learner, card.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quality, 4);

        clock.advance(Duration::days(1));
        assert_eq!(storage.get_due_cards(learner, Some(deck.id)).unwrap().len(), 1);
    }

    #[test]
    fn test_submit_review_rejects_bad_quality() {
        let (dir, clock, learner) = setup();
        let storage = FlashcardStorage::new(dir.path().to_path_buf(), &clock);

        let deck = storage.create_deck(learner, "Deck".into(), None).unwrap();
        let card = storage
            .create_card(learner, deck.id, "q".into(), "a".into(), None)
            .unwrap();

        let result = storage.submit_review(learner, card.id, 7);
        assert!(matches!(
            result,
            Err(FlashcardStorageError::Scheduler(SchedulerError::InvalidQuality(7)))
        ));
        assert!(storage.get_review_history(learner, card.id).unwrap().is_empty());
    }

    #[test]
    fn test_review_stats() {
        let (dir, clock, learner) = setup();
        let storage = FlashcardStorage::new(dir.path().to_path_buf(), &clock);

        let deck = storage.create_deck(learner, "Deck".into(), None).unwrap();
        let a = storage.create_card(learner, deck.id, "a".into(), "1".into(), None).unwrap();
        let b = storage.create_card(learner, deck.id, "b".into(), "2".into(), None).unwrap();
        storage.create_card(learner, deck.id, "c".into(), "3".into(), None).unwrap();

        storage.submit_review(learner, a.id, 5).unwrap();
        storage.submit_review(learner, b.id, 1).unwrap();

        let stats = storage.get_review_stats(learner, Some(deck.id)).unwrap();
        assert_eq!(stats.total_cards, 3);
        assert_eq!(stats.new_cards, 1);
        assert_eq!(stats.learning_cards, 1);
        assert_eq!(stats.review_cards, 1);
        assert_eq!(stats.due_cards, 1);
        assert_eq!(stats.reviews_today, 2);
        assert_eq!(stats.correct_today, 1);
    }

    #[test]
    fn test_delete_deck_removes_cards() {
        let (dir, clock, learner) = setup();
        let storage = FlashcardStorage::new(dir.path().to_path_buf(), &clock);

        let deck = storage.create_deck(learner, "Temp".into(), None).unwrap();
        let card = storage.create_card(learner, deck.id, "q".into(), "a".into(), None).unwrap();

        storage.delete_deck(learner, deck.id).unwrap();

        assert!(storage.list_decks(learner).unwrap().is_empty());
        assert!(matches!(
            storage.get_card(learner, card.id),
            Err(FlashcardStorageError::CardNotFound(_))
        ));
    }

    #[test]
    fn test_due_cards_respect_deck_limits() {
        let (dir, clock, learner) = setup();
        let storage = FlashcardStorage::new(dir.path().to_path_buf(), &clock);

        let deck = storage.create_deck(learner, "Limited".into(), None).unwrap();
        let first = storage.create_card(learner, deck.id, "a".into(), "1".into(), None).unwrap();
        storage.create_card(learner, deck.id, "b".into(), "2".into(), None).unwrap();
        storage.create_card(learner, deck.id, "c".into(), "3".into(), None).unwrap();

        let mut deck = storage.get_deck(learner, deck.id).unwrap();
        deck.new_cards_per_day = 1;
        deck.reviews_per_day = 1;
        storage.update_deck(learner, &deck).unwrap();
        assert_eq!(storage.get_due_cards(learner, Some(deck.id)).unwrap().len(), 1);

        storage.submit_review(learner, first.id, 1).unwrap();
        clock.advance(Duration::days(1));

        let due = storage.get_due_cards(learner, None).unwrap();
        assert_eq!(due.len(), 2);
        assert_eq!(due.iter().filter(|e| e.state.status() == CardStatus::New).count(), 1);
        assert!(due.iter().any(|e| e.card.id == first.id));

        deck.new_cards_per_day = 0;
        deck.reviews_per_day = 0;
        storage.update_deck(learner, &deck).unwrap();
        assert!(storage.get_due_cards(learner, Some(deck.id)).unwrap().is_empty());
    }

    #[test]
    fn test_due_cards_across_decks_have_stable_order() {
        let (dir, clock, learner) = setup();
        let storage = FlashcardStorage::new(dir.path().to_path_buf(), &clock);

        let a = storage.create_deck(learner, "A".into(), None).unwrap();
        let b = storage.create_deck(learner, "B".into(), None).unwrap();
        storage.create_card(learner, a.id, "a".into(), "1".into(), None).unwrap();
        storage.create_card(learner, b.id, "b".into(), "2".into(), None).unwrap();

        let due = storage.get_due_cards(learner, None).unwrap();
        assert_eq!(due.len(), 2);
        assert!(due[0].card.id < due[1].card.id);
    }

    #[test]
    fn test_update_card_keeps_memory_state() {
        let (dir, clock, learner) = setup();
        let storage = FlashcardStorage::new(dir.path().to_path_buf(), &clock);

        let deck = storage.create_deck(learner, "Deck".into(), None).unwrap();
        let mut card = storage
            .create_card(learner, deck.id, "Capital of Peru?".into(), "Lima".into(), None)
            .unwrap();
        let state = storage.submit_review(learner, card.id, 5).unwrap();

        clock.advance(Duration::hours(2));
        card.back = "Lima (founded 1535)".into();
        let saved = storage.update_card(learner, &card).unwrap();
        assert_eq!(saved.updated_at, clock.now());

        let stored = storage.get_card(learner, card.id).unwrap();
        assert_eq!(stored.back, "Lima (founded 1535)");
        assert_eq!(stored.updated_at, clock.now());
        assert_eq!(storage.get_card_state(learner, card.id).unwrap(), state);
        assert_eq!(storage.get_review_history(learner, card.id).unwrap().len(), 1);
    }

    #[test]
    fn test_update_missing_card() {
        let (dir, clock, learner) = setup();
        let storage = FlashcardStorage::new(dir.path().to_path_buf(), &clock);

        let card = Flashcard::new(Uuid::new_v4(), "q".into(), "a".into(), clock.now());
        assert!(matches!(
            storage.update_card(learner, &card),
            Err(FlashcardStorageError::CardNotFound(_))
        ));
    }
}
