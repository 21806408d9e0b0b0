//! Data models for the flashcard system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::algorithm::PASSING_QUALITY;

/// Ease factor every new card starts with
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Ease factor floor
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// A deck is a collection of flashcards studied by one learner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub card_count: usize,
    #[serde(default = "default_new_cards_per_day")]
    pub new_cards_per_day: i32,
    #[serde(default = "default_reviews_per_day")]
    pub reviews_per_day: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_new_cards_per_day() -> i32 {
    20
}

fn default_reviews_per_day() -> i32 {
    100
}

impl Deck {
    pub fn new(learner_id: Uuid, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            learner_id,
            name,
            description: None,
            card_count: 0,
            new_cards_per_day: default_new_cards_per_day(),
            reviews_per_day: default_reviews_per_day(),
            created_at: now,
            updated_at: now,
        }
    }

    /// How many never-reviewed cards a due queue may draw from this deck
    pub fn new_card_limit(&self) -> usize {
        usize::try_from(self.new_cards_per_day).unwrap_or(0)
    }

    /// How many cards already in rotation a due queue may draw from this deck
    pub fn review_limit(&self) -> usize {
        usize::try_from(self.reviews_per_day).unwrap_or(0)
    }
}

/// A flashcard with question (front) and answer (back)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation order within the deck, used to break due-date ties
    #[serde(default)]
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flashcard {
    pub fn new(deck_id: Uuid, front: String, back: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            deck_id,
            front,
            back,
            tags: Vec::new(),
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Where a card sits in the learning process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CardStatus {
    /// Never reviewed
    #[default]
    New,
    /// One successful review so far
    Learning,
    /// Regular spaced review
    Review,
    /// Lapsed on its last review
    Relearning,
}

/// Spaced repetition memory state for one card and one learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMemoryState {
    pub card_id: Uuid,
    /// Consecutive successful reviews since the last lapse
    #[serde(default)]
    pub repetitions: i32,
    /// SM-2 ease factor, never below 1.3
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// Days until the next review; 0 means due now
    #[serde(default)]
    pub interval_days: i32,
    pub next_review_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

impl CardMemoryState {
    /// State of a card that was just added to a deck: due immediately
    pub fn new(card_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            card_id,
            repetitions: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval_days: 0,
            next_review_at: now,
            last_reviewed_at: None,
        }
    }

    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review_at <= as_of
    }

    pub fn status(&self) -> CardStatus {
        match (self.last_reviewed_at, self.repetitions) {
            (None, _) => CardStatus::New,
            (Some(_), 0) => CardStatus::Relearning,
            (Some(_), 1) => CardStatus::Learning,
            (Some(_), _) => CardStatus::Review,
        }
    }
}

impl AsRef<CardMemoryState> for CardMemoryState {
    fn as_ref(&self) -> &CardMemoryState {
        self
    }
}

/// A record of a single review attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: Uuid,
    pub card_id: Uuid,
    /// Quality rating on the SM-2 scale (0-5)
    pub quality: i32,
    /// Interval scheduled by this review (days)
    pub interval_days: i32,
    /// Ease factor after this review
    pub ease_factor: f64,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn from_state(
        quality: i32,
        state: &CardMemoryState,
        reviewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id: state.card_id,
            quality,
            interval_days: state.interval_days,
            ease_factor: state.ease_factor,
            reviewed_at,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.quality >= PASSING_QUALITY
    }
}

/// Statistics for a deck or all decks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub review_cards: usize,
    pub due_cards: usize,
    pub reviews_today: usize,
    pub correct_today: usize,
}

/// A card with its current state, used for review sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardWithState {
    pub card: Flashcard,
    pub state: CardMemoryState,
}

impl AsRef<CardMemoryState> for CardWithState {
    fn as_ref(&self) -> &CardMemoryState {
        &self.state
    }
}
