//! Study sessions
//!
//! A session walks a fixed, ordered list of due cards. Each answer runs the
//! scheduler exactly once on exactly one card; the summary is a fold over the
//! answers given.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::algorithm::{schedule_with_quality, Quality};
use super::errors::SchedulerResult;
use super::models::{CardWithState, ReviewRecord};
use crate::clock::Clock;

/// Outcome of a study session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub correct: usize,
    pub incorrect: usize,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl SessionSummary {
    pub fn answered(&self) -> usize {
        self.correct + self.incorrect
    }
}

/// Fold a sequence of answers into a summary
pub fn summarize<I>(qualities: I, elapsed: Duration) -> SessionSummary
where
    I: IntoIterator<Item = Quality>,
{
    qualities.into_iter().fold(
        SessionSummary {
            correct: 0,
            incorrect: 0,
            elapsed,
        },
        |mut summary, quality| {
            if quality.is_lapse() {
                summary.incorrect += 1;
            } else {
                summary.correct += 1;
            }
            summary
        },
    )
}

/// An in-progress review session over a snapshot of due cards
pub struct StudySession<C: Clock> {
    cards: Vec<CardWithState>,
    position: usize,
    answers: Vec<Quality>,
    records: Vec<ReviewRecord>,
    started_at: DateTime<Utc>,
    clock: C,
}

impl<C: Clock> StudySession<C> {
    /// Start a session over `cards`, which should already be in review order
    pub fn start(cards: Vec<CardWithState>, clock: C) -> Self {
        let started_at = clock.now();
        Self {
            cards,
            position: 0,
            answers: Vec::new(),
            records: Vec::new(),
            started_at,
            clock,
        }
    }

    /// The card waiting for an answer, if any
    pub fn current(&self) -> Option<&CardWithState> {
        self.cards.get(self.position)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.position
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.cards.len()
    }

    /// Answer the current card and move to the next one.
    ///
    /// Returns `Ok(None)` once the session is finished. An invalid quality
    /// leaves the session where it was.
    pub fn answer(&mut self, quality: i32) -> SchedulerResult<Option<&CardWithState>> {
        let quality = Quality::new(quality)?;
        let now = self.clock.now();

        let Some(entry) = self.cards.get_mut(self.position) else {
            return Ok(None);
        };

        let next = schedule_with_quality(&entry.state, quality, now)?;
        self.records
            .push(ReviewRecord::from_state(quality.value(), &next, now));
        entry.state = next;

        self.answers.push(quality);
        self.position += 1;

        Ok(self.cards.get(self.position - 1))
    }

    /// Review history produced so far, one record per answer
    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    /// Cards answered so far, carrying their updated state
    pub fn reviewed(&self) -> &[CardWithState] {
        &self.cards[..self.position]
    }

    pub fn summary(&self) -> SessionSummary {
        summarize(
            self.answers.iter().copied(),
            self.clock.now() - self.started_at,
        )
    }
}

mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        Ok(Duration::seconds(secs))
    }
}
