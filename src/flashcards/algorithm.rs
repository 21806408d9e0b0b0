//! SM-2 Spaced Repetition Algorithm
//!
//! Implementation of the SuperMemo 2 algorithm for calculating
//! optimal review intervals based on user performance.
//!
//! Quality ratings (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but upon seeing answer, remembered
//! - 2: Incorrect, but answer seemed easy to recall
//! - 3: Correct response with serious difficulty
//! - 4: Correct response after hesitation
//! - 5: Perfect response with no hesitation
//!
//! The ease factor has a floor of 1.3 and no ceiling.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use super::errors::{SchedulerError, SchedulerResult};
use super::models::{CardMemoryState, MIN_EASE_FACTOR};

/// Lowest quality that counts as a successful recall
pub const PASSING_QUALITY: i32 = 3;

/// A recall quality score, guaranteed to be within 0..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: i32 = 5;

    pub fn new(value: i32) -> SchedulerResult<Self> {
        if (0..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(SchedulerError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> i32 {
        i32::from(self.0)
    }

    /// Quality below 3 is a lapse
    pub fn is_lapse(self) -> bool {
        self.value() < PASSING_QUALITY
    }
}

impl TryFrom<i32> for Quality {
    type Error = SchedulerError;

    fn try_from(value: i32) -> SchedulerResult<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reject states that could not have come out of the scheduler
pub fn validate_state(state: &CardMemoryState) -> SchedulerResult<()> {
    if state.repetitions < 0 {
        return Err(SchedulerError::InvalidState(format!(
            "negative repetitions ({})",
            state.repetitions
        )));
    }
    if state.interval_days < 0 {
        return Err(SchedulerError::InvalidState(format!(
            "negative interval ({} days)",
            state.interval_days
        )));
    }
    if !state.ease_factor.is_finite() || state.ease_factor < MIN_EASE_FACTOR {
        return Err(SchedulerError::InvalidState(format!(
            "ease factor {} below minimum {}",
            state.ease_factor, MIN_EASE_FACTOR
        )));
    }
    Ok(())
}

/// Apply the SM-2 ease update for one review: EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
pub fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    let miss = f64::from(Quality::MAX - quality.value());
    (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR)
}

/// Calculate the next memory state after one review
///
/// # Arguments
/// * `state` - Current card state
/// * `quality` - Quality rating (0-5); anything else is rejected
/// * `now` - Instant of the review
pub fn schedule_next_review(
    state: &CardMemoryState,
    quality: i32,
    now: DateTime<Utc>,
) -> SchedulerResult<CardMemoryState> {
    let quality = Quality::new(quality)?;
    schedule_with_quality(state, quality, now)
}

/// Same as [`schedule_next_review`] for an already validated quality
pub fn schedule_with_quality(
    state: &CardMemoryState,
    quality: Quality,
    now: DateTime<Utc>,
) -> SchedulerResult<CardMemoryState> {
    validate_state(state)?;

    let ease_factor = next_ease_factor(state.ease_factor, quality);

    let (repetitions, interval_days) = if quality.is_lapse() {
        (0, 1)
    } else {
        let repetitions = state.repetitions.saturating_add(1);
        let interval = match repetitions {
            1 => 1,
            2 => 6,
            // Growth compounds on the previous interval with the updated ease.
            // Values are positive so `round` is round-half-up here.
            _ => ((f64::from(state.interval_days) * ease_factor).round() as i32).max(1),
        };
        (repetitions, interval)
    };

    let next_review_at = now
        .checked_add_signed(Duration::days(i64::from(interval_days)))
        .ok_or_else(|| {
            SchedulerError::InvalidState(format!(
                "interval of {} days overflows the calendar",
                interval_days
            ))
        })?;

    Ok(CardMemoryState {
        card_id: state.card_id,
        repetitions,
        ease_factor,
        interval_days,
        next_review_at,
        last_reviewed_at: Some(now),
    })
}

/// Cards due at a given instant, oldest due first
///
/// Cloning the iterator restarts the sequence from wherever the clone was taken.
#[derive(Debug, Clone)]
pub struct DueCards<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> Iterator for DueCards<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for DueCards<T> {}

/// Select every card with `next_review_at <= as_of`, ordered by due date.
/// Ties keep the input order, which callers pass in creation order.
pub fn cards_due_for_review<I, T>(cards: I, as_of: DateTime<Utc>) -> DueCards<T>
where
    I: IntoIterator<Item = T>,
    T: AsRef<CardMemoryState>,
{
    let mut due: Vec<T> = cards
        .into_iter()
        .filter(|card| card.as_ref().is_due(as_of))
        .collect();

    // sort_by_key is stable
    due.sort_by_key(|card| card.as_ref().next_review_at);

    DueCards {
        inner: due.into_iter(),
    }
}

/// Calculate the preview intervals for each answer button
/// Used to show users what interval each rating would give
pub fn preview_intervals(
    state: &CardMemoryState,
    now: DateTime<Utc>,
) -> SchedulerResult<[i32; 4]> {
    // Again (1), Hard (3), Good (4), Easy (5)
    let again = schedule_next_review(state, 1, now)?.interval_days;
    let hard = schedule_next_review(state, 3, now)?.interval_days;
    let good = schedule_next_review(state, 4, now)?.interval_days;
    let easy = schedule_next_review(state, 5, now)?.interval_days;

    Ok([again, hard, good, easy])
}

/// Map UI rating (1-4: Again, Hard, Good, Easy) to SM-2 quality (0-5)
pub fn ui_rating_to_quality(rating: i32) -> SchedulerResult<Quality> {
    let quality = match rating {
        1 => 1, // Again -> quality 1 (incorrect but recognized)
        2 => 3, // Hard -> quality 3 (correct with difficulty)
        3 => 4, // Good -> quality 4 (correct with hesitation)
        4 => 5, // Easy -> quality 5 (perfect)
        other => return Err(SchedulerError::InvalidQuality(other)),
    };
    Quality::new(quality)
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: i32) -> String {
    if days <= 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 30, 0).unwrap()
    }

    fn new_card_state() -> CardMemoryState {
        CardMemoryState::new(Uuid::new_v4(), t0())
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_three_reviews_of_new_card() {
        let state = new_card_state();

        let first = schedule_next_review(&state, 4, t0()).unwrap();
        assert_eq!(first.repetitions, 1);
        assert_eq!(first.interval_days, 1);
        assert!(approx(first.ease_factor, 2.5));
        assert_eq!(first.next_review_at, t0() + Duration::days(1));
        assert_eq!(first.last_reviewed_at, Some(t0()));

        let day_later = t0() + Duration::days(1);
        let second = schedule_next_review(&first, 5, day_later).unwrap();
        assert_eq!(second.repetitions, 2);
        assert_eq!(second.interval_days, 6);
        assert!(approx(second.ease_factor, 2.6));

        let week_later = day_later + Duration::days(6);
        let third = schedule_next_review(&second, 3, week_later).unwrap();
        assert_eq!(third.repetitions, 3);
        assert!(approx(third.ease_factor, 2.46));
        // round(6 * 2.46) = round(14.76)
        assert_eq!(third.interval_days, 15);
        assert_eq!(third.next_review_at, week_later + Duration::days(15));
    }

    #[test]
    fn test_lapse_mid_sequence() {
        let mut state = new_card_state();
        state.repetitions = 5;
        state.interval_days = 20;
        state.ease_factor = 2.1;

        let result = schedule_next_review(&state, 1, t0()).unwrap();

        assert_eq!(result.repetitions, 0);
        assert_eq!(result.interval_days, 1);
        assert!(result.ease_factor < 2.1);
        // 2.1 + (0.1 - 4 * (0.08 + 4 * 0.02)) = 2.1 - 0.54
        assert!(approx(result.ease_factor, 1.56));
    }

    #[test]
    fn test_subsequent_review_uses_updated_ease() {
        let mut state = new_card_state();
        state.repetitions = 5;
        state.interval_days = 10;
        state.ease_factor = 2.5;

        // q=5 bumps ease to 2.6 before multiplying
        let result = schedule_next_review(&state, 5, t0()).unwrap();
        assert_eq!(result.interval_days, 26);
    }

    #[test]
    fn test_rounds_half_up() {
        let mut state = new_card_state();
        state.repetitions = 3;
        state.interval_days = 5;
        state.ease_factor = 2.5;

        // 5 * 2.5 = 12.5
        let result = schedule_next_review(&state, 4, t0()).unwrap();
        assert_eq!(result.interval_days, 13);
    }

    #[test]
    fn test_zero_interval_after_many_repetitions_still_schedules_a_day() {
        let mut state = new_card_state();
        state.repetitions = 4;
        state.interval_days = 0;

        let result = schedule_next_review(&state, 4, t0()).unwrap();
        assert_eq!(result.interval_days, 1);
    }

    #[test]
    fn test_rejects_out_of_range_quality() {
        let state = new_card_state();

        for quality in [-1, 6, 42, i32::MIN] {
            let err = schedule_next_review(&state, quality, t0()).unwrap_err();
            assert_eq!(err, SchedulerError::InvalidQuality(quality));
            assert!(err.is_invalid_input());
        }
    }

    #[test]
    fn test_rejects_corrupt_state() {
        let mut state = new_card_state();
        state.interval_days = -3;
        assert!(matches!(
            schedule_next_review(&state, 4, t0()),
            Err(SchedulerError::InvalidState(_))
        ));

        let mut state = new_card_state();
        state.repetitions = -1;
        assert!(schedule_next_review(&state, 4, t0()).is_err());

        let mut state = new_card_state();
        state.ease_factor = 1.0;
        assert!(schedule_next_review(&state, 4, t0()).is_err());

        let mut state = new_card_state();
        state.ease_factor = f64::NAN;
        assert!(schedule_next_review(&state, 4, t0()).is_err());
    }

    #[test]
    fn test_huge_interval_overflow_is_invalid_state() {
        let mut state = new_card_state();
        state.repetitions = 10;
        state.interval_days = i32::MAX;

        assert!(matches!(
            schedule_next_review(&state, 5, t0()),
            Err(SchedulerError::InvalidState(_))
        ));
    }

    #[test]
    fn test_ease_factor_minimum() {
        let mut state = new_card_state();
        for _ in 0..20 {
            state = schedule_next_review(&state, 0, t0()).unwrap();
            assert!(state.ease_factor >= MIN_EASE_FACTOR);
        }
        assert!(approx(state.ease_factor, MIN_EASE_FACTOR));
    }

    #[test]
    fn test_cards_due_for_review_ordering() {
        let as_of = t0();
        let mut a = CardMemoryState::new(Uuid::new_v4(), as_of - Duration::days(1));
        let b = CardMemoryState::new(Uuid::new_v4(), as_of - Duration::days(3));
        let c = CardMemoryState::new(Uuid::new_v4(), as_of + Duration::days(1));
        let d = CardMemoryState::new(Uuid::new_v4(), as_of - Duration::days(1));
        let e = CardMemoryState::new(Uuid::new_v4(), as_of);
        a.repetitions = 2;

        let cards = vec![a.clone(), b.clone(), c, d.clone(), e.clone()];
        let due: Vec<Uuid> = cards_due_for_review(&cards, as_of)
            .map(|s| s.card_id)
            .collect();

        // b is oldest; a and d tie and keep input order; e is due exactly now
        assert_eq!(due, vec![b.card_id, a.card_id, d.card_id, e.card_id]);
    }

    #[test]
    fn test_cards_due_for_review_is_restartable() {
        let as_of = t0();
        let cards = vec![
            CardMemoryState::new(Uuid::new_v4(), as_of - Duration::days(2)),
            CardMemoryState::new(Uuid::new_v4(), as_of - Duration::days(1)),
        ];

        let due = cards_due_for_review(&cards, as_of);
        assert_eq!(due.len(), 2);

        let first_pass: Vec<_> = due.clone().collect();
        let second_pass: Vec<_> = due.collect();
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn test_cards_due_for_review_empty() {
        let cards: Vec<CardMemoryState> = Vec::new();
        assert_eq!(cards_due_for_review(&cards, t0()).count(), 0);
    }

    #[test]
    fn test_preview_intervals() {
        let mut state = new_card_state();
        state.repetitions = 2;
        state.interval_days = 6;

        let [again, hard, good, easy] = preview_intervals(&state, t0()).unwrap();
        assert_eq!(again, 1);
        assert_eq!(hard, 14);
        assert_eq!(good, 15);
        assert_eq!(easy, 16);
    }

    #[test]
    fn test_ui_rating_to_quality() {
        assert_eq!(ui_rating_to_quality(1).unwrap().value(), 1);
        assert_eq!(ui_rating_to_quality(2).unwrap().value(), 3);
        assert_eq!(ui_rating_to_quality(3).unwrap().value(), 4);
        assert_eq!(ui_rating_to_quality(4).unwrap().value(), 5);
        assert!(ui_rating_to_quality(0).is_err());
        assert!(ui_rating_to_quality(5).is_err());
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(5), "5d");
        assert_eq!(format_interval(7), "1w");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(365), "1y");
        assert_eq!(format_interval(730), "2y");
    }

    proptest! {
        #[test]
        fn prop_interval_non_decreasing_on_success(quality in 4i32..=5, reviews in 1usize..10) {
            let mut state = new_card_state();
            let mut now = t0();
            let mut previous = state.interval_days;
            for _ in 0..reviews {
                state = schedule_next_review(&state, quality, now).unwrap();
                prop_assert!(state.interval_days >= previous);
                previous = state.interval_days;
                now = state.next_review_at;
            }
        }

        #[test]
        fn prop_lapse_resets(
            repetitions in 1i32..50,
            interval in 0i32..3650,
            ease in 1.3f64..4.0,
            quality in 0i32..3,
        ) {
            let mut state = new_card_state();
            state.repetitions = repetitions;
            state.interval_days = interval;
            state.ease_factor = ease;

            let next = schedule_next_review(&state, quality, t0()).unwrap();
            prop_assert_eq!(next.repetitions, 0);
            prop_assert_eq!(next.interval_days, 1);
            prop_assert!(next.ease_factor >= MIN_EASE_FACTOR);
        }

        #[test]
        fn prop_scheduler_is_deterministic(
            repetitions in 0i32..50,
            interval in 0i32..3650,
            ease in 1.3f64..4.0,
            quality in 0i32..=5,
        ) {
            let mut state = new_card_state();
            state.repetitions = repetitions;
            state.interval_days = interval;
            state.ease_factor = ease;

            let a = schedule_next_review(&state, quality, t0()).unwrap();
            let b = schedule_next_review(&state, quality, t0()).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
