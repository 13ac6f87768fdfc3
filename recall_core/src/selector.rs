//! Due-set selection for review sessions.
//!
//! A card is due when it is New, or when whole minutes elapsed since its last
//! review reach its interval. Due cards that were Complete are demoted to
//! Review. The resulting set is shuffled; order carries no scheduling meaning.

use crate::{Card, Status};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// Whole minutes elapsed between `since` and `now`, rounded down
pub fn minutes_elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_seconds().div_euclid(60)
}

/// Eligibility predicate for a single card
///
/// A rated card without a review stamp is treated as due.
pub fn is_due(card: &Card, now: DateTime<Utc>) -> bool {
    if card.status == Status::New {
        return true;
    }
    match card.last_reviewed {
        Some(last) => minutes_elapsed(last, now) >= i64::from(card.interval),
        None => true,
    }
}

/// Select the due cards in `cards`, returning their indices in shuffled order
///
/// Demotes due Complete cards to Review in place.
pub fn select_due<R: Rng + ?Sized>(cards: &mut [Card], now: DateTime<Utc>, rng: &mut R) -> Vec<usize> {
    let mut due = Vec::new();

    for (index, card) in cards.iter_mut().enumerate() {
        if !is_due(card, now) {
            continue;
        }
        if card.status == Status::Complete {
            card.status = Status::Review;
        }
        due.push(index);
    }

    due.shuffle(rng);
    tracing::debug!("Selected {} due cards out of {}", due.len(), cards.len());
    due
}
