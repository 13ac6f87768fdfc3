//! Decks: an ordered card collection with cached status counts.
//!
//! Card order is presentation order. Every mutation goes through a method
//! that recounts statuses, so `counts()` always matches the cards.

use crate::selector::select_due;
use crate::{Card, Error, Result, StatusCounts};
use chrono::{DateTime, Utc};
use rand::Rng;

#[derive(Clone, Debug)]
pub struct Deck {
    name: String,
    key: String,
    cards: Vec<Card>,
    counts: StatusCounts,
    /// Soft-deleted cards, most recent last. Never persisted.
    deleted: Vec<Card>,
}

impl Deck {
    /// Create a deck named `name` stored under `key`
    pub fn new(name: impl Into<String>, key: impl Into<String>, cards: Vec<Card>) -> Self {
        let mut deck = Self {
            name: name.into(),
            key: key.into(),
            cards,
            counts: StatusCounts::default(),
            deleted: Vec::new(),
        };
        deck.recount_statuses();
        deck
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage key: the file stem of this deck's card file
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn counts(&self) -> StatusCounts {
        self.counts
    }

    /// Rebuild the cached status counts from the live cards
    pub fn recount_statuses(&mut self) {
        self.counts = StatusCounts::tally(&self.cards);
    }

    /// Append a New card
    pub fn add_card(&mut self, front: impl Into<String>, back: impl Into<String>) {
        self.cards.push(Card::new(front, back));
        self.recount_statuses();
    }

    /// Append existing cards, keeping their state
    pub fn extend_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
        self.recount_statuses();
    }

    /// Replace a card's text; its scheduling state is kept
    pub fn edit_card(
        &mut self,
        index: usize,
        front: impl Into<String>,
        back: impl Into<String>,
    ) -> Result<()> {
        let card = self.cards.get_mut(index).ok_or_else(|| Error::CardIndex {
            deck: self.name.clone(),
            index,
        })?;
        card.front = front.into();
        card.back = back.into();
        Ok(())
    }

    /// Remove a card into the undo buffer
    pub fn delete_card(&mut self, index: usize) -> Result<&Card> {
        if index >= self.cards.len() {
            return Err(Error::CardIndex {
                deck: self.name.clone(),
                index,
            });
        }
        let card = self.cards.remove(index);
        tracing::debug!("Deleted card {:?} from deck {:?}", card.front, self.name);
        self.deleted.push(card);
        self.recount_statuses();
        Ok(&self.deleted[self.deleted.len() - 1])
    }

    /// Restore the most recently deleted card to the front of the deck
    ///
    /// Returns false when there is nothing to undo.
    pub fn undo_delete(&mut self) -> bool {
        match self.deleted.pop() {
            Some(card) => {
                tracing::debug!("Restored card {:?} to deck {:?}", card.front, self.name);
                self.cards.insert(0, card);
                self.recount_statuses();
                true
            }
            None => false,
        }
    }

    /// Number of cards waiting in the undo buffer
    pub fn deleted_len(&self) -> usize {
        self.deleted.len()
    }

    /// Indices of the cards due at `now`, shuffled with `rng`
    ///
    /// Due Complete cards are demoted to Review.
    pub fn due_indices<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> Vec<usize> {
        let due = select_due(&mut self.cards, now, rng);
        self.recount_statuses();
        due
    }

    /// The cards due at `now`, in random order
    pub fn build_due_set(&mut self, now: DateTime<Utc>) -> Vec<&Card> {
        let due = self.due_indices(now, &mut rand::thread_rng());
        due.into_iter().map(|index| &self.cards[index]).collect()
    }

    pub(crate) fn card_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rate, Quality, Status};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn sample_deck() -> Deck {
        Deck::new(
            "Spanish",
            "spanish",
            vec![
                Card::new("hola", "hello"),
                Card::new("adiós", "goodbye"),
                Card::new("gracias", "thank you"),
            ],
        )
    }

    #[test]
    fn test_counts_follow_mutations() {
        let mut deck = sample_deck();
        assert_eq!(deck.counts().new, 3);

        deck.add_card("perro", "dog");
        assert_eq!(deck.counts().new, 4);

        deck.delete_card(0).unwrap();
        assert_eq!(deck.counts(), StatusCounts::tally(deck.cards()));
        assert_eq!(deck.counts().new, 3);
    }

    #[test]
    fn test_delete_then_undo_restores_to_front() {
        let mut deck = sample_deck();
        let mut rated = deck.cards()[2].clone();
        rate(&mut rated, Quality::Easy, now());
        deck.extend_cards([rated.clone()]);

        let deleted = deck.delete_card(3).unwrap().clone();
        assert_eq!(deleted, rated);
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.deleted_len(), 1);

        assert!(deck.undo_delete());
        assert_eq!(deck.cards()[0], rated);
        assert_eq!(deck.cards()[0].status, Status::Complete);
        assert_eq!(deck.cards()[0].interval, 20);
        assert_eq!(deck.len(), 4);
        assert_eq!(deck.counts().complete, 1);
    }

    #[test]
    fn test_undo_is_lifo_and_empty_undo_is_noop() {
        let mut deck = sample_deck();
        deck.delete_card(0).unwrap();
        deck.delete_card(0).unwrap();

        assert!(deck.undo_delete());
        assert_eq!(deck.cards()[0].front, "adiós");
        assert!(deck.undo_delete());
        assert_eq!(deck.cards()[0].front, "hola");
        assert!(!deck.undo_delete());
        assert_eq!(deck.len(), 3);
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut deck = sample_deck();
        assert!(matches!(
            deck.delete_card(3),
            Err(Error::CardIndex { index: 3, .. })
        ));
        assert_eq!(deck.deleted_len(), 0);
    }

    #[test]
    fn test_edit_keeps_schedule() {
        let mut deck = sample_deck();
        rate(deck.card_mut(1).unwrap(), Quality::Good, now());
        deck.edit_card(1, "adiós", "bye").unwrap();

        let card = deck.card(1).unwrap();
        assert_eq!(card.back, "bye");
        assert_eq!(card.score, 1);
        assert_eq!(card.interval, 10);
        assert!(deck.edit_card(9, "x", "y").is_err());
    }

    #[test]
    fn test_build_due_set_demotes_and_recounts() {
        let mut deck = sample_deck();
        for index in 0..2 {
            rate(deck.card_mut(index).unwrap(), Quality::Good, now());
        }
        deck.recount_statuses();
        assert_eq!(deck.counts().complete, 2);

        let later = now() + Duration::minutes(10);
        let due: Vec<String> = deck
            .build_due_set(later)
            .into_iter()
            .map(|card| card.front.clone())
            .collect();

        assert_eq!(due.len(), 3);
        assert_eq!(deck.counts().review, 2);
        assert_eq!(deck.counts().complete, 0);
        assert_eq!(deck.counts().new, 1);
    }

    #[test]
    fn test_build_due_set_before_interval() {
        let mut deck = Deck::new("Math", "math", vec![Card::new("2+2", "4")]);
        rate(deck.card_mut(0).unwrap(), Quality::Good, now());

        assert!(deck.build_due_set(now() + Duration::minutes(9)).is_empty());
    }
}
