//! Review sessions over a deck's due set.
//!
//! ```text
//! start ─► Active(hidden) ─reveal─► Active(revealed) ─advance─► Active(hidden) ... ─► Complete
//!                    └────────────── abort ──────────────┘──► Idle
//! ```
//!
//! A session mutably borrows its deck for its whole lifetime, so the card
//! collection cannot change underneath the queue. Operations called in the
//! wrong state are ignored.

use crate::{Card, Deck, Quality, Result, Scheduler};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Persists a deck after one of its cards was rated
pub trait DeckSink {
    fn save_deck(&mut self, deck: &Deck) -> Result<()>;
}

/// Where a session is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Aborted before reaching the end of the queue
    Idle,
    /// Showing the current card, answer hidden or revealed
    Active { revealed: bool },
    /// Every queued card has been rated, or nothing was due
    Complete,
}

pub struct ReviewSession<'d> {
    deck: &'d mut Deck,
    scheduler: Scheduler,
    queue: Vec<usize>,
    cursor: usize,
    state: SessionState,
}

impl<'d> ReviewSession<'d> {
    /// Start reviewing the cards of `deck` that are due at `now`
    pub fn start(deck: &'d mut Deck, now: DateTime<Utc>) -> Self {
        Self::start_with(deck, Scheduler::default(), now, &mut rand::thread_rng())
    }

    /// Start a session with an explicit scheduler and shuffle source
    pub fn start_with<R: Rng + ?Sized>(
        deck: &'d mut Deck,
        scheduler: Scheduler,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        let queue = deck.due_indices(now, rng);
        let state = if queue.is_empty() {
            SessionState::Complete
        } else {
            SessionState::Active { revealed: false }
        };

        tracing::info!(
            "Started review of deck {:?} with {} due cards",
            deck.name(),
            queue.len()
        );

        Self {
            deck,
            scheduler,
            queue,
            cursor: 0,
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    pub fn is_revealed(&self) -> bool {
        self.state == SessionState::Active { revealed: true }
    }

    /// The card under the cursor while the session is active
    pub fn current(&self) -> Option<&Card> {
        if !self.is_active() {
            return None;
        }
        self.queue
            .get(self.cursor)
            .and_then(|&index| self.deck.card(index))
    }

    /// Zero-based position of the current card in the queue
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of cards queued when the session started
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn deck(&self) -> &Deck {
        &*self.deck
    }

    /// Show the answer side. Returns false if the call was ignored.
    pub fn reveal(&mut self) -> bool {
        if self.state != (SessionState::Active { revealed: false }) {
            return false;
        }
        self.state = SessionState::Active { revealed: true };
        true
    }

    /// Rate the revealed card, persist the deck and move to the next card
    ///
    /// Returns the rated card, or `None` if the call was ignored because the
    /// answer was not revealed. If the save fails the card is put back as it
    /// was and the session ends in `Idle`.
    pub fn advance<S: DeckSink + ?Sized>(
        &mut self,
        quality: Quality,
        now: DateTime<Utc>,
        sink: &mut S,
    ) -> Result<Option<Card>> {
        if !self.is_revealed() {
            return Ok(None);
        }
        let Some(&index) = self.queue.get(self.cursor) else {
            self.state = SessionState::Complete;
            return Ok(None);
        };
        let Some(card) = self.deck.card_mut(index) else {
            self.state = SessionState::Complete;
            return Ok(None);
        };

        let previous = card.clone();
        self.scheduler.rate(card, quality, now);
        let rated = card.clone();
        self.deck.recount_statuses();

        if let Err(e) = sink.save_deck(&*self.deck) {
            if let Some(card) = self.deck.card_mut(index) {
                *card = previous;
            }
            self.deck.recount_statuses();
            self.state = SessionState::Idle;
            tracing::warn!(
                "Saving deck {:?} failed, review stopped: {}",
                self.deck.name(),
                e
            );
            return Err(e);
        }

        self.cursor += 1;
        self.state = if self.cursor >= self.queue.len() {
            tracing::info!("Finished review of deck {:?}", self.deck.name());
            SessionState::Complete
        } else {
            SessionState::Active { revealed: false }
        };

        Ok(Some(rated))
    }

    /// Stop early. Cards already rated keep their new state.
    pub fn abort(&mut self) {
        if self.is_active() {
            tracing::info!(
                "Aborted review of deck {:?} after {} of {} cards",
                self.deck.name(),
                self.cursor,
                self.queue.len()
            );
            self.state = SessionState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Status};
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Records a snapshot of every save
    #[derive(Default)]
    struct RecordingSink {
        saves: Vec<Vec<Card>>,
    }

    impl DeckSink for RecordingSink {
        fn save_deck(&mut self, deck: &Deck) -> Result<()> {
            self.saves.push(deck.cards().to_vec());
            Ok(())
        }
    }

    /// Fails the first `failures` saves, then records like `RecordingSink`
    #[derive(Default)]
    struct FlakySink {
        failures: usize,
        saves: usize,
    }

    impl DeckSink for FlakySink {
        fn save_deck(&mut self, _deck: &Deck) -> Result<()> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.saves += 1;
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn start(deck: &mut Deck, at: DateTime<Utc>) -> ReviewSession<'_> {
        ReviewSession::start_with(deck, Scheduler::default(), at, &mut StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_empty_due_set_completes_immediately() {
        let mut deck = Deck::new("Empty", "empty", vec![]);
        let mut session = start(&mut deck, now());

        assert!(session.is_complete());
        assert!(session.current().is_none());
        assert!(!session.reveal());
    }

    #[test]
    fn test_full_session() {
        let mut deck = Deck::new(
            "Math",
            "math",
            vec![Card::new("2+2", "4"), Card::new("3+3", "6")],
        );
        let mut sink = RecordingSink::default();
        let mut session = start(&mut deck, now());
        assert_eq!(session.len(), 2);
        assert_eq!(session.state(), SessionState::Active { revealed: false });

        let first = session.current().unwrap().front.clone();
        assert!(session.reveal());
        let rated = session.advance(Quality::Good, now(), &mut sink).unwrap().unwrap();
        assert_eq!(rated.front, first);
        assert_eq!(rated.status, Status::Complete);
        assert_eq!(session.position(), 1);
        assert_eq!(session.state(), SessionState::Active { revealed: false });

        assert_ne!(session.current().unwrap().front, first);
        session.reveal();
        session.advance(Quality::Again, now(), &mut sink).unwrap();
        assert!(session.is_complete());
        assert!(session.current().is_none());

        assert_eq!(sink.saves.len(), 2);
        assert_eq!(deck.counts().complete, 1);
        assert_eq!(deck.counts().learning, 1);
    }

    #[test]
    fn test_advance_requires_reveal() {
        let mut deck = Deck::new("Math", "math", vec![Card::new("2+2", "4")]);
        let mut sink = RecordingSink::default();
        let mut session = start(&mut deck, now());

        assert!(session.advance(Quality::Easy, now(), &mut sink).unwrap().is_none());
        assert_eq!(session.position(), 0);
        assert!(sink.saves.is_empty());

        session.reveal();
        assert!(!session.reveal());
        assert!(session.is_revealed());
    }

    #[test]
    fn test_abort_leaves_unrated_cards_untouched() {
        let mut deck = Deck::new(
            "Math",
            "math",
            vec![Card::new("2+2", "4"), Card::new("3+3", "6")],
        );
        let mut sink = RecordingSink::default();
        let mut session = start(&mut deck, now());
        session.reveal();
        session.advance(Quality::Easy, now(), &mut sink).unwrap();
        session.reveal();
        session.abort();

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.advance(Quality::Good, now(), &mut sink).unwrap().is_none());
        assert_eq!(deck.counts().complete, 1);
        assert_eq!(deck.counts().new, 1);
    }

    #[test]
    fn test_failed_save_restores_card_and_stops() {
        let mut deck = Deck::new("Math", "math", vec![Card::new("2+2", "4")]);
        let mut sink = FlakySink {
            failures: 1,
            ..FlakySink::default()
        };
        let mut session = start(&mut deck, now());
        session.reveal();

        assert!(session.advance(Quality::Good, now(), &mut sink).is_err());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.position(), 0);

        // A second attempt is ignored rather than rating the card twice
        assert!(session.advance(Quality::Good, now(), &mut sink).unwrap().is_none());
        assert_eq!(sink.saves, 0);

        assert_eq!(deck.cards()[0], Card::new("2+2", "4"));
        assert_eq!(deck.counts().new, 1);
        assert_eq!(deck.counts().complete, 0);
    }

    #[test]
    fn test_two_goods_scenario() {
        let mut deck = Deck::new("Math", "math", vec![Card::new("2+2", "4")]);
        let mut sink = RecordingSink::default();

        let mut session = start(&mut deck, now());
        session.reveal();
        session.advance(Quality::Good, now(), &mut sink).unwrap();
        let card = &deck.cards()[0];
        assert_eq!((card.score, card.interval, card.status), (1, 10, Status::Complete));

        let later = now() + Duration::minutes(10);
        let mut session = start(&mut deck, later);
        assert_eq!(session.len(), 1);
        assert_eq!(session.current().unwrap().status, Status::Review);

        let ease = session.current().unwrap().ease_factor;
        session.reveal();
        let rated = session.advance(Quality::Good, later, &mut sink).unwrap().unwrap();
        let expected = (10.0 * ease).floor().max(0.0) as u32;
        assert_eq!(rated.score, 2);
        assert_eq!(rated.interval, expected);
    }
}
