//! Application context: configuration, store and the loaded decks.
//!
//! One context is built at start-up and handed to whatever drives the
//! review loop. Nothing in the core keeps global state.

use crate::review_log::{JsonlReviewSink, REVIEW_LOG_FILE};
use crate::{Config, Deck, Error, Result, ReviewSession, Scheduler, TextStore};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

pub struct AppContext {
    config: Config,
    store: TextStore,
    scheduler: Scheduler,
    decks: Vec<Deck>,
}

impl AppContext {
    /// Load every deck from the configured data directory
    pub fn load(config: Config) -> Result<Self> {
        config.validate()?;
        let store = TextStore::new(config.data.data_dir.clone());
        let decks = store.load_all()?;
        Ok(Self {
            scheduler: Scheduler::new(config.scheduler.clone()),
            config,
            store,
            decks,
        })
    }

    pub fn store(&self) -> &TextStore {
        &self.store
    }

    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    /// Look up a deck by name, falling back to a case-insensitive match
    pub fn deck(&self, name: &str) -> Result<&Deck> {
        let index = self.position(name)?;
        Ok(&self.decks[index])
    }

    pub fn deck_mut(&mut self, name: &str) -> Result<&mut Deck> {
        let index = self.position(name)?;
        Ok(&mut self.decks[index])
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.decks
            .iter()
            .position(|deck| deck.name() == name)
            .or_else(|| {
                self.decks
                    .iter()
                    .position(|deck| deck.name().eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| Error::DeckNotFound(name.to_string()))
    }

    /// Rewrite the index and every deck file
    pub fn save_all(&self) -> Result<()> {
        self.store.save_all(&self.decks)
    }

    /// Rewrite one deck's card file
    pub fn save_deck(&self, name: &str) -> Result<()> {
        self.store.write_deck(self.deck(name)?)
    }

    /// Add an empty deck and persist it along with the index
    pub fn create_deck(&mut self, name: &str) -> Result<&mut Deck> {
        let name = name.trim();
        if name.is_empty() || name.contains(['\n', '\r']) {
            return Err(Error::Other(format!("Invalid deck name {:?}", name)));
        }
        if self.decks.iter().any(|deck| deck.name() == name) {
            return Err(Error::DeckExists(name.to_string()));
        }

        let key = storage_key(name, self.decks.iter().map(Deck::key));
        let deck = Deck::new(name, key, Vec::new());
        self.store.write_deck(&deck)?;
        self.decks.push(deck);
        self.store.write_index(&self.decks)?;

        tracing::info!("Created deck {:?}", name);
        let last = self.decks.len() - 1;
        Ok(&mut self.decks[last])
    }

    /// Remove a deck from the index and delete its card file
    pub fn delete_deck(&mut self, name: &str) -> Result<Deck> {
        let index = self.position(name)?;
        let deck = self.decks.remove(index);
        self.store.write_index(&self.decks)?;
        self.store.remove_deck_file(deck.key())?;
        tracing::info!("Deleted deck {:?}", deck.name());
        Ok(deck)
    }

    /// Run due-set selection over every deck so counts reflect `now`
    pub fn refresh_due(&mut self, now: DateTime<Utc>) {
        let mut rng = rand::thread_rng();
        for deck in &mut self.decks {
            deck.due_indices(now, &mut rng);
        }
    }

    /// Start reviewing a deck; ratings persist through the returned store
    pub fn start_review(
        &mut self,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<(ReviewSession<'_>, &mut TextStore)> {
        let index = self.position(name)?;
        let deck = &mut self.decks[index];
        let session = ReviewSession::start_with(
            deck,
            self.scheduler.clone(),
            now,
            &mut rand::thread_rng(),
        );
        Ok((session, &mut self.store))
    }

    pub fn review_log_path(&self) -> PathBuf {
        self.store.root().join(REVIEW_LOG_FILE)
    }

    /// Review log sink, if review logging is enabled
    pub fn review_sink(&self) -> Option<JsonlReviewSink> {
        self.config
            .review
            .log_reviews
            .then(|| JsonlReviewSink::new(self.review_log_path()))
    }
}

/// Derive a file-safe storage key from a deck name, unique among `taken`
pub fn storage_key<'a>(name: &str, taken: impl IntoIterator<Item = &'a str>) -> String {
    let mut base = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            base.extend(c.to_lowercase());
        } else if !base.is_empty() && !base.ends_with('-') {
            base.push('-');
        }
    }
    while base.ends_with('-') {
        base.pop();
    }
    if base.is_empty() {
        base.push_str("deck");
    }

    let taken: Vec<&str> = taken.into_iter().collect();
    let mut key = base.clone();
    let mut suffix = 2;
    while taken.contains(&key.as_str()) {
        key = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Quality, Status};
    use chrono::{Duration, TimeZone};

    fn context_in(dir: &std::path::Path) -> AppContext {
        let mut config = Config::default();
        config.data.data_dir = dir.to_path_buf();
        AppContext::load(config).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_storage_key() {
        let none: [&str; 0] = [];
        assert_eq!(storage_key("Spanish", none), "spanish");
        assert_eq!(storage_key("  Capitals / Europe!  ", none), "capitals-europe");
        assert_eq!(storage_key("???", none), "deck");
        assert_eq!(storage_key("Math", ["math", "math-2"]), "math-3");
    }

    #[test]
    fn test_create_and_reload_deck() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(temp_dir.path());

        let deck = ctx.create_deck("Spanish").unwrap();
        deck.add_card("hola", "hello");
        ctx.save_deck("spanish").unwrap();

        assert!(matches!(ctx.create_deck("Spanish"), Err(Error::DeckExists(_))));
        assert!(ctx.create_deck("   ").is_err());

        let reloaded = context_in(temp_dir.path());
        let deck = reloaded.deck("Spanish").unwrap();
        assert_eq!(deck.key(), "spanish");
        assert_eq!(deck.cards()[0].front, "hola");
    }

    #[test]
    fn test_delete_deck_removes_file_and_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(temp_dir.path());
        ctx.create_deck("Math").unwrap();
        ctx.create_deck("Art").unwrap();
        let path = ctx.store().deck_path("math");
        assert!(path.exists());

        ctx.delete_deck("math").unwrap();

        assert!(!path.exists());
        assert!(matches!(ctx.deck("Math"), Err(Error::DeckNotFound(_))));
        let reloaded = context_in(temp_dir.path());
        assert_eq!(reloaded.decks().len(), 1);
        assert_eq!(reloaded.decks()[0].name(), "Art");
    }

    #[test]
    fn test_review_persists_each_rating() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(temp_dir.path());
        ctx.create_deck("Math").unwrap().add_card("2+2", "4");

        let (mut session, store) = ctx.start_review("Math", now()).unwrap();
        session.reveal();
        session.advance(Quality::Good, now(), store).unwrap();
        assert!(session.is_complete());

        let text = std::fs::read_to_string(ctx.store().deck_path("math")).unwrap();
        assert!(text.contains("- Score: 1\n"));
        assert!(text.contains("- Interval: 10\n"));
        assert_eq!(ctx.deck("Math").unwrap().counts().complete, 1);
    }

    #[test]
    fn test_refresh_due_demotes_complete_cards() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(temp_dir.path());
        ctx.create_deck("Math").unwrap().add_card("2+2", "4");

        let (mut session, store) = ctx.start_review("Math", now()).unwrap();
        session.reveal();
        session.advance(Quality::Easy, now(), store).unwrap();

        ctx.refresh_due(now() + Duration::minutes(19));
        assert_eq!(ctx.deck("Math").unwrap().cards()[0].status, Status::Complete);
        ctx.refresh_due(now() + Duration::minutes(20));
        assert_eq!(ctx.deck("Math").unwrap().cards()[0].status, Status::Review);
        assert_eq!(ctx.deck("Math").unwrap().counts().review, 1);
    }

    #[test]
    fn test_review_sink_follows_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data.data_dir = temp_dir.path().to_path_buf();
        config.review.log_reviews = false;
        let ctx = AppContext::load(config).unwrap();
        assert!(ctx.review_sink().is_none());

        let ctx = context_in(temp_dir.path());
        assert_eq!(
            ctx.review_sink().unwrap().path(),
            temp_dir.path().join(REVIEW_LOG_FILE)
        );
    }
}
