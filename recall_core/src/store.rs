//! On-disk deck storage.
//!
//! Layout under the application directory:
//! ```text
//! <root>/decks.md          # deck index
//! <root>/cards/<key>.md    # one card file per deck
//! ```
//!
//! Saves rewrite whole files in place. Read or write failures are returned
//! to the caller and end the operation; malformed lines are skipped by the
//! codec.

use crate::codec::{decode_cards, decode_index, encode_cards, encode_index, IndexEntry};
use crate::session::DeckSink;
use crate::{Deck, Result};
use std::io;
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "decks.md";
pub const CARDS_DIR: &str = "cards";
pub const DECK_FILE_EXTENSION: &str = "md";

#[derive(Clone, Debug)]
pub struct TextStore {
    root: PathBuf,
}

impl TextStore {
    /// Create a store rooted at the application directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn cards_dir(&self) -> PathBuf {
        self.root.join(CARDS_DIR)
    }

    /// Path of the card file for a storage key
    pub fn deck_path(&self, key: &str) -> PathBuf {
        self.cards_dir()
            .join(format!("{}.{}", key, DECK_FILE_EXTENSION))
    }

    /// Create the application and card directories
    pub fn ensure_layout(&self) -> Result<()> {
        std::fs::create_dir_all(self.cards_dir())?;
        Ok(())
    }

    /// Load every deck listed in the index
    ///
    /// A missing index is created empty. A listed deck whose card file does
    /// not exist loads as an empty deck.
    pub fn load_all(&self) -> Result<Vec<Deck>> {
        self.ensure_layout()?;

        let index_path = self.index_path();
        let text = match std::fs::read_to_string(&index_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("No deck index at {:?}, creating one", index_path);
                self.write_index(&[])?;
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let decks = decode_index(&text)
            .iter()
            .map(|entry| self.load_deck(entry))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Loaded {} decks from {:?}", decks.len(), self.root);
        Ok(decks)
    }

    /// Load the cards of one index entry
    pub fn load_deck(&self, entry: &IndexEntry) -> Result<Deck> {
        let path = self.deck_path(&entry.key);
        let cards = match std::fs::read_to_string(&path) {
            Ok(text) => decode_cards(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Card file {:?} for deck {:?} is missing, starting empty",
                    path,
                    entry.name
                );
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("Loaded {} cards for deck {:?}", cards.len(), entry.name);
        Ok(Deck::new(entry.name.clone(), entry.key.clone(), cards))
    }

    /// Rewrite the deck index from `decks`
    pub fn write_index(&self, decks: &[Deck]) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.index_path(), encode_index(decks))?;
        tracing::debug!("Saved index with {} decks", decks.len());
        Ok(())
    }

    /// Rewrite a deck's card file
    pub fn write_deck(&self, deck: &Deck) -> Result<()> {
        std::fs::create_dir_all(self.cards_dir())?;
        let path = self.deck_path(deck.key());
        std::fs::write(&path, encode_cards(deck.cards()))?;
        tracing::debug!("Saved {} cards to {:?}", deck.len(), path);
        Ok(())
    }

    /// Rewrite the index and every deck file
    pub fn save_all(&self, decks: &[Deck]) -> Result<()> {
        self.write_index(decks)?;
        for deck in decks {
            self.write_deck(deck)?;
        }
        tracing::info!("Saved {} decks to {:?}", decks.len(), self.root);
        Ok(())
    }

    /// Delete a deck's card file if present
    pub fn remove_deck_file(&self, key: &str) -> Result<()> {
        let path = self.deck_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl DeckSink for TextStore {
    fn save_deck(&mut self, deck: &Deck) -> Result<()> {
        self.write_deck(deck)
    }
}
