//! CSV import and export of deck cards.
//!
//! Export writes `front,back,status,score,interval` with a header row.
//! Import needs `front` and `back` columns and yields New cards; any other
//! columns are ignored.

use crate::{Card, Deck, Result, Status};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A row in exported CSV files
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    front: &'a str,
    back: &'a str,
    status: Status,
    score: u32,
    interval: u32,
}

impl<'a> From<&'a Card> for ExportRow<'a> {
    fn from(card: &'a Card) -> Self {
        ExportRow {
            front: &card.front,
            back: &card.back,
            status: card.status,
            score: card.score,
            interval: card.interval,
        }
    }
}

/// A row read from imported CSV files
#[derive(Debug, Deserialize)]
struct ImportRow {
    front: String,
    back: String,
}

/// Write every card of `deck` to `path`, replacing the file
pub fn export_deck(deck: &Deck, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for card in deck.cards() {
        writer.serialize(ExportRow::from(card))?;
    }
    writer.flush()?;

    tracing::info!("Exported {} cards from {:?} to {:?}", deck.len(), deck.name(), path);
    Ok(deck.len())
}

/// Read cards from a CSV file with `front` and `back` columns
///
/// Rows that cannot be parsed are skipped with a warning.
pub fn import_cards(path: &Path) -> Result<Vec<Card>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let mut cards = Vec::new();
    for (row_num, result) in reader.deserialize::<ImportRow>().enumerate() {
        match result {
            Ok(row) => cards.push(Card::new(row.front, row.back)),
            Err(e) => tracing::warn!("Skipping CSV row {}: {}", row_num + 2, e),
        }
    }

    tracing::info!("Imported {} cards from {:?}", cards.len(), path);
    Ok(cards)
}
