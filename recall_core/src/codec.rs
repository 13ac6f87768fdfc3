//! Line-oriented text format for the deck index and deck card files.
//!
//! Index file:
//! ```text
//! # Decks
//!
//! ## Spanish
//! - JSON File: spanish
//! ```
//!
//! Card file:
//! ```text
//! # Cards
//!
//! ### Card
//! - Front: hola
//! - Back: hello
//! - Score: 0
//! - Interval: 0
//! - Ease Factor: 0.00
//! - Status: 0
//! - Last Reviewed: never
//! ```
//!
//! Decoding is driven by line prefixes; lines that match nothing are skipped.
//! Only front and back are read back from card records. The scheduling lines
//! are informational, so a reloaded card starts again as New.

use crate::{Card, Deck};
use chrono::SecondsFormat;
use std::fmt::Write;

pub const INDEX_TITLE: &str = "# Decks";
pub const CARDS_TITLE: &str = "# Cards";

const DECK_HEADING: &str = "## ";
const DECK_KEY_FIELD: &str = "- JSON File: ";
const CARD_HEADING: &str = "### Card";
const FRONT_FIELD: &str = "- Front: ";
const BACK_FIELD: &str = "- Back: ";
const WRITE_ONLY_FIELDS: [&str; 5] = [
    "- Score: ",
    "- Interval: ",
    "- Ease Factor: ",
    "- Status: ",
    "- Last Reviewed: ",
];

/// One deck as listed in the index
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub key: String,
}

/// Render the deck index
pub fn encode_index<'a>(decks: impl IntoIterator<Item = &'a Deck>) -> String {
    let mut out = format!("{}\n\n", INDEX_TITLE);
    for deck in decks {
        let _ = writeln!(out, "{}{}", DECK_HEADING, deck.name());
        let _ = writeln!(out, "{}{}", DECK_KEY_FIELD, deck.key());
    }
    out
}

/// Parse the deck index
///
/// A deck without a key line is stored under its own name. Records whose
/// key is not a plain file name, or repeats an earlier record's key, are
/// skipped.
pub fn decode_index(text: &str) -> Vec<IndexEntry> {
    let mut entries: Vec<IndexEntry> = Vec::new();
    let mut current: Option<IndexEntry> = None;

    for (line_num, line) in text.lines().enumerate() {
        if let Some(name) = line.strip_prefix(DECK_HEADING) {
            entries.extend(current.take().map(finish_entry));
            current = Some(IndexEntry {
                name: name.trim().to_string(),
                key: String::new(),
            });
        } else if let Some(key) = line.strip_prefix(DECK_KEY_FIELD) {
            match current.as_mut() {
                Some(entry) => entry.key = key.trim().to_string(),
                None => tracing::warn!("Index line {}: key outside a deck record", line_num + 1),
            }
        } else if !line.trim().is_empty() && line != INDEX_TITLE {
            tracing::debug!("Index line {}: ignoring {:?}", line_num + 1, line);
        }
    }
    entries.extend(current.map(finish_entry));

    let mut accepted: Vec<IndexEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !is_valid_key(&entry.key) {
            tracing::warn!(
                "Skipping deck {:?}: storage key {:?} is not a file name",
                entry.name,
                entry.key
            );
        } else if accepted.iter().any(|seen| seen.key == entry.key) {
            tracing::warn!(
                "Skipping deck {:?}: storage key {:?} is already used",
                entry.name,
                entry.key
            );
        } else {
            accepted.push(entry);
        }
    }
    accepted
}

fn finish_entry(mut entry: IndexEntry) -> IndexEntry {
    if entry.key.is_empty() {
        entry.key = entry.name.clone();
    }
    entry
}

/// Whether `key` can name a card file inside the cards directory
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['/', '\\', '\0']) && !key.contains("..")
}

/// Render a single card record
pub fn encode_card(card: &Card) -> String {
    let last_reviewed = card
        .last_reviewed
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "never".to_string());

    let mut out = String::new();
    let _ = writeln!(out, "{}", CARD_HEADING);
    let _ = writeln!(out, "{}{}", FRONT_FIELD, escape(&card.front));
    let _ = writeln!(out, "{}{}", BACK_FIELD, escape(&card.back));
    let _ = writeln!(out, "{}{}", WRITE_ONLY_FIELDS[0], card.score);
    let _ = writeln!(out, "{}{}", WRITE_ONLY_FIELDS[1], card.interval);
    let _ = writeln!(out, "{}{:.2}", WRITE_ONLY_FIELDS[2], card.ease_factor);
    let _ = writeln!(out, "{}{}", WRITE_ONLY_FIELDS[3], card.status.ordinal());
    let _ = writeln!(out, "{}{}", WRITE_ONLY_FIELDS[4], last_reviewed);
    out
}

/// Render a deck's card file
pub fn encode_cards<'a>(cards: impl IntoIterator<Item = &'a Card>) -> String {
    let mut out = format!("{}\n\n", CARDS_TITLE);
    for card in cards {
        out.push_str(&encode_card(card));
    }
    out
}

/// Parse a deck's card file into New cards
pub fn decode_cards(text: &str) -> Vec<Card> {
    let mut cards = Vec::new();
    let mut current: Option<Card> = None;

    for (line_num, line) in text.lines().enumerate() {
        if line.starts_with(CARD_HEADING) {
            cards.extend(current.take());
            current = Some(Card::new("", ""));
        } else if let Some(front) = line.strip_prefix(FRONT_FIELD) {
            if let Some(card) = current.as_mut() {
                card.front = unescape(front);
            }
        } else if let Some(back) = line.strip_prefix(BACK_FIELD) {
            if let Some(card) = current.as_mut() {
                card.back = unescape(back);
            }
        } else if WRITE_ONLY_FIELDS.iter().any(|field| line.starts_with(field)) {
            continue;
        } else if !line.trim().is_empty() && line != CARDS_TITLE {
            tracing::debug!("Card line {}: ignoring {:?}", line_num + 1, line);
        }
    }
    cards.extend(current);
    cards
}

/// Keep card text on one line
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of `escape`; unknown escapes are kept verbatim
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
