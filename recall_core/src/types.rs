//! Core domain types for Recall.
//!
//! - Cards and their scheduling state
//! - Card status and quality ratings
//! - Per-deck status counts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Status and Quality
// ============================================================================

/// Where a card sits in the review cycle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Never rated
    #[default]
    New,
    /// Lapsed (last rating was Again)
    Learning,
    /// Due again after a successful rating
    Review,
    /// Rated successfully and waiting out its interval
    Complete,
}

impl Status {
    /// Ordinal written to deck files
    pub fn ordinal(self) -> u8 {
        match self {
            Status::New => 0,
            Status::Learning => 1,
            Status::Review => 2,
            Status::Complete => 3,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::New => "new",
            Status::Learning => "learning",
            Status::Review => "review",
            Status::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Recall quality supplied by the user after seeing the answer
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Again,
    Good,
    Easy,
}

impl Quality {
    /// Ordinal value fed into the ease-factor formula
    pub fn ordinal(self) -> u8 {
        match self {
            Quality::Again => 0,
            Quality::Good => 1,
            Quality::Easy => 2,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Quality::Again => "again",
            Quality::Good => "good",
            Quality::Easy => "easy",
        };
        f.write_str(s)
    }
}

impl FromStr for Quality {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "a" | "again" | "0" => Ok(Quality::Again),
            "g" | "good" | "1" => Ok(Quality::Good),
            "e" | "easy" | "2" => Ok(Quality::Easy),
            other => Err(crate::Error::Other(format!(
                "Unknown quality {:?} (expected again, good or easy)",
                other
            ))),
        }
    }
}

// ============================================================================
// Card
// ============================================================================

/// A flashcard and its scheduling state
///
/// Front and back are opaque text; markup is left for the presentation layer.
/// Scheduling fields are only changed by [`crate::scheduler`], apart from the
/// Complete → Review demotion done by the due-set selector.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub front: String,
    pub back: String,
    /// Consecutive successful ratings since the last lapse
    pub score: u32,
    /// Minutes after `last_reviewed` before the card is due again
    pub interval: u32,
    pub ease_factor: f64,
    pub status: Status,
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl Card {
    /// Create a New card with zeroed scheduling state
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            score: 0,
            interval: 0,
            ease_factor: 0.0,
            status: Status::New,
            last_reviewed: None,
        }
    }

    /// Whether the card has ever been rated
    pub fn is_new(&self) -> bool {
        self.status == Status::New
    }
}

// ============================================================================
// Status counts
// ============================================================================

/// Per-status card counts for a deck
///
/// A cache over the deck's cards; rebuilt by `Deck::recount_statuses`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub new: usize,
    pub learning: usize,
    pub review: usize,
    pub complete: usize,
}

impl StatusCounts {
    /// Count statuses over a card collection
    pub fn tally<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Self {
        let mut counts = Self::default();
        for card in cards {
            match card.status {
                Status::New => counts.new += 1,
                Status::Learning => counts.learning += 1,
                Status::Review => counts.review += 1,
                Status::Complete => counts.complete += 1,
            }
        }
        counts
    }
}
