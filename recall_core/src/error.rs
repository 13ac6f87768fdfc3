//! Error types for the recall_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for recall_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred while reading or writing the store
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error (review log)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No deck with the given name is loaded
    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    /// A deck with the given name already exists
    #[error("Deck already exists: {0}")]
    DeckExists(String),

    /// Card index outside the deck's live collection
    #[error("Deck {deck:?} has no card at position {index}")]
    CardIndex { deck: String, index: usize },

    /// 1-based card number that names no card
    #[error("Deck {deck:?} has no card number {number}")]
    CardNumber { deck: String, number: usize },

    /// Generic error
    #[error("{0}")]
    Other(String),
}
