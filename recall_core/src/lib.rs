#![forbid(unsafe_code)]

//! Core scheduling engine and card store for Recall.
//!
//! This crate provides:
//! - Domain types (cards, statuses, quality ratings)
//! - Card scheduling and due-set selection
//! - Review sessions
//! - Persistence (text deck store, review log, CSV interchange)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod scheduler;
pub mod selector;
pub mod deck;
pub mod session;
pub mod codec;
pub mod store;
pub mod review_log;
pub mod csv_io;
pub mod item;
pub mod context;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use scheduler::{rate, Scheduler};
pub use deck::Deck;
pub use session::{DeckSink, ReviewSession, SessionState};
pub use store::TextStore;
pub use review_log::{read_events, JsonlReviewSink, ReviewEvent, ReviewSink};
pub use item::ListItem;
pub use context::AppContext;
