//! Append-only review log.
//!
//! Every rating is appended as one JSON line. The log is a record for the
//! user; scheduling never reads it.

use crate::{Card, Quality, Result, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const REVIEW_LOG_FILE: &str = "reviews.jsonl";

/// One rating and the schedule it produced
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReviewEvent {
    pub id: Uuid,
    pub deck: String,
    pub front: String,
    pub quality: Quality,
    pub score: u32,
    pub interval: u32,
    pub ease_factor: f64,
    pub status: Status,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewEvent {
    /// Build an event from a card that has just been rated
    pub fn from_rated(deck: &str, card: &Card, quality: Quality, reviewed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            deck: deck.to_string(),
            front: card.front.clone(),
            quality,
            score: card.score,
            interval: card.interval,
            ease_factor: card.ease_factor,
            status: card.status,
            reviewed_at,
        }
    }
}

/// Destination for review events
pub trait ReviewSink {
    fn append(&mut self, event: &ReviewEvent) -> Result<()>;
}

/// JSONL-backed review sink
pub struct JsonlReviewSink {
    path: PathBuf,
}

impl JsonlReviewSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl ReviewSink for JsonlReviewSink {
    fn append(&mut self, event: &ReviewEvent) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(event)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::debug!("Logged review {} of {:?}", event.id, event.front);
        Ok(())
    }
}

/// Read all events from a review log, oldest first
///
/// Lines that fail to parse are skipped with a warning.
pub fn read_events(path: &Path) -> Result<Vec<ReviewEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<ReviewEvent>(&line) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!("Failed to parse review at line {}: {}", line_num + 1, e);
            }
        }
    }

    tracing::debug!("Read {} reviews from {:?}", events.len(), path);
    Ok(events)
}
