//! Card scheduling: rating a card moves it through the review cycle.
//!
//! Rules (simplified SM-2):
//! - Again: reset score and interval, demote to Learning
//! - Good/Easy: first success gets a fixed interval, later ones multiply the
//!   interval by the ease factor; the card becomes Complete
//! - The ease factor is adjusted by the SM-2 formula for every rating,
//!   including Again, and is not clamped

use crate::config::SchedulerConfig;
use crate::{Card, Quality, Status};
use chrono::{DateTime, Utc};

/// Applies ratings to cards
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Rate `card` with `quality`, stamping `now` as its last review
    pub fn rate(&self, card: &mut Card, quality: Quality, now: DateTime<Utc>) {
        match quality {
            Quality::Again => {
                card.score = 0;
                card.interval = 0;
                card.status = Status::Learning;
            }
            Quality::Good => self.succeed(card, self.config.good_first_interval),
            Quality::Easy => self.succeed(card, self.config.easy_first_interval),
        }

        card.ease_factor += ease_delta(quality);
        card.last_reviewed = Some(now);

        tracing::debug!(
            "Rated {:?} as {}: score={} interval={} ease={:.2} status={}",
            card.front,
            quality,
            card.score,
            card.interval,
            card.ease_factor,
            card.status
        );
    }

    fn succeed(&self, card: &mut Card, first_interval: u32) {
        card.interval = if card.score == 0 {
            first_interval
        } else {
            grow_interval(card.interval, card.ease_factor)
        };
        card.status = Status::Complete;
        card.score += 1;
    }
}

/// Rate a card with the default first-success intervals (10 and 20 minutes)
pub fn rate(card: &mut Card, quality: Quality, now: DateTime<Utc>) {
    Scheduler::default().rate(card, quality, now)
}

/// SM-2 ease adjustment: `0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)`
pub fn ease_delta(quality: Quality) -> f64 {
    let miss = 5.0 - f64::from(quality.ordinal());
    0.1 - miss * (0.08 + miss * 0.02)
}

/// `floor(interval * ease)`, saturating at zero since intervals are unsigned
fn grow_interval(interval: u32, ease_factor: f64) -> u32 {
    let grown = (f64::from(interval) * ease_factor).floor();
    if grown <= 0.0 || grown.is_nan() {
        0
    } else if grown >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        grown as u32
    }
}
