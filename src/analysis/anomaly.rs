//! Spread-threshold anomaly detection over window snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::window::{SlidingWindow, WindowSnapshot};

/// Default spread threshold, in the tracked field's unit (meters for
/// `wp_dist`). A default, not a protocol invariant.
pub const DEFAULT_SPREAD_THRESHOLD: u16 = 10_000;

/// How many of the most recent raw samples ride along with an event.
pub const EVENT_SAMPLE_COUNT: usize = 10;

/// One detected discontinuity, handed to the reporting sink and not
/// retained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyEvent {
    /// Smallest sample in the window at trigger time.
    pub min: u16,
    /// Largest sample in the window at trigger time.
    pub max: u16,
    /// Window mean at trigger time.
    pub mean: f64,
    /// `max - min`, the triggering signal.
    pub spread: u16,
    /// The last [`EVENT_SAMPLE_COUNT`] raw samples, oldest first.
    pub recent: Vec<u16>,
    /// When the trigger was evaluated.
    pub at: DateTime<Utc>,
}

/// Pure predicate plus event constructor over window snapshots.
///
/// Deliberately latch-free: every push that satisfies the threshold
/// re-triggers, so a sustained large spread keeps surfacing. Callers that
/// want debouncing add it at the sink.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    threshold: u16,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SPREAD_THRESHOLD)
    }
}

impl AnomalyDetector {
    pub fn new(threshold: u16) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Evaluate one snapshot, returning an event when the spread strictly
    /// exceeds the threshold.
    ///
    /// Snapshots without a spread basis (fewer than 2 samples) never
    /// trigger.
    pub fn evaluate(
        &self,
        snapshot: &WindowSnapshot,
        window: &SlidingWindow,
    ) -> Option<AnomalyEvent> {
        if !snapshot.has_spread_basis() || snapshot.spread <= self.threshold {
            return None;
        }

        Some(AnomalyEvent {
            min: snapshot.min,
            max: snapshot.max,
            mean: snapshot.mean,
            spread: snapshot.spread,
            recent: window.recent(EVENT_SAMPLE_COUNT),
            at: Utc::now(),
        })
    }
}
