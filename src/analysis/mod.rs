//! Online analysis over the decoded telemetry stream.

mod anomaly;
mod window;

pub use anomaly::{AnomalyDetector, AnomalyEvent, DEFAULT_SPREAD_THRESHOLD, EVENT_SAMPLE_COUNT};
pub use window::{SlidingWindow, WindowSnapshot};
