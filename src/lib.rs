//! Streaming MAVLink v2 telemetry decoder with online anomaly detection.
//!
//! Skywatch listens to a best-effort datagram feed of MAVLink v2 frames,
//! recovers typed messages from fixed-offset payload layouts, and watches
//! one field — the NAV_CONTROLLER_OUTPUT waypoint distance — for
//! discontinuities with bounded, O(1)-per-sample sliding-window statistics.
//!
//! # Features
//!
//! - **Streaming decode**: validate, dispatch by message id, extract
//!   little-endian fields with no partial decodes
//! - **Online analysis**: fixed-capacity FIFO window, spread-threshold
//!   anomaly events with the raw samples attached
//! - **Injectable transport**: UDP in production, an in-memory queue in
//!   tests
//! - **Lossy by design**: matches the transport — no retries, no
//!   reordering, no duplicate suppression
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use skywatch::{MonitorConfig, Skywatch};
//!
//! #[tokio::main]
//! async fn main() -> skywatch::Result<()> {
//!     let monitor = Skywatch::bind(MonitorConfig::default()).await?;
//!
//!     let mut anomalies = monitor.anomalies();
//!     while let Some(event) = anomalies.next().await {
//!         println!(
//!             "wp_dist spread {} m (min {}, max {}), recent {:?}",
//!             event.spread, event.min, event.max, event.recent
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Feeding synthetic frames instead of a socket:
//!
//! ```rust,no_run
//! use skywatch::{MonitorConfig, QueueSource, Skywatch};
//!
//! # #[tokio::main]
//! # async fn main() -> skywatch::Result<()> {
//! let (feeder, source) = QueueSource::channel(64);
//! let monitor = Skywatch::attach(source, MonitorConfig::default())?;
//! feeder.send(vec![0xFD /* ... */]).await;
//! # Ok(())
//! # }
//! ```

// Core types and error handling
mod config;
mod error;
pub mod logging;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;

// Wire format and analysis
pub mod analysis;
pub mod protocol;

// Stream-based monitor architecture
pub mod connection;
pub mod pipeline;
pub mod source;
pub mod sources;
pub mod stream;

// Core exports
pub use config::{DEFAULT_BIND_PORT, DEFAULT_WINDOW_CAPACITY, MonitorConfig};
pub use error::{DecodeError, FrameError, MonitorError, Result};

// Wire format exports
pub use protocol::{
    Attitude, Decoded, GlobalPositionInt, NavControllerOutput, ValidFrame, VfrHud,
};

// Analysis exports
pub use analysis::{
    AnomalyDetector, AnomalyEvent, DEFAULT_SPREAD_THRESHOLD, SlidingWindow, WindowSnapshot,
};

// Monitor API exports
pub use connection::Monitor;
pub use logging::{Verbosity, init_logging};
pub use pipeline::{PipelineStats, StatsSnapshot};
pub use source::Source;
pub use sources::{QueueSender, QueueSource, UdpSource};
pub use stream::StreamRate;

/// Unified entry point for telemetry monitor connections.
///
/// # Examples
///
/// ## Live UDP feed
/// ```rust,no_run
/// use skywatch::{MonitorConfig, Skywatch};
///
/// #[tokio::main]
/// async fn main() -> skywatch::Result<()> {
///     let monitor = Skywatch::bind(MonitorConfig::default()).await?;
///     // Use monitor...
///     Ok(())
/// }
/// ```
///
/// ## Injected source
/// ```rust,no_run
/// use skywatch::{MonitorConfig, QueueSource, Skywatch};
///
/// # #[tokio::main]
/// # async fn main() -> skywatch::Result<()> {
/// let (_feeder, source) = QueueSource::channel(64);
/// let monitor = Skywatch::attach(source, MonitorConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub struct Skywatch;

impl Skywatch {
    /// Bind a UDP telemetry endpoint and start the monitor.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the socket
    /// cannot be bound.
    pub async fn bind(config: MonitorConfig) -> Result<Monitor> {
        Monitor::bind(config).await
    }

    /// Start the monitor over an arbitrary datagram source.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn attach<S: Source>(source: S, config: MonitorConfig) -> Result<Monitor> {
        Monitor::attach(source, config)
    }
}
