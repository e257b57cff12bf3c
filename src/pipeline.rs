//! Processing pipeline: validate, decode, track, evaluate.
//!
//! One spawned task owns the source, the sliding window, and the detector,
//! processing each datagram independently and statelessly except for the
//! window. Decoded messages fan out on a `watch` channel (latest-wins;
//! dropped intermediates are accepted the same way the transport accepts
//! dropped datagrams). Anomaly events fan out on a `broadcast` channel.
//! Validation and decode failures discard the frame, bump a counter, and
//! the loop resumes; only transport failures can stop it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::analysis::{AnomalyDetector, AnomalyEvent, SlidingWindow};
use crate::config::MonitorConfig;
use crate::error::{DecodeError, FrameError};
use crate::protocol::{self, Decoded};
use crate::source::Source;

/// Consecutive transport failures tolerated before the loop gives up.
const MAX_TRANSPORT_ERRORS: u32 = 10;

/// Per-variant discard and throughput counters.
///
/// Observability only: the pipeline never branches on these.
#[derive(Debug, Default)]
pub struct PipelineStats {
    pub datagrams_received: AtomicU64,
    pub messages_decoded: AtomicU64,
    pub frames_too_short: AtomicU64,
    pub frames_bad_marker: AtomicU64,
    pub frames_truncated: AtomicU64,
    pub payloads_too_small: AtomicU64,
    pub messages_unhandled: AtomicU64,
    pub anomalies_emitted: AtomicU64,
}

impl PipelineStats {
    fn record_frame_error(&self, err: &FrameError) {
        match err {
            FrameError::TooShort { .. } => &self.frames_too_short,
            FrameError::BadVersionMarker { .. } => &self.frames_bad_marker,
            FrameError::TruncatedPayload { .. } => &self.frames_truncated,
        }
        .fetch_add(1, Ordering::Relaxed);
    }

    fn record_decode_error(&self, err: &DecodeError) {
        match err {
            DecodeError::PayloadTooSmall { .. } => &self.payloads_too_small,
            DecodeError::Unhandled(_) => &self.messages_unhandled,
        }
        .fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            messages_decoded: self.messages_decoded.load(Ordering::Relaxed),
            frames_too_short: self.frames_too_short.load(Ordering::Relaxed),
            frames_bad_marker: self.frames_bad_marker.load(Ordering::Relaxed),
            frames_truncated: self.frames_truncated.load(Ordering::Relaxed),
            payloads_too_small: self.payloads_too_small.load(Ordering::Relaxed),
            messages_unhandled: self.messages_unhandled.load(Ordering::Relaxed),
            anomalies_emitted: self.anomalies_emitted.load(Ordering::Relaxed),
        }
    }
}

/// Plain-value view of [`PipelineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub datagrams_received: u64,
    pub messages_decoded: u64,
    pub frames_too_short: u64,
    pub frames_bad_marker: u64,
    pub frames_truncated: u64,
    pub payloads_too_small: u64,
    pub messages_unhandled: u64,
    pub anomalies_emitted: u64,
}

impl StatsSnapshot {
    /// Total frames discarded for any reason.
    pub fn discarded(&self) -> u64 {
        self.frames_too_short
            + self.frames_bad_marker
            + self.frames_truncated
            + self.payloads_too_small
            + self.messages_unhandled
    }
}

/// Result of spawning the pipeline task.
pub struct PipelineChannels {
    /// Latest decoded message.
    pub messages: watch::Receiver<Option<Arc<Decoded>>>,
    /// Anomaly event fan-out; subscribe before feeding to see every event.
    pub anomalies: broadcast::Sender<AnomalyEvent>,
    /// Shared counters.
    pub stats: Arc<PipelineStats>,
    /// Cancellation token for graceful shutdown.
    pub cancel: CancellationToken,
}

/// Pipeline spawns and manages the processing task.
pub struct Pipeline;

impl Pipeline {
    /// Spawn the processing task for the given source.
    ///
    /// Returns the message watch receiver, the anomaly broadcast handle, the
    /// shared counters, and a cancellation token for shutdown.
    pub fn spawn<S>(source: S, config: &MonitorConfig) -> PipelineChannels
    where
        S: Source,
    {
        let (message_tx, message_rx) = watch::channel(None);
        let (anomaly_tx, _) = broadcast::channel(config.anomaly_queue_depth);
        let stats = Arc::new(PipelineStats::default());
        let cancel = CancellationToken::new();

        let worker = Worker {
            window: SlidingWindow::new(config.window_capacity),
            detector: AnomalyDetector::new(config.spread_threshold),
            message_tx,
            anomaly_tx: anomaly_tx.clone(),
            stats: Arc::clone(&stats),
        };

        let cancel_task = cancel.clone();
        tokio::spawn(async move {
            worker.run(source, cancel_task).await;
        });

        PipelineChannels { messages: message_rx, anomalies: anomaly_tx, stats, cancel }
    }
}

struct Worker {
    window: SlidingWindow,
    detector: AnomalyDetector,
    message_tx: watch::Sender<Option<Arc<Decoded>>>,
    anomaly_tx: broadcast::Sender<AnomalyEvent>,
    stats: Arc<PipelineStats>,
}

impl Worker {
    async fn run<S: Source>(mut self, mut source: S, cancel: CancellationToken) {
        info!(source = %source.describe(), "pipeline started");
        let mut transport_errors = 0u32;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("pipeline cancelled");
                    break;
                }
                result = source.recv() => result,
            };

            match result {
                Ok(Some(datagram)) => {
                    transport_errors = 0;
                    self.stats.datagrams_received.fetch_add(1, Ordering::Relaxed);
                    if !self.process(&datagram) {
                        debug!("message receiver dropped, shutting down");
                        break;
                    }
                }
                Ok(None) => {
                    info!("source exhausted");
                    let _ = self.message_tx.send(None);
                    break;
                }
                Err(e) => {
                    transport_errors += 1;
                    error!(
                        error = %e,
                        attempt = transport_errors,
                        max = MAX_TRANSPORT_ERRORS,
                        "transport receive failed"
                    );

                    if !e.is_retryable() || transport_errors >= MAX_TRANSPORT_ERRORS {
                        error!("giving up on transport");
                        let _ = self.message_tx.send(None);
                        break;
                    }

                    // Exponential backoff: 50ms, 100ms, 200ms, ...
                    let backoff = std::time::Duration::from_millis(
                        50 * (1 << transport_errors.min(5)),
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        let stats = self.stats.snapshot();
        info!(
            received = stats.datagrams_received,
            decoded = stats.messages_decoded,
            discarded = stats.discarded(),
            anomalies = stats.anomalies_emitted,
            "pipeline ended"
        );
    }

    /// Process one datagram end to end. Returns `false` once every message
    /// receiver is gone.
    fn process(&mut self, datagram: &[u8]) -> bool {
        let frame = match protocol::validate(datagram) {
            Ok(frame) => frame,
            Err(err) => {
                self.stats.record_frame_error(&err);
                trace!(error = %err, "frame discarded");
                return true;
            }
        };

        let decoded = match protocol::decode(frame.msg_id, frame.payload) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.stats.record_decode_error(&err);
                trace!(msg_id = frame.msg_id, error = %err, "payload discarded");
                return true;
            }
        };

        self.stats.messages_decoded.fetch_add(1, Ordering::Relaxed);
        trace!(msg = decoded.name(), "message decoded");

        if let Decoded::NavControllerOutput(nav) = &decoded {
            let snapshot = self.window.push(nav.wp_dist);
            if let Some(event) = self.detector.evaluate(&snapshot, &self.window) {
                self.stats.anomalies_emitted.fetch_add(1, Ordering::Relaxed);
                warn!(
                    spread = event.spread,
                    min = event.min,
                    max = event.max,
                    threshold = self.detector.threshold(),
                    "wp_dist spread anomaly"
                );
                // No receivers yet is fine; events are fire-and-forget
                let _ = self.anomaly_tx.send(event);
            }
        }

        self.message_tx.send(Some(Arc::new(decoded))).is_ok()
    }
}
