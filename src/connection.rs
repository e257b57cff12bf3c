//! Monitor connection facade over the pipeline.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::analysis::AnomalyEvent;
use crate::config::MonitorConfig;
use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineStats, StatsSnapshot};
use crate::protocol::{Decoded, NavControllerOutput};
use crate::source::Source;
use crate::sources::UdpSource;
use crate::stream::{SampleExt, StreamRate};

/// A running telemetry monitor.
///
/// Owns the spawned pipeline; dropping the connection cancels it. Streams
/// hand out the pipeline's channels, so any number of subscribers can
/// attach and detach over the connection's lifetime.
#[derive(Debug)]
pub struct Monitor {
    messages: watch::Receiver<Option<Arc<Decoded>>>,
    anomalies: broadcast::Sender<AnomalyEvent>,
    stats: Arc<PipelineStats>,
    config: MonitorConfig,
    cancel: CancellationToken,
}

impl Monitor {
    /// Bind a UDP telemetry endpoint and start processing.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the socket
    /// cannot be bound.
    pub async fn bind(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        let source = UdpSource::bind(config.socket_addr()).await?;
        info!(endpoint = %source.describe(), "monitor listening");
        Ok(Self::attach_unchecked(source, config))
    }

    /// Start processing over an arbitrary source (an in-memory queue, a
    /// capture replay, ...).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn attach<S: Source>(source: S, config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::attach_unchecked(source, config))
    }

    fn attach_unchecked<S: Source>(source: S, config: MonitorConfig) -> Self {
        let channels = Pipeline::spawn(source, &config);
        Self {
            messages: channels.messages,
            anomalies: channels.anomalies,
            stats: channels.stats,
            config,
            cancel: channels.cancel,
        }
    }

    /// Every decoded message, at wire rate. The underlying channel is
    /// latest-wins: a slow consumer sees the newest message, not a backlog.
    pub fn messages(&self) -> impl Stream<Item = Arc<Decoded>> + 'static {
        WatchStream::new(self.messages.clone())
            .filter_map(|opt| async move { opt })
            .boxed()
    }

    /// Decoded messages, sampled down to `rate`.
    pub fn messages_at(&self, rate: StreamRate) -> impl Stream<Item = Arc<Decoded>> + 'static {
        let messages = self.messages();
        match rate.period() {
            None => messages.boxed(),
            Some(period) => messages.sample_every(period).boxed(),
        }
    }

    /// Just the tracked NAV_CONTROLLER_OUTPUT records.
    pub fn nav_updates(&self) -> impl Stream<Item = NavControllerOutput> + 'static {
        self.messages()
            .filter_map(|decoded| async move {
                match decoded.as_ref() {
                    Decoded::NavControllerOutput(nav) => Some(*nav),
                    _ => None,
                }
            })
            .boxed()
    }

    /// Anomaly events from the detector.
    ///
    /// Each call subscribes independently. A subscriber that lags more than
    /// the configured queue depth loses the oldest events, mirroring the
    /// transport's own loss model.
    pub fn anomalies(&self) -> impl Stream<Item = AnomalyEvent> + 'static {
        BroadcastStream::new(self.anomalies.subscribe())
            .filter_map(|result| async move { result.ok() })
            .boxed()
    }

    /// Current discard and throughput counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// The configuration this monitor runs with.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Stop the pipeline. Streams end once the in-flight datagram (if any)
    /// finishes processing.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        debug!("dropping monitor connection");
        self.cancel.cancel();
    }
}
