//! Rate control for subscriber streams.
//!
//! Telemetry arrives at wire rate; many sinks (UIs, log writers) want less.
//! [`StreamRate`] names the contract and [`SampleExt::sample_every`] applies
//! it: at most one item per period, latest-wins, intermediate items
//! discarded.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use serde::{Deserialize, Serialize};
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Delivery rate for a subscriber stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StreamRate {
    /// Every decoded item, at wire rate.
    Native,

    /// At most `hz` items per second, latest-wins.
    Max(u32),
}

impl StreamRate {
    /// Sampling period implied by this rate, if any. `Max(0)` degrades to
    /// `Native` rather than dividing by zero.
    pub fn period(self) -> Option<Duration> {
        match self {
            StreamRate::Native => None,
            StreamRate::Max(0) => None,
            StreamRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / f64::from(hz))),
        }
    }
}

pin_project! {
    /// Stream combinator emitting at most one item per period.
    pub struct Sampled<S: Stream> {
        #[pin]
        inner: S,
        ticker: Interval,
        latest: Option<S::Item>,
        done: bool,
    }
}

impl<S: Stream> Sampled<S> {
    fn new(inner: S, period: Duration) -> Self {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { inner, ticker, latest: None, done: false }
    }
}

impl<S: Stream> Stream for Sampled<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Absorb everything the inner stream has, keeping only the newest.
        while !*this.done {
            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => *this.latest = Some(item),
                Poll::Ready(None) => {
                    *this.done = true;
                    // Flush the held item, then end
                    return Poll::Ready(this.latest.take());
                }
                Poll::Pending => break,
            }
        }

        if *this.done {
            return Poll::Ready(None);
        }

        ready!(this.ticker.poll_tick(cx));
        match this.latest.take() {
            Some(item) => Poll::Ready(Some(item)),
            // Tick with nothing buffered: wait for the inner stream's waker
            None => Poll::Pending,
        }
    }
}

/// Extension trait adding period sampling to any stream.
pub trait SampleExt: Stream {
    /// Emit at most one item per `period`, keeping only the latest.
    fn sample_every(self, period: Duration) -> Sampled<Self>
    where
        Self: Sized,
    {
        Sampled::new(self, period)
    }
}

impl<T: Stream> SampleExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn native_rate_has_no_period() {
        assert_eq!(StreamRate::Native.period(), None);
        assert_eq!(StreamRate::Max(0).period(), None);
        assert_eq!(StreamRate::Max(4).period(), Some(Duration::from_millis(250)));
    }

    #[tokio::test(start_paused = true)]
    async fn sampling_keeps_only_the_latest() {
        let items = futures::stream::iter(1..=5);
        let mut sampled = items.sample_every(Duration::from_millis(100));

        // All five arrive before the first tick; only the newest survives
        assert_eq!(sampled.next().await, Some(5));
        assert_eq!(sampled.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stream_passes_through() {
        let (tx, rx) = tokio::sync::mpsc::channel::<u32>(4);
        let mut sampled = tokio_stream::wrappers::ReceiverStream::new(rx)
            .sample_every(Duration::from_millis(10));

        tokio::spawn(async move {
            for i in 0..3 {
                tx.send(i).await.expect("receiver alive");
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        });

        assert_eq!(sampled.next().await, Some(0));
        assert_eq!(sampled.next().await, Some(1));
        assert_eq!(sampled.next().await, Some(2));
        assert_eq!(sampled.next().await, None);
    }
}
