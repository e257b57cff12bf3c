//! Sliding-window statistics over a tracked telemetry field.
//!
//! A fixed-capacity FIFO ring of recent samples with O(1) amortized summary
//! updates: a running sum for the mean and monotonic deques for min/max, so
//! a snapshot never rescans the window regardless of capacity.

use std::collections::VecDeque;

use serde::Serialize;

/// Summary statistics over the current window contents.
///
/// With fewer than 2 samples the spread reports 0 and the snapshot is not
/// eligible for anomaly evaluation, which keeps stream startup quiet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowSnapshot {
    /// Samples currently in the window.
    pub len: usize,
    /// Smallest sample in the window (0 when empty).
    pub min: u16,
    /// Largest sample in the window (0 when empty).
    pub max: u16,
    /// Arithmetic mean of the window (0.0 when empty).
    pub mean: f64,
    /// `max - min` over the window.
    pub spread: u16,
}

impl WindowSnapshot {
    /// Whether enough samples exist for the spread to mean anything.
    pub fn has_spread_basis(&self) -> bool {
        self.len >= 2
    }
}

/// Fixed-capacity FIFO window of recent samples.
///
/// Owned exclusively by the processing loop; `push` is not safely
/// interleavable across writers.
#[derive(Debug)]
pub struct SlidingWindow {
    capacity: usize,
    samples: VecDeque<u16>,
    sum: u64,
    /// (sequence, value), values increasing front to back. Front is the min.
    min_deque: VecDeque<(u64, u16)>,
    /// (sequence, value), values decreasing front to back. Front is the max.
    max_deque: VecDeque<(u64, u16)>,
    next_seq: u64,
}

impl SlidingWindow {
    /// Create an empty window. Capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
            sum: 0,
            min_deque: VecDeque::new(),
            max_deque: VecDeque::new(),
            next_seq: 0,
        }
    }

    /// Push one sample, evicting the oldest when full (strict FIFO), and
    /// return the updated summary.
    pub fn push(&mut self, value: u16) -> WindowSnapshot {
        let seq = self.next_seq;
        self.next_seq += 1;

        if self.samples.len() == self.capacity
            && let Some(evicted) = self.samples.pop_front()
        {
            self.sum -= u64::from(evicted);
        }
        self.samples.push_back(value);
        self.sum += u64::from(value);

        // Sequence of the oldest sample still in the window.
        let oldest = seq + 1 - self.samples.len() as u64;
        while self.min_deque.front().is_some_and(|&(s, _)| s < oldest) {
            self.min_deque.pop_front();
        }
        while self.max_deque.front().is_some_and(|&(s, _)| s < oldest) {
            self.max_deque.pop_front();
        }

        while self.min_deque.back().is_some_and(|&(_, v)| v >= value) {
            self.min_deque.pop_back();
        }
        self.min_deque.push_back((seq, value));

        while self.max_deque.back().is_some_and(|&(_, v)| v <= value) {
            self.max_deque.pop_back();
        }
        self.max_deque.push_back((seq, value));

        self.snapshot()
    }

    /// Summary over the current contents.
    pub fn snapshot(&self) -> WindowSnapshot {
        let len = self.samples.len();
        let min = self.min_deque.front().map_or(0, |&(_, v)| v);
        let max = self.max_deque.front().map_or(0, |&(_, v)| v);
        let mean = if len == 0 { 0.0 } else { self.sum as f64 / len as f64 };
        let spread = if len < 2 { 0 } else { max - min };
        WindowSnapshot { len, min, max, mean, spread }
    }

    /// The last `k` samples, oldest first.
    pub fn recent(&self, k: usize) -> Vec<u16> {
        let skip = self.samples.len().saturating_sub(k);
        self.samples.iter().skip(skip).copied().collect()
    }

    /// Current contents, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.samples.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
