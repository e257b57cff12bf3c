//! In-memory datagram source for tests and embedding.

use tokio::sync::mpsc;

use crate::error::Result;
use crate::source::Source;

/// Sending half of a [`QueueSource`] pair. Dropping every sender exhausts
/// the source.
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: mpsc::Sender<Vec<u8>>,
}

impl QueueSender {
    /// Feed one raw datagram into the queue. Returns `false` when the
    /// source side is gone.
    pub async fn send(&self, bytes: Vec<u8>) -> bool {
        self.tx.send(bytes).await.is_ok()
    }
}

/// Source fed from an in-process channel instead of a live socket.
///
/// The substitution point the pipeline tests use: synthetic byte buffers go
/// in, the processing loop sees them exactly as it would see datagrams.
pub struct QueueSource {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl QueueSource {
    /// Create a connected sender/source pair with the given channel
    /// capacity.
    pub fn channel(capacity: usize) -> (QueueSender, QueueSource) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (QueueSender { tx }, QueueSource { rx })
    }
}

#[async_trait::async_trait]
impl Source for QueueSource {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.rx.recv().await)
    }

    fn describe(&self) -> String {
        "queue://in-process".to_string()
    }
}
