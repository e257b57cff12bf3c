//! Datagram source abstraction for the processing loop.
//!
//! Sources hand raw datagrams to the pipeline without any knowledge of
//! message semantics. The trait is deliberately narrow so unit tests can
//! substitute an in-memory feed for the live socket.

use crate::error::Result;

#[async_trait::async_trait]
pub trait Source: Send + 'static {
    /// Receive the next raw datagram.
    ///
    /// Returns:
    /// - `Ok(Some(bytes))` - a new datagram arrived
    /// - `Ok(None)` - the source is exhausted (normal termination)
    /// - `Err(e)` - transport failure
    ///
    /// Each source handles its own blocking: the UDP source waits on the
    /// socket, the queue source waits on its channel.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>>;

    /// Human-readable endpoint description, for logging.
    fn describe(&self) -> String;
}
