//! UDP datagram source.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::{info, trace};

use crate::error::{MonitorError, Result};
use crate::source::Source;

/// Largest datagram the transport hands us, matching the reference
/// deployment's receive buffer.
pub const MAX_DATAGRAM: usize = 1024;

/// Source reading datagrams from a bound UDP socket.
///
/// Best-effort by construction: the OS drops datagrams the loop cannot keep
/// up with, and the source neither reorders nor deduplicates. Sender
/// address is accepted from anyone; the monitor is agnostic to origin.
pub struct UdpSource {
    socket: UdpSocket,
    local_addr: SocketAddr,
    buf: Box<[u8; MAX_DATAGRAM]>,
}

impl UdpSource {
    /// Bind a socket on the given address.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Bind`] when the address cannot be bound.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| MonitorError::bind_failed(addr.to_string(), e))?;
        let local_addr = socket.local_addr().map_err(MonitorError::transport)?;

        info!(%local_addr, "telemetry socket bound");

        Ok(Self { socket, local_addr, buf: Box::new([0u8; MAX_DATAGRAM]) })
    }

    /// The address the socket actually bound to (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait::async_trait]
impl Source for UdpSource {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        let (len, peer) = self
            .socket
            .recv_from(self.buf.as_mut_slice())
            .await
            .map_err(MonitorError::transport)?;

        trace!(len, %peer, "datagram received");
        Ok(Some(self.buf[..len].to_vec()))
    }

    fn describe(&self) -> String {
        format!("udp://{}", self.local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_on_ephemeral_port_and_receive() {
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("literal address");
        let mut source = UdpSource::bind(addr).await.expect("bind on ephemeral port");
        let target = source.local_addr();
        assert_ne!(target.port(), 0);
        assert!(source.describe().starts_with("udp://127.0.0.1:"));

        let sender = UdpSocket::bind("127.0.0.1:0").await.expect("sender socket");
        sender.send_to(&[0xFD, 1, 2, 3], target).await.expect("send datagram");

        let datagram = source.recv().await.expect("receive").expect("one datagram");
        assert_eq!(datagram, vec![0xFD, 1, 2, 3]);
    }

    #[tokio::test]
    async fn oversized_datagrams_truncate_to_buffer() {
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("literal address");
        let mut source = UdpSource::bind(addr).await.expect("bind on ephemeral port");
        let target = source.local_addr();

        let sender = UdpSocket::bind("127.0.0.1:0").await.expect("sender socket");
        sender.send_to(&vec![0xAB; MAX_DATAGRAM + 200], target).await.expect("send datagram");

        let datagram = source.recv().await.expect("receive").expect("one datagram");
        assert_eq!(datagram.len(), MAX_DATAGRAM);
    }
}
