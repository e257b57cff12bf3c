//! Datagram source implementations.

mod queue;
mod udp;

pub use queue::{QueueSender, QueueSource};
pub use udp::{MAX_DATAGRAM, UdpSource};
