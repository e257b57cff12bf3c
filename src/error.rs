//! Error types for telemetry processing.
//!
//! Errors split into two tiers. [`FrameError`] and [`DecodeError`] are
//! per-frame classifications: recoverable, never fatal to the processing
//! loop, the offending datagram is discarded and the loop resumes.
//! [`MonitorError`] covers the conditions that can actually stop a monitor —
//! socket binding, transport failure, bad configuration.

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T, E = MonitorError> = std::result::Result<T, E>;

/// Why a raw datagram was rejected before decoding.
///
/// All variants mean the same thing to the pipeline: drop the frame, keep
/// the counter, wait for the next datagram.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame too short: {len} bytes, need more than {min}")]
    TooShort { len: usize, min: usize },

    #[error("bad version marker {found:#04x}, expected {expected:#04x}")]
    BadVersionMarker { found: u8, expected: u8 },

    #[error("truncated payload: frame is {len} bytes, header declares {declared} payload bytes")]
    TruncatedPayload { len: usize, declared: usize },
}

/// Why a validated payload did not produce a typed message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload too small: {len} bytes, need at least {min}")]
    PayloadTooSmall { len: usize, min: usize },

    /// No decoder registered for this message id. Not a fault: the stream
    /// carries many message types the monitor does not track.
    #[error("no decoder for message id {0}")]
    Unhandled(u32),
}

/// Fatal error type for monitor operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MonitorError {
    #[error("failed to bind telemetry socket on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transport receive failed")]
    Transport {
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl MonitorError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            MonitorError::Bind { .. } => false,
            MonitorError::Transport { .. } => true,
            MonitorError::Config { .. } => false,
        }
    }

    /// Helper constructor for bind failures with endpoint context.
    pub fn bind_failed(addr: impl Into<String>, source: std::io::Error) -> Self {
        MonitorError::Bind { addr: addr.into(), source }
    }

    /// Helper constructor for transport receive failures.
    pub fn transport(source: std::io::Error) -> Self {
        MonitorError::Transport { source }
    }

    /// Helper constructor for configuration errors.
    pub fn config(message: impl Into<String>) -> Self {
        MonitorError::Config { message: message.into() }
    }
}

impl From<figment::Error> for MonitorError {
    fn from(err: figment::Error) -> Self {
        MonitorError::Config { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_traits_validation() {
        // Compile-time check: MonitorError must be Send + Sync + 'static
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<MonitorError>();
        assert_send_sync_static::<FrameError>();
        assert_send_sync_static::<DecodeError>();

        let error = MonitorError::config("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn retryable_classification() {
        let bind = MonitorError::bind_failed(
            "0.0.0.0:14557",
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        );
        let transport = MonitorError::transport(std::io::Error::other("recv failed"));
        let config = MonitorError::config("bad threshold");

        assert!(!bind.is_retryable());
        assert!(transport.is_retryable());
        assert!(!config.is_retryable());
    }

    #[test]
    fn error_messages_carry_context() {
        let err = FrameError::BadVersionMarker { found: 0xFE, expected: 0xFD };
        assert!(err.to_string().contains("0xfe"));
        assert!(err.to_string().contains("0xfd"));

        let err = FrameError::TruncatedPayload { len: 20, declared: 26 };
        assert!(err.to_string().contains("20"));
        assert!(err.to_string().contains("26"));

        let err = DecodeError::Unhandled(253);
        assert!(err.to_string().contains("253"));
    }

    #[test]
    fn bind_error_preserves_source() {
        let err = MonitorError::bind_failed(
            "0.0.0.0:14557",
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        );
        let source = std::error::Error::source(&err).expect("bind error should chain its source");
        assert_eq!(source.to_string(), "address in use");
    }
}
