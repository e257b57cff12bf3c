//! Logging initialization for embedding applications.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is the host's call. This helper wires up the common case: an env-filter
//! seeded from a verbosity level, overridable through `RUST_LOG`.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Info and above.
    #[default]
    Normal,
    /// Debug and above.
    Verbose,
    /// Everything, including per-frame traces.
    Trace,
}

impl Verbosity {
    /// Convert verbosity to a tracing level.
    #[must_use]
    pub fn to_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Install a global subscriber filtered to this crate at the given
/// verbosity. `RUST_LOG` takes precedence when set. Calling more than once
/// is harmless; only the first call installs.
pub fn init_logging(verbosity: Verbosity) {
    let default_filter = format!("skywatch={}", verbosity.to_level());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let subscriber =
        tracing_subscriber::registry().with(env_filter).with(fmt::layer().with_target(true));

    let _ = subscriber.try_init();
}
