//! Monitor configuration.
//!
//! Configuration loads via figment from (in order of precedence, highest
//! first): environment variables prefixed with `SKYWATCH_`, a TOML config
//! file, then defaults. The threshold and window capacity are defaults
//! carried over from the reference deployment, not protocol invariants.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::analysis::DEFAULT_SPREAD_THRESHOLD;
use crate::error::{MonitorError, Result};

/// Default configuration file name, resolved relative to the working
/// directory.
const CONFIG_FILE_NAME: &str = "skywatch.toml";

/// UDP port the reference deployment listens on.
pub const DEFAULT_BIND_PORT: u16 = 14557;

/// Default sliding-window capacity.
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

/// Monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Address the UDP socket binds to.
    pub bind_address: IpAddr,
    /// Port the UDP socket binds to.
    pub bind_port: u16,
    /// Sliding-window capacity for the tracked field.
    pub window_capacity: usize,
    /// Spread threshold that trips the anomaly detector, in the tracked
    /// field's unit.
    pub spread_threshold: u16,
    /// Buffered anomaly events per subscriber before lagging ones are
    /// dropped.
    pub anomaly_queue_depth: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            bind_port: DEFAULT_BIND_PORT,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            spread_threshold: DEFAULT_SPREAD_THRESHOLD,
            anomaly_queue_depth: 64,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from the default file location, environment, and
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        let figment = Figment::new()
            .merge(Serialized::defaults(MonitorConfig::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SKYWATCH_"));

        let config: MonitorConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.window_capacity < 2 {
            return Err(MonitorError::config(format!(
                "window_capacity ({}) must be at least 2: a spread needs two samples",
                self.window_capacity
            )));
        }
        if self.anomaly_queue_depth == 0 {
            return Err(MonitorError::config("anomaly_queue_depth must be greater than 0"));
        }
        Ok(())
    }

    /// The socket address to bind the telemetry endpoint on.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.bind_port)
    }
}
