//! Configuration for the yantra-node daemon
//!
//! Loads configuration from a TOML file with the handful of parameters
//! the control layer needs: serial port, experiment timing, and the
//! radio channel plan used for channel-quality reporting.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
    pub serial: SerialConfig,
    pub experiment: ExperimentConfig,
    pub radio: RadioConfig,
    pub logging: LoggingConfig,
}

/// Serial link to the testbed controller
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0")
    pub port: String,
    /// Baud rate
    pub baud: u32,
}

/// Experiment timing parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExperimentConfig {
    /// Experiment duration in seconds when no DURAT command arrives (600 = 10 min)
    pub default_duration_secs: u32,
    /// Seconds between periodic statistics reports
    pub report_interval_secs: u32,
}

/// Radio channel plan for channel-quality reporting
///
/// The defaults cover the sixteen IEEE 802.15.4 channels in the
/// 2.4 GHz band (11..=26).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RadioConfig {
    /// First hopping channel
    pub first_channel: u8,
    /// Number of consecutive channels
    pub channel_count: u8,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log output (stdout, stderr, or file path)
    pub output: String,
}

impl NodeConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: NodeConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration for a testbed node
    ///
    /// Suitable for development. Deployments should use a proper TOML
    /// configuration file.
    pub fn testbed_defaults() -> Self {
        Self {
            serial: SerialConfig {
                port: "/dev/ttyUSB0".to_string(),
                baud: 115_200,
            },
            experiment: ExperimentConfig {
                default_duration_secs: 600,
                report_interval_secs: 5,
            },
            radio: RadioConfig {
                first_channel: 11,
                channel_count: 16,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                output: "stdout".to_string(),
            },
        }
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::testbed_defaults()
    }
}
