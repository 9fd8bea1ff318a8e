//! yantra-node - Experiment-control daemon for a wireless sensor node
//!
//! Implements the testbed control layer: a fixed-width serial command
//! protocol, an experiment lifecycle state machine, a network
//! membership monitor, and a periodic statistics reporter, all driven
//! by a single cooperative loop. The routing/MAC/radio stack sits
//! behind the [`netstack::NetStack`] trait.

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod experiment;
pub mod netstack;
pub mod protocol;
pub mod transport;

// Re-export commonly used types
pub use config::NodeConfig;
pub use error::{Error, Result};
