//! Experiment lifecycle components
//!
//! Three small state machines, each advanced only by the dispatcher:
//! the controller owns the Idle/Running state and the elapsed counter,
//! the monitor owns the joined/not-joined edge detector, and the
//! reporter formats statistics snapshots. None of them touch the
//! serial port directly; they append output lines to a buffer the
//! caller flushes.

mod controller;
mod monitor;
mod reporter;

pub use controller::{ExperimentController, ExperimentState};
pub use monitor::MembershipMonitor;
pub use reporter::StatsReporter;
