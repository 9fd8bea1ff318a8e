//! Network stack boundary
//!
//! The control layer drives the routing/MAC/radio stack through this
//! trait and never looks behind it. Real firmware binds it to the RPL
//! root/parent calls and the radio driver counters; tests use
//! [`MockNetStack`] and the binary runs against [`SimNetStack`].

use std::fmt;
use std::net::Ipv6Addr;

mod mock;
mod sim;

pub use mock::MockNetStack;
pub use sim::SimNetStack;

/// Routing, MAC and radio-driver queries used by the control layer
pub trait NetStack {
    /// Whether this node is the DAG root
    fn is_root(&self) -> bool;

    /// Promote this node to DAG root
    fn become_root(&mut self);

    /// Leave the routing network (root teardown on STOP)
    fn leave_network(&mut self);

    /// Whether a routing instance is currently active on this node
    fn routing_instance_active(&self) -> bool;

    /// This node's link-local IPv6 address
    fn local_address(&self) -> Ipv6Addr;

    /// Preferred parent address, if the node has joined under one
    fn preferred_parent_address(&self) -> Option<Ipv6Addr>;

    /// Clear accumulated packet statistics (issued at experiment start)
    fn reset_packet_stats(&mut self);

    /// Clear accumulated radio-driver statistics (issued at experiment
    /// start, so the final dump covers only this run)
    fn reset_driver_stats(&mut self);

    /// Current packet counters
    fn packet_stats_snapshot(&self) -> PacketStats;

    /// Current radio-driver counters
    fn driver_stats_snapshot(&self) -> DriverStats;

    /// Channel-free EWMA and busy threshold for one hopping channel
    fn channel_quality_snapshot(&self, channel: u8) -> ChannelQuality;

    /// Advance internal sampling by one second
    ///
    /// A firmware-backed stack updates itself from interrupts and needs
    /// nothing here; the simulated stack uses this hook to evolve.
    fn poll_second(&mut self) {}
}

/// Application-level packet counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketStats {
    pub tx_packets: u32,
    pub rx_packets: u32,
    pub tx_errors: u32,
    pub rx_errors: u32,
}

impl fmt::Display for PacketStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tx {} rx {} tx_err {} rx_err {}",
            self.tx_packets, self.rx_packets, self.tx_errors, self.rx_errors
        )
    }
}

/// Radio-driver counters, aggregated across the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub frames_sent: u32,
    pub frames_received: u32,
    pub cca_failures: u32,
    pub rx_overflows: u32,
}

impl fmt::Display for DriverStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sent {} received {} cca_fail {} rx_ovf {}",
            self.frames_sent, self.frames_received, self.cca_failures, self.rx_overflows
        )
    }
}

/// Channel occupancy measurement for one hopping channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelQuality {
    /// Exponentially weighted moving average of "channel free" samples
    pub free_ewma: u16,
    /// EWMA values below this mean the channel counts as busy
    pub busy_threshold: u16,
}

impl ChannelQuality {
    /// A channel is busy when its free-EWMA drops below the threshold
    pub fn is_busy(&self) -> bool {
        self.free_ewma < self.busy_threshold
    }
}
