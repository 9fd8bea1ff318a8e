//! Recording mock network stack for unit tests

use super::{ChannelQuality, DriverStats, NetStack, PacketStats};
use std::net::Ipv6Addr;

/// Mock network stack for unit testing
///
/// All observable signals are plain settable fields; mutating calls
/// are counted so tests can assert on exactly how often the control
/// layer reached into the stack.
pub struct MockNetStack {
    pub root: bool,
    pub active: bool,
    pub parent: Option<Ipv6Addr>,
    pub packet_stats: PacketStats,
    pub driver_stats: DriverStats,
    pub free_ewma: u16,
    pub busy_threshold: u16,

    pub become_root_calls: u32,
    pub leave_network_calls: u32,
    pub reset_packet_stats_calls: u32,
    pub reset_driver_stats_calls: u32,
}

impl MockNetStack {
    pub fn new() -> Self {
        Self {
            root: false,
            active: false,
            parent: None,
            packet_stats: PacketStats::default(),
            driver_stats: DriverStats::default(),
            free_ewma: 90,
            busy_threshold: 85,
            become_root_calls: 0,
            leave_network_calls: 0,
            reset_packet_stats_calls: 0,
            reset_driver_stats_calls: 0,
        }
    }

    /// Mock that reports as an active DAG root
    pub fn as_root() -> Self {
        Self {
            root: true,
            active: true,
            ..Self::new()
        }
    }
}

impl Default for MockNetStack {
    fn default() -> Self {
        Self::new()
    }
}

impl NetStack for MockNetStack {
    fn is_root(&self) -> bool {
        self.root
    }

    fn become_root(&mut self) {
        self.become_root_calls += 1;
        self.root = true;
        self.active = true;
    }

    fn leave_network(&mut self) {
        self.leave_network_calls += 1;
        self.active = false;
    }

    fn routing_instance_active(&self) -> bool {
        self.active
    }

    fn local_address(&self) -> Ipv6Addr {
        Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1)
    }

    fn preferred_parent_address(&self) -> Option<Ipv6Addr> {
        self.parent
    }

    fn reset_packet_stats(&mut self) {
        self.reset_packet_stats_calls += 1;
        self.packet_stats = PacketStats::default();
    }

    fn reset_driver_stats(&mut self) {
        self.reset_driver_stats_calls += 1;
        self.driver_stats = DriverStats::default();
    }

    fn packet_stats_snapshot(&self) -> PacketStats {
        self.packet_stats
    }

    fn driver_stats_snapshot(&self) -> DriverStats {
        self.driver_stats
    }

    fn channel_quality_snapshot(&self, _channel: u8) -> ChannelQuality {
        ChannelQuality {
            free_ewma: self.free_ewma,
            busy_threshold: self.busy_threshold,
        }
    }
}
