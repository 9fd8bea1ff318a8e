//! Statistics reporter
//!
//! Formats statistics snapshots into the serial output protocol. The
//! dispatcher calls [`StatsReporter::periodic`] on report-interval
//! boundaries while the experiment runs, and [`StatsReporter::final_dump`]
//! once on duration expiry. All values are read-only snapshots from the
//! network stack; the only mutation this path ever issues is the
//! packet-stats reset at experiment start, and that belongs to the
//! dispatcher.

use crate::netstack::NetStack;

/// Snapshot formatter for the periodic and final statistics lines
pub struct StatsReporter {
    first_channel: u8,
    channel_count: u8,
}

impl StatsReporter {
    pub fn new(first_channel: u8, channel_count: u8) -> Self {
        Self {
            first_channel,
            channel_count,
        }
    }

    /// Emit one periodic report
    ///
    /// Every node reports its packet counters. The root additionally
    /// reports driver counters and the per-channel quality lines,
    /// since it is the node wired to the testbed monitor.
    pub fn periodic(&self, net: &dyn NetStack, out: &mut Vec<String>) {
        out.push(format!("$ Packet stats: {}", net.packet_stats_snapshot()));

        if net.is_root() {
            out.push(format!("$ Driver stats: {}", net.driver_stats_snapshot()));

            for i in 0..self.channel_count {
                // A misconfigured plan running past channel 255 is cut
                // short rather than wrapping.
                let Some(channel) = self.first_channel.checked_add(i) else {
                    break;
                };
                let quality = net.channel_quality_snapshot(channel);
                out.push(format!(
                    "$ Channel {} quality: {} --> busy {}",
                    channel,
                    quality.free_ewma,
                    u8::from(quality.is_busy())
                ));
            }
        }
    }

    /// Emit the cumulative driver-statistics dump (auto-stop path)
    pub fn final_dump(&self, net: &dyn NetStack, out: &mut Vec<String>) {
        out.push(format!(
            "$ Driver stats total: {}",
            net.driver_stats_snapshot()
        ));
    }
}
