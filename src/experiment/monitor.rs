//! Network membership monitor
//!
//! Samples the routing-instance-active signal once per second and
//! reports edges: `$ JOIN_DAG` when a non-root node attaches to the
//! network, `$ EXIT_DAG` when any node loses it. Runs regardless of
//! experiment state, keeping only the previous sample as state.
//!
//! Giving up on a lost DAG takes the routing layer a while, so the
//! active signal can lag the real link state by minutes; the exit edge
//! fires when the routing instance is finally torn down.

use crate::netstack::NetStack;

/// Edge-triggered joined/not-joined detector
pub struct MembershipMonitor {
    joined: bool,
}

impl MembershipMonitor {
    pub fn new() -> Self {
        Self { joined: false }
    }

    /// Whether the last sample showed the node inside the network
    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// Sample the routing stack once and emit any transition line
    pub fn tick(&mut self, net: &dyn NetStack, out: &mut Vec<String>) {
        let active = net.routing_instance_active();

        if self.joined {
            if !active {
                out.push("$ EXIT_DAG".to_string());
                self.joined = false;
            }
        } else if active {
            // The root forms the network rather than joining it, so it
            // gets no JOIN edge, only the state update.
            if !net.is_root() {
                out.push("$ JOIN_DAG".to_string());
            }
            self.joined = true;
        }
    }
}

impl Default for MembershipMonitor {
    fn default() -> Self {
        Self::new()
    }
}
