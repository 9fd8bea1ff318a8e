//! Command and tick dispatcher
//!
//! Composition root for the control layer: parses each received serial
//! line, applies the resulting command to the experiment controller and
//! the network stack, and advances the membership monitor and the
//! statistics reporter on the shared one-second tick. Output lines are
//! appended to the caller's buffer; the run loop owns the serial port.
//!
//! Ordering within one tick is fixed: the monitor samples first, then
//! the experiment second is processed to completion (report, expiry
//! check, END) before control returns. Commands are handled between
//! ticks, never mid-transition.

use crate::config::NodeConfig;
use crate::experiment::{ExperimentController, MembershipMonitor, StatsReporter};
use crate::netstack::NetStack;
use crate::protocol::{self, Command};

/// Routes serial lines and timer ticks to the experiment components
pub struct Dispatcher {
    controller: ExperimentController,
    monitor: MembershipMonitor,
    reporter: StatsReporter,
    report_interval_secs: u32,
}

impl Dispatcher {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            controller: ExperimentController::new(config.experiment.default_duration_secs),
            monitor: MembershipMonitor::new(),
            reporter: StatsReporter::new(config.radio.first_channel, config.radio.channel_count),
            report_interval_secs: config.experiment.report_interval_secs.max(1),
        }
    }

    pub fn controller(&self) -> &ExperimentController {
        &self.controller
    }

    /// Handle one received serial line
    ///
    /// Total: every line produces a deterministic reaction, and
    /// unrecognized input is echoed back rather than dropped.
    pub fn handle_line(&mut self, line: &str, net: &mut dyn NetStack, out: &mut Vec<String>) {
        match protocol::parse(line) {
            Command::Sync => out.push("@".to_string()),
            Command::Start => self.handle_start(net, out),
            Command::Stop => self.handle_stop(net, out),
            Command::SetRoot => self.handle_set_root(net, out),
            Command::SetDuration(secs) => {
                self.controller.set_duration(secs);
                out.push(format!("$ Received app duration {}", secs));
            }
            Command::QueryIp => {
                out.push(format!("$ My IPv6 address is: {}", net.local_address()));
            }
            Command::QueryParent => self.handle_query_parent(net, out),
            Command::Unknown(raw) => {
                out.push(format!("$ Unsupported command: {}", raw));
            }
        }
    }

    /// Advance all timer-driven components by one second
    pub fn tick_second(&mut self, net: &mut dyn NetStack, out: &mut Vec<String>) {
        self.monitor.tick(net, out);

        if let Some(elapsed) = self.controller.advance_second() {
            self.experiment_second(elapsed, net, out);
        }
    }

    fn handle_start(&mut self, net: &mut dyn NetStack, out: &mut Vec<String>) {
        if !self.controller.start() {
            log::debug!("START ignored: experiment already running");
            return;
        }
        // Empty statistics buffers so every report covers only this run
        net.reset_driver_stats();
        net.reset_packet_stats();
        out.push("$ START".to_string());

        // The first report window is second zero, before any tick. A
        // zero duration therefore expires right here.
        self.experiment_second(0, net, out);
    }

    fn handle_stop(&mut self, net: &mut dyn NetStack, out: &mut Vec<String>) {
        out.push("$ STOP".to_string());
        if net.is_root() {
            net.leave_network();
        }
        self.controller.stop();
    }

    fn handle_set_root(&mut self, net: &mut dyn NetStack, out: &mut Vec<String>) {
        if net.is_root() {
            out.push("$ Device is already a DAG root".to_string());
        } else {
            net.become_root();
            out.push("$ ROOT".to_string());
        }
    }

    fn handle_query_parent(&mut self, net: &dyn NetStack, out: &mut Vec<String>) {
        // The root has no parent; the query is a no-op there.
        if net.is_root() {
            log::debug!("PAREN ignored: node is the DAG root");
            return;
        }
        match net.preferred_parent_address() {
            Some(addr) => out.push(format!("$ My parent is: {}", addr)),
            None => log::debug!("PAREN: no preferred parent yet"),
        }
    }

    /// Process one second of experiment time (second `elapsed`)
    ///
    /// Report first, then evaluate the duration bound, matching the
    /// order the testbed monitor expects: the expiry second still gets
    /// its periodic report before the final dump and END.
    fn experiment_second(&mut self, elapsed: u32, net: &mut dyn NetStack, out: &mut Vec<String>) {
        if elapsed % self.report_interval_secs == 0 {
            self.reporter.periodic(net, out);
        }

        if self.controller.duration_expired() {
            self.reporter.final_dump(net, out);
            out.push("$ END".to_string());
            self.controller.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::ExperimentState;
    use crate::netstack::MockNetStack;

    fn dispatcher_with_duration(duration_secs: u32) -> Dispatcher {
        let mut config = NodeConfig::testbed_defaults();
        config.experiment.default_duration_secs = duration_secs;
        Dispatcher::new(&config)
    }

    fn send(d: &mut Dispatcher, net: &mut MockNetStack, line: &str) -> Vec<String> {
        let mut out = Vec::new();
        d.handle_line(line, net, &mut out);
        out
    }

    fn tick(d: &mut Dispatcher, net: &mut MockNetStack) -> Vec<String> {
        let mut out = Vec::new();
        d.tick_second(net, &mut out);
        out
    }

    #[test]
    fn test_sync_answered_in_band() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();
        assert_eq!(send(&mut d, &mut net, "@"), vec!["@"]);
    }

    #[test]
    fn test_start_resets_stats_and_reports_second_zero() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();

        let out = send(&mut d, &mut net, "$ START");
        assert_eq!(net.reset_packet_stats_calls, 1);
        assert_eq!(net.reset_driver_stats_calls, 1);
        assert_eq!(out[0], "$ START");
        // Second zero is a report window
        assert!(out[1].starts_with("$ Packet stats:"));
        assert!(d.controller().is_running());
    }

    #[test]
    fn test_running_elapsed_tracks_ticks() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();

        send(&mut d, &mut net, "$ START");
        for _ in 0..7 {
            tick(&mut d, &mut net);
        }
        assert_eq!(d.controller().state(), ExperimentState::Running);
        assert_eq!(d.controller().elapsed_secs(), 7);
    }

    #[test]
    fn test_auto_stop_emits_end_exactly_once() {
        let mut d = dispatcher_with_duration(3);
        let mut net = MockNetStack::new();

        send(&mut d, &mut net, "$ START");
        let mut end_count = 0;
        for _ in 0..10 {
            let out = tick(&mut d, &mut net);
            end_count += out.iter().filter(|l| *l == "$ END").count();
        }
        assert_eq!(end_count, 1);
        assert_eq!(d.controller().state(), ExperimentState::Idle);
    }

    #[test]
    fn test_auto_stop_dumps_driver_stats_before_end() {
        let mut d = dispatcher_with_duration(2);
        let mut net = MockNetStack::new();

        send(&mut d, &mut net, "$ START");
        tick(&mut d, &mut net);
        let out = tick(&mut d, &mut net);

        let dump = out
            .iter()
            .position(|l| l.starts_with("$ Driver stats total:"))
            .expect("final dump missing");
        let end = out.iter().position(|l| l == "$ END").expect("END missing");
        assert!(dump < end);
        // Auto-stop never tears down the network
        assert_eq!(net.leave_network_calls, 0);
    }

    #[test]
    fn test_start_clears_driver_stats_from_previous_run() {
        let mut d = dispatcher_with_duration(1);
        let mut net = MockNetStack::new();
        net.driver_stats.frames_sent = 999;

        send(&mut d, &mut net, "$ START");
        let out = tick(&mut d, &mut net);

        // The final dump covers only this run, not counters that
        // accumulated before START.
        assert!(
            out.contains(&"$ Driver stats total: sent 0 received 0 cca_fail 0 rx_ovf 0".to_string()),
            "stale driver counters leaked: {:?}",
            out
        );
    }

    #[test]
    fn test_zero_duration_ends_during_start() {
        let mut d = dispatcher_with_duration(0);
        let mut net = MockNetStack::new();

        let out = send(&mut d, &mut net, "$ START");
        assert_eq!(out.first().map(String::as_str), Some("$ START"));
        assert_eq!(out.last().map(String::as_str), Some("$ END"));
        assert!(!d.controller().is_running());
    }

    #[test]
    fn test_stop_as_root_leaves_network_once() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::as_root();

        send(&mut d, &mut net, "$ START");
        let out = send(&mut d, &mut net, "$ STOP ");
        assert_eq!(out[0], "$ STOP");
        assert_eq!(net.leave_network_calls, 1);
        assert!(!d.controller().is_running());
    }

    #[test]
    fn test_stop_as_non_root_does_not_leave() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();
        net.active = true;

        send(&mut d, &mut net, "$ START");
        send(&mut d, &mut net, "$ STOP ");
        assert_eq!(net.leave_network_calls, 0);
        assert!(!d.controller().is_running());
    }

    #[test]
    fn test_stop_halts_reporting_before_next_tick() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();

        send(&mut d, &mut net, "$ START");
        send(&mut d, &mut net, "$ STOP ");
        for _ in 0..10 {
            let out = tick(&mut d, &mut net);
            assert!(out.iter().all(|l| !l.starts_with("$ Packet stats:")));
        }
    }

    #[test]
    fn test_root_command_promotes_once() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();

        let out = send(&mut d, &mut net, "$ ROOT ");
        assert_eq!(out, vec!["$ ROOT"]);
        assert_eq!(net.become_root_calls, 1);

        let out = send(&mut d, &mut net, "$ ROOT ");
        assert_eq!(out, vec!["$ Device is already a DAG root"]);
        assert_eq!(net.become_root_calls, 1);
    }

    #[test]
    fn test_duration_command_applies_to_next_expiry() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();

        let out = send(&mut d, &mut net, "$ DURAT00002");
        assert_eq!(out, vec!["$ Received app duration 2"]);

        send(&mut d, &mut net, "$ START");
        tick(&mut d, &mut net);
        let out = tick(&mut d, &mut net);
        assert!(out.contains(&"$ END".to_string()));
    }

    #[test]
    fn test_query_ip() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();
        let out = send(&mut d, &mut net, "$ IP   ");
        assert_eq!(out, vec!["$ My IPv6 address is: fe80::1"]);
    }

    #[test]
    fn test_query_parent_non_root() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();
        net.parent = Some("fe80::2".parse().unwrap());

        let out = send(&mut d, &mut net, "$ PAREN");
        assert_eq!(out, vec!["$ My parent is: fe80::2"]);
    }

    #[test]
    fn test_query_parent_as_root_is_noop() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::as_root();
        assert!(send(&mut d, &mut net, "$ PAREN").is_empty());
    }

    #[test]
    fn test_unknown_command_echoed() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();
        let out = send(&mut d, &mut net, "$ NOPE!");
        assert_eq!(out, vec!["$ Unsupported command: $ NOPE!"]);
    }

    #[test]
    fn test_periodic_report_every_five_seconds() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();

        send(&mut d, &mut net, "$ START");
        for second in 1..=12u32 {
            let out = tick(&mut d, &mut net);
            let reported = out.iter().any(|l| l.starts_with("$ Packet stats:"));
            assert_eq!(reported, second % 5 == 0, "second {}", second);
        }
    }

    #[test]
    fn test_channel_lines_only_for_root_on_interval() {
        let mut config = NodeConfig::testbed_defaults();
        config.experiment.default_duration_secs = 600;
        config.radio.channel_count = 2;
        let mut d = Dispatcher::new(&config);

        // Non-root never gets channel lines
        let mut net = MockNetStack::new();
        send(&mut d, &mut net, "$ START");
        for _ in 0..10 {
            let out = tick(&mut d, &mut net);
            assert!(out.iter().all(|l| !l.starts_with("$ Channel")));
        }

        // Root gets them exactly on report seconds
        let mut d = Dispatcher::new(&config);
        let mut net = MockNetStack::as_root();
        send(&mut d, &mut net, "$ START");
        for second in 1..=10u32 {
            let out = tick(&mut d, &mut net);
            let channel_lines = out.iter().filter(|l| l.starts_with("$ Channel")).count();
            if second % 5 == 0 {
                assert_eq!(channel_lines, 2, "second {}", second);
            } else {
                assert_eq!(channel_lines, 0, "second {}", second);
            }
        }
    }

    #[test]
    fn test_monitor_runs_while_idle() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();

        net.active = true;
        let out = tick(&mut d, &mut net);
        assert_eq!(out, vec!["$ JOIN_DAG"]);
    }

    #[test]
    fn test_start_ignored_while_running_keeps_elapsed() {
        let mut d = dispatcher_with_duration(600);
        let mut net = MockNetStack::new();

        send(&mut d, &mut net, "$ START");
        for _ in 0..4 {
            tick(&mut d, &mut net);
        }
        let out = send(&mut d, &mut net, "$ START");
        assert!(out.is_empty());
        assert_eq!(net.reset_packet_stats_calls, 1);
        assert_eq!(d.controller().elapsed_secs(), 4);
    }
}
