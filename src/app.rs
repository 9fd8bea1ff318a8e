//! Application run loop
//!
//! Single-threaded cooperative loop: poll the serial link for complete
//! command lines, dispatch them, and fire the shared one-second tick.
//! Exactly one component advances at a time, so every state transition
//! and its output finish before the next input or tick is looked at.

use crate::config::NodeConfig;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::netstack::NetStack;
use crate::transport::{LineReader, Transport};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Poll interval for the serial line between ticks
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Experiment-control daemon wiring: transport, stack, dispatcher
pub struct NodeApp {
    transport: Box<dyn Transport>,
    net: Box<dyn NetStack>,
    dispatcher: Dispatcher,
    reader: LineReader,
    shutdown: Arc<AtomicBool>,
}

impl NodeApp {
    pub fn new(
        config: &NodeConfig,
        transport: Box<dyn Transport>,
        net: Box<dyn NetStack>,
    ) -> Self {
        Self {
            transport,
            net,
            dispatcher: Dispatcher::new(config),
            reader: LineReader::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shutdown flag handle for the signal handler
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run until the shutdown flag is raised
    pub fn run(&mut self) -> Result<()> {
        log::info!("Control loop running");
        let mut next_tick = Instant::now() + Duration::from_secs(1);

        while !self.shutdown.load(Ordering::Relaxed) {
            self.poll_input()?;

            if Instant::now() >= next_tick {
                next_tick += Duration::from_secs(1);
                self.tick_second()?;
            }

            std::thread::sleep(POLL_INTERVAL);
        }

        log::info!("Control loop stopped");
        Ok(())
    }

    /// Drain complete lines from the serial link and dispatch them
    pub fn poll_input(&mut self) -> Result<()> {
        let lines = self.reader.poll(self.transport.as_mut())?;
        for line in lines {
            log::debug!("Line received: {:?}", line);
            let mut out = Vec::new();
            self.dispatcher
                .handle_line(&line, self.net.as_mut(), &mut out);
            self.emit(&out)?;
        }
        Ok(())
    }

    /// Advance the stack sampling, the monitor and the experiment clock
    pub fn tick_second(&mut self) -> Result<()> {
        self.net.poll_second();

        let mut out = Vec::new();
        self.dispatcher.tick_second(self.net.as_mut(), &mut out);
        self.emit(&out)
    }

    fn emit(&mut self, lines: &[String]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        for line in lines {
            self.transport.write(line.as_bytes())?;
            self.transport.write(b"\n")?;
        }
        self.transport.flush()
    }
}
