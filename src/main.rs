//! yantra-node daemon entry point
//!
//! Opens the serial link to the testbed controller and runs the
//! experiment-control loop against the simulated network stack.

use std::env;
use std::sync::atomic::Ordering;

use yantra_node::app::NodeApp;
use yantra_node::config::NodeConfig;
use yantra_node::error::{Error, Result};
use yantra_node::netstack::SimNetStack;
use yantra_node::transport::SerialTransport;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `yantra-node <path>` (positional)
/// - `yantra-node --config <path>` (flag-based)
/// - `yantra-node -c <path>` (short flag)
///
/// Defaults to `/etc/yantra-node.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    // Default path
    "/etc/yantra-node.toml".to_string()
}

fn main() -> Result<()> {
    let config_path = parse_config_path();

    let config = match NodeConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("Config {} not found, using defaults", config_path);
            NodeConfig::testbed_defaults()
        }
        Err(e) => return Err(e),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    log::info!("yantra-node v{} starting...", env!("CARGO_PKG_VERSION"));
    log::info!("Using config: {}", config_path);
    log::info!(
        "Serial: {} @ {} baud, default duration {} s",
        config.serial.port,
        config.serial.baud,
        config.experiment.default_duration_secs
    );

    let transport = SerialTransport::open(&config.serial.port, config.serial.baud)?;
    let net = SimNetStack::new(config.radio.first_channel, config.radio.channel_count);

    let mut app = NodeApp::new(&config, Box::new(transport), Box::new(net));

    let shutdown = app.shutdown_flag();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        shutdown.store(true, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    app.run()?;

    log::info!("yantra-node stopped");
    Ok(())
}
