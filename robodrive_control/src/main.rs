//! # RoboDrive Controller
//!
//! Remote drive controller for a differential-drive base.
//!
//! Starts the arbitration engine on its own thread and one thread per
//! enabled transport (TCP text key protocol, WebSocket JSON). Runs until
//! a text client sends `exit`, Ctrl-C is received or a worker fails; the
//! engine stops the actuator exactly once on the way out.

use clap::Parser;
use robodrive_control::command::arbitration::ArbitrationPolicy;
use robodrive_control::config::{ControllerConfig, load_config};
use robodrive_control::cycle::ArbitrationEngine;
use robodrive_control::error::ControlError;
use robodrive_control::shutdown::ShutdownCoordinator;
use robodrive_control::state::ControlState;
use robodrive_control::transport::{TextServer, WsServer};
use robodrive_hal::DriverRegistry;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// RoboDrive Controller: keyboard-driven drive arbitration
#[derive(Parser, Debug)]
#[command(name = "robodrive_control")]
#[command(version)]
#[command(about = "Key-flag arbitration engine with text and WebSocket transports")]
struct Args {
    /// Path to robodrive.toml. Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Actuator driver (overrides [actuator].driver).
    #[arg(long)]
    driver: Option<String>,

    /// Text transport bind address (overrides [transport].text_bind).
    #[arg(long, value_name = "ADDR")]
    text_bind: Option<String>,

    /// WebSocket transport bind address (overrides [transport].ws_bind).
    #[arg(long, value_name = "ADDR")]
    ws_bind: Option<String>,

    /// Arbitration policy: table | priority_fallback.
    #[arg(long)]
    policy: Option<ArbitrationPolicy>,

    /// List available actuator drivers and exit.
    #[arg(long)]
    list_drivers: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    if args.list_drivers {
        for name in DriverRegistry::with_builtin().list_drivers() {
            println!("{name}");
        }
        return;
    }

    // Config errors are reported before tracing is up.
    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e}");
            process::exit(1);
        }
    };
    setup_tracing(&args, &config);

    info!(
        "{} v{} starting...",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run(config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("RoboDrive controller shutdown complete");
}

/// Load the config file (or defaults), apply CLI overrides, validate.
fn load(args: &Args) -> Result<ControllerConfig, ControlError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ControllerConfig::default(),
    };
    if let Some(driver) = &args.driver {
        config.actuator.driver = driver.clone();
    }
    if let Some(bind) = &args.text_bind {
        config.transport.text_bind = Some(bind.clone());
    }
    if let Some(bind) = &args.ws_bind {
        config.transport.ws_bind = Some(bind.clone());
    }
    if let Some(policy) = args.policy {
        config.arbitration.policy = policy;
    }
    config.validate()?;
    Ok(config)
}

fn run(config: ControllerConfig) -> Result<(), ControlError> {
    let state = ControlState::shared();
    let actuator = DriverRegistry::with_builtin().create(&config.actuator)?;
    info!(
        driver = actuator.name(),
        policy = %config.arbitration.policy,
        cycle_us = config.arbitration.cycle_interval_us,
        "Config OK"
    );

    let mut coordinator = ShutdownCoordinator::new(Arc::clone(&state));
    coordinator.install_signal_handler()?;

    // Bind everything before spawning so a bad address fails fast.
    let poll = config.transport.poll_interval();
    let text = config
        .transport
        .text_bind
        .as_deref()
        .map(|addr| TextServer::bind(addr, Arc::clone(&state), poll))
        .transpose()?;
    let ws = config
        .transport
        .ws_bind
        .as_deref()
        .map(|addr| {
            WsServer::bind(addr, Arc::clone(&state), poll)
                .map(|s| s.release_on_disconnect(config.transport.release_on_disconnect))
        })
        .transpose()?;

    let mut engine = ArbitrationEngine::new(
        Arc::clone(&state),
        actuator,
        config.arbitration.policy,
    );
    let interval = config.arbitration.cycle_interval();
    coordinator.spawn("arbitration", move || engine.run(interval).map(|_| ()))?;

    if let Some(server) = text {
        coordinator.spawn("text-transport", move || server.serve())?;
    }
    if let Some(server) = ws {
        coordinator.spawn("ws-transport", move || server.serve())?;
    }

    coordinator.wait()
}

/// Setup tracing subscriber from CLI flags and `[shared].log_level`.
fn setup_tracing(args: &Args, config: &ControllerConfig) {
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.shared.log_level.as_directive()))
    };

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
