//! # Haptic Gamepad Bridge Binary
//!
//! Reads a haptic device at its servo rate and republishes position and
//! force as a virtual gamepad.
//!
//! # Usage
//!
//! ```bash
//! # Simulated device, log sink
//! hapad_bridge -s
//!
//! # Passthrough variant from a config file, verbose
//! hapad_bridge --config config/bridge.toml --variant passthrough -v
//!
//! # Synthetic sweep pattern, JSON logs
//! hapad_bridge --variant sweep --json
//! ```
//!
//! Keys (rotation variant): `0`/`1`/`2` toggle a wrist lock, `a` toggles all,
//! `q` quits. Exit status is 0 on a requested stop, 1 on any failure.

use std::path::PathBuf;

use clap::Parser;
use hapad_bridge::config::{BridgeConfig, Variant, load_config};
use hapad_bridge::cycle::{CycleRunner, StopFlag, rt_setup};
use hapad_bridge::drivers::builtin_registry;
use hapad_bridge::session::Session;
use hapad_common::config::LogLevel;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Haptic Gamepad Bridge - haptic device to virtual gamepad
#[derive(Parser, Debug)]
#[command(name = "hapad_bridge")]
#[command(version)]
#[command(about = "Fixed-rate bridge from a haptic device to a virtual gamepad")]
#[command(long_about = None)]
struct Args {
    /// Path to the bridge configuration file (bridge.toml).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the per-tick pipeline.
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Override the device driver.
    #[arg(long, value_name = "NAME")]
    device: Option<String>,

    /// Override the sink driver.
    #[arg(long, value_name = "NAME")]
    sink: Option<String>,

    /// Force the built-in simulated device and log sink
    #[arg(short = 's', long)]
    simulate: bool,

    /// CPU core for the loop thread (RT builds only)
    #[arg(long, default_value_t = 0)]
    cpu_core: usize,

    /// SCHED_FIFO priority (RT builds only)
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let config = load_config(args.config.as_deref());
    let level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    let result = match config {
        Ok(mut config) => {
            apply_overrides(&mut config, &args);
            run(&config, &args)
        }
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        error!("FATAL: {e}");
        std::process::exit(1);
    }
}

fn run(config: &BridgeConfig, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "{} v{} starting ({:?}, device={}, sink={})",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION"),
        config.bridge.variant,
        config.bridge.device,
        config.bridge.sink
    );

    rt_setup(args.cpu_core, args.rt_priority)?;

    let stop = StopFlag::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        handler_stop.request();
    })?;

    let registry = builtin_registry();
    let device = registry.create_device(&config.bridge.device, config)?;
    let sink = registry.create_sink(&config.bridge.sink, config)?;

    let mut session = Session::open(device, sink)?;
    let mut runner = CycleRunner::new(config, stop);
    runner.run(&mut session)?;

    info!("Shutdown complete");
    Ok(())
}

/// Fold CLI overrides into the loaded configuration.
fn apply_overrides(config: &mut BridgeConfig, args: &Args) {
    if let Some(variant) = args.variant {
        config.bridge.variant = variant;
    }
    let sweep = config.bridge.variant == Variant::Sweep;

    if args.simulate {
        info!("Simulation mode enabled (exclusive)");
        config.bridge.sink = "log".to_string();
        config.bridge.device = if sweep { "sweep" } else { "simulation" }.to_string();
        return;
    }

    if let Some(device) = &args.device {
        config.bridge.device.clone_from(device);
    } else if sweep {
        config.bridge.device = "sweep".to_string();
    }
    if let Some(sink) = &args.sink {
        config.bridge.sink.clone_from(sink);
    }
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::from(configured)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
