//! RS-232 Telemetry Reader
//!
//! Reads newline-terminated telemetry from a development board (e.g. a DE1
//! FPGA board) over its serial link and echoes every line to stdout.
//!
//! The port (`COM5`) and baud rate (115200) are fixed. Log output goes to
//! stderr and can be tuned with `RUST_LOG`.
//!
//! # Usage
//!
//! ```bash
//! # Echo each line, a label, and the line again
//! rs232-reader
//!
//! # Echo each line once
//! rs232-reader --single
//!
//! # Also trace the raw bytes of every line
//! rs232-reader --verbose
//! ```

mod error;
mod serial;
mod shutdown;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use serial::{EchoMode, MonitorConfig, PortConfig};
use shutdown::StopFlag;

/// RS-232 Telemetry Reader
///
/// Echoes lines received from the board's serial port
#[derive(Parser)]
#[command(name = "rs232-reader")]
#[command(version)]
#[command(about = "Echoes newline-terminated telemetry received on the board's serial port")]
struct Cli {
    /// Print each received line once instead of line, label, line
    #[arg(long)]
    single: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let stop = StopFlag::with_ctrlc()?;

    let config = MonitorConfig {
        port_config: PortConfig::default(),
        echo: if cli.single {
            EchoMode::Single
        } else {
            EchoMode::Faithful
        },
    };

    let port = config.port_config.port_path.clone();
    serial::monitor::run_monitor(config, stop)
        .with_context(|| format!("Telemetry reader on {} stopped", port))
}
