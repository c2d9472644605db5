//! Serial port configuration and connection handle
//!
//! The board is always reached on the same port at the same speed, so the
//! configuration is fixed in code.

use crate::error::{ReaderError, Result};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Read};
use std::time::Duration;

/// Port the DE1 board enumerates as
pub const DEFAULT_PORT: &str = "COM5";

/// Baud rate the board's UART transmits at
pub const DEFAULT_BAUD_RATE: u32 = 115200;

/// How long a single read waits before the loop gets a chance to check for
/// a stop request. Not a read timeout from the user's point of view.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Configuration for serial port connection
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Serial port path (e.g., COM5, /dev/ttyUSB0)
    pub port_path: String,
    /// Baud rate (default: 115200)
    pub baud_rate: u32,
    /// Data bits (default: 8)
    pub data_bits: DataBits,
    /// Parity (default: None)
    pub parity: Parity,
    /// Stop bits (default: 1)
    pub stop_bits: StopBits,
    /// Flow control (default: None)
    pub flow_control: FlowControl,
    pub poll_interval: Duration,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            port_path: String::from(DEFAULT_PORT),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            poll_interval: POLL_INTERVAL,
        }
    }
}

impl PortConfig {
    #[cfg(test)]
    pub fn new(port_path: &str) -> Self {
        Self {
            port_path: port_path.to_string(),
            ..Default::default()
        }
    }
}

/// Exclusively owned handle to the open port. Dropping it releases the port.
pub struct SerialConnection {
    port: Box<dyn SerialPort>,
    config: PortConfig,
}

impl SerialConnection {
    /// Open a serial connection with the given configuration
    pub fn open(config: PortConfig) -> Result<Self> {
        let port = serialport::new(&config.port_path, config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.poll_interval)
            .open()
            .map_err(|source| ReaderError::Open {
                port: config.port_path.clone(),
                baud_rate: config.baud_rate,
                source,
            })?;

        Ok(Self { port, config })
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }
}

impl Read for SerialConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}
