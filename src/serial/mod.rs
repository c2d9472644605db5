//! Serial port communication for board telemetry
//!
//! This module provides functionality for:
//! - Opening the board's fixed serial port
//! - Framing the incoming byte stream into lines
//! - Echoing decoded lines to the console

pub mod line;
pub mod monitor;
pub mod port;

pub use monitor::{EchoMode, MonitorConfig};
pub use port::{PortConfig, SerialConnection};
