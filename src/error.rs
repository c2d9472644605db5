//! Error types for the serial reader
//!
//! Every failure is fatal to the read loop; the variants exist so callers
//! and tests can tell the failure kinds apart.

use std::io;
use std::str::Utf8Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    /// The port is missing, busy or inaccessible
    #[error("failed to open serial port {port} at {baud_rate} baud")]
    Open {
        port: String,
        baud_rate: u32,
        #[source]
        source: serialport::Error,
    },

    #[error("failed to read from serial port")]
    Read {
        #[source]
        source: io::Error,
    },

    /// The transport reported end of stream
    #[error("serial port closed by the device")]
    Disconnected,

    /// Received bytes were not valid UTF-8 (`line` is 1-based)
    #[error("line {line} is not valid UTF-8")]
    Decode {
        line: u64,
        #[source]
        source: Utf8Error,
    },

    #[error("failed to write to stdout")]
    Output {
        #[source]
        source: io::Error,
    },

    #[error("failed to install Ctrl+C handler")]
    Signal {
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ReaderError>;
