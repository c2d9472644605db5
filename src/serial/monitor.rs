//! Telemetry monitor: the read, decode and echo loop
//!
//! Connects to the board, then echoes every received line to the output
//! until the stream fails or a stop is requested. Failures are never
//! retried.

use crate::error::{ReaderError, Result};
use crate::serial::line::{LineReader, ReadEvent};
use crate::serial::{PortConfig, SerialConnection};
use crate::shutdown::StopFlag;
use chrono::{DateTime, Local};
use log::{debug, info};
use std::io::{self, BufRead, BufReader, Write};
use std::str::Utf8Error;

/// Label printed between the two copies of a line in faithful mode
pub const DATA_LABEL: &str = "Data Recieved: ";

/// How a received line is written to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoMode {
    /// Line, label, line again, as the board tooling has always printed it
    #[default]
    Faithful,
    /// Each line once, terminator stripped
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Connecting,
    Reading,
}

/// Configuration for serial monitoring
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    pub port_config: PortConfig,
    pub echo: EchoMode,
}

pub struct SerialMonitor<W: Write> {
    config: MonitorConfig,
    out: W,
    stop: StopFlag,
    state: MonitorState,
    line_count: u64,
    started: DateTime<Local>,
}

impl<W: Write> SerialMonitor<W> {
    pub fn new(config: MonitorConfig, out: W, stop: StopFlag) -> Self {
        Self {
            config,
            out,
            stop,
            state: MonitorState::Connecting,
            line_count: 0,
            started: Local::now(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    /// Open the port and read until failure or a stop request.
    ///
    /// The connection lives only for the duration of this call.
    pub fn run(&mut self) -> Result<()> {
        let connection = self.connect()?;
        let mut lines = LineReader::new(BufReader::new(connection));

        self.read_lines(&mut lines)?;
        self.print_summary();
        Ok(())
    }

    fn connect(&mut self) -> Result<SerialConnection> {
        let port = &self.config.port_config;
        info!("Opening {} at {} baud", port.port_path, port.baud_rate);

        let connection = SerialConnection::open(port.clone())?;

        info!("Connected to {}, waiting for data", connection.config().port_path);
        self.state = MonitorState::Reading;
        self.started = Local::now();
        Ok(connection)
    }

    /// Echo lines until the stream fails or the stop flag is raised
    pub fn read_lines<R: BufRead>(&mut self, lines: &mut LineReader<R>) -> Result<()> {
        self.state = MonitorState::Reading;

        while !self.stop.is_stopped() {
            match lines.next_event() {
                Ok(ReadEvent::Line(raw)) => self.process_line(&raw)?,
                Ok(ReadEvent::Idle) => continue,
                Ok(ReadEvent::Closed) => return Err(ReaderError::Disconnected),
                Err(source) => return Err(ReaderError::Read { source }),
            }
        }

        info!("Stop requested");
        Ok(())
    }

    fn process_line(&mut self, raw: &[u8]) -> Result<()> {
        self.line_count += 1;
        debug!("line {}: {} bytes {:02x?}", self.line_count, raw.len(), raw);

        let text = decode_line(raw).map_err(|source| ReaderError::Decode {
            line: self.line_count,
            source,
        })?;

        write_line(&mut self.out, text, self.config.echo)
            .and_then(|_| self.out.flush())
            .map_err(|source| ReaderError::Output { source })
    }

    fn print_summary(&self) {
        let elapsed = Local::now().signed_duration_since(self.started);
        info!(
            "Received {} lines since {} ({}s)",
            self.line_count(),
            self.started.format("%Y-%m-%d %H:%M:%S"),
            elapsed.num_seconds()
        );
    }
}

/// Strict UTF-8 decode, terminator kept
pub fn decode_line(raw: &[u8]) -> std::result::Result<&str, Utf8Error> {
    std::str::from_utf8(raw)
}

/// Write one decoded line in the given echo mode
pub fn write_line<W: Write>(out: &mut W, text: &str, mode: EchoMode) -> io::Result<()> {
    match mode {
        EchoMode::Faithful => {
            writeln!(out, "{}", text)?;
            writeln!(out, "{}", DATA_LABEL)?;
            writeln!(out, "{}", text)
        }
        EchoMode::Single => writeln!(out, "{}", text.trim_end_matches(['\r', '\n'])),
    }
}

/// Run the monitor against stdout until failure or Ctrl+C
pub fn run_monitor(config: MonitorConfig, stop: StopFlag) -> Result<()> {
    let stdout = io::stdout();
    let mut monitor = SerialMonitor::new(config, stdout.lock(), stop);
    monitor.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn monitor(out: &mut Vec<u8>, echo: EchoMode, stop: StopFlag) -> SerialMonitor<&mut Vec<u8>> {
        let config = MonitorConfig {
            echo,
            ..Default::default()
        };
        SerialMonitor::new(config, out, stop)
    }

    /// Produces `TICK\n` forever and raises the stop flag after `limit` lines
    struct Endless {
        stop: StopFlag,
        sent: usize,
        limit: usize,
    }

    impl Read for Endless {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.sent += 1;
            if self.sent == self.limit {
                self.stop.stop();
            }
            let line = b"TICK\n";
            buf[..line.len()].copy_from_slice(line);
            Ok(line.len())
        }
    }

    #[test]
    fn test_hello_faithful_output() {
        let mut out = Vec::new();
        let mut lines = LineReader::new(Cursor::new(&b"HELLO\n"[..]));

        let result = monitor(&mut out, EchoMode::Faithful, StopFlag::new()).read_lines(&mut lines);

        assert!(matches!(result, Err(ReaderError::Disconnected)));
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "HELLO\n\nData Recieved: \nHELLO\n\n");
        assert_eq!(text.matches("HELLO").count(), 2);
    }

    #[test]
    fn test_single_echo_strips_terminator() {
        let mut out = Vec::new();
        let mut lines = LineReader::new(Cursor::new(&b"T=21.5\r\nV=3.3\n"[..]));

        let _ = monitor(&mut out, EchoMode::Single, StopFlag::new()).read_lines(&mut lines);

        assert_eq!(String::from_utf8(out).unwrap(), "T=21.5\nV=3.3\n");
    }

    #[test]
    fn test_every_line_echoed_until_stopped() {
        let stop = StopFlag::new();
        let endless = Endless {
            stop: stop.clone(),
            sent: 0,
            limit: 25,
        };
        // Buffer holds exactly one line per read.
        let mut lines = LineReader::new(BufReader::with_capacity(5, endless));
        let mut out = Vec::new();

        let mut mon = monitor(&mut out, EchoMode::Faithful, stop);
        mon.read_lines(&mut lines).unwrap();
        assert_eq!(mon.line_count(), 25);
        assert_eq!(mon.state(), MonitorState::Reading);
        drop(mon);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("TICK").count(), 50);
        assert_eq!(text.matches(DATA_LABEL).count(), 25);
    }

    #[test]
    fn test_invalid_utf8_is_fatal_after_prior_lines() {
        let mut out = Vec::new();
        let mut lines = LineReader::new(Cursor::new(&b"ok\n\xff\xfe\nnever\n"[..]));

        let result = monitor(&mut out, EchoMode::Single, StopFlag::new()).read_lines(&mut lines);

        match result {
            Err(ReaderError::Decode { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected decode error, got {:?}", other),
        }
        assert_eq!(String::from_utf8(out).unwrap(), "ok\n");
    }

    #[test]
    fn test_stop_before_reading() {
        let stop = StopFlag::new();
        stop.stop();
        let mut out = Vec::new();
        let mut lines = LineReader::new(Cursor::new(&b"HELLO\n"[..]));

        monitor(&mut out, EchoMode::Faithful, stop).read_lines(&mut lines).unwrap();

        assert!(out.is_empty());
    }

    #[test]
    fn test_new_monitor_is_connecting() {
        let mut out = Vec::new();
        let mon = monitor(&mut out, EchoMode::Faithful, StopFlag::new());
        assert_eq!(mon.state(), MonitorState::Connecting);
        assert_eq!(mon.line_count(), 0);
    }

    #[test]
    fn test_run_fails_on_missing_port() {
        let mut out = Vec::new();
        let config = MonitorConfig {
            port_config: PortConfig::new("/dev/rs232-reader-missing-port"),
            echo: EchoMode::Faithful,
        };
        let mut mon = SerialMonitor::new(config, &mut out, StopFlag::new());

        assert!(matches!(mon.run(), Err(ReaderError::Open { .. })));
        assert_eq!(mon.state(), MonitorState::Connecting);
        drop(mon);
        assert!(out.is_empty());
    }
}
