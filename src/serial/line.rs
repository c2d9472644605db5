//! Newline framing over a byte stream
//!
//! Gives a `readline` that never gives up on a quiet port: read timeouts
//! surface as [`ReadEvent::Idle`] and whatever part of the line has already
//! arrived stays buffered until the terminator shows up.

use std::io::{self, BufRead, ErrorKind};

pub const LINE_TERMINATOR: u8 = b'\n';

#[derive(Debug, PartialEq, Eq)]
pub enum ReadEvent {
    /// A complete line, terminator included. A final unterminated chunk at
    /// end of stream is delivered the same way.
    Line(Vec<u8>),
    /// Nothing new arrived before the poll interval ran out
    Idle,
    /// End of stream with nothing left buffered
    Closed,
}

pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
        }
    }

    pub fn next_event(&mut self) -> io::Result<ReadEvent> {
        match self.inner.read_until(LINE_TERMINATOR, &mut self.pending) {
            Ok(0) if self.pending.is_empty() => Ok(ReadEvent::Closed),
            Ok(_) => Ok(ReadEvent::Line(std::mem::take(&mut self.pending))),
            Err(e) if is_idle(&e) => Ok(ReadEvent::Idle),
            Err(e) => Err(e),
        }
    }
}

fn is_idle(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}
