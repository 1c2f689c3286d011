// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Session wire protocol
//!
//! Newline-delimited UTF-8 text, no length prefix:
//!
//! ```text
//! session_start,<ticks>,<epoch_millis>,<path>\n
//! gaze,<timestamp_millis>,<x>,<y>\n        (one per sample)
//! session_end                              (no newline; the connection closes next)
//! ```

use std::fmt;
use std::io::Write;

use chrono::Utc;

use crate::error::{Result, StreamError};
use crate::samples::Sample;

pub const SESSION_START_TAG: &str = "session_start";
pub const GAZE_TAG: &str = "gaze";
pub const SESSION_END_TAG: &str = "session_end";

/// Two-part session identifier derived from the wall clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionId {
    /// Epoch time in 100ns units
    pub ticks: i64,
    /// Epoch time in (fractional) milliseconds
    pub epoch_millis: f64,
}

impl SessionId {
    pub fn now() -> Self {
        let micros = Utc::now().timestamp_micros();
        Self {
            ticks: micros * 10,
            epoch_millis: micros as f64 / 1000.0,
        }
    }
}

/// One protocol message
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    SessionStart { id: SessionId, path: String },
    Gaze { timestamp_millis: i64, sample: Sample },
    SessionEnd,
}

impl Message {
    pub fn gaze(timestamp_millis: i64, sample: Sample) -> Self {
        Message::Gaze {
            timestamp_millis,
            sample,
        }
    }

    /// Wire form, including the trailing newline where the protocol has one.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Write the wire form with a single `write_all`.
    pub fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> std::io::Result<()> {
        sink.write_all(self.encode().as_bytes())
    }

    /// Parse one message. `line` must not contain the trailing newline.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut fields = line.splitn(4, ',');
        let tag = fields.next().unwrap_or_default();

        match tag {
            SESSION_START_TAG => {
                let ticks = parse_field(fields.next(), "session_start id")?;
                let epoch_millis = parse_field(fields.next(), "session_start timestamp")?;
                let path = fields
                    .next()
                    .ok_or_else(|| malformed(line, "session_start path missing"))?;
                Ok(Message::SessionStart {
                    id: SessionId {
                        ticks,
                        epoch_millis,
                    },
                    path: path.to_string(),
                })
            }
            GAZE_TAG => {
                let timestamp_millis = parse_field(fields.next(), "gaze timestamp")?;
                let x = parse_field(fields.next(), "gaze x")?;
                let y = parse_field(fields.next(), "gaze y")?;
                Ok(Message::gaze(timestamp_millis, Sample::new(x, y)))
            }
            SESSION_END_TAG if fields.next().is_none() => Ok(Message::SessionEnd),
            _ => Err(malformed(line, "unknown message")),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::SessionStart { id, path } => writeln!(
                f,
                "{},{},{},{}",
                SESSION_START_TAG, id.ticks, id.epoch_millis, path
            ),
            Message::Gaze {
                timestamp_millis,
                sample,
            } => writeln!(
                f,
                "{},{},{},{}",
                GAZE_TAG, timestamp_millis, sample.x, sample.y
            ),
            Message::SessionEnd => write!(f, "{}", SESSION_END_TAG),
        }
    }
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, what: &str) -> Result<T> {
    let raw = field.ok_or_else(|| StreamError::Protocol(format!("{} missing", what)))?;
    raw.trim()
        .parse()
        .map_err(|_| StreamError::Protocol(format!("{} is not a number: '{}'", what, raw)))
}

fn malformed(line: &str, reason: &str) -> StreamError {
    StreamError::Protocol(format!("{}: '{}'", reason, line))
}

/// Reassembles newline-delimited messages from arbitrary read chunks.
///
/// Bytes are buffered until a `\n` arrives, so coalesced or split reads
/// yield the same message sequence. Whatever is left at end of stream is
/// handed out by [`LineFramer::finish`] (normally the unterminated `session_end`).
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
    scanned: usize,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Next complete line, without its `\n`.
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let offset = self.buffer[self.scanned..].iter().position(|&b| b == b'\n');
        match offset {
            Some(offset) => {
                let end = self.scanned + offset;
                let line: Vec<u8> = self.buffer.drain(..=end).take(end).collect();
                self.scanned = 0;
                Some(decode(line))
            }
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    /// Next complete message; blank lines are skipped.
    pub fn next_message(&mut self) -> Option<Result<Message>> {
        loop {
            match self.next_line()? {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some(Message::parse(&line)),
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Bytes received after the last newline.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Parse the unterminated tail at end of stream, if any.
    pub fn finish(&mut self) -> Option<Result<Message>> {
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.buffer.clear();
            self.scanned = 0;
            return None;
        }
        let tail = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        Some(decode(tail).and_then(|line| Message::parse(line.trim_end())))
    }
}

fn decode(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| StreamError::Protocol(format!("invalid UTF-8: {}", e)))
}
