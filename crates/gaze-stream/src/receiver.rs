//! Session receiver
//!
//! Reads one session from one connection until the peer closes it and
//! reports how many gaze entries arrived and how fast.
//!
//! Two counting modes are available:
//! - [`CountingMode::Chunks`]: every non-empty socket read counts as one
//!   entry. Cheap, but only accurate when each read returns exactly one
//!   message (small messages, `TCP_NODELAY`, a receiver that keeps up).
//! - [`CountingMode::Lines`]: reads are reassembled into lines and only
//!   complete, parseable `gaze` messages are counted.

use std::io::{ErrorKind, Read};
use std::time::Duration;

use gaze_config::{CountingMode, ReceiverConfig};
use tracing::{debug, info, warn};

use crate::clock::TimeSource;
use crate::error::{Result, StreamError};
use crate::protocol::{LineFramer, Message};
use crate::transport::Endpoint;

/// Receive parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverSettings {
    pub counting: CountingMode,
    pub read_buffer_size: usize,
}

impl Default for ReceiverSettings {
    fn default() -> Self {
        Self {
            counting: CountingMode::Chunks,
            read_buffer_size: 1024,
        }
    }
}

impl ReceiverSettings {
    pub fn from_config(config: &ReceiverConfig) -> Self {
        Self {
            counting: config.counting,
            read_buffer_size: config.read_buffer_size.max(1),
        }
    }
}

/// Something unexpected about the shape of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveAnomaly {
    /// The peer closed before sending anything
    MissingSessionStart,
    /// Nothing followed the session start, or the stream did not end with `session_end`
    MissingSessionEnd,
}

/// Result of receiving one session
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiveReport {
    pub entry_count: u64,
    pub elapsed: Duration,
    pub mode: CountingMode,
    pub anomaly: Option<ReceiveAnomaly>,
    /// Lines that failed to parse (lines mode only)
    pub rejected_frames: u64,
}

impl ReceiveReport {
    /// Entries per second; 0 when no time elapsed.
    pub fn throughput_hz(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.entry_count as f64 / secs
        } else {
            0.0
        }
    }
}

/// Receives and measures gaze sessions.
#[derive(Debug)]
pub struct SessionReceiver<C> {
    settings: ReceiverSettings,
    clock: C,
}

impl<C: TimeSource> SessionReceiver<C> {
    pub fn new(settings: ReceiverSettings, clock: C) -> Self {
        Self { settings, clock }
    }

    pub fn settings(&self) -> &ReceiverSettings {
        &self.settings
    }

    /// Obtain the connection described by `endpoint` and receive one session.
    pub fn receive_session(&self, endpoint: &Endpoint) -> Result<ReceiveReport> {
        let stream = endpoint.open()?;
        self.receive_from(stream)
    }

    /// Receive one session from any byte source until it reports end of stream.
    pub fn receive_from<R: Read>(&self, mut source: R) -> Result<ReceiveReport> {
        let mut buf = vec![0u8; self.settings.read_buffer_size.max(1)];
        let report = match self.settings.counting {
            CountingMode::Chunks => self.count_chunks(&mut source, &mut buf)?,
            CountingMode::Lines => self.count_lines(&mut source, &mut buf)?,
        };

        if let Some(anomaly) = report.anomaly {
            warn!(?anomaly, entries = report.entry_count, "Session ended abnormally");
        }
        info!(
            "Received {} entries in {:?} ({} counting)",
            report.entry_count, report.elapsed, report.mode
        );
        Ok(report)
    }

    fn count_chunks<R: Read>(&self, source: &mut R, buf: &mut [u8]) -> Result<ReceiveReport> {
        // First chunk is the session start.
        if read_chunk(source, buf)? == 0 {
            return Ok(self.empty_report(CountingMode::Chunks));
        }

        let mut chunks: u64 = 0;
        let mut started = None;
        let finished = loop {
            let n = read_chunk(source, buf)?;
            let now = self.clock.now();
            started.get_or_insert(now);
            if n == 0 {
                break now;
            }
            chunks += 1;
        };

        // Last chunk is the session end.
        let (entry_count, anomaly) = match chunks.checked_sub(1) {
            Some(count) => (count, None),
            None => (0, Some(ReceiveAnomaly::MissingSessionEnd)),
        };
        Ok(ReceiveReport {
            entry_count,
            elapsed: finished.saturating_sub(started.unwrap_or(finished)),
            mode: CountingMode::Chunks,
            anomaly,
            rejected_frames: 0,
        })
    }

    fn count_lines<R: Read>(&self, source: &mut R, buf: &mut [u8]) -> Result<ReceiveReport> {
        let mut framer = LineFramer::new();
        let mut seen_start = false;
        let mut seen_end = false;
        let mut anomaly = None;
        let mut entries: u64 = 0;
        let mut rejected: u64 = 0;
        let mut started = None;

        let finished = loop {
            let n = read_chunk(source, buf)?;
            let now = self.clock.now();
            if n == 0 {
                break now;
            }
            framer.push(&buf[..n]);

            while let Some(frame) = framer.next_message() {
                match frame {
                    Ok(Message::SessionStart { id, path }) => {
                        debug!(ticks = id.ticks, %path, "Session start received");
                        seen_start = true;
                    }
                    Ok(Message::Gaze { .. }) => {
                        if !seen_start {
                            anomaly.get_or_insert(ReceiveAnomaly::MissingSessionStart);
                            seen_start = true;
                        }
                        // Elapsed time runs from the read that delivered the first gaze.
                        started.get_or_insert(now);
                        entries += 1;
                    }
                    Ok(Message::SessionEnd) => seen_end = true,
                    Err(e) => {
                        warn!("Rejected frame: {}", e);
                        rejected += 1;
                    }
                }
            }
        };

        match framer.finish() {
            Some(Ok(Message::SessionEnd)) => seen_end = true,
            Some(Ok(Message::Gaze { .. })) => entries += 1,
            Some(Ok(Message::SessionStart { .. })) => seen_start = true,
            Some(Err(e)) => {
                warn!("Rejected trailing frame: {}", e);
                rejected += 1;
            }
            None => {}
        }

        if !seen_start {
            anomaly.get_or_insert(ReceiveAnomaly::MissingSessionStart);
        } else if !seen_end {
            anomaly.get_or_insert(ReceiveAnomaly::MissingSessionEnd);
        }

        Ok(ReceiveReport {
            entry_count: entries,
            elapsed: finished.saturating_sub(started.unwrap_or(finished)),
            mode: CountingMode::Lines,
            anomaly,
            rejected_frames: rejected,
        })
    }

    fn empty_report(&self, mode: CountingMode) -> ReceiveReport {
        ReceiveReport {
            entry_count: 0,
            elapsed: Duration::ZERO,
            mode,
            anomaly: Some(ReceiveAnomaly::MissingSessionStart),
            rejected_frames: 0,
        }
    }
}

fn read_chunk<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match source.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::connection("read failed mid-session", e)),
        }
    }
}
