// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Session emitter
//!
//! Sends one session over one connection: `session_start`, a fixed prelude
//! pause, one `gaze` message per pacer tick (cycling the sample pool), then
//! `session_end`. Any write failure ends the session; nothing is retried.

use std::io::Write;
use std::thread;
use std::time::Duration;

use gaze_config::EmitterConfig;
use tracing::{debug, info};

use crate::clock::{epoch_millis, TimeSource};
use crate::error::{Result, StreamError};
use crate::pacer::Pacer;
use crate::protocol::{Message, SessionId};
use crate::samples::SamplePool;
use crate::transport::Endpoint;

/// Below this remaining time the emitter spins instead of sleeping.
const SPIN_THRESHOLD: Duration = Duration::from_millis(2);
/// Longest single sleep between polls.
const MAX_SLEEP_CHUNK: Duration = Duration::from_millis(50);

/// Per-session emission parameters
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterSettings {
    pub frequency_hz: f64,
    pub duration: Duration,
    pub prelude_delay: Duration,
    pub session_path: String,
}

impl EmitterSettings {
    pub fn from_config(config: &EmitterConfig) -> Result<Self> {
        // Validates the frequency as a side effect.
        config.interval()?;
        Ok(Self {
            frequency_hz: config.frequency_hz,
            duration: config.session_duration()?,
            prelude_delay: config.prelude_delay()?,
            session_path: config.session_path.clone(),
        })
    }
}

/// What one session sent
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub entries_sent: u64,
    /// Time spent in the paced loop (excludes the prelude delay)
    pub elapsed: Duration,
}

/// Sends paced gaze sessions from a fixed sample pool.
#[derive(Debug)]
pub struct SessionEmitter<C> {
    settings: EmitterSettings,
    pool: SamplePool,
    clock: C,
}

impl<C: TimeSource> SessionEmitter<C> {
    /// # Errors
    ///
    /// `StreamError::InvalidPacing` when the frequency is not a positive finite number
    pub fn new(settings: EmitterSettings, pool: SamplePool, clock: C) -> Result<Self> {
        // Fail before any socket is opened.
        Pacer::with_frequency(settings.frequency_hz, settings.duration, &clock)?;
        Ok(Self {
            settings,
            pool,
            clock,
        })
    }

    pub fn settings(&self) -> &EmitterSettings {
        &self.settings
    }

    pub fn pool(&self) -> &SamplePool {
        &self.pool
    }

    /// Open the connection described by `endpoint` and run one session on it.
    ///
    /// The connection is closed when this returns, which tells the peer the session is over.
    pub fn run_session(&self, endpoint: &Endpoint) -> Result<SessionSummary> {
        if endpoint.role == gaze_config::ConnectionRole::Listen {
            info!("Waiting for the receiver to connect");
        }
        let mut stream = endpoint.open()?;
        self.run_on(&mut stream)
    }

    /// Run one session on an already-open sink.
    pub fn run_on<W: Write + ?Sized>(&self, sink: &mut W) -> Result<SessionSummary> {
        let settings = &self.settings;
        let pacer = Pacer::with_frequency(settings.frequency_hz, settings.duration, &self.clock)?;
        let interval = pacer.interval();

        info!("Starting session");
        let session_id = SessionId::now();
        send(
            sink,
            &Message::SessionStart {
                id: session_id,
                path: settings.session_path.clone(),
            },
        )?;
        debug!(ticks = session_id.ticks, path = %settings.session_path, "Session start sent");

        info!("Session started. Waiting {:?}", settings.prelude_delay);
        thread::sleep(settings.prelude_delay);

        info!(
            "Sending gazes @{}hz ({:?} between gazes)",
            settings.frequency_hz, interval
        );
        let loop_start = self.clock.now();
        let mut entries_sent: u64 = 0;

        // The pacer's clock starts at its first poll, i.e. right after the prelude.
        for (_tick, sample) in pacer.ticks_with(wait_for_tick).zip(self.pool.cycle()) {
            send(sink, &Message::gaze(epoch_millis(), sample))?;
            entries_sent += 1;
        }
        let elapsed = self.clock.now().saturating_sub(loop_start);

        info!("Ending session. {} entries sent.", entries_sent);
        send(sink, &Message::SessionEnd)?;
        sink.flush()
            .map_err(|e| StreamError::connection("flush at session end failed", e))?;

        Ok(SessionSummary {
            session_id,
            entries_sent,
            elapsed,
        })
    }
}

/// Hybrid wait: sleep most of the remaining time in bounded chunks, spin the rest.
fn wait_for_tick(remaining: Duration) {
    if remaining > SPIN_THRESHOLD {
        thread::sleep((remaining - SPIN_THRESHOLD).min(MAX_SLEEP_CHUNK));
    } else {
        std::hint::spin_loop();
    }
}

fn send<W: Write + ?Sized>(sink: &mut W, message: &Message) -> Result<()> {
    message
        .write_to(sink)
        .map_err(|e| StreamError::connection("send failed mid-session", e))
}

/// Run one session with explicit parameters.
///
/// Convenience wrapper over [`SessionEmitter`] for callers that do not use configuration files.
pub fn run_session<C: TimeSource>(
    frequency_hz: f64,
    duration: Duration,
    pool: SamplePool,
    clock: C,
    endpoint: &Endpoint,
    prelude_delay: Duration,
    session_path: &str,
) -> Result<SessionSummary> {
    let settings = EmitterSettings {
        frequency_hz,
        duration,
        prelude_delay,
        session_path: session_path.to_string(),
    };
    SessionEmitter::new(settings, pool, clock)?.run_session(endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MonotonicClock;
    use crate::samples::Sample;
    use std::io;

    fn settings(frequency_hz: f64, duration: Duration) -> EmitterSettings {
        EmitterSettings {
            frequency_hz,
            duration,
            prelude_delay: Duration::ZERO,
            session_path: "./".to_string(),
        }
    }

    fn pool(points: &[(f64, f64)]) -> SamplePool {
        SamplePool::new(points.iter().map(|&(x, y)| Sample::new(x, y)).collect()).unwrap()
    }

    fn capture(emitter: &SessionEmitter<MonotonicClock>) -> (SessionSummary, String) {
        let mut sink = Vec::new();
        let summary = emitter.run_on(&mut sink).unwrap();
        (summary, String::from_utf8(sink).unwrap())
    }

    #[test]
    fn test_stream_is_session_framed() {
        let emitter = SessionEmitter::new(
            settings(50.0, Duration::from_millis(100)),
            pool(&[(1.0, 2.0), (3.0, 4.0)]),
            MonotonicClock::new(),
        )
        .unwrap();
        let (summary, stream) = capture(&emitter);

        let lines: Vec<&str> = stream.split('\n').collect();
        assert!(lines[0].starts_with("session_start,"));
        assert!(lines[0].ends_with(",./"));
        assert_eq!(*lines.last().unwrap(), "session_end");
        let gaze_lines = &lines[1..lines.len() - 1];
        assert!(gaze_lines.iter().all(|l| l.starts_with("gaze,")));
        assert_eq!(gaze_lines.len() as u64, summary.entries_sent);
        // floor(0.1 / 0.02) + 1
        assert!(summary.entries_sent >= 1 && summary.entries_sent <= 6);
    }

    #[test]
    fn test_samples_are_consumed_cyclically() {
        let points = [(1.0, 10.0), (2.0, 20.0), (3.0, 30.0)];
        let emitter = SessionEmitter::new(
            settings(200.0, Duration::from_millis(50)),
            pool(&points),
            MonotonicClock::new(),
        )
        .unwrap();
        let (_, stream) = capture(&emitter);

        let gazes: Vec<Message> = stream
            .lines()
            .filter(|l| l.starts_with("gaze,"))
            .map(|l| Message::parse(l).unwrap())
            .collect();
        assert!(gazes.len() > points.len());
        for (i, msg) in gazes.iter().enumerate() {
            match msg {
                Message::Gaze { sample, .. } => {
                    let (x, y) = points[i % points.len()];
                    assert_eq!(*sample, Sample::new(x, y));
                }
                other => panic!("unexpected message {:?}", other),
            }
        }
    }

    #[test]
    fn test_zero_duration_sends_one_gaze() {
        let emitter = SessionEmitter::new(
            settings(1.0, Duration::ZERO),
            pool(&[(1.0, 2.0)]),
            MonotonicClock::new(),
        )
        .unwrap();
        let (summary, stream) = capture(&emitter);
        assert_eq!(summary.entries_sent, 1);
        assert_eq!(stream.matches("gaze,").count(), 1);
    }

    #[test]
    fn test_gaze_timestamps_are_wall_clock_millis() {
        let emitter = SessionEmitter::new(
            settings(100.0, Duration::from_millis(30)),
            pool(&[(1.0, 2.0)]),
            MonotonicClock::new(),
        )
        .unwrap();
        let before = epoch_millis();
        let (_, stream) = capture(&emitter);
        let after = epoch_millis();

        let mut last = before;
        for line in stream.lines().filter(|l| l.starts_with("gaze,")) {
            match Message::parse(line).unwrap() {
                Message::Gaze {
                    timestamp_millis, ..
                } => {
                    assert!(timestamp_millis >= last && timestamp_millis <= after);
                    last = timestamp_millis;
                }
                other => panic!("unexpected message {:?}", other),
            }
        }
    }

    #[test]
    fn test_invalid_frequency_rejected_before_io() {
        let result = SessionEmitter::new(
            settings(0.0, Duration::from_secs(1)),
            pool(&[(1.0, 2.0)]),
            MonotonicClock::new(),
        );
        assert!(matches!(result, Err(StreamError::InvalidPacing(_))));
    }

    struct FailAfter {
        writes_left: usize,
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.writes_left == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
            }
            self.writes_left -= 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_send_failure_is_fatal() {
        let emitter = SessionEmitter::new(
            settings(100.0, Duration::from_secs(5)),
            pool(&[(1.0, 2.0)]),
            MonotonicClock::new(),
        )
        .unwrap();
        let mut sink = FailAfter { writes_left: 3 };
        let err = emitter.run_on(&mut sink).unwrap_err();
        assert!(err.is_connection());
    }

    #[test]
    fn test_settings_from_config() {
        let config = EmitterConfig {
            frequency_hz: 120.0,
            duration_secs: 2.5,
            prelude_delay_secs: 0.0,
            ..EmitterConfig::default()
        };
        let settings = EmitterSettings::from_config(&config).unwrap();
        assert_eq!(settings.duration, Duration::from_millis(2500));
        assert_eq!(settings.prelude_delay, Duration::ZERO);

        let bad = EmitterConfig {
            frequency_hz: -1.0,
            ..EmitterConfig::default()
        };
        assert!(EmitterSettings::from_config(&bad).is_err());
    }
}
