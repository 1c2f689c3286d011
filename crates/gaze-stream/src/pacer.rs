// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-interval tick gate
//!
//! A [`Pacer`] answers "is it time to act?" and nothing more. It never sleeps
//! or spins; the caller decides how to wait between polls (see
//! [`Pacer::ticks_with`]).
//!
//! Guarantees, for `interval > 0` and `duration >= 0`:
//! - the first poll always ticks;
//! - two ticks are at least `interval` apart (late ticks are not caught up);
//! - no tick fires once more than `duration` has elapsed since the first poll,
//!   so at most `floor(duration / interval) + 1` ticks are produced.

use std::iter::FusedIterator;
use std::time::Duration;

use crate::clock::TimeSource;

/// "Time to act." Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

/// Outcome of a single [`Pacer::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacerPoll {
    Tick(Tick),
    Pending,
    Finished,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PacerError {
    #[error("interval must be positive")]
    ZeroInterval,
    #[error("frequency must be a positive finite number, got {0}")]
    InvalidFrequency(f64),
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Running { start: Duration, last_tick: Duration },
    Finished,
}

/// Tick gate owning its own timing state.
#[derive(Debug)]
pub struct Pacer<C> {
    clock: C,
    interval: Duration,
    duration: Duration,
    phase: Phase,
}

impl<C: TimeSource> Pacer<C> {
    pub fn new(interval: Duration, duration: Duration, clock: C) -> Result<Self, PacerError> {
        if interval.is_zero() {
            return Err(PacerError::ZeroInterval);
        }
        Ok(Self {
            clock,
            interval,
            duration,
            phase: Phase::Idle,
        })
    }

    /// Pacer ticking `frequency_hz` times per second
    pub fn with_frequency(frequency_hz: f64, duration: Duration, clock: C) -> Result<Self, PacerError> {
        if !(frequency_hz.is_finite() && frequency_hz > 0.0) {
            return Err(PacerError::InvalidFrequency(frequency_hz));
        }
        let interval = Duration::try_from_secs_f64(1.0 / frequency_hz)
            .map_err(|_| PacerError::InvalidFrequency(frequency_hz))?;
        Self::new(interval, duration, clock)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    /// Check the gate once.
    pub fn poll(&mut self) -> PacerPoll {
        match self.phase {
            Phase::Idle => {
                let now = self.clock.now();
                self.phase = Phase::Running {
                    start: now,
                    last_tick: now,
                };
                PacerPoll::Tick(Tick)
            }
            Phase::Running { start, last_tick } => {
                let now = self.clock.now();
                // Termination is checked first so a late poll cannot add a tick past the deadline.
                if now.saturating_sub(start) > self.duration {
                    self.phase = Phase::Finished;
                    return PacerPoll::Finished;
                }
                if now.saturating_sub(last_tick) >= self.interval {
                    self.phase = Phase::Running {
                        start,
                        last_tick: now,
                    };
                    PacerPoll::Tick(Tick)
                } else {
                    PacerPoll::Pending
                }
            }
            Phase::Finished => PacerPoll::Finished,
        }
    }

    /// Time until the next poll can change the outcome: either the next tick
    /// becomes eligible or the deadline passes. `None` once finished.
    pub fn until_next_tick(&self) -> Option<Duration> {
        match self.phase {
            Phase::Idle => Some(Duration::ZERO),
            Phase::Running { start, last_tick } => {
                let now = self.clock.now();
                // An unrepresentable instant is treated as never arriving.
                let to_tick = last_tick
                    .checked_add(self.interval)
                    .map_or(Duration::MAX, |at| at.saturating_sub(now));
                let to_deadline = start
                    .checked_add(self.duration)
                    .and_then(|at| at.checked_add(Duration::from_nanos(1)))
                    .map_or(Duration::MAX, |at| at.saturating_sub(now));
                Some(to_tick.min(to_deadline))
            }
            Phase::Finished => None,
        }
    }

    /// Turn the gate into a blocking iterator.
    ///
    /// `wait` is called with the remaining time whenever a poll is pending; it
    /// may sleep, spin or do nothing.
    pub fn ticks_with<W>(self, wait: W) -> PacedTicks<C, W>
    where
        W: FnMut(Duration),
    {
        PacedTicks { pacer: self, wait }
    }
}

/// Iterator over the ticks of a [`Pacer`]; see [`Pacer::ticks_with`].
pub struct PacedTicks<C, W> {
    pacer: Pacer<C>,
    wait: W,
}

impl<C: TimeSource, W: FnMut(Duration)> Iterator for PacedTicks<C, W> {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        loop {
            match self.pacer.poll() {
                PacerPoll::Tick(tick) => return Some(tick),
                PacerPoll::Finished => return None,
                PacerPoll::Pending => {
                    let remaining = self.pacer.until_next_tick().unwrap_or_default();
                    (self.wait)(remaining);
                }
            }
        }
    }
}

impl<C: TimeSource, W: FnMut(Duration)> FusedIterator for PacedTicks<C, W> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use proptest::prelude::*;

    /// Poll until finished, advancing the clock by `step` after every poll.
    fn count_ticks(interval: Duration, duration: Duration, step: Duration) -> Vec<Duration> {
        let clock = ManualClock::new();
        let mut pacer = Pacer::new(interval, duration, &clock).unwrap();
        let mut tick_times = Vec::new();
        loop {
            match pacer.poll() {
                PacerPoll::Tick(_) => tick_times.push(clock.now()),
                PacerPoll::Pending => {}
                PacerPoll::Finished => break,
            }
            clock.advance(step);
        }
        tick_times
    }

    fn bound(interval: Duration, duration: Duration) -> usize {
        (duration.as_nanos() / interval.as_nanos()) as usize + 1
    }

    #[test]
    fn test_first_poll_ticks_immediately() {
        let clock = ManualClock::new();
        let mut pacer = Pacer::new(Duration::from_secs(1), Duration::from_secs(10), &clock).unwrap();
        assert_eq!(pacer.poll(), PacerPoll::Tick(Tick));
        assert_eq!(pacer.poll(), PacerPoll::Pending);
    }

    #[test]
    fn test_zero_duration_yields_exactly_one_tick() {
        let ticks = count_ticks(Duration::from_millis(10), Duration::ZERO, Duration::from_millis(1));
        assert_eq!(ticks.len(), 1);

        let ticks = count_ticks(Duration::from_millis(10), Duration::ZERO, Duration::from_secs(5));
        assert_eq!(ticks.len(), 1);
    }

    #[test]
    fn test_zero_duration_with_frozen_clock_stays_pending() {
        let clock = ManualClock::new();
        let mut pacer = Pacer::new(Duration::from_millis(10), Duration::ZERO, &clock).unwrap();
        assert_eq!(pacer.poll(), PacerPoll::Tick(Tick));
        for _ in 0..100 {
            assert_eq!(pacer.poll(), PacerPoll::Pending);
        }
        clock.advance(Duration::from_nanos(1));
        assert_eq!(pacer.poll(), PacerPoll::Finished);
    }

    #[test]
    fn test_exact_steps_hit_the_bound() {
        // Polls at 0, 100, ..., 500 all tick; the poll at 600 finishes.
        let ticks = count_ticks(
            Duration::from_millis(100),
            Duration::from_millis(500),
            Duration::from_millis(100),
        );
        assert_eq!(ticks.len(), 6);
        assert_eq!(ticks.last(), Some(&Duration::from_millis(500)));
    }

    #[test]
    fn test_late_ticks_are_not_caught_up() {
        let clock = ManualClock::new();
        let mut pacer =
            Pacer::new(Duration::from_millis(100), Duration::from_secs(10), &clock).unwrap();
        assert_eq!(pacer.poll(), PacerPoll::Tick(Tick));

        // Three intervals late: one tick, not three.
        clock.advance(Duration::from_millis(350));
        assert_eq!(pacer.poll(), PacerPoll::Tick(Tick));
        assert_eq!(pacer.poll(), PacerPoll::Pending);

        // The next interval counts from the late tick.
        clock.advance(Duration::from_millis(99));
        assert_eq!(pacer.poll(), PacerPoll::Pending);
        clock.advance(Duration::from_millis(1));
        assert_eq!(pacer.poll(), PacerPoll::Tick(Tick));
    }

    #[test]
    fn test_finished_is_sticky() {
        let clock = ManualClock::new();
        let mut pacer =
            Pacer::new(Duration::from_millis(10), Duration::from_millis(20), &clock).unwrap();
        pacer.poll();
        clock.advance(Duration::from_millis(21));
        assert_eq!(pacer.poll(), PacerPoll::Finished);
        assert!(pacer.is_finished());
        clock.set(Duration::ZERO);
        assert_eq!(pacer.poll(), PacerPoll::Finished);
        assert_eq!(pacer.until_next_tick(), None);
    }

    #[test]
    fn test_pacers_do_not_share_state() {
        let clock = ManualClock::new();
        let mut first =
            Pacer::new(Duration::from_millis(10), Duration::from_millis(50), &clock).unwrap();
        first.poll();
        clock.advance(Duration::from_millis(100));
        assert_eq!(first.poll(), PacerPoll::Finished);

        let mut second =
            Pacer::new(Duration::from_millis(10), Duration::from_millis(50), &clock).unwrap();
        assert_eq!(second.poll(), PacerPoll::Tick(Tick));
        assert_eq!(second.poll(), PacerPoll::Pending);
    }

    #[test]
    fn test_until_next_tick_is_capped_by_deadline() {
        let clock = ManualClock::new();
        let mut pacer =
            Pacer::new(Duration::from_millis(300), Duration::from_millis(500), &clock).unwrap();
        assert_eq!(pacer.until_next_tick(), Some(Duration::ZERO));
        pacer.poll();
        assert_eq!(pacer.until_next_tick(), Some(Duration::from_millis(300)));

        clock.advance(Duration::from_millis(300));
        assert_eq!(pacer.poll(), PacerPoll::Tick(Tick));
        // Next tick would be at 600ms but the deadline is just past 500ms.
        assert_eq!(
            pacer.until_next_tick(),
            Some(Duration::from_millis(200) + Duration::from_nanos(1))
        );
    }

    #[test]
    fn test_invalid_parameters() {
        let clock = ManualClock::new();
        assert_eq!(
            Pacer::new(Duration::ZERO, Duration::from_secs(1), &clock).unwrap_err(),
            PacerError::ZeroInterval
        );
        assert!(Pacer::with_frequency(0.0, Duration::from_secs(1), &clock).is_err());
        assert!(Pacer::with_frequency(f64::NAN, Duration::from_secs(1), &clock).is_err());
        assert!(Pacer::with_frequency(-5.0, Duration::from_secs(1), &clock).is_err());
    }

    #[test]
    fn test_with_frequency_interval() {
        let clock = ManualClock::new();
        let pacer = Pacer::with_frequency(10.0, Duration::from_secs(1), &clock).unwrap();
        assert_eq!(pacer.interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_ticks_with_waits_through_the_clock() {
        let clock = ManualClock::new();
        let pacer =
            Pacer::new(Duration::from_millis(100), Duration::from_millis(1000), &clock).unwrap();
        let mut waits = 0;
        let ticks = pacer
            .ticks_with(|remaining| {
                waits += 1;
                clock.advance(remaining);
            })
            .count();
        // Waiting exactly the hinted time lands on every interval boundary.
        assert_eq!(ticks, 11);
        assert!(waits >= 10);
    }

    #[test]
    fn test_unbounded_duration_does_not_overflow() {
        let clock = ManualClock::starting_at(Duration::from_secs(1));
        let mut pacer = Pacer::new(Duration::from_millis(10), Duration::MAX, &clock).unwrap();
        assert_eq!(pacer.poll(), PacerPoll::Tick(Tick));
        assert_eq!(pacer.until_next_tick(), Some(Duration::from_millis(10)));

        let ticks = pacer.ticks_with(|remaining| clock.advance(remaining)).take(3).count();
        assert_eq!(ticks, 3);
    }

    #[test]
    fn test_unbounded_interval_waits_for_deadline() {
        let clock = ManualClock::starting_at(Duration::from_secs(1));
        let mut pacer = Pacer::new(Duration::MAX, Duration::from_millis(10), &clock).unwrap();
        assert_eq!(pacer.poll(), PacerPoll::Tick(Tick));
        assert_eq!(
            pacer.until_next_tick(),
            Some(Duration::from_millis(10) + Duration::from_nanos(1))
        );
    }

    proptest! {
        #[test]
        fn prop_tick_count_is_bounded(
            interval_ms in 1u64..200,
            duration_ms in 0u64..2_000,
            step_us in 1u64..50_000,
        ) {
            let interval = Duration::from_millis(interval_ms);
            let duration = Duration::from_millis(duration_ms);
            let ticks = count_ticks(interval, duration, Duration::from_micros(step_us));
            prop_assert!(!ticks.is_empty());
            prop_assert!(ticks.len() <= bound(interval, duration));
        }

        #[test]
        fn prop_ticks_never_fire_early_or_late(
            interval_ms in 1u64..200,
            duration_ms in 0u64..2_000,
            step_us in 1u64..50_000,
        ) {
            let interval = Duration::from_millis(interval_ms);
            let duration = Duration::from_millis(duration_ms);
            let ticks = count_ticks(interval, duration, Duration::from_micros(step_us));
            for pair in ticks.windows(2) {
                prop_assert!(pair[1] - pair[0] >= interval);
            }
            for t in &ticks {
                prop_assert!(*t <= duration);
            }
        }
    }
}
