#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-period tick scheduler that drives the world while a session is running.

use std::time::Duration;

use log::debug;
use math_snake_core::{Command, Event, SessionPhase};

/// Ticks a single frame may release when not configured otherwise.
pub const DEFAULT_MAX_CATCH_UP: u32 = 4;

/// Countdown that exists only while the scheduler is armed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ArmedTimer {
    period: Duration,
    elapsed: Duration,
    due: u32,
}

/// Pure system that converts elapsed host time into `Command::Tick`.
#[derive(Debug)]
pub struct TickScheduler {
    timer: Option<ArmedTimer>,
    max_catch_up: u32,
    in_flight: bool,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CATCH_UP)
    }
}

impl TickScheduler {
    /// Creates a disarmed scheduler that releases at most `max_catch_up` ticks per frame.
    #[must_use]
    pub fn new(max_catch_up: u32) -> Self {
        Self {
            timer: None,
            max_catch_up: max_catch_up.max(1),
            in_flight: false,
        }
    }

    /// Reports whether a countdown is active.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Period of the active countdown.
    #[must_use]
    pub fn period(&self) -> Option<Duration> {
        self.timer.map(|timer| timer.period)
    }

    /// Consumes world events together with the settled phase and tick period.
    ///
    /// Any call acknowledges the tick released by the previous `poll`.
    pub fn handle(&mut self, events: &[Event], phase: SessionPhase, period: Duration) {
        self.in_flight = false;

        let restart_countdown = events.iter().any(|event| {
            matches!(
                event,
                Event::TickPeriodChanged { .. }
                    | Event::SessionReset
                    | Event::PhaseChanged {
                        phase: SessionPhase::Running
                    }
            )
        });

        if phase != SessionPhase::Running || period.is_zero() {
            self.disarm();
            return;
        }

        let stale = self.timer.map_or(true, |timer| timer.period != period);
        if restart_countdown || stale {
            self.arm(period);
        }
    }

    /// Accumulates host time, releasing up to the catch-up cap of ticks.
    ///
    /// Time beyond the cap is discarded.
    pub fn elapse(&mut self, dt: Duration) {
        let max_catch_up = self.max_catch_up;
        let Some(timer) = self.timer.as_mut() else {
            return;
        };

        timer.elapsed = timer.elapsed.saturating_add(dt);
        let period_nanos = timer.period.as_nanos();
        let fires = timer.elapsed.as_nanos() / period_nanos;
        if fires == 0 {
            return;
        }

        let remainder = timer.elapsed.as_nanos() % period_nanos;
        timer.elapsed = Duration::from_nanos(u64::try_from(remainder).unwrap_or(u64::MAX));
        let fires = u32::try_from(fires).unwrap_or(u32::MAX);
        let due = timer.due.saturating_add(fires);
        if due > max_catch_up {
            debug!("dropping {} overdue ticks", due - max_catch_up);
        }
        timer.due = due.min(max_catch_up);
    }

    /// Releases the next due tick unless the previous one is still unacknowledged.
    pub fn poll(&mut self) -> Option<Command> {
        if self.in_flight {
            return None;
        }
        let timer = self.timer.as_mut()?;
        if timer.due == 0 {
            return None;
        }
        timer.due -= 1;
        self.in_flight = true;
        Some(Command::Tick)
    }

    fn arm(&mut self, period: Duration) {
        debug!("arming tick scheduler at {} ms", period.as_millis());
        self.timer = Some(ArmedTimer {
            period,
            elapsed: Duration::ZERO,
            due: 0,
        });
    }

    fn disarm(&mut self) {
        if self.timer.take().is_some() {
            debug!("disarming tick scheduler");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(200);

    fn armed() -> TickScheduler {
        let mut scheduler = TickScheduler::default();
        scheduler.handle(
            &[Event::PhaseChanged {
                phase: SessionPhase::Running,
            }],
            SessionPhase::Running,
            PERIOD,
        );
        scheduler
    }

    fn drain(scheduler: &mut TickScheduler) -> usize {
        let mut fired = 0;
        while scheduler.poll().is_some() {
            fired += 1;
            scheduler.handle(&[], SessionPhase::Running, PERIOD);
        }
        fired
    }

    #[test]
    fn starts_disarmed() {
        let mut scheduler = TickScheduler::default();
        scheduler.elapse(Duration::from_secs(5));
        assert!(!scheduler.is_armed());
        assert_eq!(scheduler.poll(), None);
    }

    #[test]
    fn fires_once_per_period() {
        let mut scheduler = armed();
        scheduler.elapse(Duration::from_millis(199));
        assert_eq!(scheduler.poll(), None);

        scheduler.elapse(Duration::from_millis(1));
        assert_eq!(scheduler.poll(), Some(Command::Tick));
    }

    #[test]
    fn never_releases_a_second_tick_before_acknowledgement() {
        let mut scheduler = armed();
        scheduler.elapse(Duration::from_millis(400));
        assert_eq!(scheduler.poll(), Some(Command::Tick));
        assert_eq!(scheduler.poll(), None);

        scheduler.handle(&[], SessionPhase::Running, PERIOD);
        assert_eq!(scheduler.poll(), Some(Command::Tick));
    }

    #[test]
    fn catch_up_is_capped() {
        let mut scheduler = armed();
        scheduler.elapse(Duration::from_secs(10));
        assert_eq!(drain(&mut scheduler), DEFAULT_MAX_CATCH_UP as usize);

        scheduler.elapse(Duration::from_millis(100));
        assert_eq!(drain(&mut scheduler), 0);
    }

    #[test]
    fn period_change_restarts_the_countdown() {
        let mut scheduler = armed();
        scheduler.elapse(Duration::from_millis(150));

        let faster = Duration::from_millis(190);
        scheduler.handle(
            &[Event::TickPeriodChanged { period: faster }],
            SessionPhase::Running,
            faster,
        );
        assert_eq!(scheduler.period(), Some(faster));

        scheduler.elapse(Duration::from_millis(60));
        assert_eq!(scheduler.poll(), None);
        scheduler.elapse(Duration::from_millis(130));
        assert_eq!(scheduler.poll(), Some(Command::Tick));
    }

    #[test]
    fn leaving_running_disarms() {
        let mut scheduler = armed();
        scheduler.elapse(Duration::from_millis(400));
        scheduler.handle(
            &[Event::PhaseChanged {
                phase: SessionPhase::Paused,
            }],
            SessionPhase::Paused,
            PERIOD,
        );

        assert!(!scheduler.is_armed());
        assert_eq!(scheduler.poll(), None);
    }

    #[test]
    fn resuming_starts_a_fresh_countdown() {
        let mut scheduler = armed();
        scheduler.elapse(Duration::from_millis(150));
        scheduler.handle(&[], SessionPhase::Paused, PERIOD);
        scheduler.handle(
            &[Event::PhaseChanged {
                phase: SessionPhase::Running,
            }],
            SessionPhase::Running,
            PERIOD,
        );

        scheduler.elapse(Duration::from_millis(150));
        assert_eq!(scheduler.poll(), None);
    }

    #[test]
    fn unrelated_events_keep_the_countdown() {
        let mut scheduler = armed();
        scheduler.elapse(Duration::from_millis(150));
        scheduler.handle(&[Event::ScoreChanged { score: 10 }], SessionPhase::Running, PERIOD);
        scheduler.elapse(Duration::from_millis(50));
        assert_eq!(scheduler.poll(), Some(Command::Tick));
    }
}
