//! Session Clock
//!
//! Discrete-tick scheduler driving drill playback.
//!
//! - `Stopped` / `Running` state machine; `start` and `stop` are idempotent
//! - While running, one step is taken every `TICK_PERIOD_MS`
//! - The step index wraps around the path length; every wrap is one lap
//!
//! Time is fed in explicitly through [`SessionClock::advance`], so tests can
//! drive the clock with a fake elapsed time and the host decides where wall
//! time comes from (see [`WallClock`]).

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Playback period (1 step per second)
pub const TICK_PERIOD_MS: u64 = 1000;

pub const TICK_PERIOD: Duration = Duration::from_millis(TICK_PERIOD_MS);

/// Cancellable repeating timer.
///
/// Accumulates elapsed time and reports how many whole periods came due.
/// Time accumulated toward the next tick is the "pending" tick; cancelling
/// drops it so a stale partial period can never fire later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatingTimer {
    period: Duration,
    elapsed: Duration,
}

impl RepeatingTimer {
    pub fn new(period: Duration) -> Self {
        Self { period, elapsed: Duration::ZERO }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time accumulated toward the next tick.
    pub fn pending(&self) -> Duration {
        self.elapsed
    }

    /// Feed elapsed time, returning the number of ticks that came due.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.period.is_zero() {
            return 0;
        }

        let total = self.elapsed.saturating_add(dt).as_nanos();
        let period = self.period.as_nanos();
        let fired = total / period;
        self.elapsed = Duration::from_nanos((total % period) as u64);

        u32::try_from(fired).unwrap_or(u32::MAX)
    }

    pub fn cancel_pending(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockState {
    Stopped,
    Running,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub step_index: usize,
    /// The tick wrapped the index back to 0
    pub lap_completed: bool,
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    step_index: usize,
    lap_count: u64,
    path_len: NonZeroUsize,
    period: Duration,
    /// Present exactly while running
    timer: Option<RepeatingTimer>,
}

impl SessionClock {
    pub fn new(path_len: NonZeroUsize) -> Self {
        Self::with_period(path_len, TICK_PERIOD)
    }

    pub fn with_period(path_len: NonZeroUsize, period: Duration) -> Self {
        Self { step_index: 0, lap_count: 0, path_len, period, timer: None }
    }

    pub fn state(&self) -> ClockState {
        if self.timer.is_some() {
            ClockState::Running
        } else {
            ClockState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn lap_count(&self) -> u64 {
        self.lap_count
    }

    pub fn path_len(&self) -> NonZeroUsize {
        self.path_len
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time accumulated toward the next tick, `None` when stopped.
    pub fn pending(&self) -> Option<Duration> {
        self.timer.as_ref().map(RepeatingTimer::pending)
    }

    /// Stopped -> Running. Returns false if already running; never creates a
    /// second timer.
    pub fn start(&mut self) -> bool {
        if self.timer.is_some() {
            return false;
        }
        self.timer = Some(RepeatingTimer::new(self.period));
        log::debug!("clock started (period {:?})", self.period);
        true
    }

    /// Running -> Stopped. Cancels the pending tick. Returns false if already
    /// stopped.
    pub fn stop(&mut self) -> bool {
        if self.timer.take().is_none() {
            return false;
        }
        log::debug!("clock stopped at step {}", self.step_index);
        true
    }

    /// Flip the running state, returning the new one.
    pub fn toggle(&mut self) -> bool {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
        self.is_running()
    }

    /// Take one step. Only acts while running.
    pub fn tick(&mut self) -> Option<Tick> {
        if !self.is_running() {
            return None;
        }

        let next = (self.step_index + 1) % self.path_len.get();
        let lap_completed = next == 0;
        if lap_completed {
            self.lap_count += 1;
        }
        self.step_index = next;

        Some(Tick { step_index: next, lap_completed })
    }

    /// Feed wall time; fires every tick that came due. Returns the number of
    /// ticks taken.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let fired = match self.timer.as_mut() {
            Some(timer) => timer.advance(elapsed),
            None => return 0,
        };

        let len = self.path_len.get() as u64;
        let reached = self.step_index as u64 + u64::from(fired);
        self.lap_count += reached / len;
        self.step_index = (reached % len) as usize;
        fired
    }

    /// Point the clock at a new path. `running` is kept, the lap count is
    /// not touched, and any partially elapsed tick is cancelled first so it
    /// cannot land on the new path.
    pub fn reset(&mut self, path_len: NonZeroUsize) {
        if let Some(timer) = self.timer.as_mut() {
            timer.cancel_pending();
        }
        self.path_len = path_len;
        self.step_index = 0;
    }

    pub fn reset_laps(&mut self) {
        self.lap_count = 0;
    }

    /// Change the tick period. A running clock restarts its timer.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
        if self.timer.is_some() {
            self.timer = Some(RepeatingTimer::new(period));
        }
    }
}

/// Monotonic wall-time source for hosts that drive the clock in real time.
#[derive(Debug, Clone)]
pub struct WallClock {
    last: Instant,
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock {
    pub fn new() -> Self {
        Self { last: Instant::now() }
    }

    /// Time since the previous call (or construction).
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn len(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_full_traversal_completes_one_lap() {
        let mut clock = SessionClock::new(len(4));
        clock.start();

        for _ in 0..3 {
            assert!(!clock.tick().unwrap().lap_completed);
        }
        let last = clock.tick().unwrap();
        assert!(last.lap_completed);
        assert_eq!(clock.step_index(), 0);
        assert_eq!(clock.lap_count(), 1);
    }

    #[test]
    fn test_single_point_path_laps_every_tick() {
        let mut clock = SessionClock::new(len(1));
        clock.start();

        for expected in 1..=5 {
            clock.tick();
            assert_eq!(clock.step_index(), 0);
            assert_eq!(clock.lap_count(), expected);
        }
    }

    #[test]
    fn test_tick_ignored_while_stopped() {
        let mut clock = SessionClock::new(len(3));
        assert_eq!(clock.tick(), None);
        assert_eq!(clock.advance(Duration::from_secs(10)), 0);
        assert_eq!(clock.step_index(), 0);
    }

    #[test]
    fn test_double_start_single_stop() {
        let mut clock = SessionClock::new(len(3));
        assert!(clock.start());
        assert!(!clock.start());
        assert!(clock.stop());

        assert_eq!(clock.state(), ClockState::Stopped);
        assert_eq!(clock.pending(), None);
        assert!(!clock.stop());
    }

    #[test]
    fn test_advance_fires_whole_periods() {
        let mut clock = SessionClock::new(len(4));
        clock.start();

        assert_eq!(clock.advance(Duration::from_millis(999)), 0);
        assert_eq!(clock.advance(Duration::from_millis(1)), 1);
        assert_eq!(clock.step_index(), 1);

        assert_eq!(clock.advance(Duration::from_millis(2500)), 2);
        assert_eq!(clock.step_index(), 3);
        assert_eq!(clock.pending(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_stop_cancels_pending_tick() {
        let mut clock = SessionClock::new(len(4));
        clock.start();
        clock.advance(Duration::from_millis(900));
        clock.stop();
        clock.start();

        assert_eq!(clock.advance(Duration::from_millis(200)), 0);
        assert_eq!(clock.step_index(), 0);
    }

    #[test]
    fn test_reset_keeps_running_and_laps() {
        let mut clock = SessionClock::new(len(2));
        clock.start();
        clock.advance(Duration::from_millis(2700));
        assert_eq!(clock.lap_count(), 1);

        clock.reset(len(6));
        assert!(clock.is_running());
        assert_eq!(clock.step_index(), 0);
        assert_eq!(clock.lap_count(), 1);
        // partial tick from the old path was dropped
        assert_eq!(clock.pending(), Some(Duration::ZERO));

        clock.reset_laps();
        assert_eq!(clock.lap_count(), 0);
    }

    #[test]
    fn test_reset_to_shorter_path_stays_in_range() {
        let mut clock = SessionClock::new(len(6));
        clock.start();
        clock.advance(Duration::from_millis(4900));
        assert_eq!(clock.step_index(), 4);

        clock.reset(len(2));
        clock.advance(Duration::from_millis(1000));
        assert_eq!(clock.step_index(), 1);
    }

    #[test]
    fn test_toggle_and_set_period() {
        let mut clock = SessionClock::new(len(3));
        assert!(clock.toggle());
        clock.set_period(Duration::from_millis(250));
        assert_eq!(clock.advance(Duration::from_millis(500)), 2);
        assert!(!clock.toggle());
    }

    #[test]
    fn test_huge_elapsed_saturates() {
        let mut clock = SessionClock::new(len(4));
        clock.start();
        clock.advance(Duration::from_millis(500));

        assert_eq!(clock.advance(Duration::MAX), u32::MAX);
        assert_eq!(clock.step_index(), 3);
        assert_eq!(clock.lap_count(), u64::from(u32::MAX) / 4);
        assert!(clock.pending().unwrap() < TICK_PERIOD);
    }

    #[test]
    fn test_zero_period_timer_never_fires() {
        let mut timer = RepeatingTimer::new(Duration::ZERO);
        assert_eq!(timer.advance(Duration::from_secs(1)), 0);
    }

    proptest! {
        #[test]
        fn prop_laps_count_full_traversals(n in 1usize..40, ticks in 0usize..400) {
            let mut clock = SessionClock::new(len(n));
            clock.start();
            for _ in 0..ticks {
                clock.tick();
            }
            prop_assert_eq!(clock.step_index(), ticks % n);
            prop_assert_eq!(clock.lap_count(), (ticks / n) as u64);
        }

        #[test]
        fn prop_step_index_always_in_range(n in 1usize..40, ms in 0u64..100_000) {
            let mut clock = SessionClock::new(len(n));
            clock.start();
            clock.advance(Duration::from_millis(ms));
            prop_assert!(clock.step_index() < n);
            prop_assert_eq!(clock.lap_count(), (ms / TICK_PERIOD_MS) / n as u64);
        }
    }
}
