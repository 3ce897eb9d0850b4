use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, info};

use crate::clock::ClockReading;
use crate::TICK_RATE_MS;

/// Time credited by a tick that has no previous observation to measure from
pub const NOMINAL_TICK: Duration = Duration::from_millis(TICK_RATE_MS);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ClockState {
    Active,
    Paused,
}

/// What a single tick did to the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub rolled_over: bool,
    pub seconds_added: u64,
}

/// Counts active seconds for the current day against a daily limit
#[derive(Debug, Clone)]
pub struct SessionClock {
    elapsed_seconds: u64,
    daily_limit_minutes: u32,
    state: ClockState,
    last_active_day: NaiveDate,
    last_observed: Option<Duration>,
    carry: Duration,
}

impl SessionClock {
    pub fn new(daily_limit_minutes: u32, state: ClockState, today: NaiveDate) -> Self {
        Self {
            elapsed_seconds: 0,
            daily_limit_minutes,
            state,
            last_active_day: today,
            last_observed: None,
            carry: Duration::ZERO,
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn daily_limit_minutes(&self) -> u32 {
        self.daily_limit_minutes
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ClockState::Active
    }

    pub fn last_active_day(&self) -> NaiveDate {
        self.last_active_day
    }

    pub fn start_session(&mut self) {
        if self.state == ClockState::Paused {
            info!("session resumed at {}s", self.elapsed_seconds);
        }
        self.state = ClockState::Active;
    }

    pub fn pause_session(&mut self) {
        if self.state == ClockState::Active {
            info!("session paused at {}s", self.elapsed_seconds);
        }
        self.state = ClockState::Paused;
        // the gap until resume must not be counted
        self.last_observed = None;
    }

    pub fn reset_daily(&mut self) {
        self.elapsed_seconds = 0;
        self.carry = Duration::ZERO;
        self.last_observed = None;
    }

    /// Replaces the limit as given. Range checks belong to the settings layer.
    pub fn update_daily_limit(&mut self, minutes: u32) {
        info!(
            "daily limit changed {}min -> {}min",
            self.daily_limit_minutes, minutes
        );
        self.daily_limit_minutes = minutes;
    }

    /// Advance the clock for one tick.
    ///
    /// The day-rollover check always runs first. A rollover zeroes the
    /// counter and the tick then credits one nominal period, so the first
    /// tick of a new day reads 1 second. Otherwise an active tick credits
    /// the monotonic time since the previous counted tick.
    pub fn on_tick(&mut self, now: ClockReading) -> TickOutcome {
        let rolled_over = now.day != self.last_active_day;
        if rolled_over {
            info!(
                "day rollover {} -> {}, clearing {}s",
                self.last_active_day, now.day, self.elapsed_seconds
            );
            self.reset_daily();
            self.last_active_day = now.day;
        }

        if self.state == ClockState::Paused {
            return TickOutcome {
                rolled_over,
                seconds_added: 0,
            };
        }

        // reset_daily() drops the anchor, so a rollover always lands on NOMINAL_TICK
        let delta = match self.last_observed {
            Some(prev) => now.monotonic.saturating_sub(prev),
            None => NOMINAL_TICK,
        };
        self.last_observed = Some(now.monotonic);

        self.carry += delta;
        let whole = self.carry.as_secs();
        self.carry -= Duration::from_secs(whole);
        self.elapsed_seconds += whole;

        if whole > 1 {
            debug!("tick credited {whole}s (late or coalesced tick)");
        }

        TickOutcome {
            rolled_over,
            seconds_added: whole,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn at(secs: u64, d: u32) -> ClockReading {
        ClockReading::new(Duration::from_secs(secs), day(d))
    }

    /// Ticks once per second starting after `from`, returning the last offset
    fn tick_n(clock: &mut SessionClock, from: u64, n: u64, d: u32) -> u64 {
        for i in 1..=n {
            clock.on_tick(at(from + i, d));
        }
        from + n
    }

    #[test]
    fn test_new_clock() {
        let clock = SessionClock::new(30, ClockState::Active, day(15));

        assert_eq!(clock.elapsed_seconds(), 0);
        assert_eq!(clock.daily_limit_minutes(), 30);
        assert!(clock.is_active());
        assert_eq!(clock.last_active_day(), day(15));
    }

    #[test]
    fn test_paused_initial_state() {
        let mut clock = SessionClock::new(30, ClockState::Paused, day(15));
        assert!(!clock.is_active());

        tick_n(&mut clock, 0, 5, 15);
        assert_eq!(clock.elapsed_seconds(), 0);
    }

    #[test]
    fn test_n_ticks_count_n_seconds() {
        for n in [1, 2, 59, 60, 61, 1800] {
            let mut clock = SessionClock::new(30, ClockState::Active, day(15));
            tick_n(&mut clock, 0, n, 15);
            assert_eq!(clock.elapsed_seconds(), n, "after {n} ticks");
        }
    }

    #[test]
    fn test_pause_freezes_counter_and_start_resumes() {
        let mut clock = SessionClock::new(30, ClockState::Active, day(15));
        let t = tick_n(&mut clock, 0, 10, 15);

        clock.pause_session();
        let t = tick_n(&mut clock, t, 100, 15);
        assert_eq!(clock.elapsed_seconds(), 10);
        assert_eq!(clock.state(), ClockState::Paused);

        clock.start_session();
        tick_n(&mut clock, t, 3, 15);
        assert_eq!(clock.elapsed_seconds(), 13);
    }

    #[test]
    fn test_paused_gap_is_not_counted_after_resume() {
        let mut clock = SessionClock::new(30, ClockState::Active, day(15));
        tick_n(&mut clock, 0, 5, 15);

        clock.pause_session();
        clock.start_session();
        // an hour later the first tick only credits one period
        clock.on_tick(at(3605, 15));
        assert_eq!(clock.elapsed_seconds(), 6);
    }

    #[test]
    fn test_start_and_pause_are_idempotent() {
        let mut clock = SessionClock::new(30, ClockState::Active, day(15));
        clock.start_session();
        clock.start_session();
        assert!(clock.is_active());

        clock.pause_session();
        clock.pause_session();
        assert!(!clock.is_active());
    }

    #[test]
    fn test_reset_daily() {
        let mut clock = SessionClock::new(30, ClockState::Active, day(15));
        tick_n(&mut clock, 0, 42, 15);

        clock.reset_daily();
        assert_eq!(clock.elapsed_seconds(), 0);
        clock.reset_daily();
        assert_eq!(clock.elapsed_seconds(), 0);
        assert!(clock.is_active());
    }

    #[test]
    fn test_update_daily_limit_does_not_validate() {
        let mut clock = SessionClock::new(30, ClockState::Active, day(15));
        clock.update_daily_limit(0);
        assert_eq!(clock.daily_limit_minutes(), 0);
        clock.update_daily_limit(10);
        assert_eq!(clock.daily_limit_minutes(), 10);
    }

    #[test]
    fn test_late_tick_credits_real_time() {
        let mut clock = SessionClock::new(30, ClockState::Active, day(15));
        clock.on_tick(at(1, 15));
        let outcome = clock.on_tick(at(5, 15));

        assert_eq!(outcome.seconds_added, 4);
        assert_eq!(clock.elapsed_seconds(), 5);
    }

    #[test]
    fn test_sub_second_ticks_accumulate() {
        let mut clock = SessionClock::new(30, ClockState::Active, day(15));
        clock.on_tick(at(1, 15));
        for i in 1..=4 {
            clock.on_tick(ClockReading::new(
                Duration::from_secs(1) + Duration::from_millis(250 * i),
                day(15),
            ));
        }
        assert_eq!(clock.elapsed_seconds(), 2);
    }

    #[test]
    fn test_day_rollover_resets_before_increment() {
        let mut clock = SessionClock::new(30, ClockState::Active, day(15));
        let t = tick_n(&mut clock, 0, 500, 15);

        let outcome = clock.on_tick(at(t + 1, 16));
        assert!(outcome.rolled_over);
        assert_eq!(clock.elapsed_seconds(), 1);
        assert_eq!(clock.last_active_day(), day(16));

        tick_n(&mut clock, t + 1, 2, 16);
        assert_eq!(clock.elapsed_seconds(), 3);
    }

    #[test]
    fn test_day_rollover_while_paused() {
        let mut clock = SessionClock::new(30, ClockState::Active, day(15));
        let t = tick_n(&mut clock, 0, 20, 15);
        clock.pause_session();

        let outcome = clock.on_tick(at(t + 1, 16));
        assert_eq!(
            outcome,
            TickOutcome {
                rolled_over: true,
                seconds_added: 0
            }
        );
        assert_eq!(clock.elapsed_seconds(), 0);
        assert_eq!(clock.last_active_day(), day(16));
    }

    #[test]
    fn test_long_gap_across_midnight_credits_one_period() {
        let mut clock = SessionClock::new(30, ClockState::Active, day(15));
        clock.on_tick(at(1, 15));

        clock.on_tick(at(8 * 3600, 16));
        assert_eq!(clock.elapsed_seconds(), 1);
    }

    #[test]
    fn test_clock_state_display() {
        assert_eq!(ClockState::Active.to_string(), "Active");
        assert_eq!(ClockState::Paused.to_string(), "Paused");
    }
}
