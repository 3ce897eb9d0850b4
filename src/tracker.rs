//! The single owner of a user's session clock.
//!
//! Widgets read a [`TrackerSnapshot`]; every mutation goes through
//! [`TimeTracker`] so the limit monitor sees each change.

use log::debug;

use crate::clock::Clock;
use crate::limit_monitor::{LimitMonitor, LimitReached, UsageLevel};
use crate::session_clock::{ClockState, SessionClock, TickOutcome};

/// Read-only view for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSnapshot {
    pub elapsed_seconds: u64,
    pub daily_limit_minutes: u32,
    pub is_active: bool,
    pub is_limit_reached: bool,
    pub usage_level: UsageLevel,
    pub progress_percent: u64,
}

impl TrackerSnapshot {
    pub fn minutes(&self) -> u64 {
        self.elapsed_seconds / 60
    }

    pub fn seconds(&self) -> u64 {
        self.elapsed_seconds % 60
    }
}

/// Result of one tick, as seen by the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    pub limit_reached: Option<LimitReached>,
}

pub struct TimeTracker {
    clock: SessionClock,
    monitor: LimitMonitor,
    source: Box<dyn Clock>,
}

impl TimeTracker {
    pub fn new<C: Clock>(
        daily_limit_minutes: u32,
        initial_state: ClockState,
        source: C,
        monitor: LimitMonitor,
    ) -> Self {
        let today = source.read().day;
        let mut tracker = Self {
            clock: SessionClock::new(daily_limit_minutes, initial_state, today),
            monitor,
            source: Box::new(source),
        };
        tracker.monitor.observe(&tracker.clock);
        tracker
    }

    pub fn start_session(&mut self) {
        self.clock.start_session();
    }

    pub fn pause_session(&mut self) {
        self.clock.pause_session();
    }

    pub fn toggle_session(&mut self) {
        match self.clock.state() {
            ClockState::Active => self.pause_session(),
            ClockState::Paused => self.start_session(),
        }
    }

    pub fn reset_daily(&mut self) -> Option<LimitReached> {
        debug!("daily counter reset at {}s", self.clock.elapsed_seconds());
        self.clock.reset_daily();
        self.monitor.observe(&self.clock)
    }

    /// Takes effect immediately: lowering the limit below the time already
    /// used reports the crossing without waiting for a tick.
    pub fn update_daily_limit(&mut self, minutes: u32) -> Option<LimitReached> {
        self.clock.update_daily_limit(minutes);
        self.monitor.observe(&self.clock)
    }

    pub fn on_tick(&mut self) -> TickReport {
        let outcome = self.clock.on_tick(self.source.read());
        let limit_reached = self.monitor.observe(&self.clock);
        TickReport {
            outcome,
            limit_reached,
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.clock.elapsed_seconds()
    }

    pub fn daily_limit_minutes(&self) -> u32 {
        self.clock.daily_limit_minutes()
    }

    pub fn is_active(&self) -> bool {
        self.clock.is_active()
    }

    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn is_limit_reached(&self) -> bool {
        self.monitor.is_limit_reached(&self.clock)
    }

    pub fn usage_level(&self) -> UsageLevel {
        self.monitor.usage_level(&self.clock)
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        let elapsed_seconds = self.clock.elapsed_seconds();
        let daily_limit_minutes = self.clock.daily_limit_minutes();
        TrackerSnapshot {
            elapsed_seconds,
            daily_limit_minutes,
            is_active: self.clock.is_active(),
            is_limit_reached: self.is_limit_reached(),
            usage_level: self.usage_level(),
            progress_percent: crate::limit_monitor::progress_percent(
                elapsed_seconds,
                daily_limit_minutes,
            ),
        }
    }
}

impl std::fmt::Debug for TimeTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeTracker")
            .field("clock", &self.clock)
            .field("monitor", &self.monitor)
            .finish_non_exhaustive()
    }
}
