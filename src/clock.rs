//! Time sources for the session clock.
//!
//! A reading pairs a monotonic offset (for measuring how much time passed
//! between ticks) with the local calendar day (for detecting day rollover).

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};

/// One observation of the wall clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    /// Offset from an arbitrary, fixed origin. Never goes backwards.
    pub monotonic: Duration,
    /// Local calendar date at the moment of the reading
    pub day: NaiveDate,
}

impl ClockReading {
    pub fn new(monotonic: Duration, day: NaiveDate) -> Self {
        Self { monotonic, day }
    }
}

/// Source of clock readings
pub trait Clock: Send + 'static {
    fn read(&self) -> ClockReading;
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn read(&self) -> ClockReading {
        (**self).read()
    }
}

/// Real clock: `Instant` for elapsed time, `chrono::Local` for the date
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn read(&self) -> ClockReading {
        ClockReading {
            monotonic: self.origin.elapsed(),
            day: Local::now().date_naive(),
        }
    }
}

/// Hand-driven clock for tests and headless runs.
///
/// Clones share the same underlying time, so a test can keep one handle
/// while the tracker owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ClockReading>>,
}

impl ManualClock {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ClockReading::new(Duration::ZERO, day))),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut reading = self.lock();
        reading.monotonic += by;
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// Move to another calendar day. Monotonic time is left untouched.
    pub fn set_day(&self, day: NaiveDate) {
        self.lock().day = day;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClockReading> {
        // a poisoned lock still holds a valid reading
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn read(&self) -> ClockReading {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.read();
        let b = clock.read();
        assert!(b.monotonic >= a.monotonic);
    }

    #[test]
    fn test_system_clock_reports_today() {
        let clock = SystemClock::default();
        assert_eq!(clock.read().day, Local::now().date_naive());
    }

    #[test]
    fn test_manual_clock_starts_at_zero() {
        let clock = ManualClock::new(day(15));
        assert_eq!(clock.read(), ClockReading::new(Duration::ZERO, day(15)));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(day(15));
        let handle = clock.clone();

        handle.advance_secs(3);
        handle.advance(Duration::from_millis(500));
        handle.set_day(day(16));

        let reading = clock.read();
        assert_eq!(reading.monotonic, Duration::from_millis(3500));
        assert_eq!(reading.day, day(16));
    }
}
