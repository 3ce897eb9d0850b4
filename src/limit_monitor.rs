use chrono::NaiveDate;
use log::info;

use crate::session_clock::SessionClock;

/// Usage above this share of the limit is shown as a warning
pub const DEFAULT_NEAR_LIMIT_PERCENT: u8 = 80;

/// True once the whole minutes used reach the daily limit
pub fn is_limit_reached(elapsed_seconds: u64, daily_limit_minutes: u32) -> bool {
    elapsed_seconds / 60 >= u64::from(daily_limit_minutes)
}

/// Whole minutes used as a percentage of the limit, uncapped.
///
/// A zero limit counts as fully used.
pub fn progress_percent(elapsed_seconds: u64, daily_limit_minutes: u32) -> u64 {
    if daily_limit_minutes == 0 {
        return 100;
    }
    (elapsed_seconds / 60) * 100 / u64::from(daily_limit_minutes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum UsageLevel {
    Normal,
    NearLimit,
    Reached,
}

pub fn usage_level(elapsed_seconds: u64, daily_limit_minutes: u32, near_percent: u8) -> UsageLevel {
    if is_limit_reached(elapsed_seconds, daily_limit_minutes) {
        UsageLevel::Reached
    } else if progress_percent(elapsed_seconds, daily_limit_minutes) > u64::from(near_percent) {
        UsageLevel::NearLimit
    } else {
        UsageLevel::Normal
    }
}

/// Passed to the callback when the limit is crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitReached {
    pub elapsed_seconds: u64,
    pub daily_limit_minutes: u32,
    pub day: NaiveDate,
}

pub type LimitCallback = Box<dyn FnMut(&LimitReached) + Send>;

/// Watches a [`SessionClock`] and reports each false -> true crossing once.
pub struct LimitMonitor {
    on_limit_reached: Option<LimitCallback>,
    was_reached: bool,
    near_percent: u8,
}

impl LimitMonitor {
    pub fn new(on_limit_reached: Option<LimitCallback>) -> Self {
        Self {
            on_limit_reached,
            was_reached: false,
            near_percent: DEFAULT_NEAR_LIMIT_PERCENT,
        }
    }

    pub fn with_callback<F>(callback: F) -> Self
    where
        F: FnMut(&LimitReached) + Send + 'static,
    {
        Self::new(Some(Box::new(callback)))
    }

    pub fn with_near_percent(mut self, near_percent: u8) -> Self {
        self.near_percent = near_percent;
        self
    }

    pub fn near_percent(&self) -> u8 {
        self.near_percent
    }

    pub fn is_limit_reached(&self, clock: &SessionClock) -> bool {
        is_limit_reached(clock.elapsed_seconds(), clock.daily_limit_minutes())
    }

    pub fn usage_level(&self, clock: &SessionClock) -> UsageLevel {
        usage_level(
            clock.elapsed_seconds(),
            clock.daily_limit_minutes(),
            self.near_percent,
        )
    }

    /// Re-evaluate after the clock changed.
    ///
    /// Returns the event when this observation is the rising edge. The edge
    /// re-arms as soon as the condition is observed false again.
    pub fn observe(&mut self, clock: &SessionClock) -> Option<LimitReached> {
        let reached = self.is_limit_reached(clock);
        let crossed = reached && !self.was_reached;
        self.was_reached = reached;

        if !crossed {
            return None;
        }

        let event = LimitReached {
            elapsed_seconds: clock.elapsed_seconds(),
            daily_limit_minutes: clock.daily_limit_minutes(),
            day: clock.last_active_day(),
        };
        info!(
            "daily limit of {}min reached at {}s",
            event.daily_limit_minutes, event.elapsed_seconds
        );
        if let Some(callback) = self.on_limit_reached.as_mut() {
            callback(&event);
        }
        Some(event)
    }
}

impl std::fmt::Debug for LimitMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitMonitor")
            .field("has_callback", &self.on_limit_reached.is_some())
            .field("was_reached", &self.was_reached)
            .field("near_percent", &self.near_percent)
            .finish()
    }
}

impl Default for LimitMonitor {
    fn default() -> Self {
        Self::new(None)
    }
}
