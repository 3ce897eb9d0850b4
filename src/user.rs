use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::limit_monitor::LimitMonitor;
use crate::session_clock::ClockState;
use crate::tracker::TimeTracker;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub joined_at: NaiveDate,
    pub communities: Vec<String>,
    /// Minutes per day; 0 means "use the configured default"
    pub daily_time_limit: u32,
}

impl UserProfile {
    /// Built-in profile used when no one logs in explicitly
    pub fn demo() -> Self {
        Self {
            id: "1".to_string(),
            name: "Ana Reflexiva".to_string(),
            username: "ana_reflete".to_string(),
            email: "ana@reflectis.com".to_string(),
            joined_at: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default(),
            communities: vec![
                "Minimalismo Digital".to_string(),
                "Saúde Mental e Redes".to_string(),
            ],
            daily_time_limit: 30,
        }
    }
}

/// Partial profile update; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub communities: Option<Vec<String>>,
    pub daily_time_limit: Option<u32>,
}

impl UserUpdate {
    pub fn daily_time_limit(minutes: u32) -> Self {
        Self {
            daily_time_limit: Some(minutes),
            ..Self::default()
        }
    }
}

struct LoggedIn {
    profile: UserProfile,
    tracker: TimeTracker,
}

/// Who is logged in, and the tracker that lives exactly as long as they are
#[derive(Default)]
pub struct UserSession {
    current: Option<LoggedIn>,
}

/// Tracker settings applied at login
#[derive(Debug, Clone, Copy)]
pub struct TrackerSettings {
    pub default_limit_minutes: u32,
    pub initial_state: ClockState,
    pub near_limit_percent: u8,
}

impl UserSession {
    pub fn logged_out() -> Self {
        Self { current: None }
    }

    pub fn login<C: Clock>(
        profile: UserProfile,
        settings: TrackerSettings,
        source: C,
        monitor: LimitMonitor,
    ) -> Self {
        let mut session = Self::logged_out();
        session.log_in(profile, settings, source, monitor);
        session
    }

    /// Replaces any previous user; their tracker is dropped first.
    pub fn log_in<C: Clock>(
        &mut self,
        profile: UserProfile,
        settings: TrackerSettings,
        source: C,
        monitor: LimitMonitor,
    ) {
        self.logout();
        let limit = if profile.daily_time_limit == 0 {
            settings.default_limit_minutes
        } else {
            profile.daily_time_limit
        };
        info!("{} logged in with a {limit}min daily limit", profile.username);
        let tracker = TimeTracker::new(
            limit,
            settings.initial_state,
            source,
            monitor.with_near_percent(settings.near_limit_percent),
        );
        self.current = Some(LoggedIn { profile, tracker });
    }

    /// Drops the profile and its tracker, which stops all counting.
    pub fn logout(&mut self) {
        if let Some(previous) = self.current.take() {
            info!(
                "{} logged out after {}s",
                previous.profile.username,
                previous.tracker.elapsed_seconds()
            );
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.current.as_ref().map(|c| &c.profile)
    }

    pub fn tracker(&self) -> Option<&TimeTracker> {
        self.current.as_ref().map(|c| &c.tracker)
    }

    pub fn tracker_mut(&mut self) -> Option<&mut TimeTracker> {
        self.current.as_mut().map(|c| &mut c.tracker)
    }

    /// Merge `update` into the profile. A new daily limit also goes to the
    /// tracker. Does nothing when logged out.
    pub fn update_user(&mut self, update: UserUpdate) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        let profile = &mut current.profile;

        if let Some(name) = update.name {
            profile.name = name;
        }
        if let Some(username) = update.username {
            profile.username = username;
        }
        if let Some(email) = update.email {
            profile.email = email;
        }
        if let Some(communities) = update.communities {
            profile.communities = communities;
        }
        if let Some(minutes) = update.daily_time_limit {
            profile.daily_time_limit = minutes;
            current.tracker.update_daily_limit(minutes);
        }
    }
}

impl std::fmt::Debug for UserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSession")
            .field("user", &self.user())
            .field("tracker", &self.tracker())
            .finish()
    }
}
