use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::limit_monitor::DEFAULT_NEAR_LIMIT_PERCENT;

/// Daily limits the settings panel offers
pub const LIMIT_RANGE_MINUTES: RangeInclusive<u32> = 5..=120;
pub const LIMIT_STEP_MINUTES: u32 = 5;
pub const DEFAULT_LIMIT_MINUTES: u32 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("daily limit of {minutes}min is outside 5..=120 minutes")]
    LimitOutOfRange { minutes: u32 },
    #[error("near-limit warning at {percent}% is outside 1..=99")]
    NearLimitOutOfRange { percent: u8 },
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config encoding: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub daily_limit_minutes: u32,
    pub start_paused: bool,
    pub time_warnings: bool,
    pub auto_logout: bool,
    pub near_limit_percent: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daily_limit_minutes: DEFAULT_LIMIT_MINUTES,
            start_paused: false,
            time_warnings: true,
            auto_logout: false,
            near_limit_percent: DEFAULT_NEAR_LIMIT_PERCENT,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_limit(self.daily_limit_minutes)?;
        if !(1..=99).contains(&self.near_limit_percent) {
            return Err(ConfigError::NearLimitOutOfRange {
                percent: self.near_limit_percent,
            });
        }
        Ok(())
    }
}

pub fn validate_limit(minutes: u32) -> Result<u32, ConfigError> {
    if LIMIT_RANGE_MINUTES.contains(&minutes) {
        Ok(minutes)
    } else {
        Err(ConfigError::LimitOutOfRange { minutes })
    }
}

/// Move `minutes` by `steps` slider notches, staying on the 5 minute grid
pub fn step_limit(minutes: u32, steps: i32) -> u32 {
    let snapped = minutes / LIMIT_STEP_MINUTES * LIMIT_STEP_MINUTES;
    let moved = i64::from(snapped) + i64::from(steps) * i64::from(LIMIT_STEP_MINUTES);
    let lo = i64::from(*LIMIT_RANGE_MINUTES.start());
    let hi = i64::from(*LIMIT_RANGE_MINUTES.end());
    // clamped into a u32 range, so the cast is lossless
    moved.clamp(lo, hi) as u32
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "reflectis") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("reflectis_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing, unreadable or invalid files fall back to defaults
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => match cfg.validate() {
                Ok(()) => cfg,
                Err(e) => {
                    log::warn!("ignoring {}: {e}", self.path.display());
                    Config::default()
                }
            },
            Err(e) => {
                log::warn!("unreadable config {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        cfg.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        log::info!("saved config to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            daily_limit_minutes: 45,
            start_paused: true,
            time_warnings: false,
            auto_logout: true,
            near_limit_percent: 90,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn out_of_range_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"daily_limit_minutes": 0}"#).unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"daily_limit_minutes": 60}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.daily_limit_minutes, 60);
        assert!(cfg.time_warnings);
    }

    #[test]
    fn save_rejects_invalid_limit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            daily_limit_minutes: 500,
            ..Config::default()
        };
        assert_matches!(
            store.save(&cfg),
            Err(ConfigError::LimitOutOfRange { minutes: 500 })
        );
        assert!(!path.exists());
    }

    #[test]
    fn validate_bounds() {
        assert_eq!(validate_limit(5).unwrap(), 5);
        assert_eq!(validate_limit(120).unwrap(), 120);
        assert_matches!(validate_limit(4), Err(ConfigError::LimitOutOfRange { minutes: 4 }));
        assert_matches!(validate_limit(121), Err(ConfigError::LimitOutOfRange { .. }));

        let cfg = Config {
            near_limit_percent: 100,
            ..Config::default()
        };
        assert_matches!(cfg.validate(), Err(ConfigError::NearLimitOutOfRange { percent: 100 }));
    }

    #[test]
    fn step_limit_stays_on_grid() {
        assert_eq!(step_limit(30, 1), 35);
        assert_eq!(step_limit(30, -1), 25);
        assert_eq!(step_limit(5, -1), 5);
        assert_eq!(step_limit(120, 1), 120);
        assert_eq!(step_limit(33, 1), 35);
        assert_eq!(step_limit(0, 0), 5);
        assert_eq!(step_limit(500, -1), 120);
    }

    #[test]
    fn error_messages() {
        let err = ConfigError::LimitOutOfRange { minutes: 200 };
        assert_eq!(err.to_string(), "daily limit of 200min is outside 5..=120 minutes");
    }
}
