//! Settings storage and polling configuration

use crate::errors::{FanCtrlError, Result};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Seconds between fan speed checks
pub const REFRESH_SECONDS_KEY: &str = "refresh-seconds";

pub const REFRESH_SECONDS_DEFAULT: i64 = 5;
pub const REFRESH_SECONDS_MIN: i64 = 1;
pub const REFRESH_SECONDS_MAX: i64 = 600;

/// Key-value store of integer settings
pub trait SettingsStore {
    fn get_int(&self, key: &str) -> Result<i64>;
    fn set_int(&self, key: &str, value: i64) -> Result<()>;
}

fn default_for(key: &str) -> Result<i64> {
    match key {
        REFRESH_SECONDS_KEY => Ok(REFRESH_SECONDS_DEFAULT),
        _ => Err(FanCtrlError::Settings(format!("unknown key: {}", key))),
    }
}

/// Reject values the preferences UI would not allow
pub fn validate(key: &str, value: i64) -> Result<()> {
    default_for(key)?;
    if key == REFRESH_SECONDS_KEY
        && !(REFRESH_SECONDS_MIN..=REFRESH_SECONDS_MAX).contains(&value)
    {
        return Err(FanCtrlError::Settings(format!(
            "{} must be between {} and {}, got {}",
            key, REFRESH_SECONDS_MIN, REFRESH_SECONDS_MAX, value
        )));
    }
    Ok(())
}

/// Polling cadence derived from settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval_secs: u32,
}

impl PollConfig {
    /// Clamp a raw setting into the supported range
    pub fn from_setting(value: i64) -> Self {
        let clamped = value.clamp(REFRESH_SECONDS_MIN, REFRESH_SECONDS_MAX);
        if clamped != value {
            warn!(
                "{} = {} out of range, using {}",
                REFRESH_SECONDS_KEY, value, clamped
            );
        }
        Self {
            interval_secs: clamped as u32,
        }
    }

    /// Read the configured interval
    pub fn load(settings: &dyn SettingsStore) -> Result<Self> {
        settings.get_int(REFRESH_SECONDS_KEY).map(Self::from_setting)
    }

    /// Like [`PollConfig::load`], falling back to the default on error
    pub fn load_or_default(settings: &dyn SettingsStore) -> Self {
        Self::load(settings).unwrap_or_else(|e| {
            error!("Failed to read {}: {}", REFRESH_SECONDS_KEY, e);
            Self::from_setting(REFRESH_SECONDS_DEFAULT)
        })
    }
}

/// On-disk layout: a flat JSON object of integer values
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct SettingsFile {
    values: BTreeMap<String, i64>,
}

/// Settings persisted as a flat JSON object.
///
/// Every read goes to disk, so changes written by another process are
/// picked up on the next poll.
pub struct JsonSettings {
    path: PathBuf,
}

impl JsonSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `$HOME/.config/fanctrl-indicator/settings.json`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home)
            .join(".config")
            .join("fanctrl-indicator")
            .join("settings.json")
    }

    fn load(&self) -> Result<SettingsFile> {
        if !self.path.exists() {
            return Ok(SettingsFile::default());
        }
        let json = fs::read_to_string(&self.path)?;
        let file = serde_json::from_str(&json)?;
        Ok(file)
    }

    fn save(&self, file: &SettingsFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create settings directory: {}", e);
                FanCtrlError::Io(e)
            })?;
        }

        // Write a temporary file first, then rename for an atomic update
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(file)?)?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            error!("Failed to rename temp settings file: {}", e);
            let _ = fs::remove_file(&temp_path);
            FanCtrlError::Io(e)
        })?;

        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

impl SettingsStore for JsonSettings {
    fn get_int(&self, key: &str) -> Result<i64> {
        let default = default_for(key)?;
        Ok(self.load()?.values.get(key).copied().unwrap_or(default))
    }

    fn set_int(&self, key: &str, value: i64) -> Result<()> {
        validate(key, value)?;
        let mut file = self.load()?;
        file.values.insert(key.to_string(), value);
        self.save(&file)?;
        info!("Set {} = {}", key, value);
        Ok(())
    }
}

/// Non-persistent settings
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RefCell<BTreeMap<String, i64>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_refresh_seconds(value: i64) -> Self {
        let settings = Self::new();
        settings
            .values
            .borrow_mut()
            .insert(REFRESH_SECONDS_KEY.to_string(), value);
        settings
    }
}

impl SettingsStore for MemorySettings {
    fn get_int(&self, key: &str) -> Result<i64> {
        let default = default_for(key)?;
        Ok(self.values.borrow().get(key).copied().unwrap_or(default))
    }

    fn set_int(&self, key: &str, value: i64) -> Result<()> {
        validate(key, value)?;
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}
