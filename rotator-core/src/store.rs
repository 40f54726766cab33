//! Persistence for the user's channels, interstitials, pinned items and preferences.
//!
//! Each entity lives in its own JSON file so a corrupt record only loses
//! itself. Writes are refused until [`StateStore::load`] has run, which keeps
//! startup defaults from overwriting what is on disk.

use crate::error::{CoreError, Result};
use crate::model::{Channel, ContentItem};
use crate::preferences::{Preferences, PreferencesRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "rotator::store";

pub const CHANNELS_FILE_NAME: &str = "channels.json";
pub const INTERSTITIALS_FILE_NAME: &str = "interstitials.json";
pub const MANUAL_QUEUE_FILE_NAME: &str = "manual_queue.json";
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Everything restored at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub channels: Vec<Channel>,
    pub interstitials: Vec<String>,
    /// Most recently pinned first
    pub manual_queue: Vec<ContentItem>,
    pub preferences: Preferences,
}

/// JSON-file backed state store rooted at one directory.
#[derive(Debug)]
pub struct StateStore {
    dir: PathBuf,
    hydrated: bool,
}

impl StateStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            hydrated: false,
        }
    }

    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Read every record. Missing or malformed records fall back to defaults.
    pub fn load(&mut self) -> PersistedState {
        let record: PreferencesRecord = self.read_record(PREFERENCES_FILE_NAME);
        let state = PersistedState {
            channels: self.read_record(CHANNELS_FILE_NAME),
            interstitials: self.read_record(INTERSTITIALS_FILE_NAME),
            manual_queue: self.read_record(MANUAL_QUEUE_FILE_NAME),
            preferences: Preferences::from_record(record),
        };
        self.hydrated = true;

        info!(
            target: LOG_TARGET,
            "Loaded state from {:?}: {} channels, {} interstitials, {} pinned items",
            self.dir,
            state.channels.len(),
            state.interstitials.len(),
            state.manual_queue.len()
        );
        state
    }

    /// # Errors
    ///
    /// Returns an error if the store is not loaded yet or the write fails.
    pub fn save_channels(&self, channels: &[Channel]) -> Result<()> {
        self.write_record(CHANNELS_FILE_NAME, channels)
    }

    /// # Errors
    ///
    /// Returns an error if the store is not loaded yet or the write fails.
    pub fn save_interstitials(&self, interstitials: &[String]) -> Result<()> {
        self.write_record(INTERSTITIALS_FILE_NAME, interstitials)
    }

    /// # Errors
    ///
    /// Returns an error if the store is not loaded yet or the write fails.
    pub fn save_manual_queue(&self, items: &[ContentItem]) -> Result<()> {
        self.write_record(MANUAL_QUEUE_FILE_NAME, items)
    }

    /// # Errors
    ///
    /// Returns an error if the store is not loaded yet or the write fails.
    pub fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        self.write_record(PREFERENCES_FILE_NAME, &preferences.to_record())
    }

    fn read_record<T: DeserializeOwned + Default>(&self, file_name: &str) -> T {
        let path = self.dir.join(file_name);
        if !path.exists() {
            debug!(target: LOG_TARGET, "No stored {}, using defaults", file_name);
            return T::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(value) => value,
                Err(e) => {
                    warn!(target: LOG_TARGET, "Failed to parse {:?}, using defaults: {}", path, e);
                    T::default()
                }
            },
            Err(e) => {
                warn!(target: LOG_TARGET, "Failed to read {:?}, using defaults: {}", path, e);
                T::default()
            }
        }
    }

    fn write_record<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> Result<()> {
        if !self.hydrated {
            return Err(CoreError::StoreNotHydrated);
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        let content = serde_json::to_string_pretty(value)?;
        fs::write(&path, content)?;
        debug!(target: LOG_TARGET, "Saved {:?}", path);
        Ok(())
    }
}
