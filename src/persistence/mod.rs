//! Persistence for the best score and settings
//!
//! Two layers:
//! - `Storage`: a string key/value store (memory, JSON file, browser LocalStorage)
//! - `Persistence`: the collaborator the session talks to at run boundaries
//!
//! Read failures never propagate past `KvPersistence`; they are logged and
//! replaced with defaults.

mod memory;
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
mod local;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use std::fmt;

use crate::highscores::{self, HighScore};
use crate::settings::{self, Settings, SettingsPatch};

/// Error types for storage operations
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    /// Backend missing or refused the operation
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "IO error: {}", e),
            StorageError::Serialization(e) => write!(f, "Serialization error: {}", e),
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(e) => Some(e),
            StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err)
    }
}

/// String key/value store
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// Persistence collaborator used at run boundaries (never mid-frame)
pub trait Persistence {
    /// Stored best score, 0 when missing or unreadable
    fn load_high_score(&mut self) -> u32;
    fn save_high_score(&mut self, score: u32);
    /// Stored settings, defaults when missing or unreadable
    fn load_settings(&mut self) -> Settings;
    /// Merge `patch` into the stored settings and return the result
    fn save_settings(&mut self, patch: &SettingsPatch) -> Settings;
}

/// `Persistence` over any `Storage`, with default fallbacks
#[derive(Debug, Default)]
pub struct KvPersistence<S: Storage> {
    storage: S,
}

impl<S: Storage> KvPersistence<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn try_load_settings(&self) -> Result<Option<Settings>, StorageError> {
        match self.storage.get_item(settings::STORAGE_KEY)? {
            Some(json) => Ok(Some(Settings::from_json(&json)?)),
            None => Ok(None),
        }
    }

    fn try_save_settings(&mut self, settings: &Settings) -> Result<(), StorageError> {
        let json = settings.to_json()?;
        self.storage.set_item(settings::STORAGE_KEY, &json)
    }
}

impl<S: Storage> Persistence for KvPersistence<S> {
    fn load_high_score(&mut self) -> u32 {
        match self.storage.get_item(highscores::STORAGE_KEY) {
            Ok(Some(raw)) => match HighScore::parse(&raw) {
                Some(high) => high.best,
                None => {
                    log::warn!("Ignoring corrupt high score {:?}", raw);
                    0
                }
            },
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Failed to read high score: {}", e);
                0
            }
        }
    }

    fn save_high_score(&mut self, score: u32) {
        let value = HighScore::new(score).to_storage();
        match self.storage.set_item(highscores::STORAGE_KEY, &value) {
            Ok(()) => log::info!("High score saved ({})", score),
            Err(e) => log::warn!("Failed to save high score: {}", e),
        }
    }

    fn load_settings(&mut self) -> Settings {
        match self.try_load_settings() {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => Settings::default(),
            Err(e) => {
                log::warn!("Failed to read settings, using defaults: {}", e);
                Settings::default()
            }
        }
    }

    fn save_settings(&mut self, patch: &SettingsPatch) -> Settings {
        let merged = self.load_settings().patched(patch);
        match self.try_save_settings(&merged) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
        merged
    }
}
