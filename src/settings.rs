//! Game settings and preferences
//!
//! Persisted separately from the high score under `dino_settings`.

use serde::{Deserialize, Serialize};

/// Storage key for the settings JSON
pub const STORAGE_KEY: &str = "dino_settings";

/// Game settings/preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Sound effects on
    pub sound_on: bool,
    /// Background music drone on
    pub bgm_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_on: true,
            bgm_enabled: false,
        }
    }
}

impl Settings {
    /// Parse stored JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Return a copy with `patch` applied
    pub fn patched(mut self, patch: &SettingsPatch) -> Self {
        patch.apply(&mut self);
        self
    }
}

/// Partial settings update; `None` fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgm_enabled: Option<bool>,
}

impl SettingsPatch {
    pub fn sound(on: bool) -> Self {
        Self {
            sound_on: Some(on),
            ..Default::default()
        }
    }

    pub fn bgm(enabled: bool) -> Self {
        Self {
            bgm_enabled: Some(enabled),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sound_on.is_none() && self.bgm_enabled.is_none()
    }

    pub fn apply(&self, settings: &mut Settings) {
        if let Some(on) = self.sound_on {
            settings.sound_on = on;
        }
        if let Some(enabled) = self.bgm_enabled {
            settings.bgm_enabled = enabled;
        }
    }
}
