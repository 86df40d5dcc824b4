//! Animation settings and preferences
//!
//! Persisted in LocalStorage on the web, read from a JSON file natively.

use serde::{Deserialize, Serialize};

use crate::consts::{CRASH_DURATION_MS, TICK_PERIOD_MS, TICK_STEP_PX};

/// Ticker speed presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedPreset {
    /// 4px per tick
    #[default]
    Cruise,
    /// 45px per tick
    Full,
}

impl SpeedPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreset::Cruise => "Cruise",
            SpeedPreset::Full => "Full",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cruise" | "slow" => Some(SpeedPreset::Cruise),
            "full" | "fast" => Some(SpeedPreset::Full),
            _ => None,
        }
    }

    /// Cycle to the other preset
    pub fn toggle(&self) -> Self {
        match self {
            SpeedPreset::Cruise => SpeedPreset::Full,
            SpeedPreset::Full => SpeedPreset::Cruise,
        }
    }

    /// Pixels moved per tick
    pub fn step_px(&self) -> f64 {
        match self {
            SpeedPreset::Cruise => TICK_STEP_PX,
            SpeedPreset::Full => 45.0,
        }
    }

    /// Tick period in milliseconds
    pub fn period_ms(&self) -> f64 {
        TICK_PERIOD_MS
    }
}

/// Animation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Speed preset the step/period were taken from
    pub preset: SpeedPreset,
    /// Pixels per tick
    pub step_px: f64,
    /// Milliseconds per tick
    pub period_ms: f64,
    /// Crash animation length used when no renderer reports it (headless)
    pub crash_duration_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(SpeedPreset::default())
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "titanic_anim_settings";

    /// Settings with the preset's step and period
    pub fn from_preset(preset: SpeedPreset) -> Self {
        Self {
            preset,
            step_px: preset.step_px(),
            period_ms: preset.period_ms(),
            crash_duration_ms: CRASH_DURATION_MS,
        }
    }

    /// Switch preset (overwrites step and period)
    pub fn apply_preset(&mut self, preset: SpeedPreset) {
        self.preset = preset;
        self.step_px = preset.step_px();
        self.period_ms = preset.period_ms();
    }

    /// Replace non-positive or non-finite values with the preset's
    pub fn validated(mut self) -> Self {
        if !(self.step_px.is_finite() && self.step_px > 0.0) {
            log::warn!("Invalid step {}px, using {}", self.step_px, self.preset.step_px());
            self.step_px = self.preset.step_px();
        }
        if !(self.period_ms.is_finite() && self.period_ms > 0.0) {
            log::warn!("Invalid period {}ms, using {}", self.period_ms, self.preset.period_ms());
            self.period_ms = self.preset.period_ms();
        }
        if !(self.crash_duration_ms.is_finite() && self.crash_duration_ms >= 0.0) {
            self.crash_duration_ms = CRASH_DURATION_MS;
        }
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::validated)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Cannot read {}: {e}", path.display());
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings in {}: {e}", path.display());
                Self::default()
            }
        }
    }
}
