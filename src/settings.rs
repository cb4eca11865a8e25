//! Game settings and preferences
//!
//! Persisted in LocalStorage. Only preferences live here; game state is never saved.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SPEED;
use crate::sim::GravityMode;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Obstacle speed in world units per tick
    pub speed: f32,
    /// Fixed RNG seed for reproducible runs (None = seed from the clock)
    pub seed: Option<u64>,
    /// Vertical motion per tick or scaled by frame time
    pub gravity: GravityMode,
    /// Demo mode - the game jumps by itself
    pub autopilot: bool,

    // === Visual Effects ===
    /// Neon halo around the player and obstacles
    pub glow: bool,

    // === Audio ===
    pub sound: bool,
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            seed: None,
            gravity: GravityMode::PerTick,
            autopilot: false,
            glow: true,
            sound: true,
            volume: 0.8,
        }
    }
}

impl Settings {
    /// Clamp out-of-range values loaded from storage
    pub fn sanitized(mut self) -> Self {
        self.speed = crate::sanitize_speed(self.speed);
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            Self::default().volume
        };
        self
    }

    /// Parse settings JSON, falling back to defaults for anything malformed
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                log::warn!("Ignoring malformed settings: {}", e);
                Self::default()
            }
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "byte_runner_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
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

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
