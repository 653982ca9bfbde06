//! Display configuration and user preferences
//!
//! `DisplayConfig` is created once at startup and handed to constructors;
//! nothing reads screen dimensions from global state.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::audio::{AudioSink, SoundBank};

/// Runtime display resolution and frame rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub width: f32,
    pub height: f32,
    pub fps: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1078.0,
            height: 768.0,
            fps: crate::consts::FPS,
        }
    }
}

impl DisplayConfig {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Side of a key pickup box
    pub fn key_size(&self) -> f32 {
        (self.width * 0.043).trunc()
    }

    /// Player hitbox (width, height)
    pub fn player_size(&self) -> (f32, f32) {
        ((self.width * 0.0225).trunc(), (self.height * 0.03).trunc())
    }

    /// Horizontal run speed (pixels per frame)
    pub fn run_speed(&self) -> f32 {
        self.width * 0.0075
    }

    /// Initial vertical velocity of a jump (pixels per frame, negative is up)
    pub fn jump_velocity(&self) -> f32 {
        self.height * -0.0292
    }

    /// Gravity (pixels per frame, per frame)
    pub fn gravity(&self) -> f32 {
        self.height * 0.00133
    }

    /// Terminal fall speed (pixels per frame)
    pub fn max_fall_speed(&self) -> f32 {
        self.height * 0.026
    }
}

/// User preferences, persisted as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub display: DisplayConfig,
    /// Global sound toggle
    pub sound_on: bool,
    /// Per-sound volume (0.0 - 1.0)
    pub volumes: BTreeMap<String, f32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            sound_on: true,
            volumes: SoundBank::default()
                .entries()
                .iter()
                .map(|e| (e.name.to_string(), e.volume))
                .collect(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::info!("Using default settings ({e:#})");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing settings {}", path.display()))?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Push volumes and the mute state to an audio sink
    pub fn apply(&self, sink: &mut dyn AudioSink) {
        for (name, level) in &self.volumes {
            sink.set_volume(name, level.clamp(0.0, 1.0));
        }
        if !self.sound_on {
            sink.toggle_mute();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_sizes() {
        let display = DisplayConfig::default();
        assert_eq!(display.key_size(), 46.0);
        assert_eq!(display.player_size(), (24.0, 23.0));
        assert!(display.jump_velocity() < 0.0);
        assert!(display.gravity() > 0.0);
    }

    #[test]
    fn test_default_volumes_cover_bank() {
        let settings = Settings::default();
        assert_eq!(settings.volumes.get("jump"), Some(&0.05));
        assert_eq!(settings.volumes.get("pi"), Some(&0.1));
        assert_eq!(settings.volumes.len(), SoundBank::default().entries().len());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "sound_on": false }"#).unwrap();
        assert!(!settings.sound_on);
        assert_eq!(settings.display, DisplayConfig::default());
    }
}
