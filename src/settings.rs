//! Game settings and preferences
//!
//! Persisted separately from the economy profile in the key-value store.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore, StoreError};

/// Quality preset levels, cheapest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub const ALL: [QualityPreset; 3] = [QualityPreset::Low, QualityPreset::Medium, QualityPreset::High];

    /// Same name the preset is stored under
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "low",
            QualityPreset::Medium => "medium",
            QualityPreset::High => "high",
        }
    }

    /// Case-insensitive lookup by stored name
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 120,
            QualityPreset::Medium => 400,
            QualityPreset::High => 900,
        }
    }

    /// Maximum live enemies; further spawns wait in the queue
    pub fn max_enemies(&self) -> usize {
        match self {
            QualityPreset::Low => 28,
            QualityPreset::Medium => 48,
            QualityPreset::High => 96,
        }
    }

    /// One step cheaper, or `None` at the bottom
    pub fn downgrade(&self) -> Option<Self> {
        match self {
            QualityPreset::Low => None,
            QualityPreset::Medium => Some(QualityPreset::Low),
            QualityPreset::High => Some(QualityPreset::Medium),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Step quality down when frames run slow
    pub auto_quality: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            auto_quality: true,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Storage key
    const STORAGE_KEY: &'static str = "star_draft_settings";

    /// Load settings, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match persistence::load_json(store, Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        persistence::save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
