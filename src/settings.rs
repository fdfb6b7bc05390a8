//! User settings and preferences
//!
//! Persisted as JSON next to the game's other data. Missing fields keep their
//! defaults, so older files still load.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::persistence;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Controls ===
    /// Climb ladders with left/right instead of up/down
    pub alt_controls: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alt_controls: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Volume sound effects actually play at
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Load from a JSON file, using defaults if it is missing or broken
    pub fn load(path: &Path) -> Self {
        persistence::load_json_or_default(path, "settings")
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        persistence::save_json(path, self)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
