//! Physics tuning constants
//!
//! Every number that shapes how the player and platforms move. Units are tiles
//! and seconds. Missing fields in a tuning file keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::persistence;

/// Movement tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Running ===
    /// Top horizontal speed while walking
    pub xv_max: f32,
    pub x_accel: f32,
    pub x_decel: f32,
    /// Multiplier on horizontal acceleration while airborne
    pub air_control: f32,
    /// Multiplier on horizontal acceleration and deceleration on ice
    pub ice_friction: f32,

    // === Jumping and falling ===
    /// Terminal fall speed
    pub yv_max: f32,
    pub jump_v: f32,
    pub grav: f32,
    /// Vertical velocity multiplier when jump is released early
    pub shorthop_factor: f32,
    /// Grace period after leaving the ground during which a jump still works
    pub coyote_millis: u32,

    // === Dashing ===
    pub dash_xv_max: f32,
    pub dash_x_accel: f32,
    pub dash_air_control: f32,

    // === Wall-kicks ===
    pub wallkick_xv: f32,
    pub wallkick_yv: f32,
    /// Horizontal control is locked for this long after a kick
    pub wallkick_lock_millis: u32,

    // === Ladders ===
    pub climb_yv_max: f32,
    pub climb_ya: f32,
    /// Horizontal kick when running off the top of a ladder
    pub climb_dismount_xv: f32,

    // === Platforms ===
    pub platform_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            // Running
            xv_max: 12.54,
            x_accel: 60.0,
            x_decel: 60.0,
            air_control: 0.4,
            ice_friction: 0.2,

            // Jumping
            yv_max: 20.0,
            jump_v: 16.5,
            grav: 60.0,
            shorthop_factor: 0.4,
            coyote_millis: 75,

            // Dashing
            dash_xv_max: 20.0,
            dash_x_accel: 120.0,
            dash_air_control: 0.2,

            // Wall-kicks
            wallkick_xv: 9.5,
            wallkick_yv: 16.0,
            wallkick_lock_millis: 200,

            // Ladders
            climb_yv_max: 10.0,
            climb_ya: 180.0,
            climb_dismount_xv: 6.0,

            platform_speed: 2.0,
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file, using defaults if it is missing or broken
    pub fn load(path: &Path) -> Self {
        persistence::load_json_or_default(path, "tuning")
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        persistence::save_json(path, self)
    }

    /// Coyote window in seconds
    pub fn coyote_time(&self) -> f32 {
        self.coyote_millis as f32 / 1000.0
    }

    /// Wall-kick control lock in seconds
    pub fn wallkick_lock(&self) -> f32 {
        self.wallkick_lock_millis as f32 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "jump_v": 20.0, "coyote_millis": 100 }"#).unwrap();
        assert_eq!(tuning.jump_v, 20.0);
        assert_eq!(tuning.coyote_time(), 0.1);
        assert_eq!(tuning.xv_max, Tuning::default().xv_max);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(Tuning::from_json("[1, 2"), Err(ConfigError::Json(_))));
    }
}
