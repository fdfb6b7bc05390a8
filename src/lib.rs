//! Tilerunner - deterministic tile platformer physics
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile grid, moving platforms, player body)
//! - `replay`: Fixed-timestep input recording and the packed replay format
//! - `level`: Level codes and validation
//! - `leaderboard`: Replay verification and best-time tables
//! - `renderer`: Render-data extraction for an external renderer
//! - `audio`: Fire-and-forget sound sink
//! - `tuning` / `settings`: Data-driven physics constants and user preferences

pub mod audio;
pub mod error;
pub mod leaderboard;
pub mod level;
pub mod persistence;
pub mod renderer;
pub mod replay;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use audio::{AudioQueue, AudioSink, NullAudio, Sound};
pub use error::{ConfigError, LevelError, ReplayError};
pub use leaderboard::Leaderboard;
pub use level::Level;
pub use replay::Replay;
pub use settings::Settings;
pub use sim::{InputState, World};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (10 ms, shared with the replay format)
    pub const TIMESTEP: f32 = 0.01;
    /// Number of sub-step intervals used for player collision resolution
    pub const SUBSTEPS: u32 = 10;

    /// Player hitbox size in tiles
    pub const PLAYER_WIDTH: f32 = 0.6;
    pub const PLAYER_HEIGHT: f32 = 0.7;

    /// Offset from the begin tile's corner to the player's spawn point
    pub const SPAWN_OFFSET: f32 = 0.499;

    /// Default level dimensions
    pub const LEVEL_WIDTH: i32 = 32;
    pub const LEVEL_HEIGHT: i32 = 32;

    /// Horizontal speed above which the walk animation plays
    pub const WALK_THRESHOLD: f32 = 0.3;
    /// Below this magnitude a velocity component counts as stopped
    pub const VELOCITY_EPSILON: f32 = 0.01;
}

/// Linear interpolation between `a` (t = 0) and `b` (t = 1)
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// True if both values share a sign; zero counts as matching either sign
#[inline]
pub fn same_sign(a: f32, b: f32) -> bool {
    a * b >= 0.0
}

/// Move `v` toward zero by `step`, landing exactly on zero once within one step
#[inline]
pub fn approach_zero(v: f32, step: f32) -> f32 {
    if v > step {
        v - step
    } else if v < -step {
        v + step
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_sign_treats_zero_as_matching() {
        assert!(same_sign(0.0, -3.0));
        assert!(same_sign(2.0, 5.0));
        assert!(!same_sign(-2.0, 5.0));
    }

    #[test]
    fn test_approach_zero_snaps() {
        assert_eq!(approach_zero(0.5, 0.6), 0.0);
        assert_eq!(approach_zero(-0.5, 0.6), 0.0);
        assert!((approach_zero(2.0, 0.6) - 1.4).abs() < 1e-6);
        assert!((approach_zero(-2.0, 0.6) + 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(1.0, 3.0, 0.0), 1.0);
        assert_eq!(lerp(1.0, 3.0, 1.0), 3.0);
        assert_eq!(lerp(1.0, 3.0, 0.5), 2.0);
    }
}
