//! Player kinematic state, hitboxes, and animation selection

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::tick::InputState;
use super::tile::Dir;
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH, WALK_THRESHOLD};
use crate::tuning::Tuning;

/// Distance from the player's center to the top of the hitbox (feet down)
const HEAD_OFFSET: f32 = 0.25;
/// Distance from the player's center to the feet (feet down)
const FOOT_OFFSET: f32 = PLAYER_HEIGHT - HEAD_OFFSET;

/// Inset of the narrowed per-axis hitboxes on their perpendicular sides
const AXIS_INSET: f32 = 0.1;
/// How far the above/below probes reach past the hitbox
const PROBE_REACH_Y: f32 = 0.15;
/// How far the side probes reach past the hitbox
const PROBE_REACH_X: f32 = 0.05;

/// Elapsed-time value meaning "long ago"
pub const LONG_AGO: f32 = 999.0;

/// Sprite animation for the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animation {
    Stand,
    Walk,
    Jump,
    Fall,
    Climb,
    Hang,
    Dash,
}

impl Animation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Animation::Stand => "stand",
            Animation::Walk => "walk",
            Animation::Jump => "jump",
            Animation::Fall => "fall",
            Animation::Climb => "climb",
            Animation::Hang => "hang",
            Animation::Dash => "dash",
        }
    }

    /// Sprite-sheet frames, played at 125 ms per frame
    pub fn frames(&self) -> &'static [u32] {
        match self {
            Animation::Stand => &[1],
            Animation::Walk => &[0, 1, 2, 1],
            Animation::Jump => &[3],
            Animation::Fall => &[4],
            Animation::Climb => &[5, 6, 7, 6],
            Animation::Hang => &[5],
            Animation::Dash => &[8, 9],
        }
    }
}

/// Player body and control state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Center of the sprite
    pub pos: Vec2,
    pub vel: Vec2,
    /// Left or right
    pub facing: Dir,
    pub flip_gravity: bool,
    pub dead: bool,

    pub climbing: bool,
    /// Side of the player the ladder is on
    pub climbing_facing: Dir,
    pub dashing: bool,
    pub dash_dir: Dir,
    /// Set while the jump button is held after a jump
    pub jumping: bool,

    /// Seconds since last grounded
    pub time_airborne: f32,
    /// Seconds since the last wall-kick
    pub since_wallkick: f32,

    pub this_frame: InputState,
    pub last_frame: InputState,
}

impl PlayerState {
    pub fn spawn(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            facing: Dir::Right,
            flip_gravity: false,
            dead: false,
            climbing: false,
            climbing_facing: Dir::Right,
            dashing: false,
            dash_dir: Dir::Right,
            jumping: true,
            time_airborne: LONG_AGO,
            since_wallkick: LONG_AGO,
            this_frame: InputState::default(),
            last_frame: InputState::default(),
        }
    }

    /// +1 when gravity pulls down, -1 when flipped
    #[inline]
    pub fn gravity_sign(&self) -> f32 {
        if self.flip_gravity { -1.0 } else { 1.0 }
    }

    /// Side gravity pulls toward
    pub fn floor_side(&self) -> Dir {
        if self.flip_gravity { Dir::Up } else { Dir::Down }
    }

    pub fn ceiling_side(&self) -> Dir {
        self.floor_side().mirror()
    }

    pub fn wallkick_locked(&self, tuning: &Tuning) -> bool {
        self.since_wallkick < tuning.wallkick_lock()
    }

    /// Center-to-top and center-to-bottom distances of the hitbox
    fn vertical_offsets(flip_gravity: bool) -> (f32, f32) {
        if flip_gravity {
            (FOOT_OFFSET, HEAD_OFFSET)
        } else {
            (HEAD_OFFSET, FOOT_OFFSET)
        }
    }

    pub fn hitbox_at(pos: Vec2, flip_gravity: bool) -> Aabb {
        let (above, _) = Self::vertical_offsets(flip_gravity);
        Aabb::new(
            pos.x - PLAYER_WIDTH / 2.0,
            pos.y - above,
            PLAYER_WIDTH,
            PLAYER_HEIGHT,
        )
    }

    pub fn hitbox(&self) -> Aabb {
        Self::hitbox_at(self.pos, self.flip_gravity)
    }

    /// Hitbox used for horizontal resolution
    pub fn x_hitbox_at(&self, pos: Vec2) -> Aabb {
        let b = Self::hitbox_at(pos, self.flip_gravity);
        Aabb::new(
            b.left() + 0.001,
            b.top() + AXIS_INSET,
            b.width() - 0.001,
            b.height() - 2.0 * AXIS_INSET,
        )
    }

    /// Hitbox used for vertical resolution
    pub fn y_hitbox_at(&self, pos: Vec2) -> Aabb {
        Self::hitbox_at(pos, self.flip_gravity).shrink_x(AXIS_INSET)
    }

    /// Horizontal center position that puts the hitbox flush against a tile
    /// edge. `right_of` places the player on the tile's right side.
    pub fn flush_x(tile_x: f32, right_of: bool) -> f32 {
        if right_of {
            tile_x + 1.0 + PLAYER_WIDTH / 2.0
        } else {
            tile_x - PLAYER_WIDTH / 2.0
        }
    }

    /// Vertical center position that puts the hitbox flush against a tile edge
    pub fn flush_y(&self, tile_y: f32, below: bool) -> f32 {
        let (above, under) = Self::vertical_offsets(self.flip_gravity);
        if below {
            tile_y + 1.0 + above
        } else {
            tile_y - under
        }
    }

    /// Thin probe strip just outside the hitbox on one side
    pub fn probe(&self, side: Dir) -> Aabb {
        let b = self.hitbox();
        match side {
            Dir::Up => Aabb::new(
                b.left() + AXIS_INSET,
                b.top() - PROBE_REACH_Y,
                b.width() - 2.0 * AXIS_INSET,
                PROBE_REACH_Y,
            ),
            Dir::Down => Aabb::new(
                b.left() + AXIS_INSET,
                b.bottom(),
                b.width() - 2.0 * AXIS_INSET,
                PROBE_REACH_Y,
            ),
            Dir::Left => Aabb::new(
                b.left() - PROBE_REACH_X,
                b.top() + AXIS_INSET,
                PROBE_REACH_X,
                b.height() - 2.0 * AXIS_INSET,
            ),
            Dir::Right => Aabb::new(
                b.right(),
                b.top() + AXIS_INSET,
                PROBE_REACH_X,
                b.height() - 2.0 * AXIS_INSET,
            ),
        }
    }

    /// Sprite scale: x mirrors for facing right, y mirrors when gravity is flipped
    pub fn sprite_scale(&self) -> Vec2 {
        Vec2::new(
            if self.facing == Dir::Right { -1.0 } else { 1.0 },
            if self.flip_gravity { -1.0 } else { 1.0 },
        )
    }

    /// Pick the animation for the current state
    pub fn animation(&self, on_ice: bool, tuning: &Tuning) -> Animation {
        if self.climbing {
            return if self.vel.y.abs() > 0.01 {
                Animation::Climb
            } else {
                Animation::Hang
            };
        }

        let speed = self.vel.x.abs();
        let keyed = self.this_frame.left || self.this_frame.right || self.this_frame.dash;
        let mut anim = if speed > tuning.xv_max {
            Animation::Dash
        } else if speed > WALK_THRESHOLD && (!on_ice || keyed) {
            Animation::Walk
        } else {
            Animation::Stand
        };

        // Airborne overrides, measured along gravity
        let fall_speed = self.vel.y * self.gravity_sign();
        if self.vel.y != 0.0 {
            if fall_speed < tuning.yv_max * 0.2 {
                anim = Animation::Jump;
            } else if fall_speed > tuning.yv_max * 0.5 {
                anim = Animation::Fall;
            }
        }
        anim
    }
}
