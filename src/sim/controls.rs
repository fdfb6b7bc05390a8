//! Input-driven velocity integration
//!
//! Turns one frame of input into velocity changes: running, air control, ice,
//! jumping with coyote time and short-hops, dashing, wall-kicks, ladders, and
//! gravity. Positions are not touched here except for the small nudges that
//! jumps and kicks apply to get clear of the surface they leave.

use super::collision::Adjacency;
use super::player::{LONG_AGO, PlayerState};
use super::state::GameEvent;
use super::tile::{Dir, Tile, TileKind};
use crate::approach_zero;
use crate::tuning::Tuning;

/// Distance a jump moves the player off the floor
const JUMP_NUDGE: f32 = 0.01;
/// Distance a wall-kick moves the player off the wall
const WALLKICK_NUDGE: f32 = 0.2;

/// Facts about the player's surroundings, sampled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Surroundings {
    pub grounded: bool,
    pub on_ice: bool,
    /// Solid tile directly overhead (relative to gravity)
    pub tile_above: bool,
    pub ladder_left: bool,
    pub ladder_right: bool,
    pub can_wallkick_left: bool,
    pub can_wallkick_right: bool,
    pub alt_controls: bool,
}

impl Surroundings {
    pub fn sense(player: &PlayerState, adj: &Adjacency, alt_controls: bool) -> Self {
        let floor = player.floor_side();
        let ladder_left = adj.touching_any(Dir::Left, |t| t.kind == TileKind::Ladder);
        let ladder_right = adj.touching_any(Dir::Right, |t| t.kind == TileKind::Ladder);
        let grounded = adj.touching_any(floor, Tile::solid);

        let this = player.this_frame;
        let last = player.last_frame;
        let jump_pressed = this.jump && !last.jump;

        // Kicking in direction `d` needs a kickable wall on the opposite side
        let can_kick = |d: Dir| {
            let keyed = match d {
                Dir::Left => this.left && !last.left,
                _ => this.right && !last.right,
            };
            let ladder_behind = match d {
                Dir::Left => ladder_right,
                _ => ladder_left,
            };
            (keyed || jump_pressed)
                && (!alt_controls || !ladder_behind || jump_pressed)
                && !grounded
                && adj.touching_any(d.mirror(), |t| t.solid() && !t.blocks_wallkicks())
        };

        Self {
            grounded,
            on_ice: adj.touching_any(floor, |t| t.kind == TileKind::Ice),
            tile_above: adj.touching_any(player.ceiling_side(), Tile::solid),
            ladder_left,
            ladder_right,
            can_wallkick_left: can_kick(Dir::Left),
            can_wallkick_right: can_kick(Dir::Right),
            alt_controls,
        }
    }

    pub fn against_ladder(&self, side: Dir) -> bool {
        match side {
            Dir::Left => self.ladder_left,
            Dir::Right => self.ladder_right,
            _ => false,
        }
    }

    pub fn can_wallkick(&self, dir: Dir) -> bool {
        match dir {
            Dir::Left => self.can_wallkick_left,
            Dir::Right => self.can_wallkick_right,
            _ => false,
        }
    }
}

fn wallkick(p: &mut PlayerState, dir: Dir, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    if p.wallkick_locked(tuning) {
        return;
    }
    let sign = dir.x_sign();
    p.climbing = false;
    p.vel.x = tuning.wallkick_xv * sign;
    p.vel.y = -tuning.wallkick_yv * p.gravity_sign();
    p.pos.x += WALLKICK_NUDGE * sign;
    p.facing = dir;
    p.since_wallkick = 0.0;
    events.push(GameEvent::WallKicked);
}

/// Apply one frame of input to the player's velocity
pub fn run_controls(
    dt: f32,
    p: &mut PlayerState,
    s: &Surroundings,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    let this = p.this_frame;
    let last = p.last_frame;
    let g = p.gravity_sign();

    // === Dash ===
    if this.dash {
        if s.grounded && !p.climbing {
            if !p.dashing {
                p.dash_dir = p.facing;
            }
            p.dashing = true;
        }
    } else if s.grounded {
        p.dashing = false;
    }

    let locked = p.wallkick_locked(tuning);
    let air_control = if s.grounded {
        1.0
    } else if p.dashing && this.dash {
        tuning.dash_air_control
    } else {
        tuning.air_control
    };
    let ground_control = if p.dashing && s.grounded { 0.0 } else { 1.0 };
    let kick_control = if locked { 0.0 } else { 1.0 };
    let friction = if s.on_ice && s.grounded {
        tuning.ice_friction
    } else {
        1.0
    };
    let control = air_control * ground_control * kick_control * friction;

    if p.dashing {
        if s.grounded {
            p.vel.x += tuning.dash_x_accel * dt * air_control * friction * p.dash_dir.x_sign();
        } else {
            p.dash_dir = p.facing;
        }
    }

    // Ran off the end of a ladder
    if p.climbing && !s.against_ladder(p.climbing_facing) {
        p.climbing = false;
        if p.vel.y * g < 0.0 && !locked {
            p.vel.x = tuning.climb_dismount_xv * p.climbing_facing.x_sign();
        }
    }

    // === Left / right ===
    let mut lr_input = false;
    for (dir, held, other_held, last_held) in [
        (Dir::Right, this.right, this.left, last.right),
        (Dir::Left, this.left, this.right, last.left),
    ] {
        if !held {
            continue;
        }
        lr_input = !lr_input;
        let away = dir.mirror();

        if s.can_wallkick(away) {
            wallkick(p, away, tuning, events);
        } else if !p.climbing && s.against_ladder(dir) {
            p.climbing = true;
            p.climbing_facing = dir;
            p.vel.y = 0.0;
        } else if p.climbing && s.against_ladder(away) && last_held {
            if !s.alt_controls || s.grounded {
                p.climbing = false;
            }
        } else if p.climbing && s.alt_controls {
            // Alt controls climb with left/right below
        } else if !other_held {
            let sign = dir.x_sign();
            if p.vel.x * sign < 0.0 && !s.on_ice {
                p.vel.x += tuning.x_decel * dt * control * sign;
            }
            p.vel.x += tuning.x_accel * dt * control * sign;
            if (!p.dashing || !s.grounded) && !locked {
                p.facing = dir;
            }
        }
    }

    if !lr_input && !p.dashing && !locked {
        p.vel.x = approach_zero(p.vel.x, tuning.x_decel * friction * dt);
    }

    // === Jump ===
    if this.jump {
        let alt_dismount = p.climbing && s.alt_controls && !this.left && !this.right;
        if !p.jumping && !p.climbing && p.time_airborne < tuning.coyote_time() && !s.tile_above {
            p.vel.y = -tuning.jump_v * g;
            p.time_airborne = LONG_AGO;
            p.jumping = true;
            p.pos.y -= JUMP_NUDGE * g;
            events.push(GameEvent::Jumped);
        } else if p.climbing && !last.jump && alt_dismount {
            p.climbing = false;
        }

        let away = p.facing.mirror();
        if s.can_wallkick(away) {
            wallkick(p, away, tuning, events);
        }
    } else if p.jumping {
        p.jumping = false;
        if !locked {
            p.vel.y *= tuning.shorthop_factor;
        }
    }

    // === Ladder ===
    if p.climbing {
        let (up, down) = if s.alt_controls {
            match p.climbing_facing {
                Dir::Left => (this.left, this.right),
                _ => (this.right, this.left),
            }
        } else {
            (this.up, this.down)
        };

        if up {
            p.vel.y -= tuning.climb_ya * dt * g;
            if s.grounded {
                p.pos.y -= JUMP_NUDGE * g;
            }
        } else if down {
            p.vel.y += tuning.climb_ya * dt * g;
        } else {
            p.vel.y = approach_zero(p.vel.y, tuning.climb_ya * dt);
        }
        p.vel.y = p.vel.y.clamp(-tuning.climb_yv_max, tuning.climb_yv_max);
        p.facing = p.climbing_facing;
    }

    let max_xv = if p.dashing {
        tuning.dash_xv_max
    } else {
        tuning.xv_max
    };
    p.vel.x = p.vel.x.clamp(-max_xv, max_xv);

    // === Gravity ===
    if !p.climbing {
        p.vel.y += tuning.grav * dt * g;
        p.vel.y = if p.flip_gravity {
            p.vel.y.clamp(-tuning.yv_max, tuning.jump_v)
        } else {
            p.vel.y.clamp(-tuning.jump_v, tuning.yv_max)
        };
    }
}
