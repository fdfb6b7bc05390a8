//! Fixed timestep simulation tick
//!
//! One tick: platforms advance, the player is carried by what it touches,
//! controls integrate velocity, then movement is resolved in sub-steps against
//! static and moving tiles. Death and goal transitions are decided at the end.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Adjacency, classify, merged_contacts};
use super::controls::{Surroundings, run_controls};
use super::grid::TileGrid;
use super::platform::PlatformSet;
use super::player::PlayerState;
use super::state::{GameEvent, World};
use super::tile::{Dir, TileKind};
use crate::consts::{SUBSTEPS, VELOCITY_EPSILON};
use crate::{lerp, same_sign};

/// Vertical speed given right after a gravity flip, away from the flip tile
const FLIP_KICK: f32 = 0.1;
/// Extra clearance when a blocked move ends up on the far side of a tile
const CORNER_NUDGE: f32 = 0.01;

/// Buttons held during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub dash: bool,
    pub up: bool,
    pub down: bool,
}

impl InputState {
    pub fn any(&self) -> bool {
        self.left || self.right || self.jump || self.dash || self.up || self.down
    }

    /// Pack as six bits: left, right, jump, dash, up, down (LSB first)
    pub fn to_bits(&self) -> u8 {
        u8::from(self.left)
            | u8::from(self.right) << 1
            | u8::from(self.jump) << 2
            | u8::from(self.dash) << 3
            | u8::from(self.up) << 4
            | u8::from(self.down) << 5
    }

    pub fn from_bits(bits: u8) -> Self {
        Self {
            left: bits & 1 != 0,
            right: bits & (1 << 1) != 0,
            jump: bits & (1 << 2) != 0,
            dash: bits & (1 << 3) != 0,
            up: bits & (1 << 4) != 0,
            down: bits & (1 << 5) != 0,
        }
    }
}

/// Outcome of moving the player through the sub-steps
#[derive(Debug, Clone, Copy, Default)]
struct MotionReport {
    goal: bool,
    lethal: bool,
}

/// How far platforms next to the player move it this tick
fn carry_offset(p: &PlayerState, adj: &Adjacency, dt: f32) -> Vec2 {
    let mut offset = Vec2::ZERO;

    if let Some(floor) = adj.platform(p.floor_side()) {
        let delta = floor.delta();
        if floor.tile.kind != TileKind::Ice {
            offset.x += delta.x;
        }
        offset.y += delta.y;
    }

    let left = adj.platform(Dir::Left);
    let right = adj.platform(Dir::Right);

    // Pushed by platforms moving toward us
    if let Some(m) = left.filter(|m| m.vel.x > 0.0) {
        offset.x += m.vel.x * dt;
    }
    if let Some(m) = right.filter(|m| m.vel.x < 0.0) {
        offset.x += m.vel.x * dt;
    }

    if p.climbing {
        let (ladder, moving_away) = match p.climbing_facing {
            Dir::Left => (left, left.is_some_and(|m| m.vel.x < 0.0)),
            _ => (right, right.is_some_and(|m| m.vel.x > 0.0)),
        };
        if let Some(m) = ladder {
            if m.tile.kind == TileKind::Ladder {
                offset.y += m.vel.y * dt;
            }
            if moving_away {
                offset.x += m.vel.x * dt;
            }
        }
    }

    offset
}

/// Move the player toward `pos + vel * dt`, one axis at a time per sub-step
fn resolve_motion(
    p: &mut PlayerState,
    grid: &TileGrid,
    platforms: &PlatformSet,
    adj: &Adjacency,
    dt: f32,
) -> MotionReport {
    let start = p.pos;
    let mut target = start + p.vel * dt;
    let mut cur = start;
    let mut x_blocked = false;
    let mut y_blocked = false;
    let mut report = MotionReport::default();

    for i in 0..SUBSTEPS {
        let t = i as f32 / SUBSTEPS as f32;

        if !x_blocked {
            cur.x = lerp(start.x, target.x, t);
            let hits = classify(&merged_contacts(grid, platforms, &p.x_hitbox_at(cur)));
            report.goal |= hits.goal;
            if hits.lethal() {
                report.lethal = true;
                break;
            }
            if let Some(hit) = hits.blocker {
                let right_of = cur.x > hit.pos.x;
                let mut x = PlayerState::flush_x(hit.pos.x, right_of);
                if cur.x < hit.pos.x && p.vel.x < 0.0 {
                    x -= CORNER_NUDGE;
                } else if cur.x > hit.pos.x && p.vel.x > 0.0 {
                    x += CORNER_NUDGE;
                }

                // Walking into a platform that moves away: follow it
                let side = if right_of { Dir::Left } else { Dir::Right };
                p.vel.x = match adj.platform(side) {
                    Some(m) if same_sign(m.vel.x, p.vel.x) && p.vel.x.abs() > VELOCITY_EPSILON => {
                        m.vel.x
                    }
                    _ => 0.0,
                };
                cur.x = x;
                target.x = x;
                x_blocked = true;
            }
        }

        if !y_blocked {
            cur.y = lerp(start.y, target.y, t);
            let hits = classify(&merged_contacts(grid, platforms, &p.y_hitbox_at(cur)));
            report.goal |= hits.goal;
            if hits.lethal() {
                report.lethal = true;
                break;
            }
            if let Some(hit) = hits.blocker {
                let y = p.flush_y(hit.pos.y, cur.y > hit.pos.y);
                p.vel.y = 0.0;
                cur.y = y;
                target.y = y;
                y_blocked = true;
            }
        }
    }

    p.pos = target;
    report
}

fn out_of_bounds(p: &PlayerState, grid: &TileGrid) -> bool {
    let (w, h) = grid.size();
    let fell_out = if p.flip_gravity {
        p.pos.y < -1.0
    } else {
        p.pos.y > h as f32
    };
    p.pos.x < -1.0 || p.pos.x > w as f32 || fell_out
}

fn die(world: &mut World, cause: &str, events: &mut Vec<GameEvent>) {
    world.player.dead = true;
    events.push(GameEvent::Died);
    if log::log_enabled!(log::Level::Debug) {
        let p = &world.player;
        log::debug!(
            "Player died ({}) at tick {}: pos ({:.3}, {:.3}) vel ({:.3}, {:.3}) flip={} | {}",
            cause,
            world.step,
            p.pos.x,
            p.pos.y,
            p.vel.x,
            p.vel.y,
            p.flip_gravity,
            world.adjacency.describe()
        );
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, dt: f32) {
    // Death from the previous tick restarts the attempt
    if world.player.dead {
        world.reset_run();
    }

    let input = match &world.playback {
        Some(replay) => replay.frame(world.step).unwrap_or_default(),
        None => world.live_input,
    };
    world.player.last_frame = world.player.this_frame;
    world.player.this_frame = input;
    if world.playback.is_none() && !world.won {
        world.recording.push(input);
    }
    world.step += 1;

    // Platforms move first; the player reacts to where they ended up
    world.platforms.update(&world.grid, dt);
    world.adjacency = Adjacency::probe(&world.player, &world.grid, &world.platforms);
    world.player.pos += carry_offset(&world.player, &world.adjacency, dt);

    let surroundings = Surroundings::sense(&world.player, &world.adjacency, world.alt_controls);
    if surroundings.grounded {
        world.player.time_airborne = 0.0;
    } else {
        world.player.time_airborne += dt;
    }
    world.player.since_wallkick += dt;

    let mut events = Vec::new();
    run_controls(
        dt,
        &mut world.player,
        &surroundings,
        &world.tuning,
        &mut events,
    );

    let motion = resolve_motion(
        &mut world.player,
        &world.grid,
        &world.platforms,
        &world.adjacency,
        dt,
    );
    world.adjacency = Adjacency::probe(&world.player, &world.grid, &world.platforms);

    if motion.goal && !world.won {
        world.won = true;
        world.finish_step = Some(world.step);
        events.push(GameEvent::Won);
        log::info!("Goal reached in {:.2}s", world.timer());
    }

    if motion.lethal {
        die(world, "harmful tile", &mut events);
    } else if world.adjacency.is_squeezed() {
        die(world, "squeezed", &mut events);
    } else if out_of_bounds(&world.player, &world.grid) {
        die(world, "out of bounds", &mut events);
    } else {
        let floor = world.player.floor_side();
        if world
            .adjacency
            .touching_any(floor, |t| t.kind == TileKind::Gravity)
        {
            let p = &mut world.player;
            p.flip_gravity = !p.flip_gravity;
            p.dashing = false;
            p.vel.y = if p.flip_gravity { -FLIP_KICK } else { FLIP_KICK };
            events.push(GameEvent::GravityFlipped);
        }
    }

    let on_ice = world
        .adjacency
        .touching_any(world.player.floor_side(), |t| t.kind == TileKind::Ice);
    world.animation = world.player.animation(on_ice, &world.tuning);

    for event in events {
        world.emit(event);
    }
}
