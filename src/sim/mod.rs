//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (row-major tiles, platforms in discovery order)
//! - No rendering or audio backend dependencies

pub mod aabb;
pub mod collision;
pub mod controls;
pub mod grid;
pub mod platform;
pub mod player;
pub mod state;
pub mod tick;
pub mod tile;

pub use aabb::Aabb;
pub use collision::{Adjacency, ContactReport, classify, merged_contacts};
pub use controls::{Surroundings, run_controls};
pub use grid::{TileDiff, TileGrid};
pub use platform::{MovingBlob, MovingTile, PlatformSet};
pub use player::{Animation, PlayerState};
pub use state::{GameEvent, World};
pub use tick::{InputState, tick};
pub use tile::{Contact, Dir, Tile, TileKind};
