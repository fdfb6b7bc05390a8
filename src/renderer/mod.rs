//! Render data extraction
//!
//! The core never draws. A frontend calls [`extract`] once per frame for a
//! tagged list of what to draw, and [`instances`] to flatten that into
//! `bytemuck::Pod` sprite instances ready for upload.

pub mod instance;

use glam::Vec2;

pub use instance::{SpriteInstance, atlas};

use crate::sim::{Animation, Tile, TileKind, World};

/// Player animation frame duration in seconds
pub const FRAME_TIME: f32 = 0.125;

/// Something to draw this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderItem {
    /// Static tile at grid coordinates
    Tile { x: i32, y: i32, kind: TileKind },
    /// Moving tile, top-left corner in tile units
    Platform { pos: Vec2, tile: Tile },
    /// Player sprite centered at `pos`
    Player {
        pos: Vec2,
        scale: Vec2,
        animation: Animation,
    },
}

/// Everything visible in the world, back to front
pub fn extract(world: &World) -> Vec<RenderItem> {
    let mut items: Vec<RenderItem> = world
        .grid()
        .iter()
        .filter(|(_, _, tile)| !tile.is_empty() && !tile.editor_only())
        .map(|(x, y, tile)| RenderItem::Tile {
            x,
            y,
            kind: tile.kind,
        })
        .collect();

    items.extend(
        world
            .platforms()
            .tiles()
            .filter(|m| !m.tile.editor_only())
            .map(|m| RenderItem::Platform {
                pos: m.pos,
                tile: m.tile,
            }),
    );

    let player = world.player();
    items.push(RenderItem::Player {
        pos: world.interpolated_player_pos(),
        scale: player.sprite_scale(),
        animation: world.animation(),
    });
    items
}

/// Flatten render items into sprite instances
///
/// `time` is seconds since the animation started and picks the player frame.
pub fn instances(items: &[RenderItem], time: f32) -> Vec<SpriteInstance> {
    let center = Vec2::splat(0.5);
    let mut out = Vec::with_capacity(items.len());

    for item in items {
        match *item {
            RenderItem::Tile { x, y, kind } => {
                let pos = Vec2::new(x as f32, y as f32) + center;
                out.push(SpriteInstance::new(pos, Vec2::ONE, tile_index(kind)));
            }
            RenderItem::Platform { pos, tile } => {
                out.push(SpriteInstance::new(pos + center, Vec2::ONE, tile_index(tile.kind)));
                if let Some(dir) = tile.moving {
                    out.push(SpriteInstance::new(
                        pos + center,
                        Vec2::ONE,
                        atlas::ARROW_BASE + dir.index() as u32,
                    ));
                }
            }
            RenderItem::Player {
                pos,
                scale,
                animation,
            } => {
                let frames = animation.frames();
                let i = (time.max(0.0) / FRAME_TIME) as usize % frames.len();
                out.push(SpriteInstance::new(pos, scale, atlas::PLAYER_BASE + frames[i]));
            }
        }
    }
    out
}

fn tile_index(kind: TileKind) -> u32 {
    atlas::TILE_BASE + kind.code().max(0) as u32
}
