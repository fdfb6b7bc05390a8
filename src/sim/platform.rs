//! Moving platforms
//!
//! At load time every run of collinear tiles sharing a movement direction is
//! lifted out of the static grid into a blob. Blobs travel at a constant speed
//! along their axis and reverse when they run into static obstacles or into
//! other blobs moving against them.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::grid::TileGrid;
use super::tile::{Contact, Dir, Tile};
use crate::consts::VELOCITY_EPSILON;
use crate::same_sign;

/// Perpendicular inset of a blob's ghost box
const GHOST_INSET: f32 = 0.05;

/// One member tile of a blob, positioned in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingTile {
    pub tile: Tile,
    /// Top-left corner
    pub pos: Vec2,
    /// Position before the last update
    pub last_pos: Vec2,
    /// Copied from the owning blob
    pub vel: Vec2,
}

impl MovingTile {
    pub fn aabb(&self) -> Aabb {
        Aabb::tile(self.pos)
    }

    /// Distance moved during the last update
    pub fn delta(&self) -> Vec2 {
        self.pos - self.last_pos
    }
}

/// A rigid run of moving tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingBlob {
    dir: Dir,
    start: Vec2,
    pos: Vec2,
    vel: Vec2,
    members: Vec<MovingTile>,
}

impl MovingBlob {
    fn new(dir: Dir, start: Vec2, speed: f32, tiles: Vec<Tile>) -> Self {
        let vel = dir.unit() * speed;
        let mut blob = Self {
            dir,
            start,
            pos: start,
            vel,
            members: tiles
                .into_iter()
                .map(|tile| MovingTile {
                    tile,
                    pos: start,
                    last_pos: start,
                    vel,
                })
                .collect(),
        };
        blob.reset(speed);
        blob
    }

    /// Anchor (top-left corner of the first member)
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn vel(&self) -> Vec2 {
        self.vel
    }

    /// Direction the blob started in
    pub fn start_dir(&self) -> Dir {
        self.dir
    }

    pub fn members(&self) -> &[MovingTile] {
        &self.members
    }

    fn step(&self) -> Vec2 {
        if self.dir.is_horizontal() { Vec2::X } else { Vec2::Y }
    }

    /// Size of the blob in tiles
    pub fn extent(&self) -> Vec2 {
        let len = self.members.len() as f32;
        if self.dir.is_horizontal() {
            Vec2::new(len, 1.0)
        } else {
            Vec2::new(1.0, len)
        }
    }

    pub fn aabb(&self) -> Aabb {
        self.aabb_at(self.pos)
    }

    fn aabb_at(&self, pos: Vec2) -> Aabb {
        Aabb {
            min: pos,
            size: self.extent(),
        }
    }

    /// Full extent along the motion axis, inset on the perpendicular sides
    fn ghost_at(&self, pos: Vec2) -> Aabb {
        let aabb = self.aabb_at(pos);
        if self.vel.x == 0.0 {
            aabb.shrink_x(GHOST_INSET)
        } else if self.vel.y == 0.0 {
            aabb.shrink_y(GHOST_INSET)
        } else {
            aabb
        }
    }

    /// Re-derive member positions from the anchor
    fn sync(&mut self) {
        let step = self.step();
        for (i, member) in self.members.iter_mut().enumerate() {
            member.last_pos = member.pos;
            member.pos = self.pos + step * i as f32;
            member.vel = self.vel;
        }
    }

    fn reset(&mut self, speed: f32) {
        self.pos = self.start;
        self.vel = self.dir.unit() * speed;
        self.sync();
        for member in &mut self.members {
            member.last_pos = member.pos;
        }
    }
}

/// All moving platforms of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSet {
    blobs: Vec<MovingBlob>,
    speed: f32,
}

impl PlatformSet {
    /// Lift every moving blob out of `grid`
    ///
    /// Cells are visited in row-major order. Each unvisited moving tile seeds a
    /// flood fill along its axis that collects neighbors with the same direction.
    /// Tiles that cannot move are left in the grid untouched.
    pub fn from_grid(grid: &mut TileGrid, speed: f32) -> Self {
        let (width, height) = grid.size();
        let mut visited = vec![false; (width * height) as usize];
        let mut blobs = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let idx = (y * width + x) as usize;
                if visited[idx] {
                    continue;
                }
                let tile = grid.get(x, y);
                let Some(dir) = tile.moving else {
                    continue;
                };
                if !tile.movable() {
                    continue;
                }

                let step = if dir.is_horizontal() { IVec2::X } else { IVec2::Y };
                let mut cells = Vec::new();
                let mut work = vec![IVec2::new(x, y)];
                visited[idx] = true;

                while let Some(cell) = work.pop() {
                    cells.push(cell);
                    for next in [cell - step, cell + step] {
                        if !grid.in_bounds(next.x, next.y) {
                            continue;
                        }
                        let next_idx = (next.y * width + next.x) as usize;
                        if visited[next_idx] {
                            continue;
                        }
                        let neighbor = grid.get(next.x, next.y);
                        if neighbor.moving == Some(dir) && neighbor.movable() {
                            visited[next_idx] = true;
                            work.push(next);
                        }
                    }
                }

                cells.sort_by_key(|c| c.x + c.y);
                let start = cells[0].as_vec2();
                let tiles = cells
                    .iter()
                    .map(|c| {
                        let tile = grid.get(c.x, c.y);
                        grid.clear(c.x, c.y);
                        tile
                    })
                    .collect();

                blobs.push(MovingBlob::new(dir, start, speed, tiles));
            }
        }

        log::debug!(
            "Found {} moving platforms ({} tiles)",
            blobs.len(),
            blobs.iter().map(|b| b.members.len()).sum::<usize>()
        );

        Self { blobs, speed }
    }

    pub fn blobs(&self) -> &[MovingBlob] {
        &self.blobs
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Every member tile of every blob
    pub fn tiles(&self) -> impl Iterator<Item = &MovingTile> {
        self.blobs.iter().flat_map(|b| b.members.iter())
    }

    /// Advance every blob by `dt`, bouncing off static tiles and other blobs
    pub fn update(&mut self, grid: &TileGrid, dt: f32) {
        for i in 0..self.blobs.len() {
            let blob = &self.blobs[i];
            let mut vel = blob.vel;
            let mut next = blob.pos + vel * dt;
            let ghost = blob.ghost_at(next);
            let extent = blob.extent();
            let on_x = vel.x.abs() > VELOCITY_EPSILON;
            let mut knocked = None;

            // Nearest blocking tile in the direction of travel
            let wall = grid
                .intersects(&ghost)
                .into_iter()
                .filter(|c| c.tile.blocks_moving_tiles())
                .min_by(|a, b| a.pos.dot(vel).total_cmp(&b.pos.dot(vel)));

            if let Some(wall) = wall {
                if on_x {
                    next.x = if next.x > wall.pos.x {
                        wall.pos.x + 1.0
                    } else {
                        wall.pos.x - extent.x
                    };
                    vel.x = -vel.x;
                } else {
                    next.y = if next.y > wall.pos.y {
                        wall.pos.y + 1.0
                    } else {
                        wall.pos.y - extent.y
                    };
                    vel.y = -vel.y;
                }
            } else {
                for (j, other) in self.blobs.iter().enumerate() {
                    if j == i {
                        continue;
                    }
                    let co_moving = if on_x {
                        same_sign(other.vel.x, vel.x)
                    } else {
                        same_sign(other.vel.y, vel.y)
                    };
                    if co_moving {
                        continue;
                    }

                    let other_box = if on_x {
                        other.aabb().shrink_y(GHOST_INSET)
                    } else {
                        other.aabb().shrink_x(GHOST_INSET)
                    };
                    if !ghost.intersects(&other_box) {
                        continue;
                    }

                    if on_x {
                        next.x = if next.x > other.pos.x {
                            other_box.right()
                        } else {
                            other_box.left() - extent.x
                        };
                        vel.x = -vel.x;
                        if other.vel.y == 0.0 {
                            knocked = Some(j);
                        }
                    } else {
                        next.y = if next.y > other.pos.y {
                            other_box.bottom()
                        } else {
                            other_box.top() - extent.y
                        };
                        vel.y = -vel.y;
                        if other.vel.x == 0.0 {
                            knocked = Some(j);
                        }
                    }
                    break;
                }
            }

            if let Some(j) = knocked {
                let other = &mut self.blobs[j];
                if on_x {
                    other.vel.x = -other.vel.x;
                } else {
                    other.vel.y = -other.vel.y;
                }
            }

            let blob = &mut self.blobs[i];
            blob.pos = next;
            blob.vel = vel;
            blob.sync();
        }
    }

    /// Put every blob back at its start anchor with its start velocity
    pub fn restart(&mut self) {
        let speed = self.speed;
        for blob in &mut self.blobs {
            blob.reset(speed);
        }
    }

    /// Member tiles overlapping `aabb`, shaped like a grid query
    pub fn intersects(&self, aabb: &Aabb) -> Vec<Contact> {
        self.intersects_raw(aabb)
            .into_iter()
            .map(|m| Contact::new(m.pos, m.tile))
            .collect()
    }

    /// Member tiles overlapping `aabb`, with their motion state
    pub fn intersects_raw(&self, aabb: &Aabb) -> Vec<MovingTile> {
        self.blobs
            .iter()
            .filter(|b| b.aabb().intersects(aabb))
            .flat_map(|b| b.members.iter())
            .filter(|m| m.aabb().intersects(aabb))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tile::TileKind;

    const DT: f32 = 0.01;

    fn block() -> Tile {
        Tile::new(TileKind::Block)
    }

    fn mover(dir: Dir) -> Tile {
        Tile::moving(TileKind::Block, dir)
    }

    fn run(platforms: &mut PlatformSet, grid: &TileGrid, ticks: usize) {
        for _ in 0..ticks {
            platforms.update(grid, DT);
        }
    }

    #[test]
    fn test_discovery_lifts_blobs_out_of_grid() {
        let mut grid = TileGrid::new(16, 16);
        for x in 2..5 {
            grid.set(x, 5, mover(Dir::Right));
        }
        grid.set(10, 10, mover(Dir::Up));
        grid.set(11, 10, mover(Dir::Up));

        let platforms = PlatformSet::from_grid(&mut grid, 2.0);
        assert_eq!(platforms.len(), 3);
        assert_eq!(platforms.blobs()[0].members().len(), 3);
        assert_eq!(platforms.blobs()[0].extent(), Vec2::new(3.0, 1.0));
        assert_eq!(platforms.blobs()[0].vel(), Vec2::new(2.0, 0.0));
        // Up-movers side by side are separate vertical blobs
        assert_eq!(platforms.blobs()[1].members().len(), 1);
        assert!(grid.iter().all(|(_, _, t)| t.is_empty()));
    }

    #[test]
    fn test_direction_change_splits_run() {
        let mut grid = TileGrid::new(8, 4);
        grid.set(1, 1, mover(Dir::Right));
        grid.set(2, 1, mover(Dir::Right));
        grid.set(3, 1, mover(Dir::Left));

        let platforms = PlatformSet::from_grid(&mut grid, 2.0);
        assert_eq!(platforms.len(), 2);
        assert_eq!(platforms.blobs()[0].members().len(), 2);
        assert_eq!(platforms.blobs()[1].start_dir(), Dir::Left);
    }

    #[test]
    fn test_unmovable_tiles_stay_static() {
        let mut grid = TileGrid::new(8, 4);
        grid.set(1, 1, Tile::moving(TileKind::End, Dir::Right));
        let platforms = PlatformSet::from_grid(&mut grid, 2.0);
        assert!(platforms.is_empty());
        assert_eq!(grid.get(1, 1).kind, TileKind::End);
    }

    #[test]
    fn test_blob_bounces_off_block() {
        let mut grid = TileGrid::new(32, 32);
        for x in 2..5 {
            grid.set(x, 5, mover(Dir::Right));
        }
        grid.set(10, 5, block());
        let mut platforms = PlatformSet::from_grid(&mut grid, 2.0);

        // Five tiles of travel at 2 tiles/s takes 2.5 s
        run(&mut platforms, &grid, 245);
        assert!(platforms.blobs()[0].vel().x > 0.0);

        run(&mut platforms, &grid, 10);
        let blob = &platforms.blobs()[0];
        assert!(blob.vel().x < 0.0);
        assert!(blob.aabb().right() <= 10.0 + 1e-4);
    }

    #[test]
    fn test_vertical_blob_bounces_off_floor() {
        let mut grid = TileGrid::new(8, 8);
        grid.set(3, 1, mover(Dir::Down));
        grid.set(3, 2, mover(Dir::Down));
        let mut platforms = PlatformSet::from_grid(&mut grid, 2.0);

        // Bottom edge starts at 3, map floor is at 8
        run(&mut platforms, &grid, 260);
        let blob = &platforms.blobs()[0];
        assert!(blob.vel().y < 0.0);
        assert!(blob.aabb().bottom() <= 8.0 + 1e-4);
    }

    #[test]
    fn test_head_on_blobs_both_reverse() {
        let mut grid = TileGrid::new(16, 8);
        grid.set(2, 4, mover(Dir::Right));
        grid.set(8, 4, mover(Dir::Left));
        let mut platforms = PlatformSet::from_grid(&mut grid, 2.0);

        // Gap of 5 tiles closing at 4 tiles/s
        run(&mut platforms, &grid, 150);
        let a = &platforms.blobs()[0];
        let b = &platforms.blobs()[1];
        assert!(a.vel().x < 0.0);
        assert!(b.vel().x > 0.0);
        assert!(a.aabb().right() <= b.aabb().left() + 1e-4);
    }

    #[test]
    fn test_restart_is_idempotent() {
        let mut grid = TileGrid::new(16, 8);
        for x in 2..5 {
            grid.set(x, 5, mover(Dir::Right));
        }
        grid.set(12, 1, mover(Dir::Down));
        let mut platforms = PlatformSet::from_grid(&mut grid, 2.0);
        let initial = platforms.clone();

        run(&mut platforms, &grid, 400);
        platforms.restart();
        let once = platforms.clone();
        platforms.restart();

        assert_eq!(platforms, once);
        assert_eq!(platforms, initial);
    }

    #[test]
    fn test_members_follow_anchor() {
        let mut grid = TileGrid::new(16, 8);
        for x in 2..5 {
            grid.set(x, 5, mover(Dir::Right));
        }
        let mut platforms = PlatformSet::from_grid(&mut grid, 2.0);
        run(&mut platforms, &grid, 1);

        let blob = &platforms.blobs()[0];
        for (i, m) in blob.members().iter().enumerate() {
            assert!((m.pos.x - (blob.pos().x + i as f32)).abs() < 1e-5);
            assert!((m.delta().x - 0.02).abs() < 1e-5);
        }

        let hits = platforms.intersects(&Aabb::new(3.5, 4.5, 1.0, 0.6));
        assert_eq!(hits.len(), 2);
    }
}
