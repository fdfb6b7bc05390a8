//! Fixed-size tile grid
//!
//! Row-major storage with O(1) lookup. Any coordinate outside the grid reads
//! as a solid block, so the map edge behaves like a wall without border tiles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::tile::{Contact, Tile, TileKind};

/// Before/after record of a single cell edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDiff {
    pub x: i32,
    pub y: i32,
    pub before: Tile,
    pub after: Tile,
}

/// Rectangular grid of tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Create an empty grid. Negative dimensions are clamped to zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![Tile::EMPTY; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Tile at (x, y), or the solid sentinel when out of bounds
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Tile {
        if self.in_bounds(x, y) {
            self.tiles[self.index(x, y)]
        } else {
            Tile::SOLID_SENTINEL
        }
    }

    /// Overwrite a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) -> Option<TileDiff> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.index(x, y);
        let before = std::mem::replace(&mut self.tiles[idx], tile);
        Some(TileDiff {
            x,
            y,
            before,
            after: tile,
        })
    }

    pub fn clear(&mut self, x: i32, y: i32) -> Option<TileDiff> {
        self.set(x, y, Tile::EMPTY)
    }

    /// Revert an edit
    pub fn undo(&mut self, diff: &TileDiff) {
        self.set(diff.x, diff.y, diff.before);
    }

    /// Re-apply an edit
    pub fn redo(&mut self, diff: &TileDiff) {
        self.set(diff.x, diff.y, diff.after);
    }

    /// Raw row-major storage
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Iterate cells in row-major order as (x, y, tile)
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, Tile)> + '_ {
        let width = self.width.max(1);
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &t)| (i as i32 % width, i as i32 / width, t))
    }

    pub fn tile_count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|t| t.kind == kind).count()
    }

    /// First cell of `kind` in row-major order
    pub fn find_first_of(&self, kind: TileKind) -> Option<(i32, i32)> {
        self.iter()
            .find(|(_, _, t)| t.kind == kind)
            .map(|(x, y, _)| (x, y))
    }

    /// Every non-empty tile whose unit square overlaps `aabb`
    ///
    /// Only the cells under the rectangle are scanned. Out-of-bounds cells in
    /// that range are reported as the solid sentinel.
    pub fn intersects(&self, aabb: &Aabb) -> Vec<Contact> {
        let x0 = aabb.left().floor() as i32;
        let x1 = aabb.right().floor() as i32;
        let y0 = aabb.top().floor() as i32;
        let y1 = aabb.bottom().floor() as i32;

        let mut hits = Vec::new();
        for x in x0..=x1 {
            for y in y0..=y1 {
                let tile = self.get(x, y);
                if tile.is_empty() {
                    continue;
                }
                let pos = Vec2::new(x as f32, y as f32);
                if Aabb::tile(pos).intersects(aabb) {
                    hits.push(Contact::new(pos, tile));
                }
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_set_and_undo() {
        let mut grid = TileGrid::new(4, 3);
        let diff = grid.set(1, 2, Tile::new(TileKind::Ice)).unwrap();
        assert_eq!(grid.get(1, 2).kind, TileKind::Ice);
        assert_eq!(diff.before, Tile::EMPTY);

        grid.undo(&diff);
        assert!(grid.get(1, 2).is_empty());
        grid.redo(&diff);
        assert_eq!(grid.get(1, 2).kind, TileKind::Ice);
    }

    #[test]
    fn test_out_of_bounds_write_ignored() {
        let mut grid = TileGrid::new(4, 3);
        assert!(grid.set(4, 0, Tile::new(TileKind::Spike)).is_none());
        assert!(grid.set(-1, 0, Tile::new(TileKind::Spike)).is_none());
        assert_eq!(grid.tile_count(TileKind::Spike), 0);
    }

    #[test]
    fn test_intersects_neighborhood() {
        let mut grid = TileGrid::new(8, 8);
        grid.set(3, 3, Tile::new(TileKind::Block));
        grid.set(4, 3, Tile::new(TileKind::Spike));
        grid.set(6, 6, Tile::new(TileKind::Block));

        let hits = grid.intersects(&Aabb::new(3.5, 3.2, 0.6, 0.7));
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().any(|c| c.tile.kind == TileKind::Spike));

        // Flush against the block's top-left corner: no overlap
        let hits = grid.intersects(&Aabb::new(2.0, 2.5, 1.0, 0.5));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_intersects_reports_border_as_solid() {
        let grid = TileGrid::new(4, 4);
        let hits = grid.intersects(&Aabb::new(-0.2, 1.2, 0.5, 0.5));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tile, Tile::SOLID_SENTINEL);
        assert_eq!(hits[0].pos, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_find_first_is_row_major() {
        let mut grid = TileGrid::new(5, 5);
        grid.set(4, 1, Tile::new(TileKind::Begin));
        grid.set(0, 2, Tile::new(TileKind::Begin));
        assert_eq!(grid.find_first_of(TileKind::Begin), Some((4, 1)));
        assert_eq!(grid.find_first_of(TileKind::End), None);
    }

    proptest! {
        #[test]
        fn prop_out_of_bounds_reads_solid(
            w in 1i32..40, h in 1i32..40,
            x in -100i32..100, y in -100i32..100,
        ) {
            let grid = TileGrid::new(w, h);
            let tile = grid.get(x, y);
            if grid.in_bounds(x, y) {
                prop_assert!(tile.is_empty());
            } else {
                prop_assert!(tile.solid());
            }
        }
    }
}
