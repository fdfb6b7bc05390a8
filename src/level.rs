//! Levels and the textual level code
//!
//! A level code lists every cell in row-major order. An empty cell is `/`;
//! anything else is two digits of tile kind followed by one movement digit
//! (0 = stationary, 1..=4 = up, right, down, left). Cells that cannot be read
//! load as empty.

use serde::{Deserialize, Serialize};

use crate::consts::{LEVEL_HEIGHT, LEVEL_WIDTH};
use crate::error::LevelError;
use crate::sim::{Dir, Tile, TileGrid, TileKind};

/// Bytes in a non-empty cell
const CELL_LEN: usize = 3;
const EMPTY_CELL: u8 = b'/';

/// Published level information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMetadata {
    pub id: i32,
    pub author: String,
    pub title: String,
    pub description: String,
    /// Unix seconds
    pub created: i64,
    pub updated: i64,
}

/// A tile map plus optional published metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    grid: TileGrid,
    metadata: Option<LevelMetadata>,
}

impl Default for Level {
    fn default() -> Self {
        Self::new(LEVEL_WIDTH, LEVEL_HEIGHT)
    }
}

fn parse_cell(cell: &[u8]) -> Option<Tile> {
    if cell.len() != CELL_LEN || !cell.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let code = i32::from(cell[0] - b'0') * 10 + i32::from(cell[1] - b'0');
    let kind = TileKind::from_code(code)?;
    Some(Tile {
        kind,
        moving: Dir::from_moving_code(cell[2] - b'0'),
    })
}

impl Level {
    /// Empty level of the given size
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            grid: TileGrid::new(width, height),
            metadata: None,
        }
    }

    /// Decode a level code
    ///
    /// Only non-positive dimensions are an error. Malformed cells and cells
    /// missing from a short code become empty tiles.
    pub fn from_code(width: i32, height: i32, code: &str) -> Result<Self, LevelError> {
        if width <= 0 || height <= 0 {
            return Err(LevelError::InvalidDimensions { width, height });
        }

        let mut level = Self::new(width, height);
        let bytes = code.trim().as_bytes();
        let mut pos = 0;
        let mut malformed = 0usize;
        let mut missing = 0usize;

        for i in 0..width * height {
            if bytes.get(pos) == Some(&EMPTY_CELL) {
                pos += 1;
                continue;
            }
            let end = (pos + CELL_LEN).min(bytes.len());
            let cell = &bytes[pos..end];
            pos = end;

            if cell.is_empty() {
                missing += 1;
                continue;
            }
            match parse_cell(cell) {
                Some(tile) => {
                    level.grid.set(i % width, i / width, tile);
                }
                None => malformed += 1,
            }
        }

        if malformed > 0 {
            log::warn!("Level code has {} malformed cells; loaded as empty", malformed);
        }
        if missing > 0 {
            log::warn!("Level code is {} cells short; padded with empty tiles", missing);
        }
        if pos < bytes.len() {
            log::warn!("Ignoring {} trailing bytes in level code", bytes.len() - pos);
        }
        Ok(level)
    }

    /// Encode as a level code
    pub fn to_code(&self) -> String {
        let mut code = String::with_capacity(self.grid.tiles().len() * CELL_LEN);
        for tile in self.grid.tiles() {
            if tile.is_empty() {
                code.push(EMPTY_CELL as char);
            } else {
                let moving = tile.moving.map_or(0, Dir::moving_code);
                code.push_str(&format!("{:02}{}", tile.kind.code(), moving));
            }
        }
        code
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    pub fn metadata(&self) -> Option<&LevelMetadata> {
        self.metadata.as_ref()
    }

    pub fn set_metadata(&mut self, metadata: LevelMetadata) {
        self.metadata = Some(metadata);
    }

    pub fn clear_metadata(&mut self) {
        self.metadata = None;
    }

    /// Published id, or -1 for a local level
    pub fn id(&self) -> i32 {
        self.metadata.as_ref().map_or(-1, |m| m.id)
    }

    /// Playable: exactly one begin and one end tile
    pub fn is_valid(&self) -> bool {
        self.grid.tile_count(TileKind::Begin) == 1 && self.grid.tile_count(TileKind::End) == 1
    }

    /// First begin tile in row-major order
    pub fn start(&self) -> Option<(i32, i32)> {
        self.grid.find_first_of(TileKind::Begin)
    }

    /// Empty every cell and forget the metadata
    pub fn clear(&mut self) {
        self.grid = TileGrid::new(self.grid.width(), self.grid.height());
        self.metadata = None;
    }
}
