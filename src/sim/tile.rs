//! Tile kinds, movement directions, and tile predicates
//!
//! Numeric codes are the ones used by level codes: kind as two digits,
//! movement as one digit (0 = stationary, 1 = up, 2 = right, 3 = down, 4 = left).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Kind of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TileKind {
    #[default]
    Empty,
    /// Player spawn
    Begin,
    /// Goal
    End,
    Block,
    Ice,
    /// Solid, but cannot be wall-kicked off
    Black,
    /// Flips gravity when stood on
    Gravity,
    Spike,
    Ladder,
    /// Editor-only barrier that turns moving platforms around
    Stopper,
}

impl TileKind {
    /// All non-empty kinds in code order
    pub const ALL: [TileKind; 9] = [
        TileKind::Begin,
        TileKind::End,
        TileKind::Block,
        TileKind::Ice,
        TileKind::Black,
        TileKind::Gravity,
        TileKind::Spike,
        TileKind::Ladder,
        TileKind::Stopper,
    ];

    /// Level-code number of this kind (`Empty` is -1)
    pub fn code(self) -> i32 {
        match self {
            TileKind::Empty => -1,
            TileKind::Begin => 0,
            TileKind::End => 1,
            TileKind::Block => 2,
            TileKind::Ice => 3,
            TileKind::Black => 4,
            TileKind::Gravity => 5,
            TileKind::Spike => 6,
            TileKind::Ladder => 7,
            TileKind::Stopper => 8,
        }
    }

    /// Parse a level-code number. Editor tool codes and out-of-range values yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(TileKind::Empty),
            0..=8 => Some(Self::ALL[code as usize]),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::Empty => "empty",
            TileKind::Begin => "begin",
            TileKind::End => "end",
            TileKind::Block => "block",
            TileKind::Ice => "ice",
            TileKind::Black => "black",
            TileKind::Gravity => "gravity",
            TileKind::Spike => "spike",
            TileKind::Ladder => "ladder",
            TileKind::Stopper => "stopper",
        }
    }
}

/// Cardinal direction. Screen coordinates: +y points down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

impl Dir {
    /// Directions in table order (up, right, down, left)
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    /// Index into per-side tables
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Dir::Up => 0,
            Dir::Right => 1,
            Dir::Down => 2,
            Dir::Left => 3,
        }
    }

    pub fn mirror(self) -> Self {
        match self {
            Dir::Up => Dir::Down,
            Dir::Right => Dir::Left,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
        }
    }

    /// Level-code movement digit (1..=4)
    pub fn moving_code(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Parse a movement digit; 0 and unknown values mean stationary
    pub fn from_moving_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Dir::Up),
            2 => Some(Dir::Right),
            3 => Some(Dir::Down),
            4 => Some(Dir::Left),
            _ => None,
        }
    }

    /// Unit vector in screen space
    pub fn unit(self) -> Vec2 {
        match self {
            Dir::Up => Vec2::new(0.0, -1.0),
            Dir::Right => Vec2::new(1.0, 0.0),
            Dir::Down => Vec2::new(0.0, 1.0),
            Dir::Left => Vec2::new(-1.0, 0.0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Dir::Left | Dir::Right)
    }

    /// -1 for left, +1 otherwise
    pub fn x_sign(self) -> f32 {
        if self == Dir::Left { -1.0 } else { 1.0 }
    }
}

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Tile {
    pub kind: TileKind,
    /// Movement direction, `None` when stationary
    pub moving: Option<Dir>,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        kind: TileKind::Empty,
        moving: None,
    };

    /// Returned for every out-of-bounds lookup
    pub const SOLID_SENTINEL: Tile = Tile {
        kind: TileKind::Block,
        moving: None,
    };

    pub const fn new(kind: TileKind) -> Self {
        Self { kind, moving: None }
    }

    pub const fn moving(kind: TileKind, dir: Dir) -> Self {
        Self {
            kind,
            moving: Some(dir),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kind == TileKind::Empty
    }

    /// Kills the player on contact unless something solid is also touched
    #[inline]
    pub fn harmful(&self) -> bool {
        self.kind == TileKind::Spike
    }

    #[inline]
    pub fn solid(&self) -> bool {
        matches!(
            self.kind,
            TileKind::Block | TileKind::Gravity | TileKind::Ice | TileKind::Black | TileKind::Ladder
        )
    }

    #[inline]
    pub fn blocks_wallkicks(&self) -> bool {
        self.kind == TileKind::Black
    }

    /// Moving platforms bounce off these
    #[inline]
    pub fn blocks_moving_tiles(&self) -> bool {
        self.solid() || self.harmful() || self.kind == TileKind::Stopper
    }

    /// Can be part of a moving platform
    #[inline]
    pub fn movable(&self) -> bool {
        self.blocks_moving_tiles()
    }

    /// Drawn only in the editor
    #[inline]
    pub fn editor_only(&self) -> bool {
        self.kind == TileKind::Stopper
    }
}

/// A tile hit reported by an intersection query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Top-left corner of the tile in world units
    pub pos: Vec2,
    pub tile: Tile,
}

impl Contact {
    pub fn new(pos: Vec2, tile: Tile) -> Self {
        Self { pos, tile }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_round_trip() {
        for kind in TileKind::ALL {
            assert_eq!(TileKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(TileKind::from_code(-1), Some(TileKind::Empty));
        assert_eq!(TileKind::from_code(9), None);
        assert_eq!(TileKind::from_code(42), None);
    }

    #[test]
    fn test_predicates() {
        assert!(Tile::new(TileKind::Spike).harmful());
        assert!(!Tile::new(TileKind::Spike).solid());
        assert!(Tile::new(TileKind::Spike).blocks_moving_tiles());
        assert!(Tile::new(TileKind::Ladder).solid());
        assert!(Tile::new(TileKind::Black).blocks_wallkicks());
        assert!(!Tile::new(TileKind::Block).blocks_wallkicks());
        assert!(Tile::new(TileKind::Stopper).blocks_moving_tiles());
        assert!(!Tile::new(TileKind::Stopper).solid());
        assert!(Tile::new(TileKind::Stopper).editor_only());
        assert!(!Tile::new(TileKind::End).movable());
        assert!(!Tile::EMPTY.movable());
        assert!(Tile::SOLID_SENTINEL.solid());
    }

    #[test]
    fn test_dir_codes() {
        for dir in Dir::ALL {
            assert_eq!(Dir::from_moving_code(dir.moving_code()), Some(dir));
            assert_eq!(dir.mirror().mirror(), dir);
        }
        assert_eq!(Dir::from_moving_code(0), None);
        assert_eq!(Dir::Up.unit(), Vec2::new(0.0, -1.0));
    }
}
