//! Contact classification, touching state, and squeeze detection
//!
//! The player resolves against the union of static and moving tiles. What is
//! touching on each side is re-probed every tick from thin strips just outside
//! the hitbox; nothing here is persisted between ticks.

use super::aabb::Aabb;
use super::grid::TileGrid;
use super::platform::{MovingTile, PlatformSet};
use super::player::PlayerState;
use super::tile::{Contact, Dir, Tile, TileKind};

/// Largest gap (in tiles) between closing vertical surfaces that still crushes
const CRUSH_GAP: f32 = 0.9;

/// Summary of a set of overlapping tiles
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContactReport {
    /// First solid tile; `Some` means the move is blocked
    pub blocker: Option<Contact>,
    /// Something harmful was touched
    pub harmful: bool,
    /// The goal tile was touched
    pub goal: bool,
}

impl ContactReport {
    /// Harmful contact with nothing solid to stand on kills
    pub fn lethal(&self) -> bool {
        self.harmful && self.blocker.is_none()
    }
}

pub fn classify(contacts: &[Contact]) -> ContactReport {
    ContactReport {
        blocker: contacts.iter().find(|c| c.tile.solid()).copied(),
        harmful: contacts.iter().any(|c| c.tile.harmful()),
        goal: contacts.iter().any(|c| c.tile.kind == TileKind::End),
    }
}

/// Static and moving tiles overlapping an area
pub fn merged_contacts(
    grid: &TileGrid,
    platforms: &PlatformSet,
    aabb: &Aabb,
) -> Vec<Contact> {
    let mut contacts = grid.intersects(aabb);
    contacts.extend(platforms.intersects(aabb));
    contacts
}

/// What surrounds the player on each side
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adjacency {
    /// Tiles touching each side, indexed by `Dir::index`
    pub touching: [Vec<Contact>; 4],
    /// First solid moving tile on each side
    pub platforms: [Option<MovingTile>; 4],
}

impl Adjacency {
    /// Probe around the player's current position
    pub fn probe(player: &PlayerState, grid: &TileGrid, platforms: &PlatformSet) -> Self {
        let mut adj = Self::default();
        for side in Dir::ALL {
            let probe = player.probe(side);
            let platform = platforms
                .intersects_raw(&probe)
                .into_iter()
                .find(|m| m.tile.solid());

            let mut touching = grid.intersects(&probe);
            if let Some(m) = &platform {
                touching.push(Contact::new(m.pos, m.tile));
            }

            adj.touching[side.index()] = touching;
            adj.platforms[side.index()] = platform;
        }
        adj
    }

    pub fn touching(&self, side: Dir) -> &[Contact] {
        &self.touching[side.index()]
    }

    pub fn platform(&self, side: Dir) -> Option<&MovingTile> {
        self.platforms[side.index()].as_ref()
    }

    pub fn touching_any(&self, side: Dir, pred: impl Fn(&Tile) -> bool) -> bool {
        self.touching(side).iter().any(|c| pred(&c.tile))
    }

    /// Solid on this side and no platform there moving along the side's axis
    fn static_side(&self, side: Dir) -> bool {
        let still = match self.platform(side) {
            None => true,
            Some(m) if side.is_horizontal() => m.vel.x == 0.0,
            Some(m) => m.vel.y == 0.0,
        };
        still && self.touching_any(side, Tile::solid)
    }

    /// Platform on this side moving toward the player
    fn closing_platform(&self, side: Dir) -> Option<&MovingTile> {
        self.platform(side).filter(|m| match side {
            Dir::Left => m.vel.x > 0.0,
            Dir::Right => m.vel.x < 0.0,
            Dir::Up => m.vel.y > 0.0,
            Dir::Down => m.vel.y < 0.0,
        })
    }

    /// Pinched between opposing surfaces with at least one platform closing in
    ///
    /// Horizontal pinches kill on contact. Vertical pinches also require the
    /// gap between the two surfaces to be under `CRUSH_GAP`.
    pub fn is_squeezed(&self) -> bool {
        let left_static = self.static_side(Dir::Left);
        let right_static = self.static_side(Dir::Right);
        let left_closing = self.closing_platform(Dir::Left).is_some();
        let right_closing = self.closing_platform(Dir::Right).is_some();

        if (left_static && right_closing)
            || (left_closing && right_static)
            || (left_closing && right_closing)
        {
            return true;
        }

        let up_static = self.static_side(Dir::Up);
        let down_static = self.static_side(Dir::Down);
        let up = self.closing_platform(Dir::Up);
        let down = self.closing_platform(Dir::Down);

        match (up, down) {
            (Some(up), Some(down)) => (up.pos.y + 1.0 - down.pos.y).abs() < CRUSH_GAP,
            (None, Some(down)) if up_static => self
                .touching(Dir::Up)
                .iter()
                .filter(|c| c.tile.solid())
                .any(|c| (c.pos.y + 1.0 - down.pos.y).abs() < CRUSH_GAP),
            (Some(up), None) if down_static => self
                .touching(Dir::Down)
                .iter()
                .filter(|c| c.tile.solid())
                .any(|c| (c.pos.y - (up.pos.y + 1.0)).abs() < CRUSH_GAP),
            _ => false,
        }
    }

    /// One-line description for death reports
    pub fn describe(&self) -> String {
        Dir::ALL
            .iter()
            .map(|&side| {
                let kinds: Vec<&str> = self
                    .touching(side)
                    .iter()
                    .map(|c| c.tile.kind.as_str())
                    .collect();
                let platform = self
                    .platform(side)
                    .map(|m| format!(" platform vel=({:.2}, {:.2})", m.vel.x, m.vel.y))
                    .unwrap_or_default();
                format!("{:?}: [{}]{}", side, kinds.join(", "), platform)
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn contact(x: f32, y: f32, kind: TileKind) -> Contact {
        Contact::new(Vec2::new(x, y), Tile::new(kind))
    }

    fn platform(x: f32, y: f32, vel: Vec2) -> MovingTile {
        MovingTile {
            tile: Tile::new(TileKind::Block),
            pos: Vec2::new(x, y),
            last_pos: Vec2::new(x, y),
            vel,
        }
    }

    fn with_platform(adj: &mut Adjacency, side: Dir, m: MovingTile) {
        adj.touching[side.index()].push(Contact::new(m.pos, m.tile));
        adj.platforms[side.index()] = Some(m);
    }

    #[test]
    fn test_classify_contacts() {
        let report = classify(&[contact(0.0, 0.0, TileKind::Spike)]);
        assert!(report.lethal());

        let report = classify(&[
            contact(0.0, 0.0, TileKind::Spike),
            contact(1.0, 0.0, TileKind::Block),
        ]);
        assert!(!report.lethal());
        assert_eq!(report.blocker.map(|c| c.pos.x), Some(1.0));

        let report = classify(&[contact(0.0, 0.0, TileKind::End)]);
        assert!(report.goal);
        assert!(report.blocker.is_none());
        assert!(!report.lethal());
    }

    #[test]
    fn test_static_corridor_never_squeezes() {
        let mut adj = Adjacency::default();
        adj.touching[Dir::Left.index()].push(contact(4.0, 5.0, TileKind::Block));
        adj.touching[Dir::Right.index()].push(contact(6.0, 5.0, TileKind::Block));
        adj.touching[Dir::Up.index()].push(contact(5.0, 4.0, TileKind::Block));
        adj.touching[Dir::Down.index()].push(contact(5.0, 6.0, TileKind::Block));
        assert!(!adj.is_squeezed());
    }

    #[test]
    fn test_horizontal_squeeze_against_wall() {
        let mut adj = Adjacency::default();
        adj.touching[Dir::Left.index()].push(contact(4.0, 5.0, TileKind::Block));
        with_platform(&mut adj, Dir::Right, platform(5.9, 5.0, Vec2::new(-2.0, 0.0)));
        assert!(adj.is_squeezed());
    }

    #[test]
    fn test_receding_platform_does_not_squeeze() {
        let mut adj = Adjacency::default();
        adj.touching[Dir::Left.index()].push(contact(4.0, 5.0, TileKind::Block));
        with_platform(&mut adj, Dir::Right, platform(5.9, 5.0, Vec2::new(2.0, 0.0)));
        assert!(!adj.is_squeezed());
    }

    #[test]
    fn test_two_closing_platforms_squeeze() {
        let mut adj = Adjacency::default();
        with_platform(&mut adj, Dir::Left, platform(4.1, 5.0, Vec2::new(2.0, 0.0)));
        with_platform(&mut adj, Dir::Right, platform(5.9, 5.0, Vec2::new(-2.0, 0.0)));
        assert!(adj.is_squeezed());
    }

    #[test]
    fn test_vertical_squeeze_requires_small_gap() {
        // Ceiling tile at y=4 (bottom edge 5), rising platform below
        let mut adj = Adjacency::default();
        adj.touching[Dir::Up.index()].push(contact(5.0, 4.0, TileKind::Block));
        with_platform(&mut adj, Dir::Down, platform(5.0, 5.7, Vec2::new(0.0, -2.0)));
        assert!(adj.is_squeezed());

        let mut adj = Adjacency::default();
        adj.touching[Dir::Up.index()].push(contact(5.0, 4.0, TileKind::Block));
        with_platform(&mut adj, Dir::Down, platform(5.0, 6.0, Vec2::new(0.0, -2.0)));
        assert!(!adj.is_squeezed());
    }

    #[test]
    fn test_descending_platform_onto_floor() {
        let mut adj = Adjacency::default();
        adj.touching[Dir::Down.index()].push(contact(5.0, 7.0, TileKind::Block));
        with_platform(&mut adj, Dir::Up, platform(5.0, 5.3, Vec2::new(0.0, 2.0)));
        assert!(adj.is_squeezed());
    }

    #[test]
    fn test_vertical_pair_of_platforms() {
        let mut adj = Adjacency::default();
        with_platform(&mut adj, Dir::Up, platform(5.0, 4.0, Vec2::new(0.0, 2.0)));
        with_platform(&mut adj, Dir::Down, platform(5.0, 5.8, Vec2::new(0.0, -2.0)));
        assert!(adj.is_squeezed());
    }

    #[test]
    fn test_horizontal_platform_counts_as_static_vertically() {
        // Platform above slides sideways; platform below rises into the gap
        let mut adj = Adjacency::default();
        with_platform(&mut adj, Dir::Up, platform(5.0, 4.0, Vec2::new(2.0, 0.0)));
        with_platform(&mut adj, Dir::Down, platform(5.0, 5.75, Vec2::new(0.0, -2.0)));
        assert!(adj.is_squeezed());
    }
}
