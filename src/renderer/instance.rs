//! GPU-ready sprite instances

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// One textured quad. Position is the sprite center in tile units; a negative
/// scale component mirrors the sprite on that axis.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 2],
    pub scale: [f32; 2],
    /// Cell in the sprite atlas
    pub atlas_index: u32,
    pub _pad: u32,
}

impl SpriteInstance {
    pub fn new(position: Vec2, scale: Vec2, atlas_index: u32) -> Self {
        Self {
            position: position.to_array(),
            scale: scale.to_array(),
            atlas_index,
            _pad: 0,
        }
    }
}

/// Atlas layout
pub mod atlas {
    /// Tiles occupy the first cells, one per tile kind code
    pub const TILE_BASE: u32 = 0;
    /// Overlay arrow for moving tiles, one per direction
    pub const ARROW_BASE: u32 = 12;
    /// Player animation frames
    pub const PLAYER_BASE: u32 = 16;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 24);
        let inst = SpriteInstance::new(Vec2::new(1.5, 2.5), Vec2::new(-1.0, 1.0), 7);
        let bytes: &[u8] = bytemuck::bytes_of(&inst);
        assert_eq!(&bytes[0..4], &1.5f32.to_ne_bytes());
        assert_eq!(&bytes[16..20], &7u32.to_ne_bytes());
    }
}
