//! Bit packing for input frames and little-endian field helpers
//!
//! Each frame is six flags in the order left, right, jump, dash, up, down.
//! Four frames (24 bits) pack into three bytes, least significant bit first:
//! frame 0 takes bits 0..6 of byte 0, frame 1 takes bits 6..12, and so on.
//! A trailing partial group is zero-padded.

use crate::sim::InputState;

/// Frames stored per packed group
pub const FRAMES_PER_GROUP: usize = 4;
/// Bytes per packed group
pub const BYTES_PER_GROUP: usize = 3;
/// Bits used by one frame
pub const BITS_PER_FRAME: usize = 6;

/// Packed size in bytes of `frames` frames
pub fn packed_len(frames: usize) -> usize {
    frames.div_ceil(FRAMES_PER_GROUP) * BYTES_PER_GROUP
}

/// Append the packed form of `frames` to `out`
pub fn pack_frames(frames: &[InputState], out: &mut Vec<u8>) {
    out.reserve(packed_len(frames.len()));
    for group in frames.chunks(FRAMES_PER_GROUP) {
        let mut bits: u32 = 0;
        for (i, frame) in group.iter().enumerate() {
            bits |= u32::from(frame.to_bits()) << (i * BITS_PER_FRAME);
        }
        out.extend_from_slice(&bits.to_le_bytes()[..BYTES_PER_GROUP]);
    }
}

/// Unpack every whole group in `bytes`
///
/// Yields `floor(len / 3) * 4` frames; a trailing partial group is ignored.
pub fn unpack_frames(bytes: &[u8]) -> Vec<InputState> {
    let mut frames = Vec::with_capacity(bytes.len() / BYTES_PER_GROUP * FRAMES_PER_GROUP);
    for group in bytes.chunks_exact(BYTES_PER_GROUP) {
        let bits = u32::from_le_bytes([group[0], group[1], group[2], 0]);
        for i in 0..FRAMES_PER_GROUP {
            let flags = (bits >> (i * BITS_PER_FRAME)) & 0x3f;
            frames.push(InputState::from_bits(flags as u8));
        }
    }
    frames
}

// ── Field writers ───────────────────────────────────────────────

/// Write a little-endian i32 at `offset`
pub fn write_i32_le(buf: &mut [u8], offset: usize, v: i32) {
    buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
}

/// Write a little-endian f32 at `offset`
pub fn write_f32_le(buf: &mut [u8], offset: usize, v: f32) {
    buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
}

/// Write a NUL-terminated string into a fixed-width field, truncating to fit
pub fn write_fixed_str(buf: &mut [u8], offset: usize, width: usize, s: &str) {
    let field = &mut buf[offset..offset + width];
    field.fill(0);
    let mut len = s.len().min(width - 1);
    while !s.is_char_boundary(len) {
        len -= 1;
    }
    field[..len].copy_from_slice(&s.as_bytes()[..len]);
}

// ── Field readers ───────────────────────────────────────────────

/// Read a little-endian i32 at `offset`
pub fn read_i32_le(buf: &[u8], offset: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    i32::from_le_bytes(bytes)
}

/// Read a little-endian f32 at `offset`
pub fn read_f32_le(buf: &[u8], offset: usize) -> f32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    f32::from_le_bytes(bytes)
}

/// Read a fixed-width field up to its first NUL
pub fn read_fixed_str(buf: &[u8], offset: usize, width: usize) -> String {
    let field = &buf[offset..offset + width];
    let end = field.iter().position(|&b| b == 0).unwrap_or(width);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(bits: u8) -> InputState {
        InputState::from_bits(bits)
    }

    #[test]
    fn test_bit_layout() {
        // left on frame 0, right on frame 1, down on frame 3
        let frames = [frame(0b000001), frame(0b000010), frame(0), frame(0b100000)];
        let mut out = Vec::new();
        pack_frames(&frames, &mut out);
        assert_eq!(out, vec![0b1000_0001, 0b0000_0000, 0b1000_0000]);
    }

    #[test]
    fn test_partial_group_is_padded() {
        let frames = [frame(0b111111); 5];
        let mut out = Vec::new();
        pack_frames(&frames, &mut out);
        assert_eq!(out.len(), 6);
        assert_eq!(packed_len(5), 6);

        let decoded = unpack_frames(&out);
        assert_eq!(decoded.len(), 8);
        assert_eq!(&decoded[..5], &frames);
        assert!(decoded[5..].iter().all(|f| !f.any()));
    }

    #[test]
    fn test_short_payload_never_overreads() {
        assert!(unpack_frames(&[0xff, 0xff]).is_empty());
        assert_eq!(unpack_frames(&[0xff; 7]).len(), 8);
    }

    #[test]
    fn test_fixed_strings() {
        let mut buf = [0xaau8; 8];
        write_fixed_str(&mut buf, 0, 8, "overlong-name");
        assert_eq!(buf[7], 0);
        assert_eq!(read_fixed_str(&buf, 0, 8), "overlon");

        write_fixed_str(&mut buf, 0, 8, "ab");
        assert_eq!(read_fixed_str(&buf, 0, 8), "ab");
    }
}
