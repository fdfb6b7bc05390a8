//! Input replays
//!
//! A replay is a header plus one input frame per fixed 10 ms tick. The binary
//! form is the 84-byte header followed by the packed frames (see [`codec`]).
//! Because frames pack four to a group, decoding can yield up to three
//! trailing all-false padding frames; the header's duration records how many
//! frames were actually played.

pub mod codec;
pub mod header;

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub use header::{HEADER_SIZE, MAX_USER_LEN, ReplayHeader};

use crate::consts::TIMESTEP;
use crate::error::ReplayError;
use crate::sim::InputState;

/// A recorded run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Replay {
    header: ReplayHeader,
    frames: Vec<InputState>,
    /// Frame count recovered from a decoded header, if shorter than `frames`
    recorded: Option<usize>,
}

impl Replay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> &ReplayHeader {
        &self.header
    }

    /// Append one tick of input
    pub fn push(&mut self, input: InputState) {
        if let Some(n) = self.recorded.take() {
            self.frames.truncate(n);
        }
        self.frames.push(input);
    }

    /// Drop every frame, keeping the metadata
    pub fn clear(&mut self) {
        self.frames.clear();
        self.recorded = None;
    }

    /// Input for tick `step`, if it was recorded
    pub fn frame(&self, step: usize) -> Option<InputState> {
        if step < self.recorded_len() {
            self.frames.get(step).copied()
        } else {
            None
        }
    }

    /// Every decoded frame, including any trailing padding
    pub fn frames(&self) -> &[InputState] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of ticks actually recorded
    pub fn recorded_len(&self) -> usize {
        self.recorded.unwrap_or(self.frames.len())
    }

    /// Duration in seconds
    pub fn time(&self) -> f32 {
        self.recorded_len() as f32 * TIMESTEP
    }

    pub fn version(&self) -> &str {
        &self.header.version
    }

    pub fn user(&self) -> &str {
        &self.header.user
    }

    /// Set the user name, truncated to what the header can hold
    pub fn set_user(&mut self, user: &str) {
        let mut len = user.len().min(MAX_USER_LEN);
        while !user.is_char_boundary(len) {
            len -= 1;
        }
        self.header.user = user[..len].to_string();
    }

    pub fn level_id(&self) -> i32 {
        self.header.level_id
    }

    pub fn set_level_id(&mut self, id: i32) {
        self.header.level_id = id;
    }

    pub fn created(&self) -> i32 {
        self.header.created
    }

    pub fn set_created(&mut self, created: i32) {
        self.header.created = created;
    }

    /// Stamp the current wall-clock time
    pub fn set_created_now(&mut self) {
        self.header.created = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i32)
            .unwrap_or(0);
    }

    pub fn alt(&self) -> bool {
        self.header.alt
    }

    pub fn set_alt(&mut self, alt: bool) {
        self.header.alt = alt;
    }

    /// Encoded size in bytes
    pub fn serial_size(&self) -> usize {
        HEADER_SIZE + codec::packed_len(self.recorded_len())
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut header = self.header.clone();
        header.time = self.time();

        let mut out = Vec::with_capacity(self.serial_size());
        out.extend_from_slice(&header.encode());
        codec::pack_frames(&self.frames[..self.recorded_len()], &mut out);
        out
    }

    /// Encode into a caller-provided buffer, returning the bytes written
    pub fn serialize_into(&self, buf: &mut [u8]) -> Result<usize, ReplayError> {
        let needed = self.serial_size();
        if buf.len() < needed {
            return Err(ReplayError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }
        buf[..needed].copy_from_slice(&self.serialize());
        Ok(needed)
    }

    pub fn deserialize(buf: &[u8]) -> Result<Self, ReplayError> {
        let header = ReplayHeader::decode(buf)?;
        let frames = codec::unpack_frames(&buf[HEADER_SIZE..]);

        let recorded = if header.time.is_finite() && header.time >= 0.0 {
            ((header.time / TIMESTEP).round() as usize).min(frames.len())
        } else {
            log::warn!("Replay header has invalid duration {}; playing every frame", header.time);
            frames.len()
        };
        if recorded + codec::FRAMES_PER_GROUP <= frames.len() {
            log::warn!(
                "Replay holds {} frames but its header records only {}",
                frames.len(),
                recorded
            );
        }

        Ok(Self {
            header,
            frames,
            recorded: Some(recorded),
        })
    }

    /// Standard base64 (with padding) of the binary form
    pub fn serialize_b64(&self) -> String {
        STANDARD.encode(self.serialize())
    }

    pub fn deserialize_b64(text: &str) -> Result<Self, ReplayError> {
        let bytes = STANDARD.decode(text.trim())?;
        Self::deserialize(&bytes)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ReplayError> {
        fs::write(path, self.serialize())?;
        log::info!("Saved replay ({} frames) to {}", self.recorded_len(), path.display());
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ReplayError> {
        let bytes = fs::read(path)?;
        Self::deserialize(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(n: usize) -> Replay {
        let mut replay = Replay::new();
        replay.set_user("tester");
        replay.set_level_id(12);
        replay.set_created(1_700_000_000);
        for i in 0..n {
            replay.push(InputState::from_bits((i * 7 % 64) as u8));
        }
        replay
    }

    #[test]
    fn test_serial_size() {
        assert_eq!(sample(0).serial_size(), 84);
        assert_eq!(sample(1).serial_size(), 87);
        assert_eq!(sample(4).serial_size(), 87);
        assert_eq!(sample(5).serial_size(), 90);
        assert_eq!(sample(5).serialize().len(), 90);
    }

    #[test]
    fn test_recorded_length_survives_padding() {
        let replay = sample(5);
        let decoded = Replay::deserialize(&replay.serialize()).unwrap();
        assert_eq!(decoded.len(), 8);
        assert_eq!(decoded.recorded_len(), 5);
        assert_eq!(decoded.frame(4), replay.frame(4));
        assert_eq!(decoded.frame(5), None);
        assert!((decoded.time() - 0.05).abs() < 1e-6);
        assert_eq!(decoded.user(), "tester");
        assert_eq!(decoded.level_id(), 12);
        assert_eq!(decoded.created(), 1_700_000_000);

        // Re-encoding is stable
        assert_eq!(decoded.serialize(), replay.serialize());
    }

    #[test]
    fn test_serialize_into_checks_size() {
        let replay = sample(9);
        let mut small = [0u8; 90];
        assert!(matches!(
            replay.serialize_into(&mut small),
            Err(ReplayError::BufferTooSmall { needed: 93, .. })
        ));
        let mut big = [0u8; 128];
        assert_eq!(replay.serialize_into(&mut big).unwrap(), 93);
        assert_eq!(&big[..93], replay.serialize().as_slice());
    }

    #[test]
    fn test_truncated_header() {
        let bytes = sample(3).serialize();
        assert!(matches!(
            Replay::deserialize(&bytes[..40]),
            Err(ReplayError::Truncated { .. })
        ));
    }

    #[test]
    fn test_short_payload_yields_fewer_frames() {
        let bytes = sample(8).serialize();
        let decoded = Replay::deserialize(&bytes[..bytes.len() - 1]).unwrap();
        assert_eq!(decoded.len(), 4);
        assert_eq!(decoded.recorded_len(), 4);
    }

    #[test]
    fn test_base64_round_trip() {
        let replay = sample(13);
        let text = replay.serialize_b64();
        let decoded = Replay::deserialize_b64(&text).unwrap();
        assert_eq!(decoded.recorded_len(), 13);
        assert_eq!(&decoded.frames()[..13], replay.frames());

        assert!(matches!(
            Replay::deserialize_b64("not base64!"),
            Err(ReplayError::Base64(_))
        ));
    }

    #[test]
    fn test_user_name_truncated() {
        let mut replay = Replay::new();
        replay.set_user(&"x".repeat(100));
        assert_eq!(replay.user().len(), MAX_USER_LEN);
        let decoded = Replay::deserialize(&replay.serialize()).unwrap();
        assert_eq!(decoded.user().len(), MAX_USER_LEN);
    }

    #[test]
    fn test_push_after_decode_drops_padding() {
        let mut decoded = Replay::deserialize(&sample(5).serialize()).unwrap();
        decoded.push(InputState::default());
        assert_eq!(decoded.len(), 6);
        assert_eq!(decoded.recorded_len(), 6);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("tilerunner-replay-{}.bin", std::process::id()));
        let replay = sample(21);
        replay.save_to_file(&path).unwrap();
        let loaded = Replay::load_from_file(&path).unwrap();
        assert_eq!(loaded.serialize(), replay.serialize());
        std::fs::remove_file(&path).unwrap();
    }

    proptest! {
        #[test]
        fn prop_round_trip_pads_with_empty_frames(bits in prop::collection::vec(0u8..64, 0..200)) {
            let mut replay = Replay::new();
            for &b in &bits {
                replay.push(InputState::from_bits(b));
            }
            let decoded = Replay::deserialize(&replay.serialize()).unwrap();
            let n = bits.len();

            prop_assert_eq!(decoded.len(), n.div_ceil(4) * 4);
            prop_assert_eq!(decoded.recorded_len(), n);
            prop_assert_eq!(&decoded.frames()[..n], replay.frames());
            prop_assert!(decoded.frames()[n..].iter().all(|f| !f.any()));
        }
    }
}
