//! Fixed 84-byte replay header
//!
//! Layout (little-endian, C struct order):
//!
//! | offset | size | field      |
//! |-------:|-----:|------------|
//! | 0      | 12   | `version`  |
//! | 12     | 4    | `level_id` |
//! | 16     | 4    | `created`  |
//! | 20     | 59   | `user`     |
//! | 79     | 1    | `alt`      |
//! | 80     | 4    | `time`     |

use serde::{Deserialize, Serialize};

use super::codec::{
    read_f32_le, read_fixed_str, read_i32_le, write_f32_le, write_fixed_str, write_i32_le,
};
use crate::error::ReplayError;

/// Encoded header size in bytes
pub const HEADER_SIZE: usize = 84;

const VERSION_OFFSET: usize = 0;
const VERSION_LEN: usize = 12;
const LEVEL_ID_OFFSET: usize = 12;
const CREATED_OFFSET: usize = 16;
const USER_OFFSET: usize = 20;
const USER_LEN: usize = 59;
const ALT_OFFSET: usize = 79;
const TIME_OFFSET: usize = 80;

/// Longest user name that fits the header (one byte is the terminator)
pub const MAX_USER_LEN: usize = USER_LEN - 1;

/// Replay metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayHeader {
    /// Version of the game that recorded the run
    pub version: String,
    pub level_id: i32,
    /// Creation time, seconds since the Unix epoch
    pub created: i32,
    pub user: String,
    /// Recorded with the alternate control scheme
    pub alt: bool,
    /// Duration in seconds
    pub time: f32,
}

impl Default for ReplayHeader {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            level_id: -1,
            created: 0,
            user: String::new(),
            alt: false,
            time: 0.0,
        }
    }
}

impl ReplayHeader {
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        write_fixed_str(&mut buf, VERSION_OFFSET, VERSION_LEN, &self.version);
        write_i32_le(&mut buf, LEVEL_ID_OFFSET, self.level_id);
        write_i32_le(&mut buf, CREATED_OFFSET, self.created);
        write_fixed_str(&mut buf, USER_OFFSET, USER_LEN, &self.user);
        buf[ALT_OFFSET] = u8::from(self.alt);
        write_f32_le(&mut buf, TIME_OFFSET, self.time);
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ReplayError> {
        if buf.len() < HEADER_SIZE {
            return Err(ReplayError::Truncated {
                expected: HEADER_SIZE,
                found: buf.len(),
            });
        }
        Ok(Self {
            version: read_fixed_str(buf, VERSION_OFFSET, VERSION_LEN),
            level_id: read_i32_le(buf, LEVEL_ID_OFFSET),
            created: read_i32_le(buf, CREATED_OFFSET),
            user: read_fixed_str(buf, USER_OFFSET, USER_LEN),
            alt: buf[ALT_OFFSET] != 0,
            time: read_f32_le(buf, TIME_OFFSET),
        })
    }
}
