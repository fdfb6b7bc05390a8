//! Error types for replays, level codes, and configuration files

use thiserror::Error;

/// Errors raised while encoding or decoding replays
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Buffer ends before the fixed-size header does
    #[error("replay truncated: need {expected} header bytes, got {found}")]
    Truncated { expected: usize, found: usize },

    /// Caller-provided output buffer cannot hold the encoded replay
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Text transport was not valid base64
    #[error("invalid base64 replay data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("replay I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while decoding a level code
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// Width or height is not positive
    #[error("invalid level dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
}

/// Errors raised while reading or writing JSON configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
