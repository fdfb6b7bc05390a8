//! JSON file persistence
//!
//! Writes go to a sibling `.tmp` file first and are renamed into place, so a
//! crash mid-write never leaves a half-written file behind. The previous file is
//! kept as `.bak`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ConfigError;

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Read and parse a JSON file
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Load a JSON file, falling back to `T::default()` on any failure
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    match load_json(path) {
        Ok(value) => {
            log::info!("Loaded {} from {}", what, path.display());
            value
        }
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No {} at {}, using defaults", what, path.display());
            T::default()
        }
        Err(e) => {
            log::warn!("Failed to load {} from {}: {}; using defaults", what, path.display(), e);
            T::default()
        }
    }
}

/// Serialize `value` as pretty JSON and move it into place
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = with_suffix(path, ".tmp");
    fs::write(&tmp, json)?;
    if path.exists() {
        fs::rename(path, with_suffix(path, ".bak"))?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
