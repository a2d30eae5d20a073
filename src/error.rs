//! Error types for preset and configuration I/O.
//!
//! The real-time engine itself never fails; these errors only come from
//! serialization and filesystem access at the edges.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresetError {
    /// Reading or writing a preset file failed.
    #[error("preset I/O failed for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid preset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("preset slot {0} is out of range")]
    SlotOutOfRange(usize),

    #[error("preset slot {0} is empty")]
    SlotEmpty(usize),
}

impl PresetError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PresetError::Io {
            path: path.into(),
            source,
        }
    }
}
