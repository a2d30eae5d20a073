//! Presets — snapshots of every voice and global parameter.
//!
//! A preset never includes the step grid. Presets live in numbered
//! in-memory slots on the engine and serialize to JSON:
//!
//! ```json
//! {
//!   "voices": [
//!     { "waveform": "square", "pitch": 60, "envelope": "pluck",
//!       "length": 50, "modulation": 64, "volume": 100 },
//!     ...
//!   ],
//!   "globals": { "tempo": 120, "swing": 0, "scale": 0,
//!                "transpose": 0, "master_volume": 100 }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PresetError;
use crate::params::{NUM_VOICES, SynthParams, VoiceParams};

/// Number of in-memory preset slots.
pub const NUM_PRESET_SLOTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preset {
    pub voices: [VoiceParams; NUM_VOICES],
    pub globals: SynthParams,
}

impl Preset {
    pub fn to_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a preset. Values are not clamped here; the engine clamps them
    /// when the preset is applied.
    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Fixed array of optional presets.
#[derive(Debug, Clone, Default)]
pub struct PresetSlots {
    slots: [Option<Preset>; NUM_PRESET_SLOTS],
}

impl PresetSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `preset` in `slot`; out-of-range slots are ignored.
    pub fn store(&mut self, slot: usize, preset: Preset) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) => {
                *s = Some(preset);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, slot: usize) -> Option<&Preset> {
        self.slots.get(slot)?.as_ref()
    }

    pub fn is_occupied(&self, slot: usize) -> bool {
        self.get(slot).is_some()
    }
}

/// Directory of preset files, one `slot-<n>.json` per slot.
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        PresetStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: usize) -> PathBuf {
        self.dir.join(format!("slot-{slot}.json"))
    }

    fn check_slot(slot: usize) -> Result<(), PresetError> {
        if slot >= NUM_PRESET_SLOTS {
            return Err(PresetError::SlotOutOfRange(slot));
        }
        Ok(())
    }

    pub fn save(&self, slot: usize, preset: &Preset) -> Result<PathBuf, PresetError> {
        Self::check_slot(slot)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| PresetError::io(&self.dir, e))?;
        let path = self.slot_path(slot);
        std::fs::write(&path, preset.to_json()?).map_err(|e| PresetError::io(&path, e))?;
        log::debug!("saved preset slot {slot} to {}", path.display());
        Ok(path)
    }

    pub fn load(&self, slot: usize) -> Result<Preset, PresetError> {
        Self::check_slot(slot)?;
        let path = self.slot_path(slot);
        if !path.exists() {
            return Err(PresetError::SlotEmpty(slot));
        }
        let json = std::fs::read_to_string(&path).map_err(|e| PresetError::io(&path, e))?;
        Preset::from_json(&json)
    }

    /// Write every occupied slot to disk.
    pub fn save_all(&self, slots: &PresetSlots) -> Result<usize, PresetError> {
        let mut written = 0;
        for slot in 0..NUM_PRESET_SLOTS {
            if let Some(preset) = slots.get(slot) {
                self.save(slot, preset)?;
                written += 1;
            }
        }
        Ok(written)
    }

    /// Read every slot file that exists. Files that fail to parse are
    /// skipped with a warning.
    pub fn load_all(&self) -> PresetSlots {
        let mut slots = PresetSlots::new();
        for slot in 0..NUM_PRESET_SLOTS {
            match self.load(slot) {
                Ok(preset) => {
                    slots.store(slot, preset);
                }
                Err(PresetError::SlotEmpty(_)) => {}
                Err(e) => log::warn!("failed to load preset slot {slot}: {e}"),
            }
        }
        slots
    }
}
