//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::PresetError;

/// Reference output rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Construction-time settings for a [`crate::synth::Synth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Seed for the noise waveform.
    pub noise_seed: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            noise_seed: 0x1234_5678,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate.max(1);
        self
    }

    pub fn with_noise_seed(mut self, seed: u32) -> Self {
        self.noise_seed = seed;
        self
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        Ok(config.with_sample_rate(config.sample_rate))
    }
}
