//! Envelope shapes — gain as a function of ticks since trigger.

use serde::{Deserialize, Serialize};

/// Number of envelope shapes.
pub const NUM_ENVELOPES: u8 = 5;

/// Ticks per unit of normalized envelope time.
pub const ENVELOPE_TIME_CONSTANT: f64 = 1000.0;

/// Envelope shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeShape {
    /// Linear rise to full gain, then hold.
    Attack,
    /// Linear fall to silence, then hold.
    Decay,
    /// Fast exponential decay.
    #[default]
    Pluck,
    /// Hold for two time constants, then exponential decay.
    Long,
    /// Linear fall, same curve as `Decay`.
    Reverse,
}

impl EnvelopeShape {
    const ALL: [EnvelopeShape; NUM_ENVELOPES as usize] = [
        EnvelopeShape::Attack,
        EnvelopeShape::Decay,
        EnvelopeShape::Pluck,
        EnvelopeShape::Long,
        EnvelopeShape::Reverse,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn from_index_clamped(index: i32) -> Self {
        let clamped = index.clamp(0, NUM_ENVELOPES as i32 - 1);
        Self::ALL[clamped as usize]
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Gain in [0, 1] for `shape` after `ticks` samples.
pub fn envelope_gain(shape: EnvelopeShape, ticks: u32) -> f64 {
    let t = ticks as f64 / ENVELOPE_TIME_CONSTANT;
    match shape {
        EnvelopeShape::Attack => t.min(1.0),
        EnvelopeShape::Decay | EnvelopeShape::Reverse => (1.0 - t).max(0.0),
        EnvelopeShape::Pluck => (-3.0 * t).exp(),
        EnvelopeShape::Long => {
            if t < 2.0 {
                1.0
            } else {
                (-(t - 2.0)).exp()
            }
        }
    }
}

/// Gain by raw shape index. Unknown indices get a generic `exp(-2t)` decay.
pub fn envelope_gain_index(index: u8, ticks: u32) -> f64 {
    match EnvelopeShape::from_index(index) {
        Some(shape) => envelope_gain(shape, ticks),
        None => (-2.0 * ticks as f64 / ENVELOPE_TIME_CONSTANT).exp(),
    }
}

/// Number of samples a note of `length_ms` may sound before the renderer
/// expires it.
pub fn expiry_threshold(length_ms: u8, sample_rate: u32) -> u32 {
    (length_ms as u64 * sample_rate as u64 / 1000) as u32
}
