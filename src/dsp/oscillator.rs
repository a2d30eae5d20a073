//! Waveform generation — maps an oscillator phase to a sample.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// Number of waveform kinds the parameter range advertises.
pub const NUM_WAVEFORMS: u8 = 15;

/// Supported waveform shapes.
///
/// Only `Sine`, `Triangle`, `Square`, `Noise` and `Saw` have their own
/// generators. `Ramp` and the wavetable slots resolve to a sine until
/// their tables exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Ramp,
    Triangle,
    Square,
    Noise,
    Saw,
    TableA,
    TableB,
    TableC,
    TableD,
    TableE,
    TableF,
    TableG,
    TableH,
    TableI,
}

impl Waveform {
    const ALL: [Waveform; NUM_WAVEFORMS as usize] = [
        Waveform::Sine,
        Waveform::Ramp,
        Waveform::Triangle,
        Waveform::Square,
        Waveform::Noise,
        Waveform::Saw,
        Waveform::TableA,
        Waveform::TableB,
        Waveform::TableC,
        Waveform::TableD,
        Waveform::TableE,
        Waveform::TableF,
        Waveform::TableG,
        Waveform::TableH,
        Waveform::TableI,
    ];

    /// Look up a waveform by its parameter index.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Look up a waveform, clamping the index into the advertised range.
    pub fn from_index_clamped(index: i32) -> Self {
        let clamped = index.clamp(0, NUM_WAVEFORMS as i32 - 1);
        Self::ALL[clamped as usize]
    }

    /// Parameter index of this waveform.
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Uniform white-noise source (xorshift32).
///
/// Lives on the engine so the renderer can draw noise samples without
/// touching a global RNG or allocating.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    state: u32,
}

impl NoiseSource {
    pub fn new(seed: u32) -> Self {
        // xorshift never leaves the all-zero state
        NoiseSource {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    /// Next sample, uniform in [-1, 1].
    pub fn next_sample(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as f64 / u32::MAX as f64) * 2.0 - 1.0
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        NoiseSource::new(0x1234_5678)
    }
}

/// Sample `waveform` at `phase` (radians, expected in [0, 2π)).
pub fn waveform_sample(waveform: Waveform, phase: f64, noise: &mut NoiseSource) -> f64 {
    match waveform {
        Waveform::Sine => phase.sin(),
        Waveform::Square => {
            if phase < PI {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Saw => 2.0 * phase / TAU - 1.0,
        Waveform::Triangle => {
            if phase < PI {
                2.0 * phase / PI - 1.0
            } else {
                3.0 - 2.0 * phase / PI
            }
        }
        Waveform::Noise => noise.next_sample(),
        _ => phase.sin(),
    }
}

/// Sample by raw waveform index; unknown indices play a sine.
pub fn waveform_sample_index(index: u8, phase: f64, noise: &mut NoiseSource) -> f64 {
    let waveform = Waveform::from_index(index).unwrap_or(Waveform::Sine);
    waveform_sample(waveform, phase, noise)
}

/// Advance `phase` by one sample at `frequency`, wrapped into [0, 2π).
pub fn advance_phase(phase: f64, frequency: f64, sample_rate: f64) -> f64 {
    let next = phase + TAU * frequency / sample_rate;
    if (0.0..TAU).contains(&next) {
        next
    } else {
        next.rem_euclid(TAU)
    }
}
