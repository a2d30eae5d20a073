//! Mixer — master gain and the final conversion to 16-bit PCM.

/// Full-scale output for a mix value of 1.0. Leaves headroom for several
/// voices summing before the hard clip.
pub const OUTPUT_SCALE: f64 = 16000.0;

/// Largest magnitude written to the output.
pub const CLIP_LIMIT: f64 = 32767.0;

/// Normalize a 0-127 parameter to [0, 1].
pub fn normalize_level(level: u8) -> f64 {
    level.min(127) as f64 / 127.0
}

/// Master stage for one stereo frame.
#[derive(Debug, Clone, Copy)]
pub struct Mixer {
    pub master_gain: f64,
}

impl Mixer {
    pub fn new(master_volume: u8) -> Self {
        Mixer {
            master_gain: normalize_level(master_volume),
        }
    }

    /// Apply master gain and convert to a clipped `i16` sample.
    pub fn output(&self, mix: f64) -> i16 {
        hard_clip(mix * self.master_gain * OUTPUT_SCALE)
    }
}

/// Clip to ±32767; never wraps.
fn hard_clip(x: f64) -> i16 {
    if x.is_nan() {
        return 0;
    }
    x.clamp(-CLIP_LIMIT, CLIP_LIMIT) as i16
}
