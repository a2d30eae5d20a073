pub mod config;
pub mod dsp;
pub mod error;
pub mod params;
pub mod preset;
pub mod sequencer;
pub mod synth;
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use config::EngineConfig;
pub use dsp::envelope::EnvelopeShape;
pub use dsp::oscillator::Waveform;
pub use error::PresetError;
pub use params::{GlobalParam, NUM_VOICES, SynthParams, VoiceParam, VoiceParams};
pub use preset::{NUM_PRESET_SLOTS, Preset, PresetStore};
pub use sequencer::{NUM_STEPS, SequencerStep, TransportState};
pub use synth::Synth;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the stepsynth-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: render `steps` steps of a single-voice pattern to WAV bytes.
/// `notes` holds one MIDI note per step; 0 leaves the step empty.
#[wasm_bindgen]
pub fn render_pattern_wav(notes: &[u8], sample_rate: u32) -> Vec<u8> {
    let mut synth = Synth::new(EngineConfig::default().with_sample_rate(sample_rate));
    for (step, &note) in notes.iter().take(NUM_STEPS).enumerate() {
        if note > 0 {
            synth.set_step(0, step, note, true);
        }
    }
    dsp::renderer::render_steps_wav(&mut synth, NUM_STEPS)
}
