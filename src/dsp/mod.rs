//! DSP — waveform and envelope generators, the voice bank, the master
//! mix stage and the offline renderer.
//!
//! Everything on the per-sample path works on fixed-size state and never
//! allocates.

pub mod envelope;
pub mod mixer;
pub mod oscillator;
pub mod renderer;
pub mod voice;
