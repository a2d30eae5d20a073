//! Parameter store — per-voice and global synthesis parameters.
//!
//! Every setter clamps its input into the documented range; clamping is the
//! whole error-handling policy. Out-of-range voice indices are ignored on
//! write and read back as zero.

use serde::{Deserialize, Serialize};

use crate::dsp::envelope::EnvelopeShape;
use crate::dsp::oscillator::Waveform;

/// Number of voices in the bank.
pub const NUM_VOICES: usize = 4;

pub const MIN_TEMPO: u16 = 60;
pub const MAX_TEMPO: u16 = 200;
pub const MAX_SCALE: u8 = 8;
pub const MAX_TRANSPOSE: i8 = 12;

/// Per-voice parameter ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceParam {
    Waveform,
    Pitch,
    Envelope,
    Length,
    Modulation,
    Volume,
}

impl VoiceParam {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(VoiceParam::Waveform),
            1 => Some(VoiceParam::Pitch),
            2 => Some(VoiceParam::Envelope),
            3 => Some(VoiceParam::Length),
            4 => Some(VoiceParam::Modulation),
            5 => Some(VoiceParam::Volume),
            _ => None,
        }
    }

    /// Whether writing this parameter changes any voice's frequency.
    pub fn affects_pitch(self) -> bool {
        matches!(self, VoiceParam::Pitch | VoiceParam::Waveform)
    }
}

/// Global parameter ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalParam {
    Tempo,
    Swing,
    Scale,
    Transpose,
    MasterVolume,
}

impl GlobalParam {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(GlobalParam::Tempo),
            1 => Some(GlobalParam::Swing),
            2 => Some(GlobalParam::Scale),
            3 => Some(GlobalParam::Transpose),
            4 => Some(GlobalParam::MasterVolume),
            _ => None,
        }
    }

    pub fn affects_pitch(self) -> bool {
        self == GlobalParam::Transpose
    }

    /// Whether writing this parameter changes the step period.
    pub fn affects_timing(self) -> bool {
        matches!(self, GlobalParam::Tempo | GlobalParam::Swing)
    }
}

/// Sound settings for one voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceParams {
    pub waveform: Waveform,
    /// MIDI note, 0-127.
    pub pitch: u8,
    pub envelope: EnvelopeShape,
    /// Note duration in milliseconds, 0-127.
    pub length: u8,
    /// Stored only; the renderer does not modulate yet.
    pub modulation: u8,
    pub volume: u8,
}

impl Default for VoiceParams {
    fn default() -> Self {
        VoiceParams {
            waveform: Waveform::Sine,
            pitch: 60,
            envelope: EnvelopeShape::Pluck,
            length: 50,
            modulation: 64,
            volume: 100,
        }
    }
}

/// Global synthesis settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthParams {
    /// Beats per minute, 60-200.
    pub tempo: u16,
    /// Stored only; step timing is currently straight.
    pub swing: u8,
    /// Stored only; 0-8.
    pub scale: u8,
    /// Semitones, -12..=12.
    pub transpose: i8,
    pub master_volume: u8,
}

impl Default for SynthParams {
    fn default() -> Self {
        SynthParams {
            tempo: 120,
            swing: 0,
            scale: 0,
            transpose: 0,
            master_volume: 100,
        }
    }
}

fn clamp_midi(value: i32) -> u8 {
    value.clamp(0, 127) as u8
}

/// Owns all voice parameters and the global parameters.
#[derive(Debug, Clone, Default)]
pub struct ParamStore {
    voices: [VoiceParams; NUM_VOICES],
    globals: SynthParams,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voice(&self, voice: usize) -> Option<&VoiceParams> {
        self.voices.get(voice)
    }

    pub fn voices(&self) -> &[VoiceParams; NUM_VOICES] {
        &self.voices
    }

    pub fn globals(&self) -> &SynthParams {
        &self.globals
    }

    /// Write one voice parameter, clamped. Returns `false` when the voice
    /// index is out of range and nothing was written.
    pub fn set_voice_param(&mut self, voice: usize, param: VoiceParam, value: i32) -> bool {
        let Some(v) = self.voices.get_mut(voice) else {
            return false;
        };
        match param {
            VoiceParam::Waveform => v.waveform = Waveform::from_index_clamped(value),
            VoiceParam::Pitch => v.pitch = clamp_midi(value),
            VoiceParam::Envelope => v.envelope = EnvelopeShape::from_index_clamped(value),
            VoiceParam::Length => v.length = clamp_midi(value),
            VoiceParam::Modulation => v.modulation = clamp_midi(value),
            VoiceParam::Volume => v.volume = clamp_midi(value),
        }
        true
    }

    pub fn get_voice_param(&self, voice: usize, param: VoiceParam) -> u8 {
        let Some(v) = self.voices.get(voice) else {
            return 0;
        };
        match param {
            VoiceParam::Waveform => v.waveform.index(),
            VoiceParam::Pitch => v.pitch,
            VoiceParam::Envelope => v.envelope.index(),
            VoiceParam::Length => v.length,
            VoiceParam::Modulation => v.modulation,
            VoiceParam::Volume => v.volume,
        }
    }

    pub fn set_global_param(&mut self, param: GlobalParam, value: i32) {
        let g = &mut self.globals;
        match param {
            GlobalParam::Tempo => {
                g.tempo = value.clamp(MIN_TEMPO as i32, MAX_TEMPO as i32) as u16;
            }
            GlobalParam::Swing => g.swing = clamp_midi(value),
            GlobalParam::Scale => g.scale = value.clamp(0, MAX_SCALE as i32) as u8,
            GlobalParam::Transpose => {
                let max = MAX_TRANSPOSE as i32;
                g.transpose = value.clamp(-max, max) as i8;
            }
            GlobalParam::MasterVolume => g.master_volume = clamp_midi(value),
        }
    }

    pub fn get_global_param(&self, param: GlobalParam) -> i32 {
        let g = &self.globals;
        match param {
            GlobalParam::Tempo => g.tempo as i32,
            GlobalParam::Swing => g.swing as i32,
            GlobalParam::Scale => g.scale as i32,
            GlobalParam::Transpose => g.transpose as i32,
            GlobalParam::MasterVolume => g.master_volume as i32,
        }
    }

    /// Replace every parameter, routing each value through the clamping
    /// setters.
    pub fn apply(&mut self, voices: &[VoiceParams; NUM_VOICES], globals: &SynthParams) {
        for (i, v) in voices.iter().enumerate() {
            self.set_voice_param(i, VoiceParam::Waveform, v.waveform.index() as i32);
            self.set_voice_param(i, VoiceParam::Pitch, v.pitch as i32);
            self.set_voice_param(i, VoiceParam::Envelope, v.envelope.index() as i32);
            self.set_voice_param(i, VoiceParam::Length, v.length as i32);
            self.set_voice_param(i, VoiceParam::Modulation, v.modulation as i32);
            self.set_voice_param(i, VoiceParam::Volume, v.volume as i32);
        }
        self.set_global_param(GlobalParam::Tempo, globals.tempo as i32);
        self.set_global_param(GlobalParam::Swing, globals.swing as i32);
        self.set_global_param(GlobalParam::Scale, globals.scale as i32);
        self.set_global_param(GlobalParam::Transpose, globals.transpose as i32);
        self.set_global_param(GlobalParam::MasterVolume, globals.master_volume as i32);
    }
}
