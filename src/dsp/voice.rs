//! Voice bank — runtime oscillator and envelope state for each voice.

use crate::params::{NUM_VOICES, VoiceParams};

/// Convert a MIDI note number to frequency, A4 (69) = 440 Hz.
pub fn midi_to_frequency(midi: i32) -> f64 {
    440.0 * (2.0_f64).powf((midi as f64 - 69.0) / 12.0)
}

fn transposed(note: u8, transpose: i8) -> u8 {
    (note as i32 + transpose as i32).clamp(0, 127) as u8
}

/// Runtime state of one voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceState {
    /// Oscillator phase in radians, [0, 2π).
    pub phase: f64,
    /// Current frequency in Hz.
    pub frequency: f64,
    /// Note sounding, after transpose.
    pub note: u8,
    /// Note as triggered, before transpose.
    pub base_note: u8,
    pub velocity: u8,
    /// Samples since trigger.
    pub env_ticks: u32,
    /// Note length that replaces the voice's own length for this trigger.
    pub length_override: Option<u8>,
    pub active: bool,
}

impl Default for VoiceState {
    fn default() -> Self {
        VoiceState {
            phase: 0.0,
            frequency: 440.0,
            note: 60,
            base_note: 60,
            velocity: 127,
            env_ticks: 0,
            length_override: None,
            active: false,
        }
    }
}

impl VoiceState {
    /// Note length in ms that governs expiry of the current note.
    pub fn effective_length(&self, params: &VoiceParams) -> u8 {
        self.length_override.unwrap_or(params.length)
    }
}

/// Fixed bank of voices indexed by voice number.
#[derive(Debug, Clone, Default)]
pub struct VoiceBank {
    voices: [VoiceState; NUM_VOICES],
}

impl VoiceBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, voice: usize) -> Option<&VoiceState> {
        self.voices.get(voice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoiceState> {
        self.voices.iter()
    }

    pub(crate) fn states_mut(&mut self) -> &mut [VoiceState; NUM_VOICES] {
        &mut self.voices
    }

    /// Start `base_note` shifted by `transpose`. Retriggering an active
    /// voice restarts it.
    pub fn trigger(
        &mut self,
        voice: usize,
        base_note: u8,
        transpose: i8,
        velocity: u8,
        length_override: Option<u8>,
    ) {
        let Some(v) = self.voices.get_mut(voice) else {
            return;
        };
        v.base_note = base_note.min(127);
        v.note = transposed(v.base_note, transpose);
        v.velocity = velocity.min(127);
        v.length_override = length_override.map(|l| l.min(127));
        v.active = true;
        v.phase = 0.0;
        v.env_ticks = 0;
        v.frequency = midi_to_frequency(v.note as i32);
    }

    /// Note-off: mark inactive, leave everything else alone.
    pub fn release(&mut self, voice: usize) {
        if let Some(v) = self.voices.get_mut(voice) {
            v.active = false;
        }
    }

    pub fn silence_all(&mut self) {
        for v in self.voices.iter_mut() {
            v.active = false;
        }
    }

    /// Recompute every voice's frequency under `transpose`. Sounding voices
    /// keep their triggered note; idle voices follow their pitch parameter.
    pub fn recompute_frequencies(&mut self, params: &[VoiceParams; NUM_VOICES], transpose: i8) {
        for (v, p) in self.voices.iter_mut().zip(params.iter()) {
            if v.active {
                v.note = transposed(v.base_note, transpose);
                v.frequency = midi_to_frequency(v.note as i32);
            } else {
                v.frequency = midi_to_frequency(p.pitch as i32 + transpose as i32);
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    pub fn is_active(&self, voice: usize) -> bool {
        self.voices.get(voice).is_some_and(|v| v.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert_eq!(midi_to_frequency(69), 440.0);
        assert_eq!(midi_to_frequency(81), 880.0);
        assert_eq!(midi_to_frequency(57), 220.0);
    }

    #[test]
    fn trigger_resets_state() {
        let mut bank = VoiceBank::new();
        bank.trigger(1, 69, 0, 127, None);
        {
            let v = bank.states_mut();
            v[1].phase = 2.0;
            v[1].env_ticks = 500;
        }
        bank.trigger(1, 81, 0, 100, Some(20));
        let v = bank.get(1).unwrap();
        assert!(v.active);
        assert_eq!(v.phase, 0.0);
        assert_eq!(v.env_ticks, 0);
        assert_eq!(v.frequency, 880.0);
        assert_eq!(v.velocity, 100);
        assert_eq!(v.length_override, Some(20));
        assert_eq!(bank.active_count(), 1);
    }

    #[test]
    fn release_keeps_other_state() {
        let mut bank = VoiceBank::new();
        bank.trigger(0, 69, 0, 127, None);
        bank.release(0);
        let v = bank.get(0).unwrap();
        assert!(!v.active);
        assert_eq!(v.frequency, 440.0);
        assert_eq!(v.note, 69);
    }

    #[test]
    fn out_of_range_voice_is_noop() {
        let mut bank = VoiceBank::new();
        bank.trigger(NUM_VOICES, 69, 0, 127, None);
        bank.release(NUM_VOICES + 3);
        assert_eq!(bank.active_count(), 0);
        assert!(!bank.is_active(NUM_VOICES));
    }

    #[test]
    fn recompute_applies_transpose_to_all_voices() {
        let mut bank = VoiceBank::new();
        let mut params = [VoiceParams::default(); NUM_VOICES];
        params[2].pitch = 57;
        bank.recompute_frequencies(&params, 12);
        assert_eq!(bank.get(2).unwrap().frequency, 440.0);
        assert!((bank.get(0).unwrap().frequency - midi_to_frequency(72)).abs() < 1e-9);
    }

    #[test]
    fn trigger_applies_transpose_and_clamps() {
        let mut bank = VoiceBank::new();
        bank.trigger(0, 57, 12, 127, None);
        let v = bank.get(0).unwrap();
        assert_eq!(v.base_note, 57);
        assert_eq!(v.note, 69);
        assert_eq!(v.frequency, 440.0);

        bank.trigger(1, 120, 12, 127, None);
        assert_eq!(bank.get(1).unwrap().note, 127);
    }

    #[test]
    fn recompute_keeps_sounding_notes() {
        let mut bank = VoiceBank::new();
        let params = [VoiceParams::default(); NUM_VOICES];
        bank.trigger(0, 72, 0, 127, None);
        bank.recompute_frequencies(&params, 0);
        assert_eq!(bank.get(0).unwrap().frequency, midi_to_frequency(72));
        assert_eq!(bank.get(1).unwrap().frequency, midi_to_frequency(60));

        bank.recompute_frequencies(&params, -3);
        assert_eq!(bank.get(0).unwrap().note, 69);
        assert_eq!(bank.get(0).unwrap().frequency, 440.0);
        assert_eq!(bank.get(0).unwrap().base_note, 72);
    }

    #[test]
    fn effective_length_prefers_override() {
        let params = VoiceParams::default();
        let mut state = VoiceState::default();
        assert_eq!(state.effective_length(&params), 50);
        state.length_override = Some(90);
        assert_eq!(state.effective_length(&params), 90);
    }
}
