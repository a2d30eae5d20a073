//! Synth — the engine aggregate the host drives.
//!
//! Owns the parameter store, voice bank, sequencer and preset slots. The
//! host calls [`Synth::update_sequencer`] at control rate and
//! [`Synth::process_audio`] at audio rate from the same context; `&mut self`
//! on both keeps the voice bank single-writer.
//!
//! Nothing in here logs; the host wrappers and the preset store do.

use crate::config::EngineConfig;
use crate::dsp::envelope::{envelope_gain, expiry_threshold};
use crate::dsp::mixer::{Mixer, normalize_level};
use crate::dsp::oscillator::{NoiseSource, advance_phase, waveform_sample};
use crate::dsp::voice::{VoiceBank, VoiceState};
use crate::params::{GlobalParam, NUM_VOICES, ParamStore, SynthParams, VoiceParam, VoiceParams};
use crate::preset::{Preset, PresetSlots};
use crate::sequencer::{Sequencer, SequencerStep, StepGrid, TransportState};

pub struct Synth {
    config: EngineConfig,
    params: ParamStore,
    voices: VoiceBank,
    sequencer: Sequencer,
    presets: PresetSlots,
    noise: NoiseSource,
}

impl Default for Synth {
    fn default() -> Self {
        Synth::new(EngineConfig::default())
    }
}

impl Synth {
    pub fn new(config: EngineConfig) -> Self {
        let config = config.with_sample_rate(config.sample_rate);
        let params = ParamStore::new();
        let globals = *params.globals();
        let mut voices = VoiceBank::new();
        voices.recompute_frequencies(params.voices(), globals.transpose);
        Synth {
            config,
            params,
            voices,
            sequencer: Sequencer::new(globals.tempo, globals.swing),
            presets: PresetSlots::new(),
            noise: NoiseSource::new(config.noise_seed),
        }
    }

    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Synth::new(EngineConfig::default().with_sample_rate(sample_rate))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    pub fn voices(&self) -> &VoiceBank {
        &self.voices
    }

    pub fn voice_state(&self, voice: usize) -> Option<&VoiceState> {
        self.voices.get(voice)
    }

    pub fn grid(&self) -> &StepGrid {
        self.sequencer.grid()
    }

    // ── Parameters ──────────────────────────────────────────

    pub fn set_voice_param(&mut self, voice: usize, param: VoiceParam, value: i32) {
        if self.params.set_voice_param(voice, param, value) && param.affects_pitch() {
            self.update_voice_frequencies();
        }
    }

    pub fn get_voice_param(&self, voice: usize, param: VoiceParam) -> u8 {
        self.params.get_voice_param(voice, param)
    }

    /// Raw-id form for hosts that address parameters by number. Unknown ids
    /// are ignored.
    pub fn set_voice_param_raw(&mut self, voice: usize, param: u8, value: i32) {
        if let Some(param) = VoiceParam::from_index(param) {
            self.set_voice_param(voice, param, value);
        }
    }

    pub fn get_voice_param_raw(&self, voice: usize, param: u8) -> u8 {
        VoiceParam::from_index(param).map_or(0, |p| self.get_voice_param(voice, p))
    }

    pub fn set_global_param(&mut self, param: GlobalParam, value: i32) {
        self.params.set_global_param(param, value);
        if param.affects_pitch() {
            self.update_voice_frequencies();
        }
        if param.affects_timing() {
            self.update_step_duration();
        }
    }

    pub fn get_global_param(&self, param: GlobalParam) -> i32 {
        self.params.get_global_param(param)
    }

    pub fn set_global_param_raw(&mut self, param: u8, value: i32) {
        if let Some(param) = GlobalParam::from_index(param) {
            self.set_global_param(param, value);
        }
    }

    pub fn get_global_param_raw(&self, param: u8) -> i32 {
        GlobalParam::from_index(param).map_or(0, |p| self.get_global_param(p))
    }

    pub fn set_tempo(&mut self, bpm: i32) {
        self.set_global_param(GlobalParam::Tempo, bpm);
    }

    pub fn tempo(&self) -> u16 {
        self.params.globals().tempo
    }

    fn update_voice_frequencies(&mut self) {
        let transpose = self.params.globals().transpose;
        self.voices.recompute_frequencies(self.params.voices(), transpose);
    }

    fn update_step_duration(&mut self) {
        let SynthParams { tempo, swing, .. } = *self.params.globals();
        self.sequencer.recompute_timing(tempo, swing);
    }

    // ── Voices ──────────────────────────────────────────────

    /// Start `note` on `voice`, restarting it if already sounding. The note
    /// sounds as given; later transpose changes shift it.
    pub fn trigger_voice(&mut self, voice: usize, note: u8, velocity: u8) {
        self.voices.trigger(voice, note, 0, velocity, None);
    }

    pub fn release_voice(&mut self, voice: usize) {
        self.voices.release(voice);
    }

    pub fn is_voice_active(&self, voice: usize) -> bool {
        self.voices.is_active(voice)
    }

    // ── Pattern grid ────────────────────────────────────────

    pub fn set_step(&mut self, voice: usize, step: usize, note: u8, active: bool) {
        self.sequencer.grid_mut().set(voice, step, note, active);
    }

    pub fn clear_step(&mut self, voice: usize, step: usize) {
        self.sequencer.grid_mut().clear(voice, step);
    }

    pub fn toggle_step(&mut self, voice: usize, step: usize) {
        self.sequencer.grid_mut().toggle(voice, step);
    }

    pub fn is_step_active(&self, voice: usize, step: usize) -> bool {
        self.sequencer.grid().is_active(voice, step)
    }

    pub fn step(&self, voice: usize, step: usize) -> Option<SequencerStep> {
        self.sequencer.grid().get(voice, step).copied()
    }

    pub fn set_step_velocity(&mut self, voice: usize, step: usize, velocity: i32) {
        self.sequencer.grid_mut().set_velocity(voice, step, velocity);
    }

    pub fn set_step_length(&mut self, voice: usize, step: usize, length: Option<i32>) {
        self.sequencer.grid_mut().set_length(voice, step, length);
    }

    pub fn clear_pattern(&mut self) {
        self.sequencer.grid_mut().clear_all();
    }

    // ── Transport ───────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64) {
        self.sequencer.start(now_ms);
    }

    /// Stop the transport and silence every voice before returning.
    pub fn stop(&mut self) {
        self.sequencer.stop();
        self.voices.silence_all();
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.is_playing()
    }

    pub fn transport(&self) -> TransportState {
        self.sequencer.state()
    }

    pub fn current_step(&self) -> usize {
        self.sequencer.current_step()
    }

    /// Step duration in milliseconds at the current tempo.
    pub fn step_duration_ms(&self) -> u64 {
        self.sequencer.step_duration()
    }

    /// Control-rate tick. Triggers the voices of the new step when a step
    /// boundary has elapsed; returns that step.
    pub fn update_sequencer(&mut self, now_ms: u64) -> Option<usize> {
        let step = self.sequencer.tick(now_ms)?;
        let transpose = self.params.globals().transpose;
        for (voice, cell) in self.sequencer.grid().column(step) {
            self.voices.trigger(voice, cell.note, transpose, cell.velocity, cell.length);
        }
        Some(step)
    }

    // ── Audio ───────────────────────────────────────────────

    /// Fill `buffer` with interleaved stereo frames (`buffer.len() / 2`).
    /// A trailing odd sample is written as silence.
    pub fn process_audio(&mut self, buffer: &mut [i16]) {
        let sample_rate = self.config.sample_rate;
        let sr = sample_rate as f64;
        let mixer = Mixer::new(self.params.globals().master_volume);
        let params: &[VoiceParams; NUM_VOICES] = self.params.voices();
        let mut thresholds = [0u32; NUM_VOICES];
        for (t, (state, p)) in thresholds.iter_mut().zip(self.voices.iter().zip(params.iter())) {
            *t = expiry_threshold(state.effective_length(p), sample_rate);
        }

        let mut frames = buffer.chunks_exact_mut(2);
        for frame in &mut frames {
            let mut mix = 0.0;
            for (state, p) in self.voices.iter().zip(params.iter()) {
                if !state.active {
                    continue;
                }
                let sample = waveform_sample(p.waveform, state.phase, &mut self.noise);
                mix += sample * envelope_gain(p.envelope, state.env_ticks) * normalize_level(p.volume);
            }

            let out = mixer.output(mix);
            frame[0] = out;
            frame[1] = out;

            for (i, state) in self.voices.states_mut().iter_mut().enumerate() {
                state.phase = advance_phase(state.phase, state.frequency, sr);
                state.env_ticks = state.env_ticks.saturating_add(1);
                if state.active && state.env_ticks > thresholds[i] {
                    state.active = false;
                }
            }
        }
        for sample in frames.into_remainder() {
            *sample = 0;
        }
    }

    // ── Presets ─────────────────────────────────────────────

    /// Snapshot all voice and global parameters.
    pub fn preset(&self) -> Preset {
        Preset {
            voices: *self.params.voices(),
            globals: *self.params.globals(),
        }
    }

    /// Apply `preset` through the clamping setters.
    pub fn apply_preset(&mut self, preset: &Preset) {
        self.params.apply(&preset.voices, &preset.globals);
        self.update_voice_frequencies();
        self.update_step_duration();
    }

    /// Save the current parameters to `slot`. Out-of-range slots are ignored.
    pub fn save_preset(&mut self, slot: usize) {
        let preset = self.preset();
        self.presets.store(slot, preset);
    }

    /// Restore parameters from `slot`. Returns `false` and changes nothing
    /// when the slot is out of range or empty.
    pub fn load_preset(&mut self, slot: usize) -> bool {
        let Some(preset) = self.presets.get(slot).copied() else {
            return false;
        };
        self.apply_preset(&preset);
        true
    }

    pub fn preset_slots(&self) -> &PresetSlots {
        &self.presets
    }

    /// Replace all slots, e.g. with the result of
    /// [`crate::preset::PresetStore::load_all`].
    pub fn set_preset_slots(&mut self, slots: PresetSlots) {
        self.presets = slots;
    }
}
