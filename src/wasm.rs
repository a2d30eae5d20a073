//! Browser host surface.
//!
//! Parameter ids are the raw numbers a UI sends; unknown ids are ignored
//! just like out-of-range voice or step indices.
//!
//! Transport and preset calls are logged here rather than in the engine, so
//! `process_audio` and `update_sequencer` never reach a logger.

use wasm_bindgen::prelude::*;

use crate::config::EngineConfig;
use crate::preset::Preset;
use crate::synth::Synth;

#[wasm_bindgen]
pub struct WasmSynth {
    inner: Synth,
}

#[wasm_bindgen]
impl WasmSynth {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: u32) -> WasmSynth {
        WasmSynth {
            inner: Synth::new(EngineConfig::default().with_sample_rate(sample_rate)),
        }
    }

    pub fn set_voice_param(&mut self, voice: usize, param: u8, value: i32) {
        self.inner.set_voice_param_raw(voice, param, value);
    }

    pub fn get_voice_param(&self, voice: usize, param: u8) -> u8 {
        self.inner.get_voice_param_raw(voice, param)
    }

    pub fn set_global_param(&mut self, param: u8, value: i32) {
        self.inner.set_global_param_raw(param, value);
    }

    pub fn get_global_param(&self, param: u8) -> i32 {
        self.inner.get_global_param_raw(param)
    }

    pub fn set_tempo(&mut self, bpm: i32) {
        self.inner.set_tempo(bpm);
    }

    pub fn trigger_voice(&mut self, voice: usize, note: u8, velocity: u8) {
        self.inner.trigger_voice(voice, note, velocity);
    }

    pub fn release_voice(&mut self, voice: usize) {
        self.inner.release_voice(voice);
    }

    pub fn set_step(&mut self, voice: usize, step: usize, note: u8, active: bool) {
        self.inner.set_step(voice, step, note, active);
    }

    pub fn clear_step(&mut self, voice: usize, step: usize) {
        self.inner.clear_step(voice, step);
    }

    pub fn toggle_step(&mut self, voice: usize, step: usize) {
        self.inner.toggle_step(voice, step);
    }

    pub fn is_step_active(&self, voice: usize, step: usize) -> bool {
        self.inner.is_step_active(voice, step)
    }

    /// `now_ms` comes from `performance.now()`.
    pub fn start(&mut self, now_ms: f64) {
        self.inner.start(now_ms.max(0.0) as u64);
        log::debug!("transport start at {now_ms} ms, tempo {}", self.inner.tempo());
    }

    pub fn stop(&mut self) {
        self.inner.stop();
        log::debug!("transport stop");
    }

    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    pub fn current_step(&self) -> usize {
        self.inner.current_step()
    }

    /// Returns the step that fired, or -1.
    pub fn update_sequencer(&mut self, now_ms: f64) -> i32 {
        self.inner
            .update_sequencer(now_ms.max(0.0) as u64)
            .map_or(-1, |s| s as i32)
    }

    pub fn process_audio(&mut self, buffer: &mut [i16]) {
        self.inner.process_audio(buffer);
    }

    pub fn save_preset(&mut self, slot: usize) {
        self.inner.save_preset(slot);
        log::debug!("saved preset slot {slot}");
    }

    pub fn load_preset(&mut self, slot: usize) -> bool {
        let loaded = self.inner.load_preset(slot);
        log::debug!("load preset slot {slot}: {loaded}");
        loaded
    }

    /// Current parameters as a plain JS object.
    pub fn export_preset(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.preset())
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    /// Apply a preset given as a JS object.
    pub fn import_preset(&mut self, value: JsValue) -> Result<(), JsValue> {
        let preset: Preset =
            serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.inner.apply_preset(&preset);
        Ok(())
    }

    /// Apply a preset given as JSON text.
    pub fn import_preset_json(&mut self, json: &str) -> Result<(), JsValue> {
        let preset = Preset::from_json(json).map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.inner.apply_preset(&preset);
        Ok(())
    }
}
