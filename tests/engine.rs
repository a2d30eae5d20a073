//! Integration tests for the host contract: parameter store, sequencer,
//! renderer and preset slots driven together through `Synth`.

use stepsynth_core::dsp::renderer::render_steps_pcm;
use stepsynth_core::{
    EngineConfig, EnvelopeShape, GlobalParam, NUM_STEPS, NUM_VOICES, Preset, PresetStore, Synth,
    VoiceParam, Waveform,
};

const SR: u32 = 44100;

fn render(synth: &mut Synth, frames: usize) -> Vec<i16> {
    let mut buf = vec![0i16; frames * 2];
    synth.process_audio(&mut buf);
    buf
}

// ---------------------------------------------------------------------------
// Index containment
// ---------------------------------------------------------------------------

#[test]
fn out_of_range_indices_are_contained() {
    let mut synth = Synth::with_sample_rate(SR);
    for voice in [NUM_VOICES, NUM_VOICES + 1, usize::MAX] {
        synth.set_voice_param(voice, VoiceParam::Volume, 10);
        synth.trigger_voice(voice, 60, 127);
        synth.release_voice(voice);
        synth.set_step(voice, 0, 60, true);
        synth.toggle_step(voice, 0);
        assert_eq!(synth.get_voice_param(voice, VoiceParam::Volume), 0);
        assert!(!synth.is_step_active(voice, 0));
        assert!(!synth.is_voice_active(voice));
    }
    for step in [NUM_STEPS, NUM_STEPS + 7, usize::MAX] {
        synth.set_step(0, step, 60, true);
        synth.clear_step(0, step);
        assert!(!synth.is_step_active(0, step));
        assert!(synth.step(0, step).is_none());
    }
    assert_eq!(synth.voices().active_count(), 0);
    assert!((0..NUM_STEPS).all(|s| !synth.is_step_active(0, s)));
}

// ---------------------------------------------------------------------------
// Tick-then-render host loop
// ---------------------------------------------------------------------------

#[test]
fn host_loop_plays_the_pattern() {
    let mut synth = Synth::with_sample_rate(SR);
    synth.set_voice_param(2, VoiceParam::Waveform, Waveform::Triangle.index() as i32);
    synth.set_voice_param(2, VoiceParam::Length, 100);
    synth.set_step(2, 4, 64, true);
    synth.start(0);

    let block = 128usize;
    let mut now_ms = 0u64;
    let mut rendered = 0usize;
    let mut fired = Vec::new();
    let mut heard = false;
    while now_ms < 1000 {
        if let Some(step) = synth.update_sequencer(now_ms) {
            fired.push(step);
        }
        let out = render(&mut synth, block);
        heard |= out.iter().any(|&s| s != 0);
        rendered += block;
        now_ms = rendered as u64 * 1000 / SR as u64;
    }

    assert_eq!(&fired[..4], &[1, 2, 3, 4]);
    assert!(heard, "step 4 should have sounded");
}

#[test]
fn notes_expire_without_a_note_off() {
    let mut synth = Synth::with_sample_rate(SR);
    synth.set_voice_param(0, VoiceParam::Length, 20);
    synth.set_step(0, 1, 60, true);
    synth.start(0);
    synth.update_sequencer(125);
    assert!(synth.is_voice_active(0));

    // 20 ms = 882 samples
    render(&mut synth, 883);
    assert!(!synth.is_voice_active(0));
    assert!(synth.is_playing());
}

#[test]
fn stop_mid_note_is_silent_next_block() {
    let mut synth = Synth::with_sample_rate(SR);
    for v in 0..NUM_VOICES {
        synth.set_voice_param(v, VoiceParam::Waveform, Waveform::Noise.index() as i32);
        synth.set_voice_param(v, VoiceParam::Envelope, EnvelopeShape::Long.index() as i32);
        synth.set_voice_param(v, VoiceParam::Length, 127);
        synth.set_step(v, 1, 48 + v as u8, true);
    }
    synth.start(0);
    synth.update_sequencer(200);
    assert_eq!(synth.voices().active_count(), NUM_VOICES);
    assert!(render(&mut synth, 64).iter().any(|&s| s != 0));

    synth.stop();
    assert!(render(&mut synth, 256).iter().all(|&s| s == 0));
    assert_eq!(synth.update_sequencer(10_000), None);
}

#[test]
fn loud_mix_clips_instead_of_wrapping() {
    let mut synth = Synth::with_sample_rate(SR);
    synth.set_global_param(GlobalParam::MasterVolume, 127);
    for v in 0..NUM_VOICES {
        synth.set_voice_param(v, VoiceParam::Waveform, Waveform::Square.index() as i32);
        synth.set_voice_param(v, VoiceParam::Envelope, EnvelopeShape::Long.index() as i32);
        synth.set_voice_param(v, VoiceParam::Volume, 127);
        synth.set_voice_param(v, VoiceParam::Length, 127);
        synth.trigger_voice(v, 69, 127);
    }
    let out = render(&mut synth, 8);
    assert!(out.iter().all(|&s| s == 32767), "got {:?}", &out[..4]);
}

// ---------------------------------------------------------------------------
// Presets and configuration
// ---------------------------------------------------------------------------

#[test]
fn presets_survive_a_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = PresetStore::new(dir.path());

    let mut synth = Synth::with_sample_rate(SR);
    synth.set_voice_param(0, VoiceParam::Envelope, EnvelopeShape::Decay.index() as i32);
    synth.set_global_param(GlobalParam::Transpose, -7);
    synth.save_preset(1);
    store.save_all(synth.preset_slots()).unwrap();

    let mut other = Synth::with_sample_rate(SR);
    other.set_preset_slots(store.load_all());
    assert!(other.load_preset(1));
    assert_eq!(other.preset(), synth.preset());
    assert_eq!(other.get_global_param(GlobalParam::Transpose), -7);
}

#[test]
fn hand_edited_preset_is_clamped() {
    let json = r#"{
        "voices": [
            { "waveform": "saw", "pitch": 200, "envelope": "attack", "length": 255, "modulation": 0, "volume": 255 },
            { "waveform": "sine", "pitch": 60, "envelope": "pluck", "length": 50, "modulation": 64, "volume": 100 },
            { "waveform": "sine", "pitch": 60, "envelope": "pluck", "length": 50, "modulation": 64, "volume": 100 },
            { "waveform": "sine", "pitch": 60, "envelope": "pluck", "length": 50, "modulation": 64, "volume": 100 }
        ],
        "globals": { "tempo": 400, "swing": 0, "scale": 20, "transpose": -50, "master_volume": 90 }
    }"#;
    let preset = Preset::from_json(json).unwrap();
    let mut synth = Synth::with_sample_rate(SR);
    synth.apply_preset(&preset);

    assert_eq!(synth.get_voice_param(0, VoiceParam::Pitch), 127);
    assert_eq!(synth.get_voice_param(0, VoiceParam::Volume), 127);
    assert_eq!(synth.get_voice_param(0, VoiceParam::Waveform), Waveform::Saw.index());
    assert_eq!(synth.get_global_param(GlobalParam::Tempo), 200);
    assert_eq!(synth.get_global_param(GlobalParam::Scale), 8);
    assert_eq!(synth.get_global_param(GlobalParam::Transpose), -12);
}

#[test]
fn noise_seed_makes_bounces_reproducible() {
    let bounce = |seed: u32| {
        let config = EngineConfig::default().with_sample_rate(22050).with_noise_seed(seed);
        let mut synth = Synth::new(config);
        synth.set_voice_param(0, VoiceParam::Waveform, Waveform::Noise.index() as i32);
        synth.set_step(0, 1, 60, true);
        render_steps_pcm(&mut synth, 2)
    };
    assert_eq!(bounce(7), bounce(7));
    assert_ne!(bounce(7), bounce(8));
}
