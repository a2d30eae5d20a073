//! Offline renderer — bounces the running pattern to PCM or WAV bytes.
//!
//! Drives a [`Synth`] the way a host loop would: one sequencer tick, then
//! one audio block, with the millisecond clock derived from the number of
//! frames rendered so far.

use crate::synth::Synth;

/// Frames per host block.
pub const AUDIO_BUFFER_SIZE: usize = 128;

/// Render `steps` sequencer steps from a fresh start. Returns interleaved
/// stereo `i16` samples. The transport is stopped afterwards.
pub fn render_steps_pcm(synth: &mut Synth, steps: usize) -> Vec<i16> {
    let sample_rate = synth.sample_rate() as u64;
    // One extra step so the last step that fires gets its full duration.
    let total_ms = synth.step_duration_ms() * (steps as u64 + 1);
    let total_frames = (total_ms * sample_rate / 1000) as usize;

    let mut pcm = vec![0i16; total_frames * 2];
    let mut block = [0i16; AUDIO_BUFFER_SIZE * 2];
    let mut rendered = 0usize;

    log::debug!("bouncing {steps} steps, {total_frames} frames");
    synth.start(0);
    while rendered < total_frames {
        let now_ms = rendered as u64 * 1000 / sample_rate;
        synth.update_sequencer(now_ms);

        let frames = AUDIO_BUFFER_SIZE.min(total_frames - rendered);
        let out = &mut block[..frames * 2];
        synth.process_audio(out);
        pcm[rendered * 2..(rendered + frames) * 2].copy_from_slice(out);
        rendered += frames;
    }
    synth.stop();

    pcm
}

/// Render `steps` sequencer steps to a 16-bit stereo WAV file as bytes.
pub fn render_steps_wav(synth: &mut Synth, steps: usize) -> Vec<u8> {
    let pcm = render_steps_pcm(synth, steps);
    encode_wav(&pcm, synth.sample_rate(), 2)
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
pub fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
