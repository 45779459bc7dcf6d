use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mayhem_core::emulator::PcmQueue;
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

/// Number of samples over which to fade in/out (~5.8 ms at 44.1 kHz).
const FADE_SAMPLES: u32 = 256;

pub const SAMPLE_RATE: i32 = 44_100;

pub(crate) struct AudioPlayer {
    pcm: PcmQueue,
    fade_in_pos: u32,
    fading_out: Arc<AtomicBool>,
    fade_out_pos: u32,
}

impl AudioPlayer {
    fn apply_fades(&mut self, out: &mut [i16]) {
        for sample in out.iter_mut() {
            let raw = *sample;
            if self.fade_in_pos < FADE_SAMPLES {
                // Ramp up from silence at startup
                let gain = self.fade_in_pos as f32 / FADE_SAMPLES as f32;
                *sample = (raw as f32 * gain) as i16;
                self.fade_in_pos += 1;
            } else if self.fading_out.load(Ordering::Relaxed) {
                // Ramp down to silence at shutdown
                if self.fade_out_pos < FADE_SAMPLES {
                    let gain = 1.0 - (self.fade_out_pos as f32 / FADE_SAMPLES as f32);
                    *sample = (raw as f32 * gain) as i16;
                    self.fade_out_pos += 1;
                } else {
                    *sample = 0;
                }
            }
        }
    }
}

impl AudioCallback for AudioPlayer {
    type Channel = i16;
    fn callback(&mut self, out: &mut [i16]) {
        if self.pcm.drain_into(out).is_err() {
            out.fill(0);
        }
        self.apply_fades(out);
    }
}

/// Handle for signalling the audio callback to fade out before shutdown.
pub type FadeOut = Arc<AtomicBool>;

/// Open mono 16-bit playback fed from `pcm`.
///
/// Returns the audio device (must be kept alive) and a fade-out signal for
/// clean shutdown. The device starts paused.
pub fn init(
    sdl_audio: &sdl2::AudioSubsystem,
    pcm: PcmQueue,
) -> Result<(AudioDevice<AudioPlayer>, FadeOut), String> {
    let fade_out: FadeOut = Arc::new(AtomicBool::new(false));

    let desired_spec = AudioSpecDesired {
        freq: Some(SAMPLE_RATE),
        channels: Some(1),
        samples: Some(512), // ~11.6 ms at 44100 Hz
    };

    let device = sdl_audio.open_playback(None, &desired_spec, |_spec| AudioPlayer {
        pcm,
        fade_in_pos: 0,
        fading_out: Arc::clone(&fade_out),
        fade_out_pos: 0,
    })?;

    Ok((device, fade_out))
}

/// Duration to sleep after signalling fade-out, allowing the callback
/// to ramp down before the device is paused.
pub fn fade_out_duration() -> std::time::Duration {
    std::time::Duration::from_millis(10)
}
