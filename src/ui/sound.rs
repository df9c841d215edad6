/// Sound engine: procedural beeps and jingles via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Scoring beeps are rate-limited to one per `BEEP_GAP`, so a bonus
/// tally sounds like a steady ticker and not a wall of noise.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::sim::event::GameEvent;

/// Minimum spacing between two scoring beeps.
pub const BEEP_GAP: Duration = Duration::from_millis(150);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cue {
    Beep,
    Crack,
    Die,
    Clear,
    ExtraLife,
}

/// Which sound, if any, an event makes.
pub fn cue_for(event: &GameEvent) -> Option<Cue> {
    match event {
        e if e.is_scoring() => Some(Cue::Beep),
        GameEvent::DeathFrame => Some(Cue::Beep),
        GameEvent::FloorCollapsed { .. } => Some(Cue::Crack),
        GameEvent::RunnerKilled { .. } => Some(Cue::Die),
        GameEvent::GoalReached => Some(Cue::Clear),
        GameEvent::ExtraLife { .. } => Some(Cue::ExtraLife),
        _ => None,
    }
}

/// Lets a beep through at most once per `BEEP_GAP`.
#[derive(Debug, Default)]
pub struct BeepLimiter {
    last: Cell<Option<Instant>>,
}

impl BeepLimiter {
    pub fn allow(&self, now: Instant) -> bool {
        match self.last.get() {
            Some(t) if now.duration_since(t) < BEEP_GAP => false,
            _ => {
                self.last.set(Some(now));
                true
            }
        }
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Cue;

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct Mixer {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_beep: Arc<Vec<u8>>,
        sfx_crack: Arc<Vec<u8>>,
        sfx_die: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_extra_life: Arc<Vec<u8>>,
    }

    impl Mixer {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(Mixer {
                _stream: stream,
                handle,
                sfx_beep: Arc::new(make_wav(&gen_beep())),
                sfx_crack: Arc::new(make_wav(&gen_crack())),
                sfx_die: Arc::new(make_wav(&gen_die())),
                sfx_clear: Arc::new(make_wav(&gen_clear())),
                sfx_extra_life: Arc::new(make_wav(&gen_extra_life())),
            })
        }

        pub fn play(&self, cue: Cue) {
            let buf = match cue {
                Cue::Beep => &self.sfx_beep,
                Cue::Crack => &self.sfx_crack,
                Cue::Die => &self.sfx_die,
                Cue::Clear => &self.sfx_clear,
                Cue::ExtraLife => &self.sfx_extra_life,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn tone(freq: f32, duration: f32, volume: f32) -> impl Iterator<Item = f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n).map(move |i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            (t * freq * 2.0 * std::f32::consts::PI).sin() * env * volume
        })
    }

    /// Terminal-bell style beep: short square-ish A5.
    fn gen_beep() -> Vec<f32> {
        let freq = 880.0_f32;
        let n = (SAMPLE_RATE as f32 * 0.05) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(2.0);
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (t * freq * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
                wave * env * 0.2
            })
            .collect()
    }

    /// Floor giving way: brief low noise burst.
    fn gen_crack() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.08) as usize;
        let mut rng: u32 = 12345;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                noise * (1.0 - t).powf(1.5) * 0.25
            })
            .collect()
    }

    /// Death: sad descending tone
    fn gen_die() -> Vec<f32> {
        [440.0_f32, 370.0, 311.0, 261.0] // A4→F#4→Eb4→C4
            .iter()
            .flat_map(|&f| tone(f, 0.12, 0.3))
            .collect()
    }

    /// Level clear: ascending fanfare with a held top note.
    fn gen_clear() -> Vec<f32> {
        let mut samples: Vec<f32> = [523.0_f32, 659.0, 784.0] // C5→E5→G5
            .iter()
            .flat_map(|&f| tone(f, 0.1, 0.3))
            .collect();
        samples.extend(tone(1047.0, 0.3, 0.3));
        samples
    }

    fn gen_extra_life() -> Vec<f32> {
        [(784.0_f32, 0.08), (1047.0, 0.08), (1568.0, 0.18)]
            .iter()
            .flat_map(|&(f, d)| tone(f, d, 0.3))
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&gen_beep());
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]) as usize;
            assert_eq!(wav.len(), 44 + data_size);
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API (plays nothing when the sound feature is off)
// ════════════════════════════════════════════════════════════

pub struct SoundEngine {
    #[cfg(feature = "sound")]
    mixer: inner::Mixer,
    beeps: BeepLimiter,
}

impl SoundEngine {
    /// `None` when no audio device is available.
    pub fn new() -> Option<Self> {
        Some(SoundEngine {
            #[cfg(feature = "sound")]
            mixer: inner::Mixer::new()?,
            beeps: BeepLimiter::default(),
        })
    }

    pub fn play_events(&self, events: &[GameEvent]) {
        let now = Instant::now();
        for cue in events.iter().filter_map(cue_for) {
            if cue == Cue::Beep && !self.beeps.allow(now) {
                continue;
            }
            self.play(cue);
        }
    }

    #[cfg(feature = "sound")]
    fn play(&self, cue: Cue) {
        self.mixer.play(cue);
    }

    #[cfg(not(feature = "sound"))]
    fn play(&self, _cue: Cue) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Pos;
    use crate::sim::session::GameOverCause;

    #[test]
    fn scoring_events_beep() {
        assert_eq!(cue_for(&GameEvent::BarrelJumped { pos: Pos::default() }), Some(Cue::Beep));
        assert_eq!(cue_for(&GameEvent::BonusTallied { points: 10 }), Some(Cue::Beep));
        assert_eq!(
            cue_for(&GameEvent::RunnerKilled { cause: GameOverCause::Spike }),
            Some(Cue::Die)
        );
        assert_eq!(cue_for(&GameEvent::BarrelSpawned { pos: Pos::default() }), None);
    }

    #[test]
    fn beeps_are_rate_limited() {
        let limiter = BeepLimiter::default();
        let t0 = Instant::now();
        assert!(limiter.allow(t0));
        assert!(!limiter.allow(t0 + Duration::from_millis(100)));
        assert!(limiter.allow(t0 + Duration::from_millis(160)));
    }
}
