/// Sound engine: procedural chiptune effects via rodio.
///
/// Every effect is synthesized into an in-memory WAV buffer at start-up and
/// played fire-and-forget. Game events pick the effect (`Sfx::for_event`).
///
/// Without the "sound" feature the engine is a stub that plays nothing.

use crate::sim::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Sfx {
    Coin,
    Jump,
    DoubleJump,
    Dash,
    Throw,
    Stomp,
    Slam,
    BossHit,
    Die,
    Clear,
    BossDown,
}

impl Sfx {
    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    pub const ALL: [Sfx; 11] = [
        Sfx::Coin, Sfx::Jump, Sfx::DoubleJump, Sfx::Dash, Sfx::Throw, Sfx::Stomp,
        Sfx::Slam, Sfx::BossHit, Sfx::Die, Sfx::Clear, Sfx::BossDown,
    ];

    pub fn for_event(event: &GameEvent) -> Option<Sfx> {
        Some(match event {
            GameEvent::CoinCollected { .. } => Sfx::Coin,
            GameEvent::Jumped | GameEvent::WallJumped => Sfx::Jump,
            GameEvent::DoubleJumped => Sfx::DoubleJump,
            GameEvent::Dashed => Sfx::Dash,
            GameEvent::ProjectileThrown => Sfx::Throw,
            GameEvent::EnemyStomped { .. } | GameEvent::EnemyDefeated { .. } => Sfx::Stomp,
            GameEvent::GroundSlam { .. } => Sfx::Slam,
            GameEvent::BossHit { .. } => Sfx::BossHit,
            GameEvent::PlayerKilled => Sfx::Die,
            GameEvent::LevelExitReached => Sfx::Clear,
            GameEvent::BossDefeated => Sfx::BossDown,
            GameEvent::DecoyDropped | GameEvent::SlowMotion { .. } | GameEvent::BossCharge => return None,
        })
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: HashMap<Sfx, Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };
            let buffers = Sfx::ALL
                .iter()
                .map(|&sfx| (sfx, Arc::new(make_wav(&synth(sfx)))))
                .collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let buf = match self.buffers.get(&sfx) {
                Some(b) => b,
                None => return,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }
    }

    fn synth(sfx: Sfx) -> Vec<f32> {
        match sfx {
            Sfx::Coin => notes(&[1047.0, 1319.0, 1568.0], 0.045, 0.25),
            Sfx::Jump => sweep(300.0, 700.0, 0.10, 0.22),
            Sfx::DoubleJump => sweep(500.0, 1100.0, 0.09, 0.22),
            Sfx::Dash => noise(0.10, 900.0, 300.0, 0.25),
            Sfx::Throw => sweep(1400.0, 900.0, 0.06, 0.18),
            Sfx::Stomp => sweep(420.0, 120.0, 0.09, 0.3),
            Sfx::Slam => noise(0.22, 220.0, 60.0, 0.35),
            Sfx::BossHit => notes(&[196.0, 147.0], 0.07, 0.3),
            Sfx::Die => notes(&[440.0, 370.0, 311.0, 261.0], 0.12, 0.3),
            Sfx::Clear => notes(&[523.0, 659.0, 784.0, 1047.0], 0.1, 0.3),
            Sfx::BossDown => notes(&[392.0, 523.0, 659.0, 784.0, 1047.0, 1319.0], 0.11, 0.3),
        }
    }

    /// A run of short notes with a 3rd harmonic for a square-ish edge.
    fn notes(freqs: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * note_dur) as usize;
        let mut out = Vec::with_capacity(n * freqs.len());
        for &freq in freqs {
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5) * 0.7;
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                out.push(wave * env * volume);
            }
        }
        out
    }

    /// Linear pitch glide with a fade-out.
    fn sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let k = i as f32 / n as f32;
                phase += (from + (to - from) * k) * TAU / SAMPLE_RATE as f32;
                phase.sin() * (1.0 - k) * volume
            })
            .collect()
    }

    /// Noise burst mixed with a falling tone.
    fn noise(duration: f32, from: f32, to: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 0x9e37_79b9;
        let tone = sweep(from, to, duration, 1.0);
        (0..n)
            .map(|i| {
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let white = (rng >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
                let env = (1.0 - i as f32 / n as f32).powf(0.8);
                (tone.get(i).copied().unwrap_or(0.0) * 0.4 + white * 0.6 * env) * volume
            })
            .collect()
    }

    /// 16-bit mono PCM WAV.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let data_size = samples.len() as u32 * 2;
        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
        buf.extend_from_slice(&2u16.to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            buf.extend_from_slice(&((s.clamp(-1.0, 1.0) * 32767.0) as i16).to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn every_effect_synthesizes_a_valid_wav() {
            for sfx in Sfx::ALL {
                let samples = synth(sfx);
                assert!(!samples.is_empty(), "{sfx:?}");
                assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 1.0), "{sfx:?}");
                let wav = make_wav(&samples);
                assert_eq!(&wav[0..4], b"RIFF");
                assert_eq!(wav.len(), 44 + samples.len() * 2);
            }
        }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}

/// Play whatever the frame's events call for.
pub fn play_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for effect in events.iter().filter_map(Sfx::for_event) {
        sfx.play(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosmetic_events_are_silent() {
        assert_eq!(Sfx::for_event(&GameEvent::DecoyDropped), None);
        assert_eq!(Sfx::for_event(&GameEvent::SlowMotion { active: true }), None);
    }

    #[test]
    fn combat_events_have_sounds() {
        assert_eq!(Sfx::for_event(&GameEvent::BossHit { hp: 3 }), Some(Sfx::BossHit));
        assert_eq!(Sfx::for_event(&GameEvent::PlayerKilled), Some(Sfx::Die));
        assert_eq!(Sfx::for_event(&GameEvent::CoinCollected { x: 0, y: 0 }), Some(Sfx::Coin));
    }
}
