//! Mini-game sound using the Web Audio API
//!
//! Procedurally generated, no audio files.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Shard uncovered
    ShardFound,
    /// Round over
    RoundEnd,
}

/// Audio manager for the mini-game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
    muted: bool,
}

impl AudioManager {
    pub fn new(muted: bool) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: 0.3,
            muted,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn play(&self, effect: SoundEffect) {
        if self.muted || self.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers suspend the context until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::ShardFound => self.play_square(ctx, 440.0, 0.1),
            SoundEffect::RoundEnd => self.play_square(ctx, 880.0, 0.25),
        }
    }

    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Short square-wave blip
    fn play_square(&self, ctx: &AudioContext, freq: f32, secs: f64) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(self.volume, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + secs)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + secs).ok();
    }
}

impl Drop for AudioManager {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            // Returns a promise; nothing to wait for
            if ctx.close().is_err() {
                log::warn!("Failed to close AudioContext");
            }
        }
    }
}
