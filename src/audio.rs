//! Audio collaborator
//!
//! Maps game events to short procedurally generated beeps and drives the
//! background music from an explicit periodic tick. Sound goes out through the
//! Web Audio API on wasm32; native builds only log what would play.

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

#[cfg(target_arch = "wasm32")]
impl From<Waveform> for OscillatorType {
    fn from(waveform: Waveform) -> Self {
        match waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        }
    }
}

/// A single beep: one oscillator with a linear fade-out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub freq: f32,
    /// Seconds
    pub duration: f64,
    pub waveform: Waveform,
    pub gain: f32,
}

/// Effect gain
const SFX_GAIN: f32 = 0.12;
/// Background note gain
const BGM_GAIN: f32 = 0.045;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    Collision,
    /// Score milestone
    LevelUp,
    /// Day/night switch
    Cycle,
    GameOver,
}

impl SoundEffect {
    /// Effect for an event, if it has one
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jump => Some(SoundEffect::Jump),
            GameEvent::Collision { .. } => Some(SoundEffect::Collision),
            GameEvent::Milestone { .. } => Some(SoundEffect::LevelUp),
            GameEvent::Cycle { .. } => Some(SoundEffect::Cycle),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::RunStarted { .. }
            | GameEvent::NewHighScore { .. }
            | GameEvent::SoundToggled { .. } => None,
        }
    }

    pub fn cue(&self) -> SoundCue {
        let (freq, duration, waveform) = match self {
            SoundEffect::Jump => (880.0, 0.14, Waveform::Square),
            SoundEffect::Collision => (100.0, 0.22, Waveform::Sawtooth),
            SoundEffect::LevelUp => (1320.0, 0.10, Waveform::Triangle),
            SoundEffect::Cycle => (500.0, 0.16, Waveform::Triangle),
            SoundEffect::GameOver => (200.0, 0.4, Waveform::Triangle),
        };
        SoundCue {
            freq,
            duration,
            waveform,
            gain: SFX_GAIN,
        }
    }
}

/// Looping background pattern, rooted on a low 96 Hz drone
pub const BGM_PATTERN: [f32; 8] = [96.0, 96.0, 144.0, 128.0, 96.0, 108.0, 128.0, 72.0];
/// Seconds per pattern step
pub const BGM_STEP_SECS: f64 = 0.4;

/// Periodic background-music tick
///
/// Owned by the audio side and fed wall-clock seconds; it is independent of
/// the simulation's frame stepping.
#[derive(Debug, Clone)]
pub struct BgmSequencer {
    pattern: Vec<f32>,
    step_secs: f64,
    elapsed: f64,
    index: usize,
    started: bool,
}

impl Default for BgmSequencer {
    fn default() -> Self {
        Self::new(BGM_PATTERN.to_vec(), BGM_STEP_SECS)
    }
}

impl BgmSequencer {
    pub fn new(pattern: Vec<f32>, step_secs: f64) -> Self {
        Self {
            pattern,
            step_secs: step_secs.max(0.01),
            elapsed: 0.0,
            index: 0,
            started: false,
        }
    }

    /// Rewind to the first note; the next tick plays it immediately
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.index = 0;
        self.started = false;
    }

    /// Advance by `dt_secs` and return the cues due in that span
    pub fn tick(&mut self, dt_secs: f64) -> Vec<SoundCue> {
        let mut due = Vec::new();
        if self.pattern.is_empty() || !dt_secs.is_finite() || dt_secs < 0.0 {
            return due;
        }
        if !self.started {
            self.started = true;
            due.push(self.note());
        }
        self.elapsed += dt_secs;
        while self.elapsed >= self.step_secs {
            self.elapsed -= self.step_secs;
            self.index = (self.index + 1) % self.pattern.len();
            due.push(self.note());
        }
        due
    }

    fn note(&self) -> SoundCue {
        SoundCue {
            freq: self.pattern[self.index],
            duration: self.step_secs * 0.9,
            waveform: Waveform::Triangle,
            gain: BGM_GAIN,
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<AudioContext>,
    muted: bool,
    bgm_enabled: bool,
    /// True while a run is in progress
    bgm_active: bool,
    sequencer: BgmSequencer,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        #[cfg(target_arch = "wasm32")]
        let ctx = {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            ctx
        };
        Self {
            #[cfg(target_arch = "wasm32")]
            ctx,
            muted: !settings.sound_on,
            bgm_enabled: settings.bgm_enabled,
            bgm_active: false,
            sequencer: BgmSequencer::default(),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if !muted {
            self.sequencer.reset();
        }
    }

    pub fn set_bgm_enabled(&mut self, enabled: bool) {
        self.bgm_enabled = enabled;
    }

    /// Whether background music should currently be sounding
    pub fn bgm_playing(&self) -> bool {
        self.bgm_enabled && self.bgm_active && !self.muted
    }

    /// React to a game event. Returns the effect played, if any.
    pub fn handle(&mut self, event: &GameEvent) -> Option<SoundEffect> {
        match event {
            GameEvent::RunStarted { .. } => {
                self.bgm_active = true;
                self.sequencer.reset();
            }
            GameEvent::GameOver { .. } => self.bgm_active = false,
            GameEvent::SoundToggled { on } => self.set_muted(!on),
            _ => {}
        }
        let effect = SoundEffect::from_event(event)?;
        self.play(effect).then_some(effect)
    }

    /// Play a sound effect. Returns false when muted.
    pub fn play(&self, effect: SoundEffect) -> bool {
        if self.muted {
            return false;
        }
        self.output(&effect.cue());
        true
    }

    /// Periodic music tick, fed wall-clock seconds. Returns notes started.
    pub fn tick(&mut self, dt_secs: f64) -> usize {
        if !self.bgm_playing() {
            return 0;
        }
        let notes = self.sequencer.tick(dt_secs);
        for cue in &notes {
            self.output(cue);
        }
        notes.len()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn output(&self, cue: &SoundCue) {
        log::debug!(
            "beep {:.0} Hz {:?} {:.2}s",
            cue.freq,
            cue.waveform,
            cue.duration
        );
    }

    #[cfg(target_arch = "wasm32")]
    fn output(&self, cue: &SoundCue) {
        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let Some((osc, gain)) = self.create_osc(ctx, cue.freq, cue.waveform.into()) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(cue.gain, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(0.0, t + cue.duration)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + cue.duration).ok();
    }

    /// Create an oscillator routed through a gain node
    #[cfg(target_arch = "wasm32")]
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unmuted() -> AudioManager {
        AudioManager::new(&Settings {
            sound_on: true,
            bgm_enabled: true,
        })
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(SoundEffect::from_event(&GameEvent::Jump), Some(SoundEffect::Jump));
        assert_eq!(
            SoundEffect::from_event(&GameEvent::Collision { obstacle_id: 3 }),
            Some(SoundEffect::Collision)
        );
        assert_eq!(
            SoundEffect::from_event(&GameEvent::Milestone { score: 100 }),
            Some(SoundEffect::LevelUp)
        );
        assert_eq!(
            SoundEffect::from_event(&GameEvent::Cycle { night: true }),
            Some(SoundEffect::Cycle)
        );
        assert_eq!(
            SoundEffect::from_event(&GameEvent::GameOver { score: 1 }),
            Some(SoundEffect::GameOver)
        );
        assert_eq!(SoundEffect::from_event(&GameEvent::RunStarted { seed: 0 }), None);
    }

    #[test]
    fn test_cue_table() {
        let jump = SoundEffect::Jump.cue();
        assert_eq!(jump.freq, 880.0);
        assert_eq!(jump.waveform, Waveform::Square);
        assert_eq!(SoundEffect::Collision.cue().waveform, Waveform::Sawtooth);
        assert_eq!(SoundEffect::LevelUp.cue().freq, 1320.0);
        assert_eq!(SoundEffect::GameOver.cue().duration, 0.4);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let mut audio = AudioManager::new(&Settings {
            sound_on: false,
            bgm_enabled: true,
        });
        assert!(audio.is_muted());
        assert_eq!(audio.handle(&GameEvent::Jump), None);
        audio.handle(&GameEvent::RunStarted { seed: 1 });
        assert_eq!(audio.tick(5.0), 0);

        audio.handle(&GameEvent::SoundToggled { on: true });
        assert_eq!(audio.handle(&GameEvent::Jump), Some(SoundEffect::Jump));
    }

    #[test]
    fn test_bgm_follows_run_lifecycle() {
        let mut audio = unmuted();
        assert_eq!(audio.tick(1.0), 0);

        audio.handle(&GameEvent::RunStarted { seed: 1 });
        assert!(audio.bgm_playing());
        assert!(audio.tick(1.0) > 0);

        audio.handle(&GameEvent::GameOver { score: 10 });
        assert!(!audio.bgm_playing());
        assert_eq!(audio.tick(1.0), 0);
    }

    #[test]
    fn test_bgm_respects_setting() {
        let mut audio = unmuted();
        audio.set_bgm_enabled(false);
        audio.handle(&GameEvent::RunStarted { seed: 1 });
        assert_eq!(audio.tick(1.0), 0);
    }

    #[test]
    fn test_sequencer_steps_on_period() {
        let mut seq = BgmSequencer::new(vec![100.0, 200.0, 300.0], 0.5);
        // First tick starts the first note
        let notes = seq.tick(0.1);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].freq, 100.0);

        assert!(seq.tick(0.3).is_empty());
        let notes = seq.tick(0.2);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].freq, 200.0);

        // A long stall catches up note by note and wraps
        let notes = seq.tick(1.0);
        let freqs: Vec<f32> = notes.iter().map(|c| c.freq).collect();
        assert_eq!(freqs, vec![300.0, 100.0]);
    }

    #[test]
    fn test_sequencer_ignores_bad_input() {
        let mut seq = BgmSequencer::default();
        assert!(seq.tick(f64::NAN).is_empty());
        assert!(seq.tick(-1.0).is_empty());
        let mut empty = BgmSequencer::new(Vec::new(), 0.5);
        assert!(empty.tick(1.0).is_empty());
    }
}
