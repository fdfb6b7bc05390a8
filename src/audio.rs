//! Sound effect sink
//!
//! The simulation only names sounds; playing them is up to whatever sink the
//! world was built with. Playback is fire-and-forget and never fails a tick.

use std::cell::RefCell;
use std::rc::Rc;

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Jump,
    GravityFlip,
    WallKick,
    /// Player died
    Death,
    /// Goal reached
    Victory,
}

impl Sound {
    /// Asset name of the effect
    pub fn name(&self) -> &'static str {
        match self {
            Sound::Jump => "jump",
            Sound::GravityFlip => "gravityflip",
            Sound::WallKick => "wallkick",
            Sound::Death => "gameover",
            Sound::Victory => "victory",
        }
    }
}

/// Something that can play sound effects
pub trait AudioSink {
    fn play(&mut self, sound: Sound);
}

/// Discards every sound (headless runs, verification)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _sound: Sound) {}
}

/// Shared sink, so the owner can keep a handle to a sink the world also uses
impl<T: AudioSink> AudioSink for Rc<RefCell<T>> {
    fn play(&mut self, sound: Sound) {
        self.borrow_mut().play(sound);
    }
}

/// Collects sounds with their effective volume for a backend to drain
#[derive(Debug, Clone)]
pub struct AudioQueue {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    pending: Vec<(Sound, f32)>,
}

impl Default for AudioQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioQueue {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            pending: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut queue = Self::new();
        queue.set_master_volume(settings.master_volume);
        queue.set_sfx_volume(settings.sfx_volume);
        queue.set_muted(settings.muted);
        queue
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Take every queued sound
    pub fn drain(&mut self) -> Vec<(Sound, f32)> {
        std::mem::take(&mut self.pending)
    }
}

impl AudioSink for AudioQueue {
    fn play(&mut self, sound: Sound) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        log::trace!("Queued sound {} at {:.2}", sound.name(), vol);
        self.pending.push((sound, vol));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_applies_volume() {
        let mut queue = AudioQueue::new();
        queue.set_sfx_volume(0.5);
        queue.play(Sound::Jump);
        queue.play(Sound::Victory);

        let played = queue.drain();
        assert_eq!(played.len(), 2);
        assert_eq!(played[0].0, Sound::Jump);
        assert!((played[0].1 - 0.4).abs() < 1e-6);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_muted_queue_drops_sounds() {
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        let mut queue = AudioQueue::from_settings(&settings);
        queue.play(Sound::Death);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut queue = AudioQueue::new();
        queue.set_master_volume(3.0);
        queue.set_sfx_volume(-1.0);
        assert_eq!(queue.effective_volume(), 0.0);
        queue.set_sfx_volume(1.0);
        assert_eq!(queue.effective_volume(), 1.0);
    }

    #[test]
    fn test_shared_queue() {
        let queue = Rc::new(RefCell::new(AudioQueue::new()));
        let mut sink: Box<dyn AudioSink> = Box::new(Rc::clone(&queue));
        sink.play(Sound::WallKick);
        assert_eq!(queue.borrow_mut().drain().len(), 1);
    }

    #[test]
    fn test_sound_names() {
        assert_eq!(Sound::Death.name(), "gameover");
        assert_eq!(Sound::GravityFlip.name(), "gravityflip");
    }
}
