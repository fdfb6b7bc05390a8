//! World state: level geometry, platforms, player, and run bookkeeping
//!
//! A `World` is built from a `Level` and owns everything needed to replay a run
//! deterministically. Collaborators (audio, replay playback) are injected.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Adjacency;
use super::grid::TileGrid;
use super::platform::PlatformSet;
use super::player::{Animation, PlayerState};
use super::tick::{self, InputState};
use crate::audio::{AudioSink, NullAudio, Sound};
use crate::consts::{SPAWN_OFFSET, TIMESTEP};
use crate::level::Level;
use crate::replay::Replay;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Game events for audio/visual feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    WallKicked,
    GravityFlipped,
    Died,
    /// Goal tile reached
    Won,
}

impl GameEvent {
    pub fn sound(&self) -> Sound {
        match self {
            GameEvent::Jumped => Sound::Jump,
            GameEvent::WallKicked => Sound::WallKick,
            GameEvent::GravityFlipped => Sound::GravityFlip,
            GameEvent::Died => Sound::Death,
            GameEvent::Won => Sound::Victory,
        }
    }
}

/// The simulated level
pub struct World {
    pub(crate) grid: TileGrid,
    pub(crate) platforms: PlatformSet,
    pub(crate) player: PlayerState,
    pub(crate) adjacency: Adjacency,
    pub(crate) animation: Animation,
    pub(crate) spawn: Vec2,
    pub(crate) tuning: Tuning,
    pub(crate) alt_controls: bool,

    /// Inputs of the current attempt
    pub(crate) recording: Replay,
    /// Replay driving the inputs instead of the live input
    pub(crate) playback: Option<Replay>,

    /// Ticks since the attempt began
    pub(crate) step: usize,
    pub(crate) accumulator: f32,
    /// Set by the first non-empty input; the timer runs from there
    pub(crate) started: bool,
    pub(crate) live_input: InputState,

    pub(crate) won: bool,
    /// Tick on which the goal was reached
    pub(crate) finish_step: Option<usize>,

    pub(crate) events: Vec<GameEvent>,
    pub(crate) audio: Box<dyn AudioSink>,
}

impl World {
    pub fn new(level: &Level, tuning: Tuning) -> Self {
        let mut grid = level.grid().clone();
        let platforms = PlatformSet::from_grid(&mut grid, tuning.platform_speed);

        let (sx, sy) = level.start().unwrap_or_else(|| {
            log::warn!("Level has no begin tile; spawning at the origin");
            (0, 0)
        });
        let spawn = Vec2::new(sx as f32 + SPAWN_OFFSET, sy as f32 + SPAWN_OFFSET);
        let player = PlayerState::spawn(spawn);
        let adjacency = Adjacency::probe(&player, &grid, &platforms);

        let mut recording = Replay::new();
        recording.set_level_id(level.id());

        log::debug!(
            "World {}x{} with {} platforms, spawn at ({:.3}, {:.3})",
            grid.width(),
            grid.height(),
            platforms.len(),
            spawn.x,
            spawn.y
        );

        Self {
            grid,
            platforms,
            player,
            adjacency,
            animation: Animation::Stand,
            spawn,
            tuning,
            alt_controls: false,
            recording,
            playback: None,
            step: 0,
            accumulator: 0.0,
            started: false,
            live_input: InputState::default(),
            won: false,
            finish_step: None,
            events: Vec::new(),
            audio: Box::new(NullAudio),
        }
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = audio;
        self
    }

    /// Use the alternate ladder controls
    pub fn with_alt_controls(mut self, alt: bool) -> Self {
        self.alt_controls = alt;
        self.recording.set_alt(alt);
        self
    }

    /// Apply user settings: control scheme
    pub fn with_settings(self, settings: &Settings) -> Self {
        self.with_alt_controls(settings.alt_controls)
    }

    /// Drive inputs from a replay. The replay's control scheme wins.
    pub fn with_playback(mut self, replay: Replay) -> Self {
        self.alt_controls = replay.alt();
        self.playback = Some(replay);
        self
    }

    /// Advance by wall-clock `dt`, running as many fixed ticks as fit
    ///
    /// Nothing happens until the first non-empty input (or a playback replay
    /// is attached). Returns whether at least one tick ran.
    pub fn update(&mut self, dt: f32, input: InputState) -> bool {
        self.live_input = input;
        if !self.started {
            let playing_back = self.playback.as_ref().is_some_and(|r| r.recorded_len() > 0);
            if !input.any() && !playing_back {
                return false;
            }
            self.started = true;
        }

        self.accumulator += dt;
        let mut stepped = false;
        while self.accumulator >= TIMESTEP {
            self.accumulator -= TIMESTEP;
            self.step();
            stepped = true;
        }
        stepped
    }

    /// Run exactly one fixed tick
    pub fn step(&mut self) {
        tick::tick(self, TIMESTEP);
    }

    /// Restart the attempt from scratch and wait for input again
    pub fn restart(&mut self) {
        self.reset_run();
        self.accumulator = 0.0;
        self.started = false;
        self.live_input = InputState::default();
    }

    /// Reset the player, platforms, recording, and timer
    pub(crate) fn reset_run(&mut self) {
        self.player = PlayerState::spawn(self.spawn);
        self.platforms.restart();
        self.adjacency = Adjacency::probe(&self.player, &self.grid, &self.platforms);
        self.animation = Animation::Stand;
        self.recording.clear();
        self.step = 0;
        self.won = false;
        self.finish_step = None;
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.audio.play(event.sound());
        self.events.push(event);
    }

    // === Accessors ===

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn platforms(&self) -> &PlatformSet {
        &self.platforms
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    pub fn animation(&self) -> Animation {
        self.animation
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn alt_controls(&self) -> bool {
        self.alt_controls
    }

    pub fn won(&self) -> bool {
        self.won
    }

    /// Player died this tick; the next tick restarts
    pub fn lost(&self) -> bool {
        self.player.dead
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Ticks run in the current attempt
    pub fn steps(&self) -> usize {
        self.step
    }

    /// Seconds elapsed in the current attempt
    pub fn timer(&self) -> f32 {
        self.step as f32 * TIMESTEP
    }

    /// Completion time, once the goal is reached
    pub fn finish_time(&self) -> Option<f32> {
        self.finish_step.map(|s| s as f32 * TIMESTEP)
    }

    /// Inputs recorded for the current attempt (stops at the goal)
    pub fn replay(&self) -> &Replay {
        &self.recording
    }

    pub fn replay_mut(&mut self) -> &mut Replay {
        &mut self.recording
    }

    pub fn playback(&self) -> Option<&Replay> {
        self.playback.as_ref()
    }

    pub fn has_playback(&self) -> bool {
        self.playback.is_some()
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Player position extrapolated into the partial tick still accumulated
    pub fn interpolated_player_pos(&self) -> Vec2 {
        self.player.pos + self.player.vel * self.accumulator
    }
}
