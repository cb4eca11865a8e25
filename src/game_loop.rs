//! Session state machine and frame driver
//!
//! [`GameLoop`] owns the world for the current session. The host drives it with
//! [`GameLoop::set_status`] (start/retry) and [`GameLoop::frame`] (one call per
//! display refresh). Key presses reach the loop through an [`InputHandle`] and are
//! queued until the next frame drains them, so a tick sees every jump requested
//! before it ran and nothing requested after.

use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};

use thiserror::Error;

use crate::consts::*;
use crate::renderer::{DrawSurface, render_world};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameStatus, GravityMode, TickInput, World, autopilot, tick};

/// Golden-ratio increment used to derive per-session seeds
const SESSION_SEED_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

/// Opaque token for a requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host hook for "call me again when the next frame is due"
pub trait FrameScheduler {
    /// `None` when the host cannot deliver a frame callback
    fn request_frame(&mut self) -> Option<FrameHandle>;
    /// Cancelling a handle that already fired must be harmless
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Commands delivered from input listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Jump,
    ToggleAutopilot,
}

impl InputEvent {
    /// Map a `KeyboardEvent.code` to a command
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "Space" | "ArrowUp" | "KeyW" => Some(InputEvent::Jump),
            "KeyI" => Some(InputEvent::ToggleAutopilot),
            _ => None,
        }
    }
}

/// Sending side of the input queue, cheap to clone into listeners
#[derive(Debug, Clone)]
pub struct InputHandle {
    tx: Sender<InputEvent>,
}

impl InputHandle {
    /// Queue a command. Returns false once the loop has been torn down.
    pub fn send(&self, event: InputEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn jump(&self) -> bool {
        self.send(InputEvent::Jump)
    }
}

/// Rejected status changes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot move from {from} to {to}")]
    Invalid { from: GameStatus, to: GameStatus },
    #[error("unknown status signal {0:?}")]
    UnknownStatus(String),
    #[error("game loop has been torn down")]
    TornDown,
}

/// The runner game loop
pub struct GameLoop {
    status: GameStatus,
    world: World,
    seed: u64,
    /// Sessions started so far
    sessions: u64,
    speed: f32,
    gravity: GravityMode,
    glow: bool,
    /// Preferences as loaded, updated when the player changes one
    settings: Settings,
    /// Page is in the back/forward cache
    suspended: bool,
    last_time: Option<f64>,
    final_score: Option<u64>,
    input_tx: Sender<InputEvent>,
    input_rx: Option<Receiver<InputEvent>>,
    scheduler: Box<dyn FrameScheduler>,
    pending_frame: Option<FrameHandle>,
}

impl GameLoop {
    pub fn new(settings: &Settings, seed: u64, scheduler: Box<dyn FrameScheduler>) -> Self {
        let speed = crate::sanitize_speed(settings.speed);
        let (input_tx, input_rx) = channel();
        Self {
            status: GameStatus::Start,
            world: World::new_session(seed, speed),
            seed,
            sessions: 0,
            speed,
            gravity: settings.gravity,
            glow: settings.glow,
            settings: settings.clone(),
            suspended: false,
            last_time: None,
            final_score: None,
            input_tx,
            input_rx: Some(input_rx),
            scheduler,
            pending_frame: None,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current integer score
    pub fn score(&self) -> u64 {
        self.world.display_score()
    }

    /// Score reported at the end of the last session, if it has ended
    pub fn final_score(&self) -> Option<u64> {
        self.final_score
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Change obstacle speed. Applies to obstacles spawned from now on.
    pub fn set_speed(&mut self, speed: f32) {
        let sanitized = crate::sanitize_speed(speed);
        if sanitized != speed {
            log::warn!("Speed {} out of range, using {}", speed, sanitized);
        }
        self.speed = sanitized;
        self.settings.speed = sanitized;
        self.world.speed = sanitized;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn autopilot(&self) -> bool {
        self.settings.autopilot
    }

    /// Switch demo mode and remember the choice
    pub fn set_autopilot(&mut self, enabled: bool) {
        if self.settings.autopilot == enabled {
            return;
        }
        self.settings.autopilot = enabled;
        self.settings.save();
        log::info!("Autopilot: {}", enabled);
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// True while a frame callback is outstanding
    pub fn is_scheduled(&self) -> bool {
        self.pending_frame.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.input_rx.is_none()
    }

    pub fn input_handle(&self) -> InputHandle {
        InputHandle {
            tx: self.input_tx.clone(),
        }
    }

    /// Apply an external status signal.
    ///
    /// Only START → PLAYING and GAMEOVER → PLAYING are accepted; repeating the
    /// current status is a no-op.
    pub fn set_status(&mut self, next: GameStatus, now_ms: f64) -> Result<(), TransitionError> {
        if self.is_torn_down() {
            return Err(TransitionError::TornDown);
        }
        if next == self.status {
            return Ok(());
        }
        match (self.status, next) {
            (GameStatus::Start | GameStatus::GameOver, GameStatus::Playing) => {
                self.begin_session(now_ms);
                Ok(())
            }
            (from, to) => {
                log::debug!("Rejected status change {} -> {}", from, to);
                Err(TransitionError::Invalid { from, to })
            }
        }
    }

    /// Apply a status signal given as text (e.g. from a DOM attribute)
    pub fn apply_status_signal(&mut self, raw: &str, now_ms: f64) -> Result<(), TransitionError> {
        let Some(next) = GameStatus::parse(raw) else {
            log::warn!("Ignoring unknown status signal {:?}", raw);
            return Err(TransitionError::UnknownStatus(raw.to_string()));
        };
        self.set_status(next, now_ms)
    }

    fn begin_session(&mut self, now_ms: f64) {
        let session_seed = self
            .seed
            .wrapping_add(self.sessions.wrapping_mul(SESSION_SEED_STEP));
        self.sessions += 1;

        self.world = World::new_session(session_seed, self.speed);
        self.drain_inputs();
        self.last_time = Some(now_ms);
        self.final_score = None;
        self.status = GameStatus::Playing;
        self.schedule();

        log::info!(
            "Session {} started (seed {}, speed {})",
            self.sessions,
            session_seed,
            self.speed
        );
    }

    fn schedule(&mut self) {
        if self.pending_frame.is_some() || self.suspended {
            return;
        }
        self.pending_frame = self.scheduler.request_frame();
        if self.pending_frame.is_none() {
            log::error!("Frame request refused, session {} will not advance", self.sessions);
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Drain queued commands. Returns whether a jump was requested.
    fn drain_inputs(&mut self) -> bool {
        let Some(rx) = &self.input_rx else {
            return false;
        };
        let mut jump = false;
        let mut toggles = 0u32;
        loop {
            match rx.try_recv() {
                Ok(InputEvent::Jump) => jump = true,
                Ok(InputEvent::ToggleAutopilot) => toggles += 1,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        if toggles % 2 == 1 {
            self.set_autopilot(!self.settings.autopilot);
        }
        jump
    }

    /// Run one frame: spawn, simulate, render, then reschedule while still playing.
    ///
    /// Does nothing outside PLAYING. Rendering is skipped when no surface is given.
    pub fn frame(&mut self, now_ms: f64, surface: Option<&mut dyn DrawSurface>) -> Vec<GameEvent> {
        self.cancel_pending();
        if self.status != GameStatus::Playing || self.suspended || self.is_torn_down() {
            return Vec::new();
        }

        let last = self.last_time.unwrap_or(now_ms);
        let dt_ms = (now_ms - last).clamp(0.0, MAX_FRAME_DELTA_MS);
        self.last_time = Some(now_ms);

        let mut jump = self.drain_inputs();
        if self.settings.autopilot {
            jump |= autopilot::wants_jump(&self.world, self.gravity.scale(dt_ms));
        }

        let events = tick(&mut self.world, &TickInput { jump }, dt_ms, self.gravity);

        if let Some(surface) = surface {
            render_world(&self.world, surface, self.glow);
        }

        let game_over = events.iter().find_map(|e| match e {
            GameEvent::GameOver { score } => Some(*score),
            _ => None,
        });
        match game_over {
            Some(score) => {
                self.status = GameStatus::GameOver;
                self.final_score = Some(score);
                log::info!(
                    "Session {} over after {} ticks, score {}",
                    self.sessions,
                    self.world.time_ticks,
                    score
                );
            }
            None => self.schedule(),
        }

        events
    }

    /// Paint the current world without advancing it
    pub fn render(&self, surface: &mut dyn DrawSurface) {
        render_world(&self.world, surface, self.glow);
    }

    /// Page went into the back/forward cache: stop scheduling but keep the session
    pub fn suspend(&mut self) {
        if self.suspended || self.is_torn_down() {
            return;
        }
        self.cancel_pending();
        self.suspended = true;
        log::info!("Game loop suspended");
    }

    /// Page came back. A session in progress continues from `now_ms`, so the
    /// time spent hidden is not scored.
    pub fn resume(&mut self, now_ms: f64) {
        if !self.suspended || self.is_torn_down() {
            return;
        }
        self.suspended = false;
        if self.status == GameStatus::Playing {
            self.last_time = Some(now_ms);
            self.schedule();
        }
        log::info!("Game loop resumed");
    }

    /// Stop scheduling and close the input queue. The world stays readable.
    pub fn teardown(&mut self) {
        self.cancel_pending();
        self.input_rx = None;
        log::info!("Game loop torn down");
    }
}
