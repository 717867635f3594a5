// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Game loop scheduler
//!
//! The loop drives two independent cadences against a [`Clock`]: updates,
//! which advance the simulation and only run while the loop is
//! [`Running`](LoopState::Running), and renders, which clear the stage and
//! redraw it and by default keep going while paused. Each firing measures the
//! real time elapsed since the previous one of its kind and hands that delta
//! to the [`Game`].
//!
//! ```text
//!          start            pause
//!   Init ────────▶ Running ───────▶ Paused
//!                     ▲                │
//!                     └────────────────┘
//!                           resume
//! ```

use crate::clock::{Clock, SystemClock};
use crate::config::LoopConfig;
use crate::error::{EngineError, Result};
use crate::stage::Stage;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Lifecycle state of a [`GameLoop`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// Created but not started
    Init,
    /// Updating and rendering
    Running,
    /// Rendering only (unless configured otherwise)
    Paused,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoopState::Init => "init",
            LoopState::Running => "running",
            LoopState::Paused => "paused",
        })
    }
}

/// Callbacks driven by the loop
pub trait Game {
    /// Advance the simulation by `delta_ms`
    fn update(&mut self, delta_ms: f64) -> Result<()>;

    /// Draw a frame; the stage has already been cleared
    fn render(&mut self, delta_ms: f64) -> Result<()>;

    /// The loop started running
    fn on_start(&mut self) {}

    /// The loop was paused
    fn on_pause(&mut self) {}

    /// The loop resumed
    fn on_resume(&mut self) {}
}

/// Diagnostics gathered by the loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Instantaneous update rate, `floor(1000 / delta)`
    pub update_fps: u32,
    /// Instantaneous render rate, `floor(1000 / delta)`
    pub render_fps: u32,
    /// Updates run so far
    pub updates: u64,
    /// Frames rendered so far
    pub renders: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Pause,
    Resume,
}

#[derive(Debug, Default)]
struct Signals {
    stop: Cell<bool>,
    request: Cell<Option<Request>>,
}

/// Cloneable remote control for a running loop
///
/// Requests are picked up at the next tick boundary of
/// [`GameLoop::run`]. A later pause/resume request replaces an earlier one
/// that has not been applied yet.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    signals: Rc<Signals>,
}

impl LoopHandle {
    /// Ask `run` to return
    pub fn stop(&self) {
        self.signals.stop.set(true);
    }

    /// Ask the loop to pause
    pub fn pause(&self) {
        self.signals.request.set(Some(Request::Pause));
    }

    /// Ask the loop to resume
    pub fn resume(&self) {
        self.signals.request.set(Some(Request::Resume));
    }

    /// Whether a stop has been requested and not yet honoured
    pub fn is_stop_requested(&self) -> bool {
        self.signals.stop.get()
    }

    fn take_request(&self) -> Option<Request> {
        self.signals.request.take()
    }

    fn clear_stop(&self) {
        self.signals.stop.set(false);
    }
}

fn rate(delta_ms: f64) -> u32 {
    if delta_ms > 0.0 {
        (1000.0 / delta_ms).floor() as u32
    } else {
        0
    }
}

/// Fixed-cadence update and render scheduler
pub struct GameLoop<C: Clock = SystemClock> {
    stage: Rc<dyn Stage>,
    config: LoopConfig,
    clock: C,
    state: LoopState,
    last_update: f64,
    last_render: f64,
    next_update: f64,
    next_render: f64,
    stats: LoopStats,
    handle: LoopHandle,
}

impl GameLoop<SystemClock> {
    /// Create a loop measured against wall-clock time
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when the cadences are invalid.
    pub fn new(stage: Rc<dyn Stage>, config: LoopConfig) -> Result<Self> {
        Self::with_clock(stage, config, SystemClock::new())
    }
}

impl<C: Clock> GameLoop<C> {
    /// Create a loop measured against `clock`
    pub fn with_clock(stage: Rc<dyn Stage>, config: LoopConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(GameLoop {
            stage,
            config,
            clock,
            state: LoopState::Init,
            last_update: 0.0,
            last_render: 0.0,
            next_update: 0.0,
            next_render: 0.0,
            stats: LoopStats::default(),
            handle: LoopHandle::default(),
        })
    }

    /// Current state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Diagnostics so far
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Remote control sharing this loop's signals
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Cadence configuration
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Stage cleared before every frame
    pub fn stage(&self) -> &Rc<dyn Stage> {
        &self.stage
    }

    /// Clock the loop measures against
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// `Init → Running`, then [`Game::on_start`]
    pub fn start<G: Game + ?Sized>(&mut self, game: &mut G) -> Result<()> {
        self.transition("start", LoopState::Init, LoopState::Running)?;
        let now = self.clock.now_ms();
        self.last_update = now;
        self.last_render = now;
        self.next_update = now + self.config.update_interval_ms;
        self.next_render = now;
        game.on_start();
        Ok(())
    }

    /// `Running → Paused`, then [`Game::on_pause`]
    pub fn pause<G: Game + ?Sized>(&mut self, game: &mut G) -> Result<()> {
        self.transition("pause", LoopState::Running, LoopState::Paused)?;
        game.on_pause();
        Ok(())
    }

    /// `Paused → Running`, then [`Game::on_resume`]
    ///
    /// The next update measures its delta from this call rather than from
    /// the last update before the pause.
    pub fn resume<G: Game + ?Sized>(&mut self, game: &mut G) -> Result<()> {
        self.transition("resume", LoopState::Paused, LoopState::Running)?;
        let now = self.clock.now_ms();
        self.last_update = now;
        self.next_update = now + self.config.update_interval_ms;
        game.on_resume();
        Ok(())
    }

    /// Ask [`run`](Self::run) to return at the next tick boundary
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// Run one update if the loop is running
    ///
    /// Returns whether [`Game::update`] was called.
    pub fn update_tick<G: Game + ?Sized>(&mut self, game: &mut G) -> Result<bool> {
        if self.state != LoopState::Running {
            return Ok(false);
        }

        let now = self.clock.now_ms();
        let delta = now - self.last_update;
        self.last_update = now;
        self.stats.update_fps = rate(delta);
        self.stats.updates += 1;
        log::trace!("update: {:.2}ms ({} ups)", delta, self.stats.update_fps);

        game.update(delta)?;
        Ok(true)
    }

    /// Render one frame if the loop has started
    ///
    /// While paused with `render_while_paused` off, the frame is skipped but
    /// its time still counts toward the next frame's baseline. Returns whether
    /// [`Game::render`] was called.
    pub fn render_tick<G: Game + ?Sized>(&mut self, game: &mut G) -> Result<bool> {
        if self.state == LoopState::Init {
            return Ok(false);
        }

        let now = self.clock.now_ms();
        let delta = now - self.last_render;
        self.last_render = now;
        if self.state == LoopState::Paused && !self.config.render_while_paused {
            return Ok(false);
        }

        self.stats.render_fps = rate(delta);
        self.stats.renders += 1;
        log::trace!("render: {:.2}ms ({} fps)", delta, self.stats.render_fps);

        self.stage.clear();
        game.render(delta)?;
        Ok(true)
    }

    /// Drive `game` until a stop is requested or a callback fails
    ///
    /// Starts the loop first when it is still in `Init`; a loop started
    /// beforehand keeps its baselines and does not fire `on_start` again.
    /// Each timer re-arms relative to the moment it fired, and the loop
    /// sleeps on its clock until the earlier of the two deadlines.
    ///
    /// # Errors
    ///
    /// The first error from the game halts the loop and is returned.
    pub fn run<G: Game + ?Sized>(&mut self, game: &mut G) -> Result<LoopStats> {
        if self.state == LoopState::Init {
            self.start(game)?;
        }

        while !self.handle.is_stop_requested() {
            self.apply_request(game);

            let now = self.clock.now_ms();
            if now >= self.next_update {
                self.next_update = now + self.config.update_interval_ms;
                if let Err(err) = self.update_tick(game) {
                    return Err(self.halt(err));
                }
            }
            if now >= self.next_render {
                self.next_render = now + self.config.render_interval_ms;
                if let Err(err) = self.render_tick(game) {
                    return Err(self.halt(err));
                }
            }

            let wake = self.next_update.min(self.next_render);
            let now = self.clock.now_ms();
            if wake > now {
                self.clock.sleep_ms(wake - now);
            }
        }

        self.handle.clear_stop();
        log::info!(
            "game loop stopped after {} updates and {} frames",
            self.stats.updates,
            self.stats.renders
        );
        Ok(self.stats)
    }

    fn apply_request<G: Game + ?Sized>(&mut self, game: &mut G) {
        match self.handle.take_request() {
            Some(Request::Pause) => {
                if let Err(err) = self.pause(game) {
                    log::warn!("ignoring pause request: {}", err);
                }
            }
            Some(Request::Resume) => {
                if let Err(err) = self.resume(game) {
                    log::warn!("ignoring resume request: {}", err);
                }
            }
            None => {}
        }
    }

    fn halt(&mut self, err: EngineError) -> EngineError {
        log::error!("game loop halted: {}", err);
        self.handle.clear_stop();
        err
    }

    fn transition(&mut self, action: &'static str, from: LoopState, to: LoopState) -> Result<()> {
        if self.state != from {
            return Err(EngineError::InvalidTransition {
                action,
                state: self.state,
            });
        }
        log::info!("game loop {} -> {}", self.state, to);
        self.state = to;
        Ok(())
    }
}
