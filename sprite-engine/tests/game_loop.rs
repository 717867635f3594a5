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
//! Game loop tests driven by a manual clock

use sprite_engine::clock::{Clock, ManualClock};
use sprite_engine::config::LoopConfig;
use sprite_engine::ecs::components::{BoxColliderComponent, PositionComponent};
use sprite_engine::ecs::{Entity, GameState};
use sprite_engine::error::EngineError;
use sprite_engine::scheduler::{Game, GameLoop, LoopHandle, LoopState};
use sprite_engine::stage::{HeadlessStage, Stage};
use sprite_engine::Result;
use approx::assert_relative_eq;
use std::rc::Rc;

fn config(update: f64, render: f64) -> LoopConfig {
    LoopConfig {
        update_interval_ms: update,
        render_interval_ms: render,
        render_while_paused: true,
    }
}

/// Wraps a game state and stops the loop after a number of updates
struct Bounded {
    state: GameState,
    handle: LoopHandle,
    limit: u32,
    updates: u32,
    deltas: Vec<f64>,
}

impl Game for Bounded {
    fn update(&mut self, delta_ms: f64) -> Result<()> {
        self.deltas.push(delta_ms);
        Game::update(&mut self.state, delta_ms)?;
        self.updates += 1;
        if self.updates >= self.limit {
            self.handle.stop();
        }
        Ok(())
    }

    fn render(&mut self, delta_ms: f64) -> Result<()> {
        Game::render(&mut self.state, delta_ms)
    }
}

#[test]
fn test_entities_move_at_their_velocity() {
    let clock = ManualClock::new();
    let stage = Rc::new(HeadlessStage::new(800.0, 600.0));
    let mut game_loop = GameLoop::with_clock(stage.clone(), config(50.0, 25.0), clock.clone()).unwrap();

    let mut state = GameState::new(stage.clone());
    let id = state.add_entity(
        Entity::builder(stage.clone())
            .with(PositionComponent::new(0.0, 0.0).with_velocity(100.0, 20.0))
            .with(BoxColliderComponent::new(8.0, 8.0).with_outline("lime"))
            .build()
            .unwrap(),
    );

    let mut game = Bounded {
        state,
        handle: game_loop.handle(),
        limit: 10,
        updates: 0,
        deltas: Vec::new(),
    };
    let stats = game_loop.run(&mut game).unwrap();

    assert_eq!(stats.updates, 10);
    assert_eq!(stats.update_fps, 20);
    let pos = game.state.entity(id).unwrap().component::<PositionComponent>().unwrap();
    assert_relative_eq!(pos.p.x, 50.0);
    assert_relative_eq!(pos.p.y, 10.0);

    // The last frame outlined the collider
    assert_eq!(stage.command_count(), 1);
}

#[test]
fn test_pause_resume_measures_from_resume() {
    let clock = ManualClock::new();
    let stage = Rc::new(HeadlessStage::new(800.0, 600.0));
    let mut game_loop = GameLoop::with_clock(stage.clone(), config(20.0, 20.0), clock.clone()).unwrap();
    let mut game = Bounded {
        state: GameState::new(stage),
        handle: game_loop.handle(),
        limit: u32::MAX,
        updates: 0,
        deltas: Vec::new(),
    };

    game_loop.start(&mut game).unwrap();
    clock.advance(20.0);
    game_loop.update_tick(&mut game).unwrap();

    game_loop.pause(&mut game).unwrap();
    for _ in 0..10 {
        clock.advance(20.0);
        assert!(!game_loop.update_tick(&mut game).unwrap());
        assert!(game_loop.render_tick(&mut game).unwrap());
    }

    game_loop.resume(&mut game).unwrap();
    clock.advance(15.0);
    game_loop.update_tick(&mut game).unwrap();

    assert_eq!(game.deltas, vec![20.0, 15.0]);
    assert_eq!(game_loop.state(), LoopState::Running);
}

#[test]
fn test_component_error_halts_loop() {
    let clock = ManualClock::new();
    let stage: Rc<dyn Stage> = Rc::new(HeadlessStage::new(800.0, 600.0));
    let mut game_loop = GameLoop::with_clock(stage.clone(), config(10.0, 10.0), clock.clone()).unwrap();

    // A collider without a position cannot take part in collision resolution
    let mut state = GameState::new(stage.clone());
    state.add_entity(
        Entity::builder(stage)
            .with(BoxColliderComponent::new(4.0, 4.0))
            .build()
            .unwrap(),
    );

    let err = game_loop.run(&mut state).unwrap_err();
    assert!(matches!(err, EngineError::MissingComponent { .. }));
    assert_eq!(game_loop.stats().updates, 1);
    assert_eq!(clock.now_ms(), 10.0);
}
