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
//! Particle fountain under gravity
//!
//! An emitter entity spawns particles through the state api every update;
//! gravity pulls them back down and the game removes whatever has left the
//! stage. Shows deferred spawning, terminal velocity and bulk retention.

use sprite_engine::config::LoopConfig;
use sprite_engine::ecs::components::{CustomRenderComponent, GravityComponent, PositionComponent};
use sprite_engine::ecs::{Entity, GameState, StateApi, UpdateHooks};
use sprite_engine::math::Vec2;
use sprite_engine::scheduler::{Game, GameLoop, LoopHandle};
use sprite_engine::stage::{HeadlessStage, Stage};
use sprite_engine::Result;
use std::rc::Rc;

const RUN_UPDATES: u64 = 120;

/// Spawns one particle per update, fanning left and right
struct Emitter {
    spawned: u64,
}

impl UpdateHooks for Emitter {
    fn on_update_end(&mut self, entity: &mut Entity, _delta_ms: f64, state: Option<&mut StateApi>) -> Result<()> {
        let Some(state) = state else {
            return Ok(());
        };
        let origin = entity.require::<PositionComponent>()?.p;
        let spread = ((self.spawned % 21) as f64 - 10.0) * 8.0;
        self.spawned += 1;

        let particle = Entity::builder(state.stage().clone())
            .with(PositionComponent::at(origin).with_velocity(spread, -300.0))
            .with(GravityComponent::new(400.0))
            .with(CustomRenderComponent::new(|stage, pos, _delta| {
                stage.stroke_rect(pos, Vec2::new(2.0, 2.0), "white");
                Ok(())
            }))
            .build()?;
        state.add_entity(particle);
        Ok(())
    }
}

struct Fountain {
    state: GameState,
    handle: LoopHandle,
    updates: u64,
    removed: usize,
    peak: usize,
}

impl Game for Fountain {
    fn update(&mut self, delta_ms: f64) -> Result<()> {
        self.state.update(delta_ms)?;

        let size = self.state.stage().size();
        self.removed += self.state.retain(|e| match e.component::<PositionComponent>() {
            Some(pos) => pos.p.y <= size.y && pos.p.x >= 0.0 && pos.p.x <= size.x,
            None => true,
        });
        self.peak = self.peak.max(self.state.len());

        self.updates += 1;
        if self.updates >= RUN_UPDATES {
            self.handle.stop();
        }
        Ok(())
    }

    fn render(&mut self, delta_ms: f64) -> Result<()> {
        self.state.render(delta_ms)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    println!("Sprite Engine - Gravity Fountain");
    println!("================================\n");

    let stage: Rc<dyn Stage> = Rc::new(HeadlessStage::new(800.0, 600.0));
    let mut state = GameState::new(stage.clone());
    let emitter = Entity::builder(stage.clone())
        .with(PositionComponent::new(400.0, 590.0))
        .hooks(Emitter { spawned: 0 })
        .build()?;
    state.add_entity(emitter);

    let mut game_loop = GameLoop::new(stage, LoopConfig::default())?;
    let mut game = Fountain {
        state,
        handle: game_loop.handle(),
        updates: 0,
        removed: 0,
        peak: 0,
    };
    let stats = game_loop.run(&mut game)?;

    println!("Ran {} updates and {} frames", stats.updates, stats.renders);
    println!("  particles alive at peak: {}", game.peak.saturating_sub(1));
    println!("  particles removed off stage: {}", game.removed);
    println!("  particles alive at exit: {}", game.state.len().saturating_sub(1));
    Ok(())
}
