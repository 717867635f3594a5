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
//! Bouncing boxes
//!
//! Two hundred boxes drift around the stage, bounce off its edges and step
//! back and reverse when they run into each other. Runs for three seconds
//! of wall-clock time against a headless stage.
//!
//! Run with `RUST_LOG=debug` to see entity lifecycle logging.

use sprite_engine::config::EngineConfig;
use sprite_engine::ecs::components::{BoxColliderComponent, ImageRenderComponent, PositionComponent};
use sprite_engine::ecs::{Entity, GameState, StateApi, UpdateHooks};
use sprite_engine::scheduler::{Game, GameLoop, LoopHandle};
use sprite_engine::stage::{HeadlessStage, Image, Stage};
use sprite_engine::Result;
use std::rc::Rc;

const BOX_COUNT: usize = 200;
const RUN_UPDATES: u64 = 90;

/// Small deterministic generator so the demo needs no extra dependencies
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }
}

/// Flips velocity at the stage edges before the position integrates
struct WallBounce;

impl UpdateHooks for WallBounce {
    fn on_update_start(&mut self, entity: &mut Entity, _delta_ms: f64, _state: Option<&mut StateApi>) -> Result<()> {
        let size = entity.stage().size();
        let pos = entity.require_mut::<PositionComponent>()?;
        if pos.p.x < 0.0 || pos.p.x > size.x {
            pos.v.x = -pos.v.x;
        }
        if pos.p.y < 0.0 || pos.p.y > size.y {
            pos.v.y = -pos.v.y;
        }
        Ok(())
    }
}

fn spawn_box(stage: &Rc<dyn Stage>, rng: &mut Lcg, image: Image) -> Result<Entity> {
    let size = stage.size();
    let position = PositionComponent::new(rng.range(0.0, size.x), rng.range(0.0, size.y))
        .with_velocity(rng.range(-30.0, 30.0), rng.range(-30.0, 30.0));
    let collider = BoxColliderComponent::new(32.0, 32.0).with_callback(|owner, _other| {
        let first_contact = !owner.require::<BoxColliderComponent>()?.is_colliding;
        if first_contact {
            let pos = owner.require_mut::<PositionComponent>()?;
            pos.revert();
            pos.bounce();
        }
        Ok(())
    });

    Entity::builder(stage.clone())
        .with(position)
        .with(ImageRenderComponent::new(image))
        .with(collider)
        .hooks(WallBounce)
        .build()
}

struct Bouncing {
    state: GameState,
    handle: LoopHandle,
    updates: u64,
    contacts: usize,
}

impl Game for Bouncing {
    fn update(&mut self, delta_ms: f64) -> Result<()> {
        self.contacts += self.state.resolve_collisions(None)?.overlaps;
        self.state.update(delta_ms)?;

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

    println!("Sprite Engine - Bouncing Boxes");
    println!("==============================\n");

    let config = EngineConfig::default();
    config.validate()?;
    let headless = Rc::new(HeadlessStage::from_config(&config.stage));
    let stage: Rc<dyn Stage> = headless.clone();

    let mut rng = Lcg(0x5eed);
    let mushroom = Image::new(1, 32.0, 32.0);
    let mut state = GameState::new(stage.clone());
    for _ in 0..BOX_COUNT {
        state.add_entity(spawn_box(&stage, &mut rng, mushroom)?);
    }
    println!("Spawned {} boxes on a {}x{} stage", state.len(), config.stage.width, config.stage.height);

    let mut game_loop = GameLoop::new(stage, config.game_loop)?;
    let mut game = Bouncing {
        state,
        handle: game_loop.handle(),
        updates: 0,
        contacts: 0,
    };
    let stats = game_loop.run(&mut game)?;

    println!("\nRan {} updates and {} frames", stats.updates, stats.renders);
    println!("  last update rate: {} ups", stats.update_fps);
    println!("  last render rate: {} fps", stats.render_fps);
    println!("  overlapping pairs seen: {}", game.contacts);
    println!("  draw calls in the last frame: {}", headless.command_count());
    Ok(())
}
