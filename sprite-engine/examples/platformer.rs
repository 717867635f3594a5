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
//! Keyboard-driven platformer scene
//!
//! A player walks left into an enemy under scripted keyboard input. The
//! player's collider steps it back on contact; after a short stand-off the
//! scene is replaced by a menu whose listeners are wired through a console
//! menu host and released again when the scene ends.

use sprite_engine::ecs::components::{
    Animation, BoxColliderComponent, ControlComponent, KeyState, Keyboard, ListenerId, MenuCallback,
    MenuComponent, MenuHost, PositionComponent, Sprite, SpriteRenderComponent,
};
use sprite_engine::ecs::{Entity, EntityId, GameState};
use sprite_engine::scheduler::{Game, GameLoop, LoopHandle};
use sprite_engine::stage::{HeadlessStage, Image, Stage};
use sprite_engine::Result;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

const STEP: f64 = 10.0;

/// Menu host printing what a UI would do
#[derive(Default)]
struct ConsoleMenu {
    listeners: RefCell<HashMap<u64, (String, MenuCallback)>>,
    next: Cell<u64>,
}

impl ConsoleMenu {
    fn click(&self, selector: &str) {
        let callbacks: Vec<MenuCallback> = self
            .listeners
            .borrow()
            .values()
            .filter(|(s, _)| s == selector)
            .map(|(_, cb)| cb.clone())
            .collect();
        println!("  [menu] click {}", selector);
        for callback in callbacks {
            callback();
        }
    }
}

impl MenuHost for ConsoleMenu {
    fn add_listener(&self, root: &str, selector: &str, event: &str, callback: MenuCallback) -> Option<ListenerId> {
        let id = self.next.get();
        self.next.set(id + 1);
        println!("  [menu] {} {} on {} -> listener {}", root, event, selector, id);
        self.listeners.borrow_mut().insert(id, (selector.to_string(), callback));
        Some(ListenerId(id))
    }

    fn remove_listener(&self, id: ListenerId) {
        println!("  [menu] removed listener {}", id.0);
        self.listeners.borrow_mut().remove(&id.0);
    }

    fn set_visible(&self, root: &str, visible: bool) {
        println!("  [menu] {} {}", root, if visible { "shown" } else { "hidden" });
    }
}

fn character_sprite() -> Sprite {
    let frame = |id| Image::new(id, 32.0, 32.0);
    Sprite::new()
        .with_animation("idle", Animation::new(vec![frame(1), frame(2)], 500.0))
        .with_animation("idleRight", Animation::new(vec![frame(3), frame(4)], 500.0))
        .with_animation("run", Animation::new(vec![frame(5), frame(6)], 100.0))
        .with_animation("runRight", Animation::new(vec![frame(7), frame(8)], 100.0))
}

fn play(entity: &mut Entity, animation: &str) -> Result<()> {
    let renderer = entity.require_mut::<SpriteRenderComponent>()?;
    if renderer.current_animation() != animation {
        renderer.setup_animation(animation);
    }
    Ok(())
}

fn steer(keys: &KeyState, entity: &mut Entity, _delta_ms: f64) -> Result<()> {
    let pos = entity.require_mut::<PositionComponent>()?;
    let animation = if keys.is_down("ArrowLeft") {
        pos.p.x -= STEP;
        pos.direction = 1;
        "run"
    } else if keys.is_down("ArrowRight") {
        pos.p.x += STEP;
        pos.direction = -1;
        "runRight"
    } else if pos.direction == 1 {
        "idle"
    } else {
        "idleRight"
    };
    play(entity, animation)
}

fn player(stage: &Rc<dyn Stage>, keyboard: &Keyboard) -> Result<Entity> {
    let size = stage.size();
    Entity::builder(stage.clone())
        .with(PositionComponent::new(size.x / 2.0, size.y / 2.0))
        .with(SpriteRenderComponent::new(character_sprite(), "idle"))
        .with(ControlComponent::new(keyboard.clone()).with_handler(steer))
        .with(BoxColliderComponent::new(32.0, 32.0).with_callback(|owner, _other| {
            owner.require_mut::<PositionComponent>()?.revert();
            Ok(())
        }))
        .build()
}

fn enemy(stage: &Rc<dyn Stage>) -> Result<Entity> {
    let mut position = PositionComponent::new(200.0, stage.size().y / 2.0);
    position.direction = -1;
    Entity::builder(stage.clone())
        .with(position)
        .with(SpriteRenderComponent::new(character_sprite(), "idleRight"))
        .with(BoxColliderComponent::new(32.0, 32.0))
        .build()
}

struct Platformer {
    state: GameState,
    handle: LoopHandle,
    keyboard: Keyboard,
    menu_host: Rc<ConsoleMenu>,
    player: EntityId,
    updates: u64,
    blocked: u64,
    in_menu: bool,
    quit: Rc<Cell<bool>>,
}

impl Platformer {
    fn script_input(&self) {
        match self.updates {
            5 => self.keyboard.key_down("ArrowLeft"),
            60 => self.keyboard.key_up("ArrowLeft"),
            _ => {}
        }
    }

    fn open_menu(&mut self) -> Result<()> {
        let quit = self.quit.clone();
        let menu = MenuComponent::new(self.menu_host.clone(), "#game-over")
            .on_click("#quit", move || quit.set(true))
            .on_click("#retry", || println!("  [menu] retry is not wired in this demo"));
        let screen = Entity::builder(self.state.stage().clone()).with(menu).build()?;

        println!("Player blocked for {} updates, showing menu", self.blocked);
        self.state.set_entities(vec![screen]);
        self.in_menu = true;
        Ok(())
    }
}

impl Game for Platformer {
    fn update(&mut self, delta_ms: f64) -> Result<()> {
        self.updates += 1;
        self.script_input();

        if self.in_menu {
            if self.updates % 10 == 0 {
                self.menu_host.click("#quit");
            }
            if self.quit.get() {
                self.state.set_entities(Vec::new());
                self.handle.stop();
            }
            return Ok(());
        }

        self.state.resolve_collisions(None)?;
        self.state.update(delta_ms)?;

        let touching = self
            .state
            .entity(self.player)
            .and_then(|e| e.component::<BoxColliderComponent>())
            .map(|c| c.is_colliding)
            .unwrap_or(false);
        if touching {
            self.blocked += 1;
        }
        if self.blocked >= 15 {
            self.open_menu()?;
        }
        Ok(())
    }

    fn render(&mut self, delta_ms: f64) -> Result<()> {
        self.state.render(delta_ms)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    println!("Sprite Engine - Platformer");
    println!("==========================\n");

    let stage: Rc<dyn Stage> = Rc::new(HeadlessStage::new(800.0, 600.0));
    let keyboard = Keyboard::new();
    let mut state = GameState::new(stage.clone());
    let player_id = state.add_entity(player(&stage, &keyboard)?);
    state.add_entity(enemy(&stage)?);

    let mut game_loop = GameLoop::new(stage, Default::default())?;
    let mut game = Platformer {
        state,
        handle: game_loop.handle(),
        keyboard: keyboard.clone(),
        menu_host: Rc::new(ConsoleMenu::default()),
        player: player_id,
        updates: 0,
        blocked: 0,
        in_menu: false,
        quit: Rc::new(Cell::new(false)),
    };
    let stats = game_loop.run(&mut game)?;

    println!("\nRan {} updates and {} frames", stats.updates, stats.renders);
    println!("  keyboard subscribers left: {}", keyboard.subscriber_count());
    println!("  menu listeners left: {}", game.menu_host.listeners.borrow().len());
    Ok(())
}
