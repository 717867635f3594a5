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
//! Entity lifecycle tests
//!
//! Hook ordering across a whole entity, sibling access from hooks and
//! teardown of external subscriptions.

use sprite_engine::ecs::components::{
    ControlComponent, GravityComponent, Keyboard, PositionComponent, SpriteRenderComponent,
};
use sprite_engine::ecs::components::{Animation, Sprite};
use sprite_engine::ecs::{Component, ComponentKind, Entity, StateApi, UpdateHooks};
use sprite_engine::error::EngineError;
use sprite_engine::math::Vec2;
use sprite_engine::stage::{HeadlessStage, Image, Stage};
use sprite_engine::Result;
use approx::assert_relative_eq;
use std::cell::RefCell;
use std::rc::Rc;

type Journal = Rc<RefCell<Vec<String>>>;

struct Traced {
    kind: ComponentKind,
    journal: Journal,
}

impl Component for Traced {
    fn kind(&self) -> ComponentKind {
        self.kind
    }

    fn on_init(&mut self, _entity: &mut Entity) -> Result<()> {
        self.journal.borrow_mut().push(format!("{}:init", self.kind));
        Ok(())
    }

    fn on_update(&mut self, _entity: &mut Entity, _delta_ms: f64, _state: Option<&mut StateApi>) -> Result<()> {
        self.journal.borrow_mut().push(format!("{}:update", self.kind));
        Ok(())
    }

    fn on_terminate(&mut self, _entity: &mut Entity) {
        self.journal.borrow_mut().push(format!("{}:terminate", self.kind));
    }
}

struct Frame {
    journal: Journal,
}

impl UpdateHooks for Frame {
    fn on_update_start(&mut self, _entity: &mut Entity, _delta_ms: f64, _state: Option<&mut StateApi>) -> Result<()> {
        self.journal.borrow_mut().push("entity:start".to_string());
        Ok(())
    }

    fn on_update_end(&mut self, _entity: &mut Entity, _delta_ms: f64, _state: Option<&mut StateApi>) -> Result<()> {
        self.journal.borrow_mut().push("entity:end".to_string());
        Ok(())
    }
}

fn stage() -> Rc<dyn Stage> {
    Rc::new(HeadlessStage::new(800.0, 600.0))
}

#[test]
fn test_full_lifecycle_order() {
    let journal = Journal::default();
    let traced = |kind| Traced {
        kind,
        journal: journal.clone(),
    };

    let mut entity = Entity::builder(stage())
        .with(traced(ComponentKind::Sound))
        .with(traced(ComponentKind::Menu))
        .hooks(Frame {
            journal: journal.clone(),
        })
        .build()
        .unwrap();
    entity.update(16.0, None).unwrap();
    drop(entity);

    assert_eq!(
        *journal.borrow(),
        vec![
            "sound:init",
            "menu:init",
            "entity:start",
            "sound:update",
            "menu:update",
            "entity:end",
            "sound:terminate",
            "menu:terminate",
        ]
    );
}

#[test]
fn test_gravity_feeds_position_in_registration_order() {
    let mut entity = Entity::builder(stage())
        .with(GravityComponent::new(1000.0))
        .with(PositionComponent::new(0.0, 0.0))
        .build()
        .unwrap();

    entity.update(100.0, None).unwrap();
    let pos = entity.component::<PositionComponent>().unwrap();
    assert_relative_eq!(pos.v.y, 100.0);
    assert_relative_eq!(pos.p.y, 10.0);
}

#[test]
fn test_missing_sibling_surfaces_entity_and_kind() {
    let mut entity = Entity::builder(stage())
        .with(SpriteRenderComponent::new(
            Sprite::new().with_animation("idle", Animation::new(vec![Image::new(1, 8.0, 8.0)], 100.0)),
            "idle",
        ))
        .build()
        .unwrap();

    match entity.render(16.0) {
        Err(EngineError::MissingComponent { entity: id, kind }) => {
            assert_eq!(id, entity.id());
            assert_eq!(kind, ComponentKind::Position);
        }
        other => panic!("expected missing component, got {:?}", other),
    }
}

#[test]
fn test_require_reports_missing_component() {
    let entity = Entity::new(stage(), Vec::new()).unwrap();
    let err = entity.require::<PositionComponent>().unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("{} has no position component of the requested type", entity.id())
    );
}

#[test]
fn test_replacing_component_keeps_order_and_reinitialises() {
    let journal = Journal::default();
    let mut entity = Entity::builder(stage())
        .with(PositionComponent::new(1.0, 1.0))
        .with(Traced {
            kind: ComponentKind::Sound,
            journal: journal.clone(),
        })
        .build()
        .unwrap();

    entity.add_component(PositionComponent::new(5.0, 5.0)).unwrap();
    assert_eq!(
        entity.components().kinds(),
        &[ComponentKind::Position, ComponentKind::Sound]
    );
    assert_eq!(entity.component::<PositionComponent>().unwrap().p, Vec2::new(5.0, 5.0));
    assert_eq!(*journal.borrow(), vec!["sound:init"]);
}

#[test]
fn test_destroy_releases_keyboard() {
    let keyboard = Keyboard::new();
    let mut entities: Vec<Entity> = (0..3)
        .map(|_| {
            Entity::builder(stage())
                .with(ControlComponent::new(keyboard.clone()))
                .build()
                .unwrap()
        })
        .collect();
    assert_eq!(keyboard.subscriber_count(), 3);

    entities[0].destroy();
    assert_eq!(keyboard.subscriber_count(), 2);

    entities.clear();
    assert_eq!(keyboard.subscriber_count(), 0);
}

#[test]
fn test_hook_error_aborts_update() {
    struct Failing;

    impl Component for Failing {
        fn kind(&self) -> ComponentKind {
            ComponentKind::Control
        }

        fn on_update(&mut self, _entity: &mut Entity, _delta_ms: f64, _state: Option<&mut StateApi>) -> Result<()> {
            Err(EngineError::Game("no input device".to_string()))
        }
    }

    let mut entity = Entity::builder(stage())
        .with(Failing)
        .with(PositionComponent::new(0.0, 0.0).with_velocity(100.0, 0.0))
        .build()
        .unwrap();

    assert!(entity.update(100.0, None).is_err());
    // Position never ran
    assert_eq!(entity.component::<PositionComponent>().unwrap().p, Vec2::ZERO);
    // The failing component is still attached
    assert!(entity.has_component(ComponentKind::Control));
}

#[test]
fn test_replacing_control_releases_old_subscription() {
    let keyboard = Keyboard::new();
    let mut entity = Entity::builder(stage())
        .with(ControlComponent::new(keyboard.clone()))
        .build()
        .unwrap();

    entity.add_component(ControlComponent::new(keyboard.clone())).unwrap();
    assert_eq!(keyboard.subscriber_count(), 1);

    entity.destroy();
    assert_eq!(keyboard.subscriber_count(), 0);
}

#[test]
fn test_component_removing_itself_is_terminated() {
    let keyboard = Keyboard::new();
    let removed = Rc::new(RefCell::new(None));
    let seen = removed.clone();
    let mut entity = Entity::builder(stage())
        .with(ControlComponent::new(keyboard.clone()).with_handler(
            move |_, entity, _| {
                *seen.borrow_mut() = Some(entity.remove_component(ComponentKind::Control));
                Ok(())
            },
        ))
        .build()
        .unwrap();
    assert_eq!(keyboard.subscriber_count(), 1);

    entity.update(16.0, None).unwrap();

    assert_eq!(*removed.borrow(), Some(true));
    assert!(!entity.has_component(ComponentKind::Control));
    assert_eq!(keyboard.subscriber_count(), 0);
}
