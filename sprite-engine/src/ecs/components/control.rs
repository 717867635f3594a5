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
//! Keyboard-driven control
//!
//! The host owns a [`Keyboard`] and feeds it raw key events. Every
//! [`ControlComponent`] subscribes in `on_init`, folds the events it received
//! into a held-key set once per update and unsubscribes on terminate.

use crate::ecs::{Component, ComponentKind, Entity, StateApi, TypedComponent};
use crate::error::Result;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Default)]
struct KeyEvents {
    pressed: HashSet<String>,
    released: HashSet<String>,
}

type Subscription = Rc<RefCell<KeyEvents>>;

/// Shared keyboard event source
///
/// Clones share subscribers, so the host can keep one handle while
/// components hold others.
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    subscribers: Rc<RefCell<Vec<Subscription>>>,
}

impl Keyboard {
    /// Create a keyboard with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a key press
    pub fn key_down(&self, key: &str) {
        for events in self.subscribers.borrow().iter() {
            events.borrow_mut().pressed.insert(key.to_string());
        }
    }

    /// Report a key release
    pub fn key_up(&self, key: &str) {
        for events in self.subscribers.borrow().iter() {
            events.borrow_mut().released.insert(key.to_string());
        }
    }

    /// Number of attached components
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn subscribe(&self) -> Subscription {
        let events = Subscription::default();
        self.subscribers.borrow_mut().push(events.clone());
        events
    }

    fn unsubscribe(&self, events: &Subscription) {
        self.subscribers.borrow_mut().retain(|s| !Rc::ptr_eq(s, events));
    }
}

/// Keys currently held down
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyState {
    down: HashSet<String>,
}

impl KeyState {
    /// Whether `key` is held
    pub fn is_down(&self, key: &str) -> bool {
        self.down.contains(key)
    }

    /// Whether no key is held
    pub fn is_empty(&self) -> bool {
        self.down.is_empty()
    }
}

/// Per-update input handler: `(keys, entity, delta_ms)`
pub type ControlHandler = Box<dyn FnMut(&KeyState, &mut Entity, f64) -> Result<()>>;

/// Tracks held keys and hands them to a handler every update
pub struct ControlComponent {
    keyboard: Keyboard,
    events: Option<Subscription>,
    state: KeyState,
    handler: Option<ControlHandler>,
}

impl ControlComponent {
    /// Create a control listening to `keyboard`
    pub fn new(keyboard: Keyboard) -> Self {
        ControlComponent {
            keyboard,
            events: None,
            state: KeyState::default(),
            handler: None,
        }
    }

    /// Set the per-update handler
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&KeyState, &mut Entity, f64) -> Result<()> + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Keys held as of the last update
    pub fn key_state(&self) -> &KeyState {
        &self.state
    }

    /// Whether this control is subscribed to its keyboard
    pub fn is_attached(&self) -> bool {
        self.events.is_some()
    }
}

impl Component for ControlComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn on_init(&mut self, _entity: &mut Entity) -> Result<()> {
        if self.events.is_none() {
            self.events = Some(self.keyboard.subscribe());
        }
        Ok(())
    }

    fn on_update(&mut self, entity: &mut Entity, delta_ms: f64, _state: Option<&mut StateApi>) -> Result<()> {
        if let Some(events) = &self.events {
            let mut events = events.borrow_mut();
            self.state.down.extend(events.pressed.drain());
            for key in events.released.drain() {
                self.state.down.remove(&key);
            }
        }

        if let Some(handler) = self.handler.as_mut() {
            handler(&self.state, entity, delta_ms)?;
        }
        Ok(())
    }

    fn on_terminate(&mut self, _entity: &mut Entity) {
        if let Some(events) = self.events.take() {
            self.keyboard.unsubscribe(&events);
        }
        self.state.down.clear();
    }
}

impl TypedComponent for ControlComponent {
    const KIND: ComponentKind = ComponentKind::Control;
}

impl fmt::Debug for ControlComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlComponent")
            .field("attached", &self.events.is_some())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::PositionComponent;
    use crate::stage::HeadlessStage;

    fn controlled(keyboard: &Keyboard) -> Entity {
        let stage = Rc::new(HeadlessStage::new(800.0, 600.0));
        Entity::builder(stage)
            .with(PositionComponent::new(100.0, 100.0))
            .with(ControlComponent::new(keyboard.clone()).with_handler(|keys, entity, _delta| {
                let pos = entity.require_mut::<PositionComponent>()?;
                if keys.is_down("ArrowLeft") {
                    pos.p.x -= 10.0;
                } else if keys.is_down("ArrowRight") {
                    pos.p.x += 10.0;
                }
                Ok(())
            }))
            .build()
            .unwrap()
    }

    fn x_of(entity: &Entity) -> f64 {
        entity.component::<PositionComponent>().unwrap().p.x
    }

    #[test]
    fn test_held_key_drives_handler() {
        let keyboard = Keyboard::new();
        let mut entity = controlled(&keyboard);

        keyboard.key_down("ArrowLeft");
        entity.update(16.0, None).unwrap();
        entity.update(16.0, None).unwrap();
        assert_eq!(x_of(&entity), 80.0);

        keyboard.key_up("ArrowLeft");
        entity.update(16.0, None).unwrap();
        assert_eq!(x_of(&entity), 80.0);
    }

    #[test]
    fn test_press_and_release_within_one_tick() {
        let keyboard = Keyboard::new();
        let mut entity = controlled(&keyboard);

        keyboard.key_down("ArrowRight");
        keyboard.key_up("ArrowRight");
        entity.update(16.0, None).unwrap();

        assert_eq!(x_of(&entity), 100.0);
        assert!(entity.component::<ControlComponent>().unwrap().key_state().is_empty());
    }

    #[test]
    fn test_destroy_unsubscribes() {
        let keyboard = Keyboard::new();
        let mut entity = controlled(&keyboard);
        assert_eq!(keyboard.subscriber_count(), 1);

        entity.destroy();
        assert_eq!(keyboard.subscriber_count(), 0);
    }
}
