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
//! Game state registry
//!
//! [`GameState`] owns every live entity in registration order. Components
//! never touch the registry directly: during an update pass they receive a
//! [`StateApi`] that queues spawns and removals, and the queue is applied once
//! the pass is over. Removed and replaced entities are always destroyed
//! before they are dropped.

use crate::collision::{self, CollisionCallback, CollisionStats};
use crate::ecs::{ComponentKind, Entity, EntityId};
use crate::error::Result;
use crate::scheduler::Game;
use crate::stage::Stage;
use std::rc::Rc;

/// Deferred registry access available to components during an update
pub struct StateApi {
    stage: Rc<dyn Stage>,
    entity_ids: Vec<EntityId>,
    spawned: Vec<Entity>,
    removed: Vec<EntityId>,
}

impl StateApi {
    /// Create an api over a snapshot of entity ids
    pub fn new(stage: Rc<dyn Stage>, entity_ids: Vec<EntityId>) -> Self {
        StateApi {
            stage,
            entity_ids,
            spawned: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Queue an entity for registration after the current pass
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        self.spawned.push(entity);
        id
    }

    /// Queue an entity for removal after the current pass
    pub fn remove_entity(&mut self, id: EntityId) {
        if !self.removed.contains(&id) {
            self.removed.push(id);
        }
    }

    /// Ids of the entities registered when the pass began
    pub fn entities(&self) -> &[EntityId] {
        &self.entity_ids
    }

    /// Stage shared by every entity
    pub fn stage(&self) -> &Rc<dyn Stage> {
        &self.stage
    }

    /// Whether nothing has been queued
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.removed.is_empty()
    }
}

/// Registry of live entities
pub struct GameState {
    stage: Rc<dyn Stage>,
    entities: Vec<Entity>,
}

impl GameState {
    /// Create an empty registry drawing on `stage`
    pub fn new(stage: Rc<dyn Stage>) -> Self {
        GameState {
            stage,
            entities: Vec::new(),
        }
    }

    /// Stage shared by every entity
    pub fn stage(&self) -> &Rc<dyn Stage> {
        &self.stage
    }

    /// Register an entity
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        log::debug!("registering {}", id);
        self.entities.push(entity);
        id
    }

    /// Destroy and unregister an entity; `false` if it was not registered
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        match self.entities.iter().position(|e| e.id() == id) {
            Some(index) => {
                let mut entity = self.entities.remove(index);
                entity.destroy();
                true
            }
            None => false,
        }
    }

    /// Look up an entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Look up an entity mutably
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// Entities in registration order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Mutable entities in registration order
    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Ids in registration order
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(Entity::id).collect()
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is registered
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Replace every entity
    ///
    /// Each previously held entity is destroyed exactly once before the new
    /// set is installed.
    pub fn set_entities(&mut self, entities: Vec<Entity>) {
        let previous = std::mem::replace(&mut self.entities, entities);
        log::info!(
            "replacing {} entities with {}",
            previous.len(),
            self.entities.len()
        );
        for mut entity in previous {
            entity.destroy();
        }
    }

    /// Keep only the entities matching `keep`, destroying the rest
    ///
    /// Returns how many entities were removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Entity) -> bool,
    {
        let (kept, dropped): (Vec<Entity>, Vec<Entity>) =
            std::mem::take(&mut self.entities).into_iter().partition(|e| keep(e));
        self.entities = kept;

        let count = dropped.len();
        for mut entity in dropped {
            entity.destroy();
        }
        count
    }

    /// Fresh api over the current ids
    pub fn state_api(&self) -> StateApi {
        StateApi::new(self.stage.clone(), self.ids())
    }

    /// Apply the spawns and removals queued on an api
    ///
    /// Spawns are registered first, so an entity spawned and removed in the
    /// same pass never survives it.
    pub fn apply(&mut self, api: StateApi) {
        let StateApi { spawned, removed, .. } = api;
        for entity in spawned {
            self.add_entity(entity);
        }
        for id in removed {
            if !self.remove_entity(id) {
                log::debug!("{} was already gone when its removal was applied", id);
            }
        }
    }

    /// Update every entity in registration order, then apply queued changes
    ///
    /// Changes queued before a failing entity are still applied.
    pub fn update(&mut self, delta_ms: f64) -> Result<()> {
        let mut api = self.state_api();
        let mut result = Ok(());
        for entity in &mut self.entities {
            if let Err(err) = entity.update(delta_ms, Some(&mut api)) {
                result = Err(err);
                break;
            }
        }
        self.apply(api);
        result
    }

    /// Render every entity in registration order
    pub fn render(&mut self, delta_ms: f64) -> Result<()> {
        for entity in &mut self.entities {
            entity.render(delta_ms)?;
        }
        Ok(())
    }

    /// Resolve collisions between every entity carrying a collider
    pub fn resolve_collisions(&mut self, callback: Option<&CollisionCallback>) -> Result<CollisionStats> {
        let mut colliders: Vec<&mut Entity> = self
            .entities
            .iter_mut()
            .filter(|e| e.has_component(ComponentKind::Collider))
            .collect();
        collision::resolve_collisions(&mut colliders, callback)
    }
}

/// A registry can drive the game loop by itself: each update first resolves
/// collisions among its colliders, then updates every entity.
impl Game for GameState {
    fn update(&mut self, delta_ms: f64) -> Result<()> {
        self.resolve_collisions(None)?;
        GameState::update(self, delta_ms)
    }

    fn render(&mut self, delta_ms: f64) -> Result<()> {
        GameState::render(self, delta_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::PositionComponent;
    use crate::ecs::Component;
    use crate::stage::HeadlessStage;
    use std::cell::Cell;

    struct Counter {
        terminated: Rc<Cell<u32>>,
    }

    impl Component for Counter {
        fn kind(&self) -> ComponentKind {
            ComponentKind::Sound
        }

        fn on_terminate(&mut self, _entity: &mut Entity) {
            self.terminated.set(self.terminated.get() + 1);
        }
    }

    /// Spawns a copy of itself on its first update, then removes itself
    struct Splitter {
        done: bool,
    }

    impl Component for Splitter {
        fn kind(&self) -> ComponentKind {
            ComponentKind::Control
        }

        fn on_update(&mut self, entity: &mut Entity, _delta_ms: f64, state: Option<&mut StateApi>) -> Result<()> {
            if self.done {
                return Ok(());
            }
            self.done = true;
            if let Some(state) = state {
                let child = Entity::builder(state.stage().clone())
                    .with(PositionComponent::new(0.0, 0.0))
                    .build()?;
                state.add_entity(child);
                state.remove_entity(entity.id());
            }
            Ok(())
        }
    }

    fn stage() -> Rc<dyn Stage> {
        Rc::new(HeadlessStage::new(800.0, 600.0))
    }

    fn counted(stage: &Rc<dyn Stage>, terminated: &Rc<Cell<u32>>) -> Entity {
        Entity::builder(stage.clone())
            .with(Counter {
                terminated: terminated.clone(),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_remove_entity_destroys() {
        let stage = stage();
        let terminated = Rc::new(Cell::new(0));
        let mut state = GameState::new(stage.clone());
        let id = state.add_entity(counted(&stage, &terminated));

        assert!(state.remove_entity(id));
        assert!(!state.remove_entity(id));
        assert_eq!(terminated.get(), 1);
        assert!(state.is_empty());
    }

    #[test]
    fn test_set_entities_terminates_each_once() {
        let stage = stage();
        let terminated = Rc::new(Cell::new(0));
        let mut state = GameState::new(stage.clone());
        state.add_entity(counted(&stage, &terminated));
        state.add_entity(counted(&stage, &terminated));

        state.set_entities(vec![Entity::new(stage.clone(), Vec::new()).unwrap()]);
        assert_eq!(terminated.get(), 2);
        assert_eq!(state.len(), 1);

        state.set_entities(Vec::new());
        assert_eq!(terminated.get(), 2);
    }

    #[test]
    fn test_retain_destroys_dropped_only() {
        let stage = stage();
        let terminated = Rc::new(Cell::new(0));
        let mut state = GameState::new(stage.clone());
        let keep = state.add_entity(Entity::new(stage.clone(), Vec::new()).unwrap());
        state.add_entity(counted(&stage, &terminated));

        assert_eq!(state.retain(|e| e.id() == keep), 1);
        assert_eq!(state.ids(), vec![keep]);
        assert_eq!(terminated.get(), 1);
    }

    #[test]
    fn test_update_applies_deferred_changes() {
        let stage = stage();
        let mut state = GameState::new(stage.clone());
        let parent = state.add_entity(
            Entity::builder(stage.clone())
                .with(Splitter { done: false })
                .build()
                .unwrap(),
        );

        state.update(16.0).unwrap();
        assert_eq!(state.len(), 1);
        assert!(state.entity(parent).is_none());
        assert!(state.entities()[0].has_component(ComponentKind::Position));
    }

    #[test]
    fn test_state_api_snapshot() {
        let stage = stage();
        let mut state = GameState::new(stage.clone());
        let id = state.add_entity(Entity::new(stage.clone(), Vec::new()).unwrap());

        let mut api = state.state_api();
        api.add_entity(Entity::new(stage, Vec::new()).unwrap());
        assert_eq!(api.entities(), &[id]);
        assert!(!api.is_empty());

        state.apply(api);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_drop_destroys_entities() {
        let stage = stage();
        let terminated = Rc::new(Cell::new(0));
        {
            let mut state = GameState::new(stage.clone());
            state.add_entity(counted(&stage, &terminated));
        }
        assert_eq!(terminated.get(), 1);
    }
}
