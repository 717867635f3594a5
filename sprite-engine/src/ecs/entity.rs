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
//! Entity container
//!
//! An entity owns one component per kind and coordinates their lifecycle:
//! components are initialised when attached, updated and rendered in
//! registration order, and terminated exactly once when the entity is
//! destroyed (explicitly, or when it is dropped).

use crate::ecs::{Component, ComponentKind, ComponentTable, StateApi, TypedComponent};
use crate::error::{EngineError, Result};
use crate::stage::Stage;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Create a new EntityId from a raw u64 value
    pub fn new(id: u64) -> Self {
        EntityId(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Allocate a fresh, process-wide unique id
    pub(crate) fn next() -> Self {
        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Entity-level hooks wrapped around the component update pass
pub trait UpdateHooks {
    /// Runs before any component updates
    fn on_update_start(
        &mut self,
        _entity: &mut Entity,
        _delta_ms: f64,
        _state: Option<&mut StateApi>,
    ) -> Result<()> {
        Ok(())
    }

    /// Runs after every component has updated
    fn on_update_end(
        &mut self,
        _entity: &mut Entity,
        _delta_ms: f64,
        _state: Option<&mut StateApi>,
    ) -> Result<()> {
        Ok(())
    }
}

/// A bag of components sharing one identity and one stage
pub struct Entity {
    id: EntityId,
    stage: Rc<dyn Stage>,
    components: ComponentTable,
    hooks: Option<Box<dyn UpdateHooks>>,
    destroyed: bool,
}

impl Entity {
    /// Create an entity from a list of components
    ///
    /// When two components share a kind the later one wins. Every remaining
    /// component's `on_init` then runs in registration order.
    pub fn new(stage: Rc<dyn Stage>, components: Vec<Box<dyn Component>>) -> Result<Self> {
        let mut entity = Entity {
            id: EntityId::next(),
            stage,
            components: ComponentTable::new(),
            hooks: None,
            destroyed: false,
        };

        for component in components {
            entity.components.insert(component);
        }
        let kinds = entity.components.kinds().to_vec();
        for (i, &kind) in kinds.iter().enumerate() {
            if let Err(err) = entity.init_component(kind) {
                // Only the components whose init succeeded are torn down
                entity.destroyed = true;
                entity.terminate(&kinds[..i]);
                log::debug!("{} failed to initialise its {} component", entity.id, kind);
                return Err(err);
            }
        }

        log::debug!("{} created with {:?}", entity.id, entity.components);
        Ok(entity)
    }

    /// Start building an entity
    pub fn builder(stage: Rc<dyn Stage>) -> EntityBuilder {
        EntityBuilder {
            stage,
            components: Vec::new(),
            hooks: None,
        }
    }

    /// Get the entity ID
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Stage this entity draws on
    pub fn stage(&self) -> &Rc<dyn Stage> {
        &self.stage
    }

    /// Component table
    pub fn components(&self) -> &ComponentTable {
        &self.components
    }

    /// Whether [`destroy`](Self::destroy) has run
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Install entity-level update hooks, replacing any previous ones
    pub fn set_hooks(&mut self, hooks: impl UpdateHooks + 'static) {
        self.hooks = Some(Box::new(hooks));
    }

    /// Attach a component and initialise it alone
    ///
    /// A component of the same kind already attached is terminated first.
    pub fn add_component(&mut self, component: impl Component) -> Result<()> {
        self.add_boxed(Box::new(component))
    }

    /// Boxed form of [`add_component`](Self::add_component)
    pub fn add_boxed(&mut self, component: Box<dyn Component>) -> Result<()> {
        let kind = component.kind();
        if let Some(mut replaced) = self.components.insert(component) {
            replaced.on_terminate(self);
        }
        self.init_component(kind)
    }

    /// Detach a component, running its `on_terminate`
    ///
    /// Returns `false` when no component of that kind was attached. A
    /// component removing itself from inside one of its own hooks is
    /// terminated once that hook returns.
    pub fn remove_component(&mut self, kind: ComponentKind) -> bool {
        let attached = self.components.kinds().contains(&kind);
        if let Some(mut component) = self.components.remove(kind) {
            component.on_terminate(self);
        }
        attached
    }

    /// Borrow the component of a kind, if present
    pub fn get_component(&self, kind: ComponentKind) -> Option<&dyn Component> {
        self.components.get(kind)
    }

    /// Whether a component of this kind is attached
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.components.contains(kind)
    }

    /// Borrow a component by concrete type, if present
    pub fn component<T: TypedComponent>(&self) -> Option<&T> {
        self.components.get_typed::<T>()
    }

    /// Mutably borrow a component by concrete type, if present
    pub fn component_mut<T: TypedComponent>(&mut self) -> Option<&mut T> {
        self.components.get_typed_mut::<T>()
    }

    /// Borrow a component this caller cannot work without
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingComponent`] when the component is absent.
    pub fn require<T: TypedComponent>(&self) -> Result<&T> {
        let id = self.id;
        self.components.get_typed::<T>().ok_or(EngineError::MissingComponent {
            entity: id,
            kind: T::KIND,
        })
    }

    /// Mutable form of [`require`](Self::require)
    pub fn require_mut<T: TypedComponent>(&mut self) -> Result<&mut T> {
        let id = self.id;
        self.components.get_typed_mut::<T>().ok_or(EngineError::MissingComponent {
            entity: id,
            kind: T::KIND,
        })
    }

    /// Run one update pass
    ///
    /// Order: `on_update_start` hook, every component's `on_update` in
    /// registration order, `on_update_end` hook. The first error aborts the
    /// pass.
    pub fn update(&mut self, delta_ms: f64, mut state: Option<&mut StateApi>) -> Result<()> {
        if let Some(mut hooks) = self.hooks.take() {
            let result = hooks.on_update_start(self, delta_ms, state.as_deref_mut());
            self.restore_hooks(hooks);
            result?;
        }

        let kinds = self.components.kinds().to_vec();
        for kind in kinds {
            let Some(mut component) = self.components.take(kind) else {
                continue;
            };
            let result = component.on_update(self, delta_ms, state.as_deref_mut());
            self.put_back(component);
            result?;
        }

        if let Some(mut hooks) = self.hooks.take() {
            let result = hooks.on_update_end(self, delta_ms, state.as_deref_mut());
            self.restore_hooks(hooks);
            result?;
        }
        Ok(())
    }

    /// Render every component in registration order
    pub fn render(&mut self, delta_ms: f64) -> Result<()> {
        let kinds = self.components.kinds().to_vec();
        for kind in kinds {
            let Some(mut component) = self.components.take(kind) else {
                continue;
            };
            let result = component.on_render(self, delta_ms);
            self.put_back(component);
            result?;
        }
        Ok(())
    }

    /// Terminate every component
    ///
    /// Only the first call has any effect.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        let kinds = self.components.kinds().to_vec();
        self.terminate(&kinds);
        log::debug!("{} destroyed", self.id);
    }

    fn terminate(&mut self, kinds: &[ComponentKind]) {
        for &kind in kinds {
            if let Some(mut component) = self.components.take(kind) {
                component.on_terminate(self);
                // Already terminated, so a detached one is simply dropped
                let _ = self.components.restore(component);
            }
        }
    }

    fn init_component(&mut self, kind: ComponentKind) -> Result<()> {
        let Some(mut component) = self.components.take(kind) else {
            return Ok(());
        };
        let result = component.on_init(self);
        self.put_back(component);
        result
    }

    fn put_back(&mut self, component: Box<dyn Component>) {
        if let Some(mut detached) = self.components.restore(component) {
            log::debug!(
                "{} terminating a {} component detached during its own hook",
                self.id,
                detached.kind()
            );
            detached.on_terminate(self);
        }
    }

    fn restore_hooks(&mut self, hooks: Box<dyn UpdateHooks>) {
        if self.hooks.is_none() {
            self.hooks = Some(hooks);
        }
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("components", &self.components)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

/// Builder collecting components before the entity is initialised
pub struct EntityBuilder {
    stage: Rc<dyn Stage>,
    components: Vec<Box<dyn Component>>,
    hooks: Option<Box<dyn UpdateHooks>>,
}

impl EntityBuilder {
    /// Add a component
    pub fn with(mut self, component: impl Component) -> Self {
        self.components.push(Box::new(component));
        self
    }

    /// Add an already boxed component
    pub fn with_boxed(mut self, component: Box<dyn Component>) -> Self {
        self.components.push(component);
        self
    }

    /// Install entity-level update hooks
    pub fn hooks(mut self, hooks: impl UpdateHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Create the entity, initialising its components
    pub fn build(self) -> Result<Entity> {
        let mut entity = Entity::new(self.stage, self.components)?;
        entity.hooks = self.hooks;
        Ok(entity)
    }
}
