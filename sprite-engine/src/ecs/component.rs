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
//! Component trait and per-entity storage
//!
//! Components are behaviour units attached to an entity, one per
//! [`ComponentKind`]. Each may implement any subset of four lifecycle hooks;
//! the owning [`Entity`] dispatches them in registration order.
//!
//! While a hook runs, its component is temporarily taken out of the entity's
//! table. The hook therefore receives the entity itself and can reach sibling
//! components through the usual typed lookups without aliasing its own data.

use crate::ecs::{Entity, StateApi};
use crate::error::Result;
use std::any::Any;
use std::fmt;

/// Closed set of component kinds; an entity holds at most one of each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Position, last stable position and velocity
    Position,
    /// Player input
    Control,
    /// Axis-aligned box collider
    Collider,
    /// Sprite, image or custom renderer
    Render,
    /// Constant downward acceleration
    Gravity,
    /// Note playback
    Sound,
    /// Menu listeners and visibility
    Menu,
}

impl ComponentKind {
    /// Number of kinds
    pub const COUNT: usize = 7;

    /// Every kind, in declaration order
    pub const ALL: [ComponentKind; Self::COUNT] = [
        ComponentKind::Position,
        ComponentKind::Control,
        ComponentKind::Collider,
        ComponentKind::Render,
        ComponentKind::Gravity,
        ComponentKind::Sound,
        ComponentKind::Menu,
    ];

    /// Dense index of this kind, in `0..COUNT`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Position => "position",
            ComponentKind::Control => "control",
            ComponentKind::Collider => "collider",
            ComponentKind::Render => "render",
            ComponentKind::Gravity => "gravity",
            ComponentKind::Sound => "sound",
            ComponentKind::Menu => "menu",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Upcast to [`Any`] for typed component lookups
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;

    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour unit attached to an entity
///
/// All hooks default to no-ops.
pub trait Component: AsAny {
    /// Kind this component occupies on its entity
    fn kind(&self) -> ComponentKind;

    /// Called once when the component is attached to `entity`
    ///
    /// This is where a component captures per-entity resources such as the
    /// stage handle or input subscriptions.
    fn on_init(&mut self, _entity: &mut Entity) -> Result<()> {
        Ok(())
    }

    /// Called every update tick with the elapsed milliseconds
    ///
    /// `state` is present when the entity is updated through a game state and
    /// lets the component queue spawns and removals.
    fn on_update(
        &mut self,
        _entity: &mut Entity,
        _delta_ms: f64,
        _state: Option<&mut StateApi>,
    ) -> Result<()> {
        Ok(())
    }

    /// Called every render frame
    ///
    /// The entity is borrowed immutably: rendering may advance the
    /// component's own presentation state but never the simulation.
    fn on_render(&mut self, _entity: &Entity, _delta_ms: f64) -> Result<()> {
        Ok(())
    }

    /// Called once when the entity is destroyed; must release any external
    /// listeners or resources
    fn on_terminate(&mut self, _entity: &mut Entity) {}
}

/// Component type with a statically known kind, enabling typed lookups
pub trait TypedComponent: Component + Sized {
    /// Kind every instance of this type occupies
    const KIND: ComponentKind;
}

/// Fixed-size table of components keyed by kind
///
/// Iteration follows registration order. Replacing a component keeps the
/// slot's original position in that order.
#[derive(Default)]
pub struct ComponentTable {
    slots: [Option<Box<dyn Component>>; ComponentKind::COUNT],
    order: Vec<ComponentKind>,
}

impl ComponentTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component, returning the one it replaced
    pub fn insert(&mut self, component: Box<dyn Component>) -> Option<Box<dyn Component>> {
        let kind = component.kind();
        if !self.order.contains(&kind) {
            self.order.push(kind);
        }
        self.slots[kind.index()].replace(component)
    }

    /// Remove a component and forget its position in the order
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Box<dyn Component>> {
        self.order.retain(|k| *k != kind);
        self.slots[kind.index()].take()
    }

    /// Borrow the component of a kind
    pub fn get(&self, kind: ComponentKind) -> Option<&dyn Component> {
        self.slots[kind.index()].as_deref()
    }

    /// Borrow a component by concrete type
    pub fn get_typed<T: TypedComponent>(&self) -> Option<&T> {
        self.slots[T::KIND.index()]
            .as_deref()
            .and_then(|c| c.as_any().downcast_ref::<T>())
    }

    /// Mutably borrow a component by concrete type
    pub fn get_typed_mut<T: TypedComponent>(&mut self) -> Option<&mut T> {
        self.slots[T::KIND.index()]
            .as_deref_mut()
            .and_then(|c| c.as_any_mut().downcast_mut::<T>())
    }

    /// Whether a component of this kind is present
    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Kinds in registration order
    pub fn kinds(&self) -> &[ComponentKind] {
        &self.order
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the table holds no components
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Take a component out of its slot while keeping its place in the order
    pub(crate) fn take(&mut self, kind: ComponentKind) -> Option<Box<dyn Component>> {
        self.slots[kind.index()].take()
    }

    /// Return a component taken with [`take`](Self::take)
    ///
    /// If a hook attached a replacement of the same kind in the meantime, or
    /// removed the kind altogether, the replacement wins and the returned
    /// component is handed back to the caller.
    pub(crate) fn restore(&mut self, component: Box<dyn Component>) -> Option<Box<dyn Component>> {
        let kind = component.kind();
        let slot = &mut self.slots[kind.index()];
        if slot.is_none() && self.order.contains(&kind) {
            *slot = Some(component);
            None
        } else {
            Some(component)
        }
    }
}

impl fmt::Debug for ComponentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.order.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker {
        kind: ComponentKind,
        tag: u32,
    }

    impl Component for Marker {
        fn kind(&self) -> ComponentKind {
            self.kind
        }
    }

    struct Typed(u32);

    impl Component for Typed {
        fn kind(&self) -> ComponentKind {
            Self::KIND
        }
    }

    impl TypedComponent for Typed {
        const KIND: ComponentKind = ComponentKind::Gravity;
    }

    fn marker(kind: ComponentKind, tag: u32) -> Box<dyn Component> {
        Box::new(Marker { kind, tag })
    }

    fn tag_of(table: &ComponentTable, kind: ComponentKind) -> u32 {
        table
            .get(kind)
            .and_then(|c| c.as_any().downcast_ref::<Marker>())
            .map(|m| m.tag)
            .unwrap()
    }

    #[test]
    fn test_kind_indices_are_dense() {
        for (i, kind) in ComponentKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut table = ComponentTable::new();
        table.insert(marker(ComponentKind::Render, 1));
        table.insert(marker(ComponentKind::Position, 2));
        table.insert(marker(ComponentKind::Collider, 3));

        assert_eq!(
            table.kinds(),
            &[ComponentKind::Render, ComponentKind::Position, ComponentKind::Collider]
        );
    }

    #[test]
    fn test_overwrite_keeps_slot_position() {
        let mut table = ComponentTable::new();
        table.insert(marker(ComponentKind::Position, 1));
        table.insert(marker(ComponentKind::Render, 2));
        let previous = table.insert(marker(ComponentKind::Position, 3));

        assert!(previous.is_some());
        assert_eq!(table.len(), 2);
        assert_eq!(table.kinds()[0], ComponentKind::Position);
        assert_eq!(tag_of(&table, ComponentKind::Position), 3);
    }

    #[test]
    fn test_typed_lookup() {
        let mut table = ComponentTable::new();
        table.insert(Box::new(Typed(5)));

        assert_eq!(table.get_typed::<Typed>().map(|t| t.0), Some(5));
        table.get_typed_mut::<Typed>().unwrap().0 = 9;
        assert_eq!(table.get_typed::<Typed>().map(|t| t.0), Some(9));
    }

    #[test]
    fn test_typed_lookup_wrong_type() {
        let mut table = ComponentTable::new();
        table.insert(marker(ComponentKind::Gravity, 1));

        assert!(table.contains(ComponentKind::Gravity));
        assert!(table.get_typed::<Typed>().is_none());
    }

    #[test]
    fn test_take_and_restore() {
        let mut table = ComponentTable::new();
        table.insert(marker(ComponentKind::Sound, 1));

        let taken = table.take(ComponentKind::Sound).unwrap();
        assert!(!table.contains(ComponentKind::Sound));
        assert_eq!(table.kinds(), &[ComponentKind::Sound]);

        assert!(table.restore(taken).is_none());
        assert_eq!(tag_of(&table, ComponentKind::Sound), 1);
    }

    #[test]
    fn test_restore_yields_to_replacement() {
        let mut table = ComponentTable::new();
        table.insert(marker(ComponentKind::Sound, 1));

        let taken = table.take(ComponentKind::Sound).unwrap();
        table.insert(marker(ComponentKind::Sound, 2));

        let rejected = table.restore(taken);
        assert!(rejected.is_some());
        assert_eq!(tag_of(&table, ComponentKind::Sound), 2);
    }

    #[test]
    fn test_remove() {
        let mut table = ComponentTable::new();
        table.insert(marker(ComponentKind::Menu, 1));
        assert!(table.remove(ComponentKind::Menu).is_some());
        assert!(table.is_empty());
        assert!(table.get(ComponentKind::Menu).is_none());
    }
}
