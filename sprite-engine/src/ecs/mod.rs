//! Entity component core
//!
//! This module provides the engine's object model:
//! - Components: behaviour units with init/update/render/terminate hooks
//! - Entities: one component per kind, dispatched in registration order
//! - Game state: the registry of live entities and the deferred
//!   [`StateApi`] handed to components during an update pass

mod component;
pub mod components;
mod entity;
mod state;

pub use component::{AsAny, Component, ComponentKind, ComponentTable, TypedComponent};
pub use entity::{Entity, EntityBuilder, EntityId, UpdateHooks};
pub use state::{GameState, StateApi};

#[cfg(test)]
mod tests {
    use super::components::PositionComponent;
    use super::*;
    use crate::stage::HeadlessStage;
    use std::rc::Rc;

    #[test]
    fn test_state_creation() {
        let state = GameState::new(Rc::new(HeadlessStage::new(800.0, 600.0)));
        assert_eq!(state.len(), 0);
    }

    #[test]
    fn test_entity_registration() {
        let stage = Rc::new(HeadlessStage::new(800.0, 600.0));
        let mut state = GameState::new(stage.clone());
        let entity = Entity::builder(stage).with(PositionComponent::new(0.0, 0.0)).build().unwrap();
        let id = state.add_entity(entity);
        assert_eq!(state.len(), 1);
        assert!(state.entity(id).is_some());
    }
}
