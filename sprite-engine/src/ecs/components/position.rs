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
//! Position and velocity

use crate::ecs::{Component, ComponentKind, Entity, StateApi, TypedComponent};
use crate::error::Result;
use crate::math::{scale_vec, Vec2};

/// Position, last stable position and velocity of an entity
///
/// Velocity is in pixels per second. Each update first records the current
/// position as the last stable one, then integrates velocity over the
/// elapsed time.
///
/// # Examples
///
/// ```
/// use sprite_engine::ecs::components::PositionComponent;
/// use sprite_engine::math::Vec2;
///
/// let mut pos = PositionComponent::new(10.0, 20.0).with_velocity(5.0, 0.0);
/// pos.bounce();
/// assert_eq!(pos.v, Vec2::new(-5.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionComponent {
    /// Current position (top-left corner)
    pub p: Vec2,
    /// Position before the most recent update
    pub lp: Vec2,
    /// Velocity in pixels per second
    pub v: Vec2,
    /// Facing direction, `1` or `-1`
    pub direction: i8,
}

impl PositionComponent {
    /// Create a stationary position
    pub fn new(x: f64, y: f64) -> Self {
        Self::at(Vec2::new(x, y))
    }

    /// Create a stationary position from a vector
    pub fn at(p: Vec2) -> Self {
        PositionComponent {
            p,
            lp: p,
            v: Vec2::ZERO,
            direction: 1,
        }
    }

    /// Set the velocity
    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.v = Vec2::new(vx, vy);
        self
    }

    /// Move back to the last stable position
    pub fn revert(&mut self) {
        self.p = self.lp;
    }

    /// Reverse both velocity axes
    pub fn bounce(&mut self) {
        self.v = -self.v;
    }
}

impl Component for PositionComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn on_update(&mut self, _entity: &mut Entity, delta_ms: f64, _state: Option<&mut StateApi>) -> Result<()> {
        self.lp = self.p;
        self.p += scale_vec(self.v, delta_ms);
        Ok(())
    }
}

impl TypedComponent for PositionComponent {
    const KIND: ComponentKind = ComponentKind::Position;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::HeadlessStage;
    use approx::assert_relative_eq;
    use std::rc::Rc;

    fn entity_with(position: PositionComponent) -> Entity {
        let stage = Rc::new(HeadlessStage::new(800.0, 600.0));
        Entity::builder(stage).with(position).build().unwrap()
    }

    #[test]
    fn test_update_integrates_velocity() {
        let mut entity = entity_with(PositionComponent::new(0.0, 0.0).with_velocity(10.0, -4.0));
        entity.update(500.0, None).unwrap();

        let pos = entity.component::<PositionComponent>().unwrap();
        assert_relative_eq!(pos.p.x, 5.0);
        assert_relative_eq!(pos.p.y, -2.0);
        assert_eq!(pos.lp, Vec2::ZERO);
    }

    #[test]
    fn test_last_position_tracks_previous_update() {
        let mut entity = entity_with(PositionComponent::new(0.0, 0.0).with_velocity(100.0, 0.0));
        entity.update(100.0, None).unwrap();
        entity.update(100.0, None).unwrap();

        let pos = entity.component::<PositionComponent>().unwrap();
        assert_relative_eq!(pos.lp.x, 10.0);
        assert_relative_eq!(pos.p.x, 20.0);
    }

    #[test]
    fn test_revert() {
        let mut pos = PositionComponent::new(1.0, 1.0);
        pos.p = Vec2::new(9.0, 9.0);
        pos.revert();
        assert_eq!(pos.p, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_zero_delta_keeps_position() {
        let mut entity = entity_with(PositionComponent::new(3.0, 4.0).with_velocity(50.0, 50.0));
        entity.update(0.0, None).unwrap();
        assert_eq!(entity.component::<PositionComponent>().unwrap().p, Vec2::new(3.0, 4.0));
    }
}
