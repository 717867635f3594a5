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
//! Axis-aligned box collider

use crate::collision::{CollisionCallback, Rect};
use crate::ecs::components::PositionComponent;
use crate::ecs::{Component, ComponentKind, Entity, TypedComponent};
use crate::error::Result;
use crate::math::Vec2;
use std::fmt;
use std::rc::Rc;

/// Box collider anchored at the entity's position
///
/// The collision resolver sets `is_colliding` once per pass and invokes the
/// callback for every other collider this one overlaps. The callback receives
/// the owning entity first and the other entity second.
pub struct BoxColliderComponent {
    /// Width and height of the box
    pub size: Vec2,
    /// Trigger flag; carried for game code, the resolver does not read it
    pub trigger: bool,
    /// Whether this collider overlapped anything during the last pass
    pub is_colliding: bool,
    callback: Option<CollisionCallback>,
    outline: Option<String>,
}

impl BoxColliderComponent {
    /// Create a collider without a callback
    pub fn new(width: f64, height: f64) -> Self {
        BoxColliderComponent {
            size: Vec2::new(width, height),
            trigger: true,
            is_colliding: false,
            callback: None,
            outline: None,
        }
    }

    /// Set the collision callback
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Entity, &Entity) -> Result<()> + 'static,
    {
        self.callback = Some(Rc::new(callback));
        self
    }

    /// Stroke the box outline in this colour on every render
    pub fn with_outline(mut self, color: impl Into<String>) -> Self {
        self.outline = Some(color.into());
        self
    }

    /// Replace or clear the collision callback
    pub fn set_callback(&mut self, callback: Option<CollisionCallback>) {
        self.callback = callback;
    }

    /// Collision callback, if any
    pub fn callback(&self) -> Option<&CollisionCallback> {
        self.callback.as_ref()
    }

    /// The box placed at `origin`
    pub fn rect_at(&self, origin: Vec2) -> Rect {
        Rect::new(origin, self.size)
    }
}

impl Component for BoxColliderComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn on_render(&mut self, entity: &Entity, _delta_ms: f64) -> Result<()> {
        if let Some(color) = &self.outline {
            let pos = entity.require::<PositionComponent>()?;
            entity.stage().stroke_rect(pos.p, self.size, color);
        }
        Ok(())
    }
}

impl TypedComponent for BoxColliderComponent {
    const KIND: ComponentKind = ComponentKind::Collider;
}

impl fmt::Debug for BoxColliderComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxColliderComponent")
            .field("size", &self.size)
            .field("trigger", &self.trigger)
            .field("is_colliding", &self.is_colliding)
            .field("has_callback", &self.callback.is_some())
            .field("outline", &self.outline)
            .finish()
    }
}
