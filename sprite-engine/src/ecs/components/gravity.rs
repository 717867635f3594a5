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
//! Downward acceleration

use crate::ecs::components::PositionComponent;
use crate::ecs::{Component, ComponentKind, Entity, StateApi, TypedComponent};
use crate::error::Result;
use crate::math::scale;

/// Default acceleration in pixels per second squared
pub const DEFAULT_GRAVITY: f64 = 12.0;

/// Accelerates the sibling position downward, capped at a terminal velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityComponent {
    /// Acceleration in pixels per second squared
    pub gravity: f64,
    /// Highest downward speed gravity will produce
    pub terminal_velocity: f64,
}

impl GravityComponent {
    /// Create gravity with a terminal velocity ten times the acceleration
    pub fn new(gravity: f64) -> Self {
        GravityComponent {
            gravity,
            terminal_velocity: gravity * 10.0,
        }
    }

    /// Override the terminal velocity
    pub fn with_terminal_velocity(mut self, terminal_velocity: f64) -> Self {
        self.terminal_velocity = terminal_velocity;
        self
    }
}

impl Default for GravityComponent {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY)
    }
}

impl Component for GravityComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn on_update(&mut self, entity: &mut Entity, delta_ms: f64, _state: Option<&mut StateApi>) -> Result<()> {
        let pos = entity.require_mut::<PositionComponent>()?;
        pos.v.y = (pos.v.y + scale(self.gravity, delta_ms)).min(self.terminal_velocity);
        Ok(())
    }
}

impl TypedComponent for GravityComponent {
    const KIND: ComponentKind = ComponentKind::Gravity;
}
