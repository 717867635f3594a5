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
//! # Sprite Engine
//!
//! A small 2D entity/component game engine: entities are bags of behaviour
//! components driven by a fixed-cadence game loop, with axis-aligned box
//! collisions and host-provided drawing and audio surfaces.
//!
//! ## Features
//!
//! - **Components**: position, control, box collider, sprite/image/custom
//!   renderers, gravity, sound and menu, each with lifecycle hooks
//! - **Game State**: an entity registry with deferred spawns and removals
//! - **Collisions**: strict AABB overlap with per-entity callbacks
//! - **Game Loop**: independent update and render cadences with pause/resume
//! - **Parallelization**: optional Rayon overlap phase for large collider sets
//!
//! ## Example
//!
//! ```rust
//! use sprite_engine::ecs::components::PositionComponent;
//! use sprite_engine::ecs::{Entity, GameState};
//! use sprite_engine::stage::HeadlessStage;
//! use std::rc::Rc;
//!
//! let stage = Rc::new(HeadlessStage::new(800.0, 600.0));
//! let mut state = GameState::new(stage.clone());
//!
//! let ball = Entity::builder(stage)
//!     .with(PositionComponent::new(0.0, 0.0).with_velocity(10.0, -4.0))
//!     .build()
//!     .unwrap();
//! let id = state.add_entity(ball);
//!
//! state.update(500.0).unwrap();
//! let pos = state.entity(id).unwrap().component::<PositionComponent>().unwrap();
//! assert_eq!((pos.p.x, pos.p.y), (5.0, -2.0));
//! ```

#![warn(missing_docs)]

/// Audio collaborator interface and music sheets
pub mod audio;

/// Time sources
pub mod clock;

/// Axis-aligned box collision resolution
pub mod collision;

/// Engine configuration
pub mod config;

/// Entity component core
pub mod ecs;

/// Error types
pub mod error;

/// Vector helpers
pub mod math;

/// Game loop
pub mod scheduler;

/// Drawing surface abstraction
pub mod stage;

pub use ecs::{Entity, GameState};
pub use error::{EngineError, Result};
pub use scheduler::{Game, GameLoop};
