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
//! Built-in components
//!
//! | Kind       | Component                                  |
//! |------------|--------------------------------------------|
//! | position   | [`PositionComponent`]                      |
//! | control    | [`ControlComponent`]                       |
//! | collider   | [`BoxColliderComponent`]                   |
//! | render     | [`SpriteRenderComponent`], [`ImageRenderComponent`], [`CustomRenderComponent`] |
//! | gravity    | [`GravityComponent`]                       |
//! | sound      | [`SoundComponent`]                         |
//! | menu       | [`MenuComponent`]                          |

mod collider;
mod control;
mod gravity;
mod menu;
mod position;
mod render;
mod sound;

pub use collider::BoxColliderComponent;
pub use control::{ControlComponent, ControlHandler, KeyState, Keyboard};
pub use gravity::{GravityComponent, DEFAULT_GRAVITY};
pub use menu::{ListenerId, MenuCallback, MenuComponent, MenuHost};
pub use position::PositionComponent;
pub use render::{Animation, CustomRenderComponent, DrawFn, ImageRenderComponent, Sprite, SpriteRenderComponent};
pub use sound::{SoundComponent, DEFAULT_VOLUME};
