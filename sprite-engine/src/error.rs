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
//! Engine error types
//!
//! Almost every failure the engine reports is a programmer error: a hook asked
//! for a sibling component the entity was never given, or the loop was driven
//! through a transition it does not support. These propagate out of the tick
//! that hit them and halt the game loop. Audio lookups are the exception and
//! degrade to a logged warning instead of an error.

use crate::config::ConfigError;
use crate::ecs::{ComponentKind, EntityId};
use crate::scheduler::LoopState;
use thiserror::Error;

/// Errors raised by entity hooks, the collision resolver and the game loop
#[derive(Error, Debug)]
pub enum EngineError {
    /// A required sibling component is absent (or has an unexpected type)
    #[error("{entity} has no {kind} component of the requested type")]
    MissingComponent {
        /// Entity the lookup ran against
        entity: EntityId,
        /// Kind that was looked up
        kind: ComponentKind,
    },

    /// A sprite was asked to play an animation it does not define
    #[error("unknown sprite animation: {0}")]
    UnknownAnimation(String),

    /// The game loop cannot perform the requested transition
    #[error("cannot {action} the game loop while it is {state}")]
    InvalidTransition {
        /// Requested action (start, pause, resume)
        action: &'static str,
        /// State the loop was in
        state: LoopState,
    },

    /// Failure reported by game-level code
    #[error("game error: {0}")]
    Game(String),

    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, EngineError>;
