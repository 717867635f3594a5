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
//! Renderers
//!
//! Three render components share the `render` kind: animated sprites, static
//! images and user-supplied draw functions. Each draws at the sibling
//! position's top-left corner and fails the render call when that position
//! is missing.

use crate::ecs::components::PositionComponent;
use crate::ecs::{Component, ComponentKind, Entity, TypedComponent};
use crate::error::{EngineError, Result};
use crate::math::Vec2;
use crate::stage::{Image, Stage};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Frames cycled at a fixed interval
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    /// Frames in playback order
    pub frames: Vec<Image>,
    /// Milliseconds each frame stays on screen
    pub change_time_ms: f64,
}

impl Animation {
    /// Create an animation
    pub fn new(frames: Vec<Image>, change_time_ms: f64) -> Self {
        Animation {
            frames,
            change_time_ms,
        }
    }
}

/// Named set of animations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sprite {
    animations: HashMap<String, Animation>,
}

impl Sprite {
    /// Create a sprite with no animations
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an animation
    pub fn with_animation(mut self, name: impl Into<String>, animation: Animation) -> Self {
        self.animations.insert(name.into(), animation);
        self
    }

    /// Look up an animation by name
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }
}

/// Plays one of a sprite's animations
pub struct SpriteRenderComponent {
    sprite: Sprite,
    stage: Option<Rc<dyn Stage>>,
    time: f64,
    current_frame: usize,
    current_animation: String,
}

impl SpriteRenderComponent {
    /// Create a renderer starting on `default_animation`
    pub fn new(sprite: Sprite, default_animation: impl Into<String>) -> Self {
        SpriteRenderComponent {
            sprite,
            stage: None,
            time: 0.0,
            current_frame: 0,
            current_animation: default_animation.into(),
        }
    }

    /// Switch to an animation, restarting it from its first frame
    pub fn setup_animation(&mut self, name: impl Into<String>) {
        self.time = 0.0;
        self.current_frame = 0;
        self.current_animation = name.into();
    }

    /// Name of the animation being played
    pub fn current_animation(&self) -> &str {
        &self.current_animation
    }

    /// Index of the frame being shown
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Sprite being played
    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }
}

impl Component for SpriteRenderComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn on_init(&mut self, entity: &mut Entity) -> Result<()> {
        self.stage = Some(entity.stage().clone());
        Ok(())
    }

    fn on_render(&mut self, entity: &Entity, delta_ms: f64) -> Result<()> {
        let pos = entity.require::<PositionComponent>()?.p;
        let animation = self
            .sprite
            .animation(&self.current_animation)
            .ok_or_else(|| EngineError::UnknownAnimation(self.current_animation.clone()))?;
        if animation.frames.is_empty() {
            return Ok(());
        }

        self.time += delta_ms;
        if self.time > animation.change_time_ms {
            self.time = 0.0;
            self.current_frame = (self.current_frame + 1) % animation.frames.len();
        }

        let Some(frame) = animation.frames.get(self.current_frame) else {
            return Ok(());
        };
        let stage = self.stage.as_ref().unwrap_or(entity.stage());
        stage.draw_image(frame, pos, frame.size());
        Ok(())
    }
}

impl TypedComponent for SpriteRenderComponent {
    const KIND: ComponentKind = ComponentKind::Render;
}

impl fmt::Debug for SpriteRenderComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteRenderComponent")
            .field("current_animation", &self.current_animation)
            .field("current_frame", &self.current_frame)
            .field("time", &self.time)
            .finish()
    }
}

/// Draws a single image at its natural size
pub struct ImageRenderComponent {
    image: Image,
    stage: Option<Rc<dyn Stage>>,
}

impl ImageRenderComponent {
    /// Create an image renderer
    pub fn new(image: Image) -> Self {
        ImageRenderComponent { image, stage: None }
    }

    /// Image being drawn
    pub fn image(&self) -> &Image {
        &self.image
    }
}

impl Component for ImageRenderComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn on_init(&mut self, entity: &mut Entity) -> Result<()> {
        self.stage = Some(entity.stage().clone());
        Ok(())
    }

    fn on_render(&mut self, entity: &Entity, _delta_ms: f64) -> Result<()> {
        let pos = entity.require::<PositionComponent>()?.p;
        let stage = self.stage.as_ref().unwrap_or(entity.stage());
        stage.draw_image(&self.image, pos, self.image.size());
        Ok(())
    }
}

impl TypedComponent for ImageRenderComponent {
    const KIND: ComponentKind = ComponentKind::Render;
}

/// User draw function: `(stage, position, delta_ms)`
pub type DrawFn = Box<dyn FnMut(&dyn Stage, Vec2, f64) -> Result<()>>;

/// Delegates drawing to a closure
pub struct CustomRenderComponent {
    draw: DrawFn,
}

impl CustomRenderComponent {
    /// Create a renderer from a draw function
    pub fn new<F>(draw: F) -> Self
    where
        F: FnMut(&dyn Stage, Vec2, f64) -> Result<()> + 'static,
    {
        CustomRenderComponent { draw: Box::new(draw) }
    }
}

impl Component for CustomRenderComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn on_render(&mut self, entity: &Entity, delta_ms: f64) -> Result<()> {
        let pos = entity.require::<PositionComponent>()?.p;
        let stage: &dyn Stage = &**entity.stage();
        (self.draw)(stage, pos, delta_ms)
    }
}

impl TypedComponent for CustomRenderComponent {
    const KIND: ComponentKind = ComponentKind::Render;
}
