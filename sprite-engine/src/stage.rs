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
//! Drawing surface abstraction
//!
//! The engine never creates or resizes the surface it draws on. Hosts hand an
//! implementation of [`Stage`] to every entity; components issue primitive
//! draw calls against it from their render hooks. [`HeadlessStage`] records
//! those calls instead of rasterizing them and backs the tests and demos.

use crate::config::StageConfig;
use crate::math::Vec2;
use std::cell::{Cell, RefCell};

/// Opaque identifier for an image owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

/// Handle to a host image together with its pixel size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Image {
    id: ImageId,
    size: Vec2,
}

impl Image {
    /// Create an image handle
    pub fn new(id: u32, width: f64, height: f64) -> Self {
        Image {
            id: ImageId(id),
            size: Vec2::new(width, height),
        }
    }

    /// Host identifier of the image
    pub fn id(&self) -> ImageId {
        self.id
    }

    /// Pixel size of the image
    pub fn size(&self) -> Vec2 {
        self.size
    }
}

/// Fixed-size drawing surface and its 2D context
///
/// Methods take `&self`: the stage is shared read-only between all entities
/// and implementations keep their drawing state behind interior mutability.
pub trait Stage {
    /// Size of the surface in pixels
    fn size(&self) -> Vec2;

    /// Wipe the whole surface
    fn clear(&self);

    /// Stroke the outline of a rectangle
    fn stroke_rect(&self, origin: Vec2, size: Vec2, color: &str);

    /// Blit an image scaled to `size` with its top-left corner at `origin`
    fn draw_image(&self, image: &Image, origin: Vec2, size: Vec2);
}

/// A draw call captured by [`HeadlessStage`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Rectangle outline
    StrokeRect {
        /// Top-left corner
        origin: Vec2,
        /// Width and height
        size: Vec2,
        /// Stroke colour
        color: String,
    },
    /// Image blit
    DrawImage {
        /// Image drawn
        image: ImageId,
        /// Top-left corner
        origin: Vec2,
        /// Drawn size
        size: Vec2,
    },
}

/// Stage that records draw calls since the last clear
pub struct HeadlessStage {
    size: Vec2,
    commands: RefCell<Vec<DrawCommand>>,
    clears: Cell<u64>,
}

impl HeadlessStage {
    /// Create a headless stage of the given size
    pub fn new(width: f64, height: f64) -> Self {
        HeadlessStage {
            size: Vec2::new(width, height),
            commands: RefCell::new(Vec::new()),
            clears: Cell::new(0),
        }
    }

    /// Create a headless stage sized from configuration
    pub fn from_config(config: &StageConfig) -> Self {
        Self::new(config.width, config.height)
    }

    /// Draw calls issued since the last clear
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.borrow().clone()
    }

    /// Number of draw calls issued since the last clear
    pub fn command_count(&self) -> usize {
        self.commands.borrow().len()
    }

    /// Number of times the surface has been cleared
    pub fn clear_count(&self) -> u64 {
        self.clears.get()
    }
}

impl Stage for HeadlessStage {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&self) {
        self.commands.borrow_mut().clear();
        self.clears.set(self.clears.get() + 1);
    }

    fn stroke_rect(&self, origin: Vec2, size: Vec2, color: &str) {
        self.commands.borrow_mut().push(DrawCommand::StrokeRect {
            origin,
            size,
            color: color.to_string(),
        });
    }

    fn draw_image(&self, image: &Image, origin: Vec2, size: Vec2) {
        self.commands.borrow_mut().push(DrawCommand::DrawImage {
            image: image.id(),
            origin,
            size,
        });
    }
}
