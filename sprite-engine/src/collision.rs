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
//! Axis-aligned box collision resolution
//!
//! A pass works in two phases. The overlap phase tests every ordered pair of
//! colliders against rectangles captured at the start of the pass; with the
//! `parallel` feature it runs on rayon for larger sets. The dispatch phase
//! then walks the contacts sequentially in `(i, j)` order, invoking the first
//! entity's callback (or the caller's override) and finally recording
//! whether each entity touched anything.
//!
//! Because the rectangles are a snapshot, a callback that moves an entity
//! only affects the next pass.

use crate::ecs::components::{BoxColliderComponent, PositionComponent};
use crate::ecs::Entity;
use crate::error::Result;
use crate::math::Vec2;
use std::rc::Rc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Collider count above which the overlap phase goes parallel
#[cfg(feature = "parallel")]
pub const PARALLEL_THRESHOLD: usize = 64;

/// Called with `(owner, other)` for each overlap the owner takes part in
pub type CollisionCallback = Rc<dyn Fn(&mut Entity, &Entity) -> Result<()>>;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner
    pub origin: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    /// Create a rectangle
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Rect { origin, size }
    }

    /// Whether the interiors of two rectangles intersect; shared edges do
    /// not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        overlaps(self, other)
    }
}

/// Strict AABB overlap test
///
/// # Examples
///
/// ```
/// use sprite_engine::collision::{overlaps, Rect};
/// use sprite_engine::math::Vec2;
///
/// let a = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
/// let b = Rect::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
/// assert!(!overlaps(&a, &b));
/// ```
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.origin.x < b.origin.x + b.size.x
        && a.origin.x + a.size.x > b.origin.x
        && a.origin.y < b.origin.y + b.size.y
        && a.origin.y + a.size.y > b.origin.y
}

/// Counters from one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Colliders tested
    pub colliders: usize,
    /// Overlapping ordered pairs
    pub overlaps: usize,
    /// Callbacks invoked
    pub callbacks: usize,
}

/// Resolve collisions between entities that all carry a position and a box
/// collider
///
/// For every ordered pair `(a, b)` whose boxes overlap, `callback` (when
/// given) or else `a`'s own collider callback runs with `(a, b)`. After all
/// of `a`'s callbacks have run, its `is_colliding` flag is set to whether it
/// overlapped anything, so callbacks observe the previous pass's value.
///
/// # Errors
///
/// Fails with `MissingComponent` before any callback runs when an entity
/// lacks either component. A failing callback aborts the pass: entities
/// before its owner already carry this pass's flag, while the owner and
/// every entity after it keep the previous one.
pub fn resolve_collisions(
    entities: &mut [&mut Entity],
    callback: Option<&CollisionCallback>,
) -> Result<CollisionStats> {
    let rects = snapshot(entities)?;
    let contacts = find_contacts(&rects);

    let mut stats = CollisionStats {
        colliders: rects.len(),
        ..CollisionStats::default()
    };

    for (i, others) in contacts.iter().enumerate() {
        for &j in others {
            stats.overlaps += 1;
            let handler = match callback {
                Some(cb) => Some(cb.clone()),
                None => entities[i]
                    .component::<BoxColliderComponent>()
                    .and_then(|c| c.callback().cloned()),
            };
            if let Some(handler) = handler {
                let (owner, other) = pair_mut(entities, i, j);
                handler(owner, other)?;
                stats.callbacks += 1;
            }
        }

        if let Some(collider) = entities[i].component_mut::<BoxColliderComponent>() {
            collider.is_colliding = !others.is_empty();
        }
    }

    log::trace!(
        "collision pass: {} colliders, {} overlaps, {} callbacks",
        stats.colliders,
        stats.overlaps,
        stats.callbacks
    );
    Ok(stats)
}

fn snapshot(entities: &[&mut Entity]) -> Result<Vec<Rect>> {
    entities
        .iter()
        .map(|entity| {
            let pos = entity.require::<PositionComponent>()?;
            let collider = entity.require::<BoxColliderComponent>()?;
            Ok(collider.rect_at(pos.p))
        })
        .collect()
}

/// For each rectangle, the indices of the others it overlaps, ascending
fn find_contacts(rects: &[Rect]) -> Vec<Vec<usize>> {
    #[cfg(feature = "parallel")]
    {
        if rects.len() >= PARALLEL_THRESHOLD {
            return rects
                .par_iter()
                .enumerate()
                .map(|(i, rect)| contacts_of(i, rect, rects))
                .collect();
        }
    }

    rects
        .iter()
        .enumerate()
        .map(|(i, rect)| contacts_of(i, rect, rects))
        .collect()
}

fn contacts_of(i: usize, rect: &Rect, rects: &[Rect]) -> Vec<usize> {
    rects
        .iter()
        .enumerate()
        .filter(|&(j, other)| j != i && rect.overlaps(other))
        .map(|(j, _)| j)
        .collect()
}

fn pair_mut<'a>(entities: &'a mut [&mut Entity], i: usize, j: usize) -> (&'a mut Entity, &'a Entity) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = entities.split_at_mut(j);
        (&mut *left[i], &*right[0])
    } else {
        let (left, right) = entities.split_at_mut(i);
        (&mut *right[0], &*left[j])
    }
}
