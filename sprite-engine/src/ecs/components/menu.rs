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
//! Menu overlay wiring
//!
//! Menus live in the host UI. A [`MenuComponent`] only knows the menu's root
//! selector and which callbacks belong to which child elements; it asks the
//! [`MenuHost`] to attach them when the entity is initialised and to detach
//! them when it is destroyed.

use crate::ecs::{Component, ComponentKind, Entity, TypedComponent};
use crate::error::Result;
use std::fmt;
use std::rc::Rc;

/// Handle to a listener registered with a [`MenuHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback fired by a menu element
pub type MenuCallback = Rc<dyn Fn()>;

/// Host UI able to wire menu elements
pub trait MenuHost {
    /// Attach `callback` to `event` on the element matching `selector` under
    /// `root`; `None` when no such element exists
    fn add_listener(&self, root: &str, selector: &str, event: &str, callback: MenuCallback) -> Option<ListenerId>;

    /// Detach a listener previously returned by `add_listener`
    fn remove_listener(&self, id: ListenerId);

    /// Show or hide the menu rooted at `root`
    fn set_visible(&self, root: &str, visible: bool);
}

struct Behaviour {
    selector: String,
    event: String,
    callback: MenuCallback,
}

/// Shows a menu for the lifetime of its entity
pub struct MenuComponent {
    host: Rc<dyn MenuHost>,
    root: String,
    behaviours: Vec<Behaviour>,
    listeners: Vec<ListenerId>,
    visible: bool,
}

impl MenuComponent {
    /// Create a menu bound to the element matching `root`
    pub fn new(host: Rc<dyn MenuHost>, root: impl Into<String>) -> Self {
        MenuComponent {
            host,
            root: root.into(),
            behaviours: Vec::new(),
            listeners: Vec::new(),
            visible: false,
        }
    }

    /// Register a click callback for a child element
    pub fn add_listener<F>(&mut self, selector: impl Into<String>, callback: F)
    where
        F: Fn() + 'static,
    {
        self.add_listener_for(selector, "click", callback);
    }

    /// Register a callback for an arbitrary event; a selector registered
    /// twice keeps only its latest callback
    pub fn add_listener_for<F>(&mut self, selector: impl Into<String>, event: impl Into<String>, callback: F)
    where
        F: Fn() + 'static,
    {
        let selector = selector.into();
        self.behaviours.retain(|b| b.selector != selector);
        self.behaviours.push(Behaviour {
            selector,
            event: event.into(),
            callback: Rc::new(callback),
        });
    }

    /// Builder form of [`add_listener`](Self::add_listener)
    pub fn on_click<F>(mut self, selector: impl Into<String>, callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.add_listener(selector, callback);
        self
    }

    /// Make the menu visible
    pub fn show(&mut self) {
        self.host.set_visible(&self.root, true);
        self.visible = true;
    }

    /// Hide the menu
    pub fn hide(&mut self) {
        self.host.set_visible(&self.root, false);
        self.visible = false;
    }

    /// Whether the menu is currently shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of listeners currently attached in the host
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Component for MenuComponent {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn on_init(&mut self, _entity: &mut Entity) -> Result<()> {
        for behaviour in &self.behaviours {
            match self.host.add_listener(
                &self.root,
                &behaviour.selector,
                &behaviour.event,
                behaviour.callback.clone(),
            ) {
                Some(id) => self.listeners.push(id),
                None => log::debug!("menu {}: no element matches {}", self.root, behaviour.selector),
            }
        }
        self.show();
        Ok(())
    }

    fn on_terminate(&mut self, _entity: &mut Entity) {
        for id in self.listeners.drain(..) {
            self.host.remove_listener(id);
        }
        self.hide();
    }
}

impl TypedComponent for MenuComponent {
    const KIND: ComponentKind = ComponentKind::Menu;
}

impl fmt::Debug for MenuComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuComponent")
            .field("root", &self.root)
            .field("behaviours", &self.behaviours.len())
            .field("listeners", &self.listeners)
            .field("visible", &self.visible)
            .finish()
    }
}
