#![forbid(unsafe_code)]

//! Session-wide registry of live view windows.
//!
//! Maps identifiers to the window currently wrapping that node, so any
//! window can route a notification through the window that owns the
//! affected list. Entries are weak: a window with no outside references
//! is dropped and re-created (against the same registry) on the next
//! request.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::identity::Identifier;
use crate::window::ViewWindow;

/// Identifier → live window map for one synchronization session.
#[derive(Debug)]
pub struct WindowRegistry<T> {
    windows: HashMap<Identifier, Weak<ViewWindow<T>>>,
}

impl<T> WindowRegistry<T> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
        }
    }

    /// Register a window under its branch identifier.
    ///
    /// Registration happens at window construction; together with the
    /// get-or-create path in [`ViewWindow`] this keeps at most one live
    /// window per node.
    pub fn register(&mut self, id: Identifier, window: &Rc<ViewWindow<T>>) {
        self.windows.insert(id, Rc::downgrade(window));
    }

    /// The live window registered under `id`, pruning the entry when the
    /// window has been dropped.
    pub fn get(&mut self, id: &str) -> Option<Rc<ViewWindow<T>>> {
        match self.windows.get(id) {
            Some(weak) => match weak.upgrade() {
                Some(window) => Some(window),
                None => {
                    self.windows.remove(id);
                    None
                }
            },
            None => None,
        }
    }

    /// Move registrations to new identifiers after a structural change.
    ///
    /// All old keys are removed before any new key is inserted; two nodes
    /// swapping identifiers must not clobber each other's registration.
    pub fn rekey_all(&mut self, changes: impl IntoIterator<Item = (Identifier, Identifier)>) {
        let mut moved = Vec::new();
        for (old, new) in changes {
            if let Some(weak) = self.windows.remove(old.as_str()) {
                if weak.strong_count() > 0 {
                    moved.push((new, weak));
                }
            }
        }
        for (new, weak) in moved {
            self.windows.insert(new, weak);
        }
    }

    /// Number of registered windows still alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.windows
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl<T> Default for WindowRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
