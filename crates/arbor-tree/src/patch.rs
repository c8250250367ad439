#![forbid(unsafe_code)]

//! Structural patches and synchronous patch observation.
//!
//! A [`Patch`] is the atomic structural mutation applied to a tree:
//! inserting a detached node at a path, or destroying the subtree at a
//! path. Every applied mutation (including [`Tree::detach`]) notifies the
//! tree's observers synchronously, in mutation order.
//!
//! Observers must not call back into the tree from inside a notification;
//! the execution model is single-threaded and non-reentrant.
//!
//! [`Tree::detach`]: crate::Tree::detach

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::node::NodeRef;
use crate::path::TreePath;

/// An atomic structural mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Insert a detached node (and its subtree) at `path`.
    Add {
        /// Destination path; the final index is the insertion position.
        path: TreePath,
        /// The detached node to attach.
        node: NodeRef,
    },
    /// Detach and destroy the subtree at `path`.
    Remove {
        /// Path of the node being removed.
        path: TreePath,
    },
}

/// Identifier of a registered patch observer.
pub type ObserverId = u64;

type ObserverVec = Vec<(ObserverId, Box<dyn Fn(&Patch)>)>;

/// Registered patch observers for one tree.
pub(crate) struct Observers {
    list: Rc<RefCell<ObserverVec>>,
    next_id: Cell<ObserverId>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            list: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
        }
    }

    pub(crate) fn subscribe(&self, callback: impl Fn(&Patch) + 'static) -> PatchSubscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.list.borrow_mut().push((id, Box::new(callback)));
        PatchSubscription {
            list: Rc::downgrade(&self.list),
            id,
        }
    }

    pub(crate) fn notify(&self, patch: &Patch) {
        for (_, callback) in self.list.borrow().iter() {
            callback(patch);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.list.borrow().len()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers").field("len", &self.len()).finish()
    }
}

/// Handle for a registered patch observer.
///
/// Dropping the subscription unregisters the observer.
#[must_use = "dropping this subscription unregisters the observer"]
pub struct PatchSubscription {
    list: Weak<RefCell<ObserverVec>>,
    id: ObserverId,
}

impl Drop for PatchSubscription {
    fn drop(&mut self) {
        if let Some(list) = self.list.upgrade() {
            list.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_reaches_all_observers() {
        let observers = Observers::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = seen.clone();
        let _sub_a = observers.subscribe(move |p| a.borrow_mut().push(("a", p.clone())));
        let b = seen.clone();
        let _sub_b = observers.subscribe(move |p| b.borrow_mut().push(("b", p.clone())));

        let patch = Patch::Remove {
            path: TreePath::from_indices(vec![0]),
        };
        observers.notify(&patch);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "a");
        assert_eq!(seen[1].0, "b");
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let observers = Observers::new();
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        let sub = observers.subscribe(move |_| c.set(c.get() + 1));
        observers.notify(&Patch::Remove {
            path: TreePath::root(),
        });
        assert_eq!(count.get(), 1);

        drop(sub);
        observers.notify(&Patch::Remove {
            path: TreePath::root(),
        });
        assert_eq!(count.get(), 1);
        assert_eq!(observers.len(), 0);
    }
}
