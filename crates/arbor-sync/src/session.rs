#![forbid(unsafe_code)]

//! The synchronization session: shared context for all windows over one
//! tree.
//!
//! A [`SyncSession`] owns the tree, the [`WindowRegistry`], and the
//! session-wide [`IdentityIndex`]. Windows hold a shared reference to
//! this context instead of reaching for process-wide state; everything
//! is scoped to the session and dropped with it.
//!
//! The execution model is single-threaded and cooperative: every
//! operation runs to completion, and re-entering a mutating operation
//! from inside another (e.g. from an event subscriber) is disallowed by
//! contract.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use arbor_tree::{NodeRef, Tree};

use crate::error::SyncError;
use crate::events::ListEvent;
use crate::identity::{Identifier, IdentityIndex, IdentityRequest};
use crate::registry::WindowRegistry;
use crate::window::ViewWindow;

/// Shared state behind every window of one session.
#[derive(Debug)]
pub(crate) struct SessionShared<T> {
    pub(crate) tree: RefCell<Tree<T>>,
    pub(crate) registry: RefCell<WindowRegistry<T>>,
    pub(crate) index: RefCell<IdentityIndex>,
}

impl<T> SessionShared<T> {
    /// Route one event through the window registered for `owner`.
    ///
    /// A parent with no live window has no list projection to notify;
    /// the event is dropped.
    pub(crate) fn notify(&self, owner: &Identifier, event: &ListEvent) {
        let window = self.registry.borrow_mut().get(owner.as_str());
        match window {
            Some(window) => window.events().publish(event),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(owner = %owner, kind = ?event.kind, "no live window for notification");
            }
        }
    }

    /// Refresh identifiers under `node` after a structural change and
    /// re-key any window registrations whose identifier changed.
    pub(crate) fn reindex_from(&self, node: NodeRef) -> Result<(), SyncError> {
        let changed = {
            let tree = self.tree.borrow();
            self.index.borrow_mut().reindex_subtree(&tree, node)?
        };
        if !changed.is_empty() {
            self.registry.borrow_mut().rekey_all(changed);
        }
        Ok(())
    }
}

/// A synchronization session rooted at one tree.
///
/// The session keeps the root window alive for its whole lifetime (the
/// original store registered itself at construction); child windows are
/// created on demand and live as long as a consumer references them.
pub struct SyncSession<T> {
    shared: Rc<SessionShared<T>>,
    root: Rc<ViewWindow<T>>,
}

impl<T> SyncSession<T> {
    /// Start a session over the given tree.
    ///
    /// # Errors
    ///
    /// Propagates identity-resolution errors for the root node.
    pub fn new(tree: Tree<T>) -> Result<Self, SyncError> {
        let shared = Rc::new(SessionShared {
            tree: RefCell::new(tree),
            registry: RefCell::new(WindowRegistry::new()),
            index: RefCell::new(IdentityIndex::new()),
        });
        let root_node = shared.tree.borrow().root();
        let root = ViewWindow::open(&shared, root_node)?;
        Ok(Self { shared, root })
    }

    /// The window projecting the tree root's children.
    #[must_use]
    pub fn root_window(&self) -> &Rc<ViewWindow<T>> {
        &self.root
    }

    /// The window for any node: the registered one when it is still
    /// alive, else a freshly constructed one sharing this session.
    ///
    /// # Errors
    ///
    /// Propagates identity-resolution errors for `node`.
    pub fn window_for(&self, node: NodeRef) -> Result<Rc<ViewWindow<T>>, SyncError> {
        ViewWindow::open(&self.shared, node)
    }

    /// Resolve a node to its session identifier.
    ///
    /// # Errors
    ///
    /// Propagates identity-resolution errors.
    pub fn resolve(&self, request: IdentityRequest<'_>) -> Result<Identifier, SyncError> {
        let tree = self.shared.tree.borrow();
        self.shared.index.borrow_mut().resolve(&tree, request)
    }

    /// Read access to the tree.
    #[must_use]
    pub fn tree(&self) -> Ref<'_, Tree<T>> {
        self.shared.tree.borrow()
    }

    /// Write access to the tree, for payload edits and out-of-band
    /// structural changes. Do not hold this across window operations.
    #[must_use]
    pub fn tree_mut(&self) -> RefMut<'_, Tree<T>> {
        self.shared.tree.borrow_mut()
    }
}
