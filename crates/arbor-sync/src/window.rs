#![forbid(unsafe_code)]

//! Flat list projections over one node's children.
//!
//! A [`ViewWindow`] wraps exactly one container node and exposes its
//! children as an indexable, ordered sequence for list-rendering UI
//! consumers: whole-list and ranged reads annotated with the full child
//! count, point lookup and delete by identifier, move/update via
//! [`ViewWindow::put`], and tree navigation for UI expansion.
//!
//! Windows are created lazily through [`ViewWindow::open`] (or
//! `child_window`) and registered in the session's [`WindowRegistry`]
//! under their branch identifier; at most one live window exists per
//! node.
//!
//! [`WindowRegistry`]: crate::registry::WindowRegistry

use std::rc::Rc;

use arbor_tree::NodeRef;

use crate::error::SyncError;
use crate::events::{EventChannel, EventKind, ListEvent};
use crate::identity::IdentityRequest;
use crate::moves::{self, PutOptions};
use crate::session::SessionShared;

/// A fetched slice of children, annotated with the full child count.
///
/// `total` is always the length of the complete children sequence, not
/// the slice, so paging consumers can size themselves correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// The requested children, in order.
    pub items: Vec<NodeRef>,
    /// The branch's full child count.
    pub total: usize,
}

impl FetchResult {
    /// Number of items in this slice.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the slice is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A flat, indexable projection of one node's children.
pub struct ViewWindow<T> {
    branch: NodeRef,
    shared: Rc<SessionShared<T>>,
    channel: EventChannel,
}

impl<T> ViewWindow<T> {
    /// Get or create the window for `branch`, sharing this session's
    /// registry, index, and tree.
    ///
    /// Returns the registered window when one is still alive; otherwise
    /// constructs a new one and registers it under the branch identifier.
    ///
    /// # Errors
    ///
    /// Propagates identity-resolution errors for `branch`.
    pub(crate) fn open(
        shared: &Rc<SessionShared<T>>,
        branch: NodeRef,
    ) -> Result<Rc<Self>, SyncError> {
        let id = {
            let tree = shared.tree.borrow();
            shared
                .index
                .borrow_mut()
                .resolve(&tree, IdentityRequest::Bare(branch))?
        };
        if let Some(existing) = shared.registry.borrow_mut().get(id.as_str()) {
            return Ok(existing);
        }
        let window = Rc::new(Self {
            branch,
            shared: Rc::clone(shared),
            channel: EventChannel::new(),
        });
        shared.registry.borrow_mut().register(id, &window);
        Ok(window)
    }

    /// The node whose children this window projects.
    #[must_use]
    pub fn branch_root(&self) -> NodeRef {
        self.branch
    }

    /// The root of the whole session's tree.
    #[must_use]
    pub fn session_root(&self) -> NodeRef {
        self.shared.tree.borrow().root()
    }

    /// All current children, annotated with the total count.
    #[must_use]
    pub fn fetch_all(&self) -> FetchResult {
        let tree = self.shared.tree.borrow();
        let items = tree
            .children(self.branch)
            .map(<[NodeRef]>::to_vec)
            .unwrap_or_default();
        let total = items.len();
        FetchResult { items, total }
    }

    /// The children in `[start, end)`, annotated with the *full* child
    /// count. Out-of-range bounds are clamped.
    #[must_use]
    pub fn fetch_range(&self, start: usize, end: usize) -> FetchResult {
        let tree = self.shared.tree.borrow();
        let children = tree.children(self.branch).unwrap_or(&[]);
        let total = children.len();
        let end = end.min(total);
        let start = start.min(end);
        FetchResult {
            items: children[start..end].to_vec(),
            total,
        }
    }

    /// The node previously resolved to `id`, or `None`.
    ///
    /// UI consumers probe speculatively; an unknown identifier is a
    /// sentinel, not an error.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<NodeRef> {
        self.shared.index.borrow().lookup(id).ok()
    }

    /// Detach and destroy the node named by `id`, emitting a `delete`
    /// event from the window owning the node's *parent* (which need not
    /// be this window).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownIdentity`] when `id` was never
    /// resolved in this session.
    ///
    /// # Panics
    ///
    /// Panics when the identified node has no structural parent; removing
    /// the root is a contract violation.
    pub fn remove(&self, id: &str) -> Result<bool, SyncError> {
        let node = self.shared.index.borrow().lookup(id)?;
        let (item_id, parent, parent_key) = {
            let tree = self.shared.tree.borrow();
            let mut index = self.shared.index.borrow_mut();
            let item_id = index.resolve(&tree, IdentityRequest::Bare(node))?;
            let Some(parent) = tree.parent(node)? else {
                panic!("remove: node {item_id} has no structural parent");
            };
            let parent_key = index.cached_or_resolve(&tree, parent)?;
            (item_id, parent, parent_key)
        };

        self.shared.tree.borrow_mut().detach(node)?;

        // Delivered while the node is detached but alive, so subscribers
        // can still label or snapshot it.
        self.shared.notify(
            &parent_key,
            &ListEvent {
                kind: EventKind::Delete,
                id: Some(item_id),
                before_id: None,
                target: node,
            },
        );

        self.shared.tree.borrow_mut().destroy(node)?;
        self.shared.reindex_from(parent)?;
        Ok(true)
    }

    /// Save or move an item, notifying every affected window.
    ///
    /// With no position in `options` this is a field-update only: no
    /// structural change and no event from this layer (the tree's patch
    /// observers carry update notifications). See [`PutOptions`] for the
    /// move forms.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownIdentity`] when the target identifier
    /// was never resolved, and propagates tree errors.
    ///
    /// # Panics
    ///
    /// Panics when the item or a named target has no structural parent
    /// where one is required.
    pub fn put(&self, item: NodeRef, options: PutOptions) -> Result<(), SyncError> {
        moves::put(&self.shared, item, options)
    }

    /// Whether the node declares a (possibly empty) children sequence.
    #[must_use]
    pub fn may_have_children(&self, item: NodeRef) -> bool {
        self.shared.tree.borrow().may_have_children(item)
    }

    /// The window projecting `item`'s children: the registered one when
    /// still alive, else a new window sharing this session.
    ///
    /// # Errors
    ///
    /// Propagates identity-resolution errors for `item`.
    pub fn child_window(&self, item: NodeRef) -> Result<Rc<ViewWindow<T>>, SyncError> {
        Self::open(&self.shared, item)
    }

    /// This window's notification channel.
    #[must_use]
    pub fn events(&self) -> &EventChannel {
        &self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SyncSession;
    use arbor_tree::{Node, Tree};
    use std::cell::RefCell;

    fn session() -> SyncSession<&'static str> {
        SyncSession::new(Tree::new(
            Node::new("root")
                .child(
                    Node::new("a")
                        .with_identity(1)
                        .child(Node::new("a1"))
                        .child(Node::new("a2"))
                        .child(Node::new("a3")),
                )
                .child(Node::new("b").with_identity(2).with_children(Vec::new()))
                .child(Node::new("c")),
        ))
        .unwrap()
    }

    #[test]
    fn fetch_all_reports_total() {
        let session = session();
        let fetched = session.root_window().fetch_all();
        assert_eq!(fetched.len(), 3);
        assert_eq!(fetched.total, 3);
    }

    #[test]
    fn fetch_range_slices_with_full_total() {
        let session = session();
        let a = session.tree().children(session.tree().root()).unwrap()[0];
        let window = session.window_for(a).unwrap();

        let fetched = window.fetch_range(1, 3);
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched.total, 3);

        let children: Vec<NodeRef> = session.tree().children(a).unwrap().to_vec();
        assert_eq!(fetched.items, children[1..3]);
    }

    #[test]
    fn fetch_range_clamps_bounds() {
        let session = session();
        let window = session.root_window();

        assert_eq!(window.fetch_range(0, 99).len(), 3);
        assert_eq!(window.fetch_range(99, 99).len(), 0);
        assert_eq!(window.fetch_range(2, 1).len(), 0);
        assert_eq!(window.fetch_range(99, 99).total, 3);
    }

    #[test]
    fn get_probes_without_failing() {
        let session = session();
        let b = session.tree().children(session.tree().root()).unwrap()[1];
        let id = session
            .resolve(IdentityRequest::Bare(b))
            .unwrap();

        assert_eq!(session.root_window().get(id.as_str()), Some(b));
        assert_eq!(session.root_window().get("never-resolved"), None);
    }

    #[test]
    fn may_have_children_distinguishes_leaves() {
        let session = session();
        let children: Vec<NodeRef> = session
            .tree()
            .children(session.tree().root())
            .unwrap()
            .to_vec();
        let window = session.root_window();

        assert!(window.may_have_children(children[0])); // populated
        assert!(window.may_have_children(children[1])); // declared, empty
        assert!(!window.may_have_children(children[2])); // leaf
    }

    #[test]
    fn remove_deletes_exactly_one_child() {
        let session = session();
        let a = session.tree().children(session.tree().root()).unwrap()[0];
        let a2 = session.tree().children(a).unwrap()[1];
        let id = session.resolve(IdentityRequest::Bare(a2)).unwrap();

        let window = session.window_for(a).unwrap();
        assert_eq!(window.fetch_all().total, 3);

        assert_eq!(window.remove(id.as_str()), Ok(true));
        assert_eq!(window.fetch_all().total, 2);
        assert!(!session.tree().contains(a2));
    }

    #[test]
    fn remove_emits_delete_from_parent_window() {
        let session = session();
        let a = session.tree().children(session.tree().root()).unwrap()[0];
        let a1 = session.tree().children(a).unwrap()[0];
        let id = session.resolve(IdentityRequest::Bare(a1)).unwrap();

        let parent_window = session.window_for(a).unwrap();
        let events = std::rc::Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let _sub = parent_window
            .events()
            .subscribe(move |e| sink.borrow_mut().push(e.clone()));

        // Issue the remove through a *different* window; the delete still
        // arrives from the parent's window.
        session.root_window().remove(id.as_str()).unwrap();

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Delete);
        assert_eq!(events[0].id.as_ref(), Some(&id));
    }

    #[test]
    fn remove_unknown_identity_fails() {
        let session = session();
        assert_eq!(
            session.root_window().remove("missing"),
            Err(SyncError::UnknownIdentity("missing".into()))
        );
    }

    #[test]
    fn child_window_round_trips_through_registry() {
        let session = session();
        let a = session.tree().children(session.tree().root()).unwrap()[0];

        let first = session.root_window().child_window(a).unwrap();
        let second = session.root_window().child_window(a).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.branch_root(), a);
        assert_eq!(first.session_root(), session.tree().root());
    }
}
