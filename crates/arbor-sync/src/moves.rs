#![forbid(unsafe_code)]

//! Move resolution: re-parenting with sibling positioning, cycle
//! prevention, and change fanout.
//!
//! [`put`] is the central state transition: save or move an item and
//! report the change to every list view whose visible contents changed.
//! The move target is an explicit structured request ([`MovePosition`])
//! rather than an overloaded identifier shape.

use arbor_tree::{NodeRef, Patch, TreePath};

use crate::error::SyncError;
use crate::events::{EventKind, ListEvent};
use crate::identity::{Identifier, IdentityRequest};
use crate::session::SessionShared;

/// Where a moved item lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePosition {
    /// Insert directly before the node named by the identifier.
    Before(Identifier),
    /// Insert directly after the node named by the identifier.
    ///
    /// When that node can itself hold children the item becomes its
    /// *first child* instead of a sibling (drop-on-folder semantics).
    After(Identifier),
    /// Append to the end of the session root's top-level children.
    End,
}

/// Options for [`ViewWindow::put`](crate::ViewWindow::put).
///
/// No position means a field-update only: no structural change occurs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PutOptions {
    /// The structural destination, if the item is moving.
    pub position: Option<MovePosition>,
}

impl PutOptions {
    /// Field-update only; no move.
    #[must_use]
    pub fn update_only() -> Self {
        Self::default()
    }

    /// Move before the named node.
    #[must_use]
    pub fn before(id: impl Into<Identifier>) -> Self {
        Self {
            position: Some(MovePosition::Before(id.into())),
        }
    }

    /// Move after the named node (into it, when it can hold children).
    #[must_use]
    pub fn after(id: impl Into<Identifier>) -> Self {
        Self {
            position: Some(MovePosition::After(id.into())),
        }
    }

    /// Move to the end of the root's top-level children.
    #[must_use]
    pub fn end() -> Self {
        Self {
            position: Some(MovePosition::End),
        }
    }
}

/// Move or update `item`, notifying the affected windows.
///
/// A cross-parent move emits a `delete` from the old parent's window and
/// then an `add` from the new parent's window, in that order. A move
/// within one parent emits a single `update`. A move whose destination
/// equals the current position is not short-circuited: it still detaches
/// and reinserts, and still emits its `update`.
///
/// Moving an item next to its own descendant would detach the item's
/// subtree from itself; such requests are rejected without mutating
/// anything and without emitting events.
pub(crate) fn put<T>(
    shared: &SessionShared<T>,
    item: NodeRef,
    options: PutOptions,
) -> Result<(), SyncError> {
    let Some(position) = options.position else {
        // Field update only. The structural observer upstream reports
        // content changes; nothing moved, so no list event from here.
        return Ok(());
    };

    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("put", item = ?item, position = ?position).entered();

    // Capture the pre-move context while the item still occupies its old
    // slot: its identifier, its parent, and the key that parent's window
    // is registered under.
    let (parent_before, parent_before_key, item_id) = {
        let tree = shared.tree.borrow();
        let mut index = shared.index.borrow_mut();
        let item_id = index.resolve(&tree, IdentityRequest::Bare(item))?;
        let Some(parent_before) = tree.parent(item)? else {
            panic!("put: item {item_id} has no structural parent");
        };
        let parent_before_key = index.cached_or_resolve(&tree, parent_before)?;
        (parent_before, parent_before_key, item_id)
    };

    // Cycle check: walk upward from the named target; finding the item
    // among its ancestors (or as the target itself) makes the move
    // illegal.
    if let MovePosition::Before(target_id) | MovePosition::After(target_id) = &position {
        let tree = shared.tree.borrow();
        let target = shared.index.borrow().lookup(target_id.as_str())?;
        let mut current = Some(target);
        while let Some(node) = current {
            if node == item {
                #[cfg(feature = "tracing")]
                tracing::debug!(item = %item_id, target = %target_id, "rejected move into own subtree");
                return Ok(());
            }
            current = tree.parent(node)?;
        }
    }

    // Detach before resolving the destination: sibling positions must
    // not be skewed by the item's soon-to-be-vacated slot.
    shared.tree.borrow_mut().detach(item)?;

    let (parent_after, destination, before_for_event) = resolve_destination(shared, &position)?;

    // Structural insertion is delegated to the tree's patch interface.
    shared.tree.borrow_mut().apply(Patch::Add {
        path: destination,
        node: item,
    })?;

    // Fanout. Leaving the old list is reported first, so observers never
    // see the item in two lists at once.
    let moved_across = parent_after != parent_before;
    if moved_across {
        shared.notify(
            &parent_before_key,
            &ListEvent {
                kind: EventKind::Delete,
                id: Some(item_id),
                before_id: None,
                target: item,
            },
        );
    }
    let parent_after_key = {
        let tree = shared.tree.borrow();
        shared
            .index
            .borrow_mut()
            .cached_or_resolve(&tree, parent_after)?
    };
    shared.notify(
        &parent_after_key,
        &ListEvent {
            kind: if moved_across {
                EventKind::Add
            } else {
                EventKind::Update
            },
            id: None,
            before_id: before_for_event,
            target: item,
        },
    );

    // Sibling positions shifted on both sides of the move; refresh the
    // computed identifiers and any window registrations keyed by them.
    shared.reindex_from(parent_before)?;
    if moved_across {
        shared.reindex_from(parent_after)?;
    }
    Ok(())
}

/// Resolve the destination parent, insertion path, and the before-id to
/// report, with the item already detached.
fn resolve_destination<T>(
    shared: &SessionShared<T>,
    position: &MovePosition,
) -> Result<(NodeRef, TreePath, Option<Identifier>), SyncError> {
    let tree = shared.tree.borrow();
    match position {
        MovePosition::Before(target_id) => {
            let target = shared.index.borrow().lookup(target_id.as_str())?;
            let Some(parent) = tree.parent(target)? else {
                panic!("put: before-target {target_id} has no structural parent");
            };
            Ok((parent, tree.path(target)?, Some(target_id.clone())))
        }
        MovePosition::After(target_id) => {
            let mut index = shared.index.borrow_mut();
            let target = index.lookup(target_id.as_str())?;
            if tree.may_have_children(target) {
                // Drop on a folder: the item becomes its first child.
                return Ok((target, tree.path(target)?.child(0), None));
            }
            let Some(parent) = tree.parent(target)? else {
                panic!("put: after-target {target_id} has no structural parent");
            };
            let slot = tree.index_in_parent(target)?.map_or(0, |i| i + 1);
            let before = match tree.children(parent)?.get(slot).copied() {
                Some(next) => Some(index.resolve(&tree, IdentityRequest::Bare(next))?),
                None => None,
            };
            Ok((parent, tree.path(parent)?.child(slot), before))
        }
        MovePosition::End => {
            let root = tree.root();
            Ok((
                root,
                TreePath::root().child(tree.child_count(root)),
                None,
            ))
        }
    }
}
