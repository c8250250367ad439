#![forbid(unsafe_code)]

//! The backing state tree: a slab arena of nodes with ordered children.
//!
//! The tree owns every node. Consumers address nodes through copyable
//! [`NodeRef`] handles and mutate structure through [`Tree::detach`] and
//! [`Tree::apply`]; both notify registered patch observers synchronously.
//!
//! # Example
//!
//! ```
//! use arbor_tree::{Node, Patch, Tree, TreePath};
//!
//! let mut tree = Tree::new(Node::new("root")
//!     .child(Node::new("a"))
//!     .child(Node::new("b")));
//!
//! let a = tree.children(tree.root()).unwrap()[0];
//! tree.detach(a).unwrap();
//! tree.apply(Patch::Add {
//!     path: TreePath::from_indices(vec![1]),
//!     node: a,
//! })
//! .unwrap();
//!
//! assert_eq!(tree.path(a).unwrap().indices(), &[1]);
//! ```

use slab::Slab;

use crate::error::TreeError;
use crate::node::{Identity, Node, NodeRef};
use crate::patch::{Observers, Patch, PatchSubscription};
use crate::path::TreePath;
use crate::snapshot::NodeSnapshot;

#[derive(Debug)]
struct NodeData<T> {
    identity: Option<Identity>,
    value: T,
    parent: Option<NodeRef>,
    children: Option<Vec<NodeRef>>,
}

/// A mutable tree of nodes with ordered children.
#[derive(Debug)]
pub struct Tree<T> {
    slots: Slab<NodeData<T>>,
    generations: Vec<u32>,
    root: NodeRef,
    observers: Observers,
}

impl<T> Tree<T> {
    /// Build a tree from a root node definition.
    #[must_use]
    pub fn new(root: Node<T>) -> Self {
        let mut tree = Self {
            slots: Slab::new(),
            generations: Vec::new(),
            root: NodeRef::new(0, 0),
            observers: Observers::new(),
        };
        tree.root = tree.graft(root, None);
        tree
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeRef {
        self.root
    }

    /// Number of live nodes, attached or detached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the tree holds no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the handle refers to a live node.
    #[must_use]
    pub fn contains(&self, node: NodeRef) -> bool {
        self.slots.contains(node.slot())
            && self.generations.get(node.slot()) == Some(&node.generation)
    }

    /// Whether the node is reachable from the root.
    ///
    /// Detached nodes are live but not attached.
    #[must_use]
    pub fn is_attached(&self, node: NodeRef) -> bool {
        if !self.contains(node) {
            return false;
        }
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.slots.get(current.slot()).and_then(|d| d.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// The node's payload.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DeadNode`] for a stale handle.
    pub fn value(&self, node: NodeRef) -> Result<&T, TreeError> {
        Ok(&self.data(node)?.value)
    }

    /// Mutable access to the node's payload.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DeadNode`] for a stale handle.
    pub fn value_mut(&mut self, node: NodeRef) -> Result<&mut T, TreeError> {
        if !self.contains(node) {
            return Err(TreeError::DeadNode);
        }
        self.slots
            .get_mut(node.slot())
            .map(|d| &mut d.value)
            .ok_or(TreeError::DeadNode)
    }

    /// The node's explicit identity, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DeadNode`] for a stale handle.
    pub fn identity(&self, node: NodeRef) -> Result<Option<&Identity>, TreeError> {
        Ok(self.data(node)?.identity.as_ref())
    }

    /// The node's structural parent, or `None` for the root and for
    /// detached nodes.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DeadNode`] for a stale handle.
    pub fn parent(&self, node: NodeRef) -> Result<Option<NodeRef>, TreeError> {
        Ok(self.data(node)?.parent)
    }

    /// The ancestor `levels` steps up, or `None` when the walk leaves the
    /// tree first. `levels == 0` returns the node itself.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DeadNode`] for a stale handle.
    pub fn ancestor(&self, node: NodeRef, levels: usize) -> Result<Option<NodeRef>, TreeError> {
        let mut current = node;
        self.data(current)?;
        for _ in 0..levels {
            match self.data(current)?.parent {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Whether the node declares a (possibly empty) children sequence.
    ///
    /// `false` for stale handles.
    #[must_use]
    pub fn may_have_children(&self, node: NodeRef) -> bool {
        self.contains(node)
            && self
                .slots
                .get(node.slot())
                .is_some_and(|d| d.children.is_some())
    }

    /// The node's current children, in order. Empty for leaves.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DeadNode`] for a stale handle.
    pub fn children(&self, node: NodeRef) -> Result<&[NodeRef], TreeError> {
        Ok(self.data(node)?.children.as_deref().unwrap_or(&[]))
    }

    /// Number of children; `0` for leaves and stale handles.
    #[must_use]
    pub fn child_count(&self, node: NodeRef) -> usize {
        self.children(node).map_or(0, <[NodeRef]>::len)
    }

    /// The node's position in its parent's children, or `None` for the
    /// root and for detached nodes.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DeadNode`] for a stale handle.
    pub fn index_in_parent(&self, node: NodeRef) -> Result<Option<usize>, TreeError> {
        let Some(parent) = self.data(node)?.parent else {
            return Ok(None);
        };
        Ok(self
            .data(parent)?
            .children
            .as_ref()
            .and_then(|c| c.iter().position(|k| *k == node)))
    }

    /// The node's structural path from the root.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DeadNode`] for a stale handle and
    /// [`TreeError::Detached`] when the node is not reachable from the
    /// root.
    pub fn path(&self, node: NodeRef) -> Result<TreePath, TreeError> {
        self.data(node)?;
        let mut indices = Vec::new();
        let mut current = node;
        while let Some(parent) = self.data(current)?.parent {
            let position = self
                .data(parent)?
                .children
                .as_ref()
                .and_then(|c| c.iter().position(|k| *k == current))
                .ok_or(TreeError::Detached)?;
            indices.push(position);
            current = parent;
        }
        if current != self.root {
            return Err(TreeError::Detached);
        }
        indices.reverse();
        Ok(TreePath::from_indices(indices))
    }

    /// The node at the given path, or `None` when the path does not
    /// resolve.
    #[must_use]
    pub fn node_at(&self, path: &TreePath) -> Option<NodeRef> {
        let mut current = self.root;
        for &index in path.indices() {
            current = *self
                .slots
                .get(current.slot())?
                .children
                .as_ref()?
                .get(index)?;
        }
        Some(current)
    }

    /// Allocate a detached subtree from a node definition.
    ///
    /// The returned node is live but not attached; attach it with an
    /// [`Patch::Add`].
    pub fn adopt(&mut self, definition: Node<T>) -> NodeRef {
        self.graft(definition, None)
    }

    /// Unlink the node from its parent. The subtree stays alive and can be
    /// re-attached with an [`Patch::Add`]. Observers receive a
    /// [`Patch::Remove`] carrying the node's former path.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DeadNode`] for a stale handle and
    /// [`TreeError::Detached`] when the node has no parent (the root, or
    /// an already-detached node).
    pub fn detach(&mut self, node: NodeRef) -> Result<(), TreeError> {
        let parent = self.data(node)?.parent.ok_or(TreeError::Detached)?;
        let path = self.path(node)?;
        if let Some(children) = self
            .slots
            .get_mut(parent.slot())
            .and_then(|d| d.children.as_mut())
        {
            children.retain(|k| *k != node);
        }
        if let Some(data) = self.slots.get_mut(node.slot()) {
            data.parent = None;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(path = %path, "detached node");
        self.observers.notify(&Patch::Remove { path });
        Ok(())
    }

    /// Apply a structural patch.
    ///
    /// `Add` attaches a detached node at the path (the final index is the
    /// insertion position in the destination parent's children). `Remove`
    /// detaches and destroys the subtree at the path. Observers are
    /// notified after the mutation.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidPath`] when the path does not resolve,
    /// [`TreeError::NotAContainer`] when the destination parent declares
    /// no children sequence, [`TreeError::AlreadyAttached`] when adding a
    /// node that still has a parent, and [`TreeError::DeadNode`] for stale
    /// handles.
    pub fn apply(&mut self, patch: Patch) -> Result<(), TreeError> {
        match &patch {
            Patch::Add { path, node } => {
                let node = *node;
                if !self.contains(node) {
                    return Err(TreeError::DeadNode);
                }
                if node == self.root || self.data(node)?.parent.is_some() {
                    return Err(TreeError::AlreadyAttached);
                }
                let (Some(parent_path), Some(index)) = (path.parent(), path.last()) else {
                    return Err(TreeError::InvalidPath(path.to_string()));
                };
                let parent = self
                    .node_at(&parent_path)
                    .ok_or_else(|| TreeError::InvalidPath(path.to_string()))?;
                let children = self
                    .slots
                    .get_mut(parent.slot())
                    .and_then(|d| d.children.as_mut())
                    .ok_or(TreeError::NotAContainer)?;
                if index > children.len() {
                    return Err(TreeError::InvalidPath(path.to_string()));
                }
                children.insert(index, node);
                if let Some(data) = self.slots.get_mut(node.slot()) {
                    data.parent = Some(parent);
                }
                #[cfg(feature = "tracing")]
                tracing::trace!(path = %path, "attached node");
                self.observers.notify(&patch);
                Ok(())
            }
            Patch::Remove { path } => {
                let node = self
                    .node_at(path)
                    .ok_or_else(|| TreeError::InvalidPath(path.to_string()))?;
                self.detach(node)?;
                self.destroy(node)
            }
        }
    }

    /// Free the node and its entire subtree. An attached node is detached
    /// first (notifying observers); the slots are then released and every
    /// handle into the subtree goes stale.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DeadNode`] for a stale handle and
    /// [`TreeError::Detached`] when asked to destroy the root.
    pub fn destroy(&mut self, node: NodeRef) -> Result<(), TreeError> {
        if !self.contains(node) {
            return Err(TreeError::DeadNode);
        }
        if node == self.root {
            return Err(TreeError::Detached);
        }
        if self.data(node)?.parent.is_some() {
            self.detach(node)?;
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.slots.try_remove(current.slot()) {
                self.generations[current.slot()] += 1;
                if let Some(children) = data.children {
                    stack.extend(children);
                }
            }
        }
        Ok(())
    }

    /// Deep copy of the subtree rooted at `node`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DeadNode`] for a stale handle.
    pub fn snapshot(&self, node: NodeRef) -> Result<NodeSnapshot<T>, TreeError>
    where
        T: Clone,
    {
        let data = self.data(node)?;
        let children = match &data.children {
            None => None,
            Some(children) => {
                let mut snapshots = Vec::with_capacity(children.len());
                for &child in children {
                    snapshots.push(self.snapshot(child)?);
                }
                Some(snapshots)
            }
        };
        Ok(NodeSnapshot {
            identity: data.identity.clone(),
            value: data.value.clone(),
            children,
        })
    }

    /// Register a patch observer. Notifications are synchronous and arrive
    /// in mutation order; the observer is unregistered when the returned
    /// subscription drops.
    pub fn observe(&self, callback: impl Fn(&Patch) + 'static) -> PatchSubscription {
        self.observers.subscribe(callback)
    }

    fn data(&self, node: NodeRef) -> Result<&NodeData<T>, TreeError> {
        if !self.contains(node) {
            return Err(TreeError::DeadNode);
        }
        self.slots.get(node.slot()).ok_or(TreeError::DeadNode)
    }

    fn graft(&mut self, definition: Node<T>, parent: Option<NodeRef>) -> NodeRef {
        let declares_children = definition.children.is_some();
        let node = self.alloc(NodeData {
            identity: definition.identity,
            value: definition.value,
            parent,
            children: if declares_children {
                Some(Vec::new())
            } else {
                None
            },
        });
        if let Some(kids) = definition.children {
            let mut refs = Vec::with_capacity(kids.len());
            for kid in kids {
                refs.push(self.graft(kid, Some(node)));
            }
            if let Some(data) = self.slots.get_mut(node.slot()) {
                data.children = Some(refs);
            }
        }
        node
    }

    fn alloc(&mut self, data: NodeData<T>) -> NodeRef {
        let entry = self.slots.vacant_entry();
        let index = entry.key();
        if index >= self.generations.len() {
            self.generations.resize(index + 1, 0);
        }
        let node = NodeRef::new(index, self.generations[index]);
        entry.insert(data);
        node
    }
}
