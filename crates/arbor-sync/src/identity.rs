#![forbid(unsafe_code)]

//! Identifier resolution between opaque strings and tree nodes.
//!
//! An [`Identifier`] is the session-scoped name a UI consumer holds for a
//! node: the node's explicit identity rendered to a string when it has
//! one, else a synthetic path-like string with any ancestor's explicit
//! identity substituted for that ancestor's index segment
//! (`children/7/children/0`). The root without an explicit identity
//! resolves to the empty string.
//!
//! Resolution caches both directions so that [`IdentityIndex::lookup`]
//! can translate identifiers back to nodes, and so that nodes which are
//! no longer live still resolve from their last known identifier instead
//! of dereferencing dead state.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use arbor_tree::{CHILDREN_KEY, NodeRef, Tree};

use crate::error::SyncError;

/// An opaque per-session identifier for a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// The identifier's string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// How a resolution call wants its result delivered.
///
/// The two call shapes are distinct types instead of a runtime-probed
/// "wrapped or bare" parameter: `Wrapped` additionally writes the
/// resolved identifier through `out`.
#[derive(Debug)]
pub enum IdentityRequest<'a> {
    /// Resolve and return the identifier.
    Bare(NodeRef),
    /// Resolve, return the identifier, and write it through `out`.
    Wrapped {
        /// The node to resolve.
        node: NodeRef,
        /// Receives the resolved identifier.
        out: &'a mut Option<Identifier>,
    },
}

/// Bidirectional identifier cache for one synchronization session.
#[derive(Debug, Default)]
pub struct IdentityIndex {
    by_id: HashMap<Identifier, NodeRef>,
    last_id: HashMap<NodeRef, Identifier>,
}

impl IdentityIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a node to its identifier, caching both directions.
    ///
    /// A node that is no longer live (destroyed, or detached without an
    /// explicit identity) resolves from its last cached identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::StaleNode`] when the node is not live and was
    /// never resolved before.
    pub fn resolve<T>(
        &mut self,
        tree: &Tree<T>,
        request: IdentityRequest<'_>,
    ) -> Result<Identifier, SyncError> {
        let (node, out) = match request {
            IdentityRequest::Bare(node) => (node, None),
            IdentityRequest::Wrapped { node, out } => (node, Some(out)),
        };
        let id = self.compute(tree, node)?;
        self.by_id.insert(id.clone(), node);
        self.last_id.insert(node, id.clone());
        if let Some(out) = out {
            *out = Some(id.clone());
        }
        Ok(id)
    }

    /// Translate an identifier back to the node it was resolved from.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownIdentity`] when the identifier was
    /// never produced by [`resolve`](Self::resolve) in this session.
    pub fn lookup(&self, id: &str) -> Result<NodeRef, SyncError> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| SyncError::UnknownIdentity(id.to_string()))
    }

    /// The identifier last resolved for a node, if any.
    #[must_use]
    pub fn cached(&self, node: NodeRef) -> Option<&Identifier> {
        self.last_id.get(&node)
    }

    /// The cached identifier, or a fresh resolution when none is cached.
    ///
    /// Windows are registered under their cached identifier; notification
    /// routing uses this so registry keys and identifiers stay in step.
    ///
    /// # Errors
    ///
    /// Propagates [`resolve`](Self::resolve) errors.
    pub fn cached_or_resolve<T>(
        &mut self,
        tree: &Tree<T>,
        node: NodeRef,
    ) -> Result<Identifier, SyncError> {
        if let Some(id) = self.last_id.get(&node) {
            return Ok(id.clone());
        }
        self.resolve(tree, IdentityRequest::Bare(node))
    }

    /// Recompute identifiers for every previously-resolved node in the
    /// subtree, returning `(old, new)` pairs for those that changed.
    ///
    /// # Errors
    ///
    /// Propagates [`resolve`](Self::resolve) errors.
    pub fn reindex_subtree<T>(
        &mut self,
        tree: &Tree<T>,
        node: NodeRef,
    ) -> Result<Vec<(Identifier, Identifier)>, SyncError> {
        let mut changed = Vec::new();
        self.reindex_walk(tree, node, &mut changed)?;
        Ok(changed)
    }

    fn reindex_walk<T>(
        &mut self,
        tree: &Tree<T>,
        node: NodeRef,
        changed: &mut Vec<(Identifier, Identifier)>,
    ) -> Result<(), SyncError> {
        if let Some(old) = self.last_id.get(&node).cloned() {
            let new = self.resolve(tree, IdentityRequest::Bare(node))?;
            if old != new {
                changed.push((old, new));
            }
        }
        for child in tree.children(node)?.to_vec() {
            self.reindex_walk(tree, child, changed)?;
        }
        Ok(())
    }

    fn compute<T>(&self, tree: &Tree<T>, node: NodeRef) -> Result<Identifier, SyncError> {
        if tree.contains(node) {
            if let Some(identity) = tree.identity(node)? {
                return Ok(Identifier::from(identity.to_string()));
            }
            if tree.is_attached(node) {
                return self.synthesize(tree, node);
            }
        }
        self.last_id.get(&node).cloned().ok_or(SyncError::StaleNode)
    }

    fn synthesize<T>(&self, tree: &Tree<T>, node: NodeRef) -> Result<Identifier, SyncError> {
        let path = tree.path(node)?;
        let mut parts = Vec::with_capacity(path.depth() * 2);
        let mut current = tree.root();
        for &index in path.indices() {
            parts.push(CHILDREN_KEY.to_string());
            current = tree.children(current)?[index];
            match tree.identity(current)? {
                Some(identity) => parts.push(identity.to_string()),
                None => parts.push(index.to_string()),
            }
        }
        Ok(Identifier::from(parts.join("/")))
    }
}
