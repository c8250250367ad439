#![forbid(unsafe_code)]

//! Node handles, explicit identity values, and builder-style node definitions.
//!
//! A [`Node`] describes a subtree before it is grafted into a [`Tree`];
//! once grafted, nodes are addressed through copyable [`NodeRef`] handles.
//!
//! # Example
//!
//! ```
//! use arbor_tree::{Node, Tree};
//!
//! let tree = Tree::new(Node::new("root")
//!     .child(Node::new("a").with_identity(1))
//!     .child(Node::new("b").with_identity(2).with_children(Vec::new())));
//!
//! assert_eq!(tree.child_count(tree.root()), 2);
//! ```
//!
//! [`Tree`]: crate::Tree

use std::fmt;

/// A node's explicit identity value.
///
/// Identities are rendered to their string form when building identifiers.
/// `0` is a valid identity; absence is carried by the surrounding `Option`,
/// never by the value itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Identity {
    /// Numeric identity.
    Num(i64),
    /// Textual identity.
    Text(String),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Identity {
    fn from(n: i64) -> Self {
        Self::Num(n)
    }
}

impl From<i32> for Identity {
    fn from(n: i32) -> Self {
        Self::Num(n.into())
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A copyable, generational handle to a node stored in a [`Tree`].
///
/// Handles stay valid across structural moves. When the node is destroyed
/// the slot's generation is bumped, so a stale handle is detectable:
/// `Tree::contains` returns `false` and accessors fail with
/// [`TreeError::DeadNode`].
///
/// [`Tree`]: crate::Tree
/// [`TreeError::DeadNode`]: crate::TreeError::DeadNode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeRef {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        Self {
            index: index as u32,
            generation,
        }
    }

    pub(crate) fn slot(self) -> usize {
        self.index as usize
    }
}

/// A subtree definition, built up before grafting into a [`Tree`].
///
/// Whether a node *declares* a children sequence is significant: a node
/// built with [`Node::child`] or [`Node::with_children`] (even an empty
/// vec) may hold children later; a node built without either is a leaf.
///
/// [`Tree`]: crate::Tree
#[derive(Debug, Clone)]
pub struct Node<T> {
    pub(crate) identity: Option<Identity>,
    pub(crate) value: T,
    pub(crate) children: Option<Vec<Node<T>>>,
}

impl<T> Node<T> {
    /// Create a leaf node definition carrying the given payload.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            identity: None,
            value,
            children: None,
        }
    }

    /// Set the explicit identity.
    #[must_use]
    pub fn with_identity(mut self, identity: impl Into<Identity>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Append a child node, declaring a children sequence if needed.
    #[must_use]
    pub fn child(mut self, node: Node<T>) -> Self {
        self.children.get_or_insert_with(Vec::new).push(node);
        self
    }

    /// Set the children sequence from a vec.
    ///
    /// Passing an empty vec still declares the sequence, marking the node
    /// as one that may hold children.
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<Node<T>>) -> Self {
        self.children = Some(nodes);
        self
    }

    /// Get the explicit identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Get the payload.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Whether this definition declares a children sequence.
    #[must_use]
    pub fn declares_children(&self) -> bool {
        self.children.is_some()
    }
}
