#![forbid(unsafe_code)]

//! Deep subtree snapshots.
//!
//! A snapshot is a detached, owned copy of a subtree: identity, payload,
//! and children. Snapshots label events about nodes that are no longer
//! live, and serialize behind the `serde` feature.

use crate::node::Identity;

/// An owned deep copy of a subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSnapshot<T> {
    /// The node's explicit identity, if any.
    pub identity: Option<Identity>,
    /// The node's payload.
    pub value: T,
    /// Children snapshots; `Some(vec![])` preserves a declared-but-empty
    /// children sequence.
    pub children: Option<Vec<NodeSnapshot<T>>>,
}

impl<T> NodeSnapshot<T> {
    /// Total number of nodes in the snapshot, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(NodeSnapshot::node_count)
            .sum::<usize>()
    }
}
