#![forbid(unsafe_code)]

//! Synchronization errors.

use std::fmt;

use arbor_tree::TreeError;

/// Errors raised by identity resolution and window operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The identifier was never produced by `resolve` in this session.
    UnknownIdentity(String),
    /// The node is no longer live and no identifier was ever cached for it.
    StaleNode,
    /// A tree operation failed.
    Tree(TreeError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownIdentity(id) => write!(f, "unknown identity: {id}"),
            Self::StaleNode => write!(f, "node is no longer live and has no cached identifier"),
            Self::Tree(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<TreeError> for SyncError {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}
