#![forbid(unsafe_code)]

//! Tree errors.

use std::fmt;

/// Errors raised by tree introspection and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The handle refers to a destroyed (or never-allocated) node.
    DeadNode,
    /// The node has no structural parent.
    Detached,
    /// The path does not resolve within the tree.
    InvalidPath(String),
    /// The path's parent does not declare a children sequence.
    NotAContainer,
    /// The node is still attached; the operation requires a detached node.
    AlreadyAttached,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadNode => write!(f, "node handle is no longer live"),
            Self::Detached => write!(f, "node has no structural parent"),
            Self::InvalidPath(path) => write!(f, "path does not resolve: {path}"),
            Self::NotAContainer => write!(f, "node does not declare a children sequence"),
            Self::AlreadyAttached => write!(f, "node is still attached to a parent"),
        }
    }
}

impl std::error::Error for TreeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(TreeError::DeadNode.to_string(), "node handle is no longer live");
        assert_eq!(
            TreeError::InvalidPath("/children/9".into()).to_string(),
            "path does not resolve: /children/9"
        );
    }
}
