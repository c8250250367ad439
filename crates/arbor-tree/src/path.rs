#![forbid(unsafe_code)]

//! Structural paths: ordered child indices from the tree root.
//!
//! The string form interleaves the `children` key with indices, matching
//! the wire encoding used by structural patches: the second child of the
//! root's first child is `/children/0/children/1`, and the root itself is
//! the empty string.

use std::fmt;
use std::str::FromStr;

use crate::error::TreeError;

/// The key under which a node's ordered children live in the string form.
pub const CHILDREN_KEY: &str = "children";

/// A structural path: the sequence of child indices from the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreePath(Vec<usize>);

impl TreePath {
    /// The path of the root node.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from child indices.
    #[must_use]
    pub fn from_indices(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    /// The child indices, outermost first.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of steps from the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The final child index, if any.
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// The path one level up, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Extend the path by one child index.
    #[must_use]
    pub fn child(mut self, index: usize) -> Self {
        self.0.push(index);
        self
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in &self.0 {
            write!(f, "/{CHILDREN_KEY}/{index}")?;
        }
        Ok(())
    }
}

impl FromStr for TreePath {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let mut indices = Vec::new();
        let mut parts = s.strip_prefix('/').unwrap_or(s).split('/');
        while let Some(key) = parts.next() {
            if key != CHILDREN_KEY {
                return Err(TreeError::InvalidPath(s.to_string()));
            }
            let index = parts
                .next()
                .and_then(|p| p.parse::<usize>().ok())
                .ok_or_else(|| TreeError::InvalidPath(s.to_string()))?;
            indices.push(index);
        }
        Ok(Self(indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_path_is_empty_string() {
        assert_eq!(TreePath::root().to_string(), "");
        assert!(TreePath::root().is_root());
    }

    #[test]
    fn display_interleaves_children_key() {
        let path = TreePath::from_indices(vec![0, 2]);
        assert_eq!(path.to_string(), "/children/0/children/2");
    }

    #[test]
    fn parent_drops_last_index() {
        let path = TreePath::from_indices(vec![1, 3]);
        assert_eq!(path.parent(), Some(TreePath::from_indices(vec![1])));
        assert_eq!(TreePath::root().parent(), None);
    }

    #[test]
    fn child_extends() {
        let path = TreePath::root().child(4);
        assert_eq!(path.indices(), &[4]);
        assert_eq!(path.last(), Some(4));
    }

    #[test]
    fn parse_round_trip() {
        let path = TreePath::from_indices(vec![0, 5, 1]);
        let parsed: TreePath = path.to_string().parse().unwrap();
        assert_eq!(parsed, path);
    }

    #[test]
    fn parse_empty_is_root() {
        let parsed: TreePath = "".parse().unwrap();
        assert!(parsed.is_root());
    }

    #[test]
    fn parse_rejects_wrong_key() {
        assert!("/kids/0".parse::<TreePath>().is_err());
    }

    #[test]
    fn parse_rejects_missing_index() {
        assert!("/children".parse::<TreePath>().is_err());
        assert!("/children/x".parse::<TreePath>().is_err());
    }
}
