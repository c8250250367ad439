#![forbid(unsafe_code)]

//! Backing state tree for list-projection synchronization.
//!
//! A [`Tree`] owns a recursive node structure in a slab arena. Nodes carry
//! an optional explicit [`Identity`], a payload, and (when declared) an
//! ordered children sequence. Structure changes flow through two narrow
//! operations, [`Tree::detach`] and [`Tree::apply`], and every change
//! notifies registered patch observers synchronously.
//!
//! Handles ([`NodeRef`]) are copyable and generational: destroying a
//! subtree invalidates its handles detectably instead of leaving them
//! dangling.
//!
//! The execution model is single-threaded and cooperative. Observers must
//! not mutate the tree from inside a notification.

pub mod error;
pub mod node;
pub mod patch;
pub mod path;
pub mod snapshot;
pub mod tree;

pub use error::TreeError;
pub use node::{Identity, Node, NodeRef};
pub use patch::{ObserverId, Patch, PatchSubscription};
pub use path::{CHILDREN_KEY, TreePath};
pub use snapshot::NodeSnapshot;
pub use tree::Tree;
