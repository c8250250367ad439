#![forbid(unsafe_code)]

//! Keep a tree of nodes synchronized with flat list projections.
//!
//! Every container node in an [`arbor_tree::Tree`] can be wrapped by one
//! [`ViewWindow`]: a flat, indexable projection of its immediate children
//! for list-rendering UI consumers. Windows compose into a tree mirroring
//! the state tree's shape and share one [`SyncSession`] context holding
//! the identifier index and the window registry.
//!
//! The core job is [`ViewWindow::put`]: translate opaque identifiers to
//! node references, apply a structural move (re-parenting with sibling
//! positioning) while rejecting cycles, and notify exactly the windows
//! whose visible list changed: a `delete` from the list the item left,
//! then an `add` or `update` from the list it entered, in that order.
//!
//! # Example
//!
//! ```
//! use arbor_sync::{PutOptions, SyncSession};
//! use arbor_tree::{Node, Tree};
//!
//! let session = SyncSession::new(Tree::new(
//!     Node::new("root")
//!         .child(Node::new("a").with_identity(1))
//!         .child(Node::new("b").with_identity(2).with_children(Vec::new())),
//! ))
//! .unwrap();
//!
//! let a = session.tree().children(session.tree().root()).unwrap()[0];
//! session.root_window().put(a, PutOptions::end()).unwrap();
//!
//! let fetched = session.root_window().fetch_all();
//! assert_eq!(fetched.total, 2);
//! ```
//!
//! Everything is single-threaded and synchronous; see [`SyncSession`]
//! for the reentrancy contract.

pub mod error;
pub mod events;
pub mod identity;
pub mod moves;
pub mod registry;
pub mod session;
pub mod window;

pub use error::SyncError;
pub use events::{EventChannel, EventKind, EventSubscription, ListEvent, SubscriberId};
pub use identity::{Identifier, IdentityIndex, IdentityRequest};
pub use moves::{MovePosition, PutOptions};
pub use registry::WindowRegistry;
pub use session::SyncSession;
pub use window::{FetchResult, ViewWindow};
