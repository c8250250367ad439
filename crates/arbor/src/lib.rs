#![forbid(unsafe_code)]

//! Arbor public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports the backing state tree and the synchronization core, and
//! offers a lightweight prelude for day-to-day usage.

// --- Tree re-exports -------------------------------------------------------

pub use arbor_tree::{
    CHILDREN_KEY, Identity, Node, NodeRef, NodeSnapshot, Patch, PatchSubscription, Tree,
    TreeError, TreePath,
};

// --- Sync re-exports -------------------------------------------------------

pub use arbor_sync::{
    EventChannel, EventKind, EventSubscription, FetchResult, Identifier, IdentityIndex,
    IdentityRequest, ListEvent, MovePosition, PutOptions, SyncError, SyncSession, ViewWindow,
    WindowRegistry,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    //! Common imports for working with trees and their list projections.
    pub use crate::{
        EventKind, Identifier, IdentityRequest, ListEvent, MovePosition, Node, NodeRef, Patch,
        PutOptions, SyncError, SyncSession, Tree, TreePath, ViewWindow,
    };
}
