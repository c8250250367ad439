#![forbid(unsafe_code)]

//! List-change events and per-window notification channels.
//!
//! One structural operation produces at most two notifications: a
//! `delete` from the list the item left, then an `add` or `update` from
//! the list it entered. Both are emitted synchronously in that fixed
//! order so observers never see a node present in two lists at once.
//!
//! Each window holds its own [`EventChannel`]; delivery is decoupled from
//! the window type through plain `subscribe`/`publish` calls.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use arbor_tree::NodeRef;

use crate::identity::Identifier;

/// The kind of list change a window reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The item entered this window's list.
    Add,
    /// The item changed (or moved) within this window's list.
    Update,
    /// The item left this window's list.
    Delete,
}

/// A change notification delivered to one window's subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEvent {
    /// What happened.
    pub kind: EventKind,
    /// The affected item's identifier (`delete` events).
    pub id: Option<Identifier>,
    /// The identifier the item now sits before (`add`/`update` events);
    /// `None` means the end of the list or the first child slot.
    pub before_id: Option<Identifier>,
    /// The affected node.
    pub target: NodeRef,
}

/// Identifier of a registered subscriber.
pub type SubscriberId = u64;

type SubscriberVec = Vec<(SubscriberId, Box<dyn Fn(&ListEvent)>)>;

/// A window's notification channel.
///
/// Subscribers are invoked synchronously, in subscription order. A
/// subscriber must not subscribe or unsubscribe from inside a
/// notification; the execution model is single-threaded and
/// non-reentrant.
pub struct EventChannel {
    subscribers: Rc<RefCell<SubscriberVec>>,
    next_id: Cell<SubscriberId>,
}

impl EventChannel {
    /// Create a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
        }
    }

    /// Register a subscriber. It is unregistered when the returned
    /// subscription drops.
    pub fn subscribe(&self, callback: impl Fn(&ListEvent) + 'static) -> EventSubscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, Box::new(callback)));
        EventSubscription {
            subscribers: Rc::downgrade(&self.subscribers),
            id,
        }
    }

    /// Deliver an event to every subscriber.
    pub fn publish(&self, event: &ListEvent) {
        #[cfg(feature = "tracing")]
        tracing::trace!(kind = ?event.kind, subscribers = self.subscriber_count(), "publish");
        for (_, callback) in self.subscribers.borrow().iter() {
            callback(event);
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle for a registered subscriber.
///
/// Dropping the subscription unregisters the subscriber.
#[must_use = "dropping this subscription unregisters the subscriber"]
pub struct EventSubscription {
    subscribers: Weak<RefCell<SubscriberVec>>,
    id: SubscriberId,
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}
