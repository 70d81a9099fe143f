// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared, observable sets of tree indices.

use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ops::RangeBounds;

use thicket_index_set::IndexSet;

use crate::listeners::{Listeners, SubscriptionId};

/// A shared set of tree indices that notifies subscribers when it changes.
///
/// `NodeCollection` is a handle: cloning it is cheap and every clone refers
/// to the same underlying set. Identity (not contents) is what a
/// [`NodeAppearanceProvider`](crate::NodeAppearanceProvider) uses to tell
/// collections apart; see [`NodeCollection::ptr_eq`].
///
/// Membership is only ever replaced wholesale through
/// [`update_set`](Self::update_set), which bumps the revision and then calls
/// every listener with the new revision before returning.
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use thicket_styling::{IndexSet, NodeCollection};
///
/// let collection = NodeCollection::from_range(0..3);
/// let seen = Rc::new(Cell::new(0));
///
/// let sink = Rc::clone(&seen);
/// collection.subscribe(move |revision| sink.set(revision));
///
/// collection.update_set(IndexSet::from_indices(&[7]));
/// assert_eq!(seen.get(), 1);
/// assert!(collection.contains(7));
/// assert!(!collection.contains(0));
/// ```
#[derive(Clone)]
pub struct NodeCollection {
    inner: Rc<CollectionInner>,
}

struct CollectionInner {
    set: RefCell<IndexSet>,
    revision: Cell<u64>,
    listeners: Listeners<u64>,
}

impl NodeCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::from_set(IndexSet::new())
    }

    /// Creates a collection holding `set`.
    #[must_use]
    pub fn from_set(set: IndexSet) -> Self {
        Self {
            inner: Rc::new(CollectionInner {
                set: RefCell::new(set),
                revision: Cell::new(0),
                listeners: Listeners::new(),
            }),
        }
    }

    /// Creates a collection holding every index in `range`.
    #[must_use]
    pub fn from_range(range: impl RangeBounds<u32>) -> Self {
        Self::from_set(IndexSet::from_range(range))
    }

    /// Replaces the membership with `set` and notifies every listener.
    ///
    /// The replacement is complete before the first listener runs, so
    /// listeners observe the new membership.
    ///
    /// # Panics
    ///
    /// Panics if called from inside [`with_index_set`](Self::with_index_set)
    /// on the same collection.
    pub fn update_set(&self, set: IndexSet) {
        *self.inner.set.borrow_mut() = set;
        let revision = self.inner.revision.get().wrapping_add(1);
        self.inner.revision.set(revision);
        self.inner.listeners.notify(revision);
    }

    /// Removes every index and notifies every listener.
    pub fn clear(&self) {
        self.update_set(IndexSet::new());
    }

    /// Calls `f` with a borrow of the current membership.
    pub fn with_index_set<R>(&self, f: impl FnOnce(&IndexSet) -> R) -> R {
        f(&self.inner.set.borrow())
    }

    /// Returns a copy of the current membership.
    #[must_use]
    pub fn index_set(&self) -> IndexSet {
        self.inner.set.borrow().clone()
    }

    /// Returns `true` if `index` is currently a member.
    #[must_use]
    pub fn contains(&self, index: u32) -> bool {
        self.inner.set.borrow().contains(index)
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.set.borrow().len()
    }

    /// Returns `true` if the collection has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.set.borrow().is_empty()
    }

    /// Returns the number of times the membership has been replaced.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.inner.revision.get()
    }

    /// Registers `listener`, called with the new revision after every
    /// membership change.
    pub fn subscribe(&self, listener: impl Fn(u64) + 'static) -> SubscriptionId {
        self.inner.listeners.subscribe(listener)
    }

    /// Removes a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Returns `true` if both handles refer to the same collection.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for NodeCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl From<IndexSet> for NodeCollection {
    fn from(set: IndexSet) -> Self {
        Self::from_set(set)
    }
}

impl fmt::Debug for NodeCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCollection")
            .field("set", &*self.inner.set.borrow())
            .field("revision", &self.inner.revision.get())
            .field("listeners", &self.inner.listeners)
            .finish()
    }
}
