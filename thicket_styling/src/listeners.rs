// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synchronous listener lists.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

/// Handle returned by `subscribe`, used to unsubscribe later.
///
/// Identifiers are unique per listener list, not globally.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener<E> = Rc<dyn Fn(E)>;

/// An ordered list of callbacks invoked synchronously on [`Listeners::notify`].
///
/// Listeners are snapshotted before dispatch, so a listener may subscribe,
/// unsubscribe or read the owner of the list while it runs.
pub(crate) struct Listeners<E> {
    entries: RefCell<Vec<(SubscriptionId, Listener<E>)>>,
    next_id: Cell<u64>,
}

impl<E: Copy> Listeners<E> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub(crate) fn subscribe(&self, listener: impl Fn(E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.entries.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns `true` if a listener was removed.
    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub(crate) fn notify(&self, event: E) {
        let snapshot: Vec<Listener<E>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.borrow().len())
            .field("next_id", &self.next_id.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_reaches_every_listener_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let listeners = Listeners::<u32>::new();

        let first = Rc::clone(&log);
        listeners.subscribe(move |event| first.borrow_mut().push((1, event)));
        let second = Rc::clone(&log);
        listeners.subscribe(move |event| second.borrow_mut().push((2, event)));

        listeners.notify(7);
        assert_eq!(*log.borrow(), [(1, 7), (2, 7)]);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let hits = Rc::new(Cell::new(0));
        let listeners = Listeners::<()>::new();

        let a = Rc::clone(&hits);
        let id = listeners.subscribe(move |()| a.set(a.get() + 1));
        let b = Rc::clone(&hits);
        listeners.subscribe(move |()| b.set(b.get() + 10));
        assert_eq!(listeners.len(), 2);

        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.notify(());
        assert_eq!(hits.get(), 10);
    }

    #[test]
    fn listener_may_unsubscribe_itself_during_notify() {
        let listeners = Rc::new(Listeners::<()>::new());
        let hits = Rc::new(Cell::new(0));

        let own_id = Rc::new(Cell::new(None));
        let list = Rc::clone(&listeners);
        let counter = Rc::clone(&hits);
        let id_slot = Rc::clone(&own_id);
        let id = listeners.subscribe(move |()| {
            counter.set(counter.get() + 1);
            if let Some(id) = id_slot.get() {
                list.unsubscribe(id);
            }
        });
        own_id.set(Some(id));

        listeners.notify(());
        listeners.notify(());
        assert_eq!(hits.get(), 1);
        assert_eq!(listeners.len(), 0);
    }
}
