// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry of styled node collections plus the default appearance.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use log::trace;

use crate::appearance::NodeAppearance;
use crate::collection::NodeCollection;
use crate::listeners::{Listeners, SubscriptionId};

/// What changed in a [`NodeAppearanceProvider`].
///
/// Every variant means resolved appearances may have changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProviderChange {
    /// A collection was assigned, or an assigned collection got a new
    /// appearance or importance.
    Assigned,
    /// A collection was unassigned.
    Unassigned,
    /// The default appearance was replaced.
    DefaultAppearanceChanged,
    /// An assigned collection replaced its membership.
    CollectionChanged,
    /// All assignments were removed at once.
    Cleared,
}

/// Error returned when unassigning a collection that is not assigned.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NotAssignedError;

impl fmt::Display for NotAssignedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("node collection has not been assigned to this provider")
    }
}

impl core::error::Error for NotAssignedError {}

/// One (collection, appearance) assignment held by a provider.
#[derive(Clone, Debug)]
pub struct StyledNodeCollection {
    collection: NodeCollection,
    appearance: NodeAppearance,
    importance: i32,
    registration: u64,
    subscription: SubscriptionId,
}

impl StyledNodeCollection {
    /// The styled collection.
    #[must_use]
    pub fn collection(&self) -> &NodeCollection {
        &self.collection
    }

    /// The appearance applied to the collection's members.
    #[must_use]
    pub fn appearance(&self) -> &NodeAppearance {
        &self.appearance
    }

    /// The ordering key; lower importance is applied first.
    #[must_use]
    pub fn importance(&self) -> i32 {
        self.importance
    }
}

struct ProviderState {
    /// Sorted by `(importance, registration)`.
    assignments: Vec<StyledNodeCollection>,
    default_appearance: NodeAppearance,
    next_registration: u64,
}

struct ProviderInner {
    state: RefCell<ProviderState>,
    listeners: Listeners<ProviderChange>,
}

impl Drop for ProviderInner {
    fn drop(&mut self) {
        for styled in self.state.get_mut().assignments.drain(..) {
            styled.collection.unsubscribe(styled.subscription);
        }
    }
}

/// Registry of styled node collections and the default appearance.
///
/// The provider is a cheap, clonable handle; clones share one registry. It
/// keeps a handle to and a subscription on each assigned [`NodeCollection`],
/// and turns every change that can affect a resolved appearance into exactly
/// one [`ProviderChange`] notification:
///
/// - assigning or re-assigning a collection,
/// - unassigning a collection, or clearing all assignments,
/// - replacing the default appearance,
/// - any assigned collection replacing its membership.
///
/// Assigned collections are held by strong handle: an assignment keeps its
/// collection alive until it is unassigned, the provider is cleared, or the
/// last provider handle is dropped. Collections never point back at the
/// provider strongly (their listener holds a weak reference), so no cycle
/// forms. When the last handle is dropped the provider unsubscribes from
/// every collection it still holds.
///
/// ```rust
/// use thicket_styling::{NodeAppearance, NodeAppearanceProvider, NodeCollection};
///
/// let provider = NodeAppearanceProvider::new();
/// provider.set_default_appearance(NodeAppearance::GHOSTED);
///
/// let visible_nodes = NodeCollection::from_range(10..20);
/// provider.assign_styled_node_collection(
///     &visible_nodes,
///     NodeAppearance::new().with_render_ghosted(false),
/// );
///
/// assert_eq!(provider.appearance_for(5).render_ghosted, Some(true));
/// assert_eq!(provider.appearance_for(15).render_ghosted, Some(false));
///
/// provider.unassign_styled_node_collection(&visible_nodes).unwrap();
/// assert!(provider.is_empty());
/// ```
#[derive(Clone)]
pub struct NodeAppearanceProvider {
    inner: Rc<ProviderInner>,
}

impl NodeAppearanceProvider {
    /// Creates an empty provider whose default appearance has every field
    /// unset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ProviderInner {
                state: RefCell::new(ProviderState {
                    assignments: Vec::new(),
                    default_appearance: NodeAppearance::INHERIT,
                    next_registration: 0,
                }),
                listeners: Listeners::new(),
            }),
        }
    }

    /// Styles `collection` with `appearance` at importance `0`.
    ///
    /// See [`assign_styled_node_collection_with_importance`](Self::assign_styled_node_collection_with_importance).
    pub fn assign_styled_node_collection(
        &self,
        collection: &NodeCollection,
        appearance: NodeAppearance,
    ) {
        self.assign_styled_node_collection_with_importance(collection, appearance, 0);
    }

    /// Styles `collection` with `appearance`.
    ///
    /// Assignments are applied in ascending `importance`, and in
    /// registration order among equal importances, so later and more
    /// important assignments win conflicting fields.
    ///
    /// If `collection` is already assigned its appearance and importance are
    /// replaced; it keeps its registration position and is not subscribed
    /// to twice.
    pub fn assign_styled_node_collection_with_importance(
        &self,
        collection: &NodeCollection,
        appearance: NodeAppearance,
        importance: i32,
    ) {
        {
            let mut state = self.inner.state.borrow_mut();
            if let Some(existing) = state
                .assignments
                .iter_mut()
                .find(|styled| styled.collection.ptr_eq(collection))
            {
                existing.appearance = appearance;
                existing.importance = importance;
                trace!("replaced appearance of an assigned node collection");
            } else {
                let subscription = collection.subscribe(forward_collection_changes(
                    Rc::downgrade(&self.inner),
                ));
                let registration = state.next_registration;
                state.next_registration += 1;
                state.assignments.push(StyledNodeCollection {
                    collection: collection.clone(),
                    appearance,
                    importance,
                    registration,
                    subscription,
                });
                trace!(
                    "assigned node collection with {} members at importance {importance}",
                    collection.len()
                );
            }
            state
                .assignments
                .sort_by_key(|styled| (styled.importance, styled.registration));
        }
        self.inner.listeners.notify(ProviderChange::Assigned);
    }

    /// Removes the styling of `collection`, restoring its members to the
    /// default (or whatever other assignments impose).
    ///
    /// # Errors
    ///
    /// Returns [`NotAssignedError`] if `collection` is not assigned. No
    /// notification is emitted in that case.
    pub fn unassign_styled_node_collection(
        &self,
        collection: &NodeCollection,
    ) -> Result<(), NotAssignedError> {
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            let position = state
                .assignments
                .iter()
                .position(|styled| styled.collection.ptr_eq(collection))
                .ok_or(NotAssignedError)?;
            state.assignments.remove(position)
        };
        removed.collection.unsubscribe(removed.subscription);
        trace!("unassigned node collection");
        self.inner.listeners.notify(ProviderChange::Unassigned);
        Ok(())
    }

    /// Removes every assignment.
    ///
    /// Emits [`ProviderChange::Cleared`] once, unless there was nothing to
    /// remove.
    pub fn clear(&self) {
        let removed = core::mem::take(&mut self.inner.state.borrow_mut().assignments);
        if removed.is_empty() {
            return;
        }
        for styled in &removed {
            styled.collection.unsubscribe(styled.subscription);
        }
        trace!("cleared {} node collection assignments", removed.len());
        self.inner.listeners.notify(ProviderChange::Cleared);
    }

    /// Replaces the default appearance wholesale.
    ///
    /// The previous default is discarded; fields unset in `appearance` fall
    /// back to the renderer's defaults, not to the previous default.
    pub fn set_default_appearance(&self, appearance: NodeAppearance) {
        self.inner.state.borrow_mut().default_appearance = appearance;
        self.inner
            .listeners
            .notify(ProviderChange::DefaultAppearanceChanged);
    }

    /// Returns the default appearance.
    #[must_use]
    pub fn default_appearance(&self) -> NodeAppearance {
        self.inner.state.borrow().default_appearance
    }

    /// Returns a snapshot of all assignments, in application order.
    #[must_use]
    pub fn styled_node_collections(&self) -> Vec<StyledNodeCollection> {
        self.inner.state.borrow().assignments.clone()
    }

    /// Returns the number of assigned collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.borrow().assignments.len()
    }

    /// Returns `true` if no collection is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().assignments.is_empty()
    }

    /// Returns `true` if `collection` is assigned.
    #[must_use]
    pub fn contains(&self, collection: &NodeCollection) -> bool {
        self.inner
            .state
            .borrow()
            .assignments
            .iter()
            .any(|styled| styled.collection.ptr_eq(collection))
    }

    /// Resolves the appearance of a single node.
    ///
    /// This checks every assignment, so it is meant for inspection and
    /// picking. Use a [`NodeAppearanceCompositor`](crate::NodeAppearanceCompositor)
    /// to resolve a whole model.
    #[must_use]
    pub fn appearance_for(&self, index: u32) -> NodeAppearance {
        self.with_state(|default, assignments| {
            assignments
                .iter()
                .filter(|styled| styled.collection.contains(index))
                .fold(*default, |resolved, styled| {
                    resolved.overlaid(&styled.appearance)
                })
        })
    }

    /// Registers `listener`, called after every change.
    pub fn subscribe(&self, listener: impl Fn(ProviderChange) + 'static) -> SubscriptionId {
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

    /// Returns `true` if both handles refer to the same provider.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Calls `f` with the default appearance and the assignments in
    /// application order.
    pub(crate) fn with_state<R>(
        &self,
        f: impl FnOnce(&NodeAppearance, &[StyledNodeCollection]) -> R,
    ) -> R {
        let state = self.inner.state.borrow();
        f(&state.default_appearance, &state.assignments)
    }
}

/// Builds the collection listener that re-emits changes from the provider.
fn forward_collection_changes(provider: Weak<ProviderInner>) -> impl Fn(u64) + 'static {
    move |_revision| {
        if let Some(inner) = provider.upgrade() {
            inner.listeners.notify(ProviderChange::CollectionChanged);
        }
    }
}

impl Default for NodeAppearanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NodeAppearanceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("NodeAppearanceProvider")
            .field("assignments", &state.assignments)
            .field("default_appearance", &state.default_appearance)
            .field("listeners", &self.inner.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexSet;
    use alloc::vec;
    use core::cell::Cell;

    fn record_changes(provider: &NodeAppearanceProvider) -> Rc<RefCell<Vec<ProviderChange>>> {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        provider.subscribe(move |change| sink.borrow_mut().push(change));
        changes
    }

    #[test]
    fn reassignment_replaces_appearance_without_second_subscription() {
        let provider = NodeAppearanceProvider::new();
        let collection = NodeCollection::from_range(0..4);

        provider.assign_styled_node_collection(&collection, NodeAppearance::GHOSTED);
        provider.assign_styled_node_collection(&collection, NodeAppearance::HIDDEN);

        assert_eq!(provider.len(), 1);
        assert_eq!(collection.listener_count(), 1);
        assert_eq!(
            provider.styled_node_collections()[0].appearance(),
            &NodeAppearance::HIDDEN
        );
    }

    #[test]
    fn every_mutation_emits_exactly_one_change() {
        let provider = NodeAppearanceProvider::new();
        let changes = record_changes(&provider);
        let collection = NodeCollection::new();

        provider.assign_styled_node_collection(&collection, NodeAppearance::IN_FRONT);
        collection.update_set(IndexSet::from_indices(&[2]));
        provider.set_default_appearance(NodeAppearance::GHOSTED);
        provider.unassign_styled_node_collection(&collection).unwrap();

        assert_eq!(
            *changes.borrow(),
            vec![
                ProviderChange::Assigned,
                ProviderChange::CollectionChanged,
                ProviderChange::DefaultAppearanceChanged,
                ProviderChange::Unassigned,
            ]
        );
    }

    #[test]
    fn unassigned_collection_no_longer_forwards_changes() {
        let provider = NodeAppearanceProvider::new();
        let collection = NodeCollection::new();
        provider.assign_styled_node_collection(&collection, NodeAppearance::HIDDEN);
        provider.unassign_styled_node_collection(&collection).unwrap();

        let changes = record_changes(&provider);
        collection.update_set(IndexSet::from_indices(&[1]));

        assert!(changes.borrow().is_empty());
        assert_eq!(collection.listener_count(), 0);
    }

    #[test]
    fn unassigning_unknown_collection_is_an_error_and_silent() {
        let provider = NodeAppearanceProvider::new();
        let changes = record_changes(&provider);

        let result = provider.unassign_styled_node_collection(&NodeCollection::new());
        assert_eq!(result, Err(NotAssignedError));
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn clear_unsubscribes_everything_and_notifies_once() {
        let provider = NodeAppearanceProvider::new();
        let a = NodeCollection::new();
        let b = NodeCollection::new();
        provider.assign_styled_node_collection(&a, NodeAppearance::HIDDEN);
        provider.assign_styled_node_collection(&b, NodeAppearance::GHOSTED);

        let changes = record_changes(&provider);
        provider.clear();
        provider.clear();

        assert_eq!(*changes.borrow(), vec![ProviderChange::Cleared]);
        assert!(provider.is_empty());
        assert_eq!(a.listener_count(), 0);
        assert_eq!(b.listener_count(), 0);
    }

    #[test]
    fn importance_orders_application_stably() {
        let provider = NodeAppearanceProvider::new();
        let low = NodeCollection::from_range(0..1);
        let first = NodeCollection::from_range(0..1);
        let second = NodeCollection::from_range(0..1);

        provider.assign_styled_node_collection(&first, NodeAppearance::new().with_color([1, 0, 0]));
        provider.assign_styled_node_collection_with_importance(
            &low,
            NodeAppearance::new().with_color([9, 9, 9]),
            -5,
        );
        provider.assign_styled_node_collection(&second, NodeAppearance::new().with_color([2, 0, 0]));

        let order: Vec<i32> = provider
            .styled_node_collections()
            .iter()
            .map(StyledNodeCollection::importance)
            .collect();
        assert_eq!(order, vec![-5, 0, 0]);
        assert!(provider.styled_node_collections()[1].collection().ptr_eq(&first));
        assert_eq!(provider.appearance_for(0).color, Some([2, 0, 0]));
    }

    #[test]
    fn importance_round_trip_restores_registration_order() {
        let provider = NodeAppearanceProvider::new();
        let earlier = NodeCollection::from_range(0..1);
        let later = NodeCollection::from_range(0..1);
        provider.assign_styled_node_collection(&earlier, NodeAppearance::new().with_color([1, 1, 1]));
        provider.assign_styled_node_collection(&later, NodeAppearance::new().with_color([2, 2, 2]));
        assert_eq!(provider.appearance_for(0).color, Some([2, 2, 2]));

        provider.assign_styled_node_collection_with_importance(
            &earlier,
            NodeAppearance::new().with_color([1, 1, 1]),
            1,
        );
        assert_eq!(provider.appearance_for(0).color, Some([1, 1, 1]));

        provider.assign_styled_node_collection_with_importance(
            &earlier,
            NodeAppearance::new().with_color([1, 1, 1]),
            0,
        );
        assert_eq!(provider.appearance_for(0).color, Some([2, 2, 2]));
        assert!(provider.styled_node_collections()[0].collection().ptr_eq(&earlier));
    }

    #[test]
    fn appearance_for_layers_default_then_assignments() {
        let provider = NodeAppearanceProvider::new();
        provider.set_default_appearance(
            NodeAppearance::new()
                .with_color([1, 2, 3])
                .with_render_ghosted(true),
        );
        let collection = NodeCollection::from_range(0..1);
        provider.assign_styled_node_collection(
            &collection,
            NodeAppearance::new().with_render_ghosted(false),
        );

        let resolved = provider.appearance_for(0);
        assert_eq!(resolved.color, Some([1, 2, 3]));
        assert_eq!(resolved.render_ghosted, Some(false));
        assert_eq!(provider.appearance_for(1).render_ghosted, Some(true));
    }

    #[test]
    fn dropping_provider_releases_collection_subscriptions() {
        let collection = NodeCollection::new();
        {
            let provider = NodeAppearanceProvider::new();
            provider.assign_styled_node_collection(&collection, NodeAppearance::HIDDEN);
            assert_eq!(collection.listener_count(), 1);
        }
        assert_eq!(collection.listener_count(), 0);

        // A stale forwarder would have nothing to upgrade; make sure the
        // collection is still usable.
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        collection.subscribe(move |_| sink.set(sink.get() + 1));
        collection.clear();
        assert_eq!(hits.get(), 1);
    }
}
