// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolving a provider's assignments into per-node texels and render
//! partitions.

use alloc::rc::{Rc, Weak};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use log::{debug, trace};
use thicket_index_set::IndexSet;

use crate::appearance::NodeAppearance;
use crate::listeners::SubscriptionId;
use crate::provider::{NodeAppearanceProvider, ProviderChange};
use crate::texel::Texel;

/// Largest node count a [`NodeAppearanceCompositor`] accepts.
///
/// Tree indices are `u32`, so every node must be addressable by one.
pub const MAX_NODE_COUNT: usize = u32::MAX as usize;

/// Error returned when a compositor is created for more nodes than tree
/// indices can address.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct CapacityError {
    /// The node count that was asked for.
    pub requested: usize,
}

impl fmt::Debug for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapacityError {{ requested: {} }}", self.requested)
    }
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node count {} exceeds the maximum of {MAX_NODE_COUNT}",
            self.requested
        )
    }
}

impl core::error::Error for CapacityError {}

/// The render pass a node is drawn in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RenderPartition {
    /// Drawn normally.
    Regular,
    /// Drawn de-emphasized.
    Ghosted,
    /// Drawn on top of other geometry. Takes priority over ghosted.
    InFront,
}

impl RenderPartition {
    /// Returns the partition a texel belongs to.
    #[must_use]
    pub const fn of(texel: Texel) -> Self {
        if texel.renders_in_front() {
            Self::InFront
        } else if texel.renders_ghosted() {
            Self::Ghosted
        } else {
            Self::Regular
        }
    }
}

/// Resolves the assignments of a [`NodeAppearanceProvider`] for a fixed
/// number of nodes.
///
/// The compositor subscribes to its provider and only marks itself dirty when
/// notified; the actual work happens in [`build`](Self::build). All
/// accessors reflect the last successful build. Before the first build every
/// node holds [`Texel::UNSTYLED`] and is regular.
///
/// Resolution starts every texel at the encoded default appearance and then
/// applies each assignment, in application order, to its member indices
/// only. A build costs `O(N + Σ|collection|)`.
pub struct NodeAppearanceCompositor {
    provider: NodeAppearanceProvider,
    subscription: SubscriptionId,
    needs_update: Rc<Cell<bool>>,
    texels: Vec<Texel>,
    regular: IndexSet,
    ghosted: IndexSet,
    in_front: IndexSet,
    generation: u64,
}

impl NodeAppearanceCompositor {
    /// Creates a compositor for nodes `0..node_count` styled by `provider`.
    ///
    /// The compositor starts dirty, so the first [`build`](Self::build)
    /// always resolves.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if `node_count` exceeds [`MAX_NODE_COUNT`].
    pub fn new(
        node_count: usize,
        provider: &NodeAppearanceProvider,
    ) -> Result<Self, CapacityError> {
        let index_end = u32::try_from(node_count).map_err(|_| CapacityError {
            requested: node_count,
        })?;

        let needs_update = Rc::new(Cell::new(true));
        let subscription = provider.subscribe(mark_dirty(Rc::downgrade(&needs_update)));

        Ok(Self {
            provider: provider.clone(),
            subscription,
            needs_update,
            texels: vec![Texel::UNSTYLED; node_count],
            regular: IndexSet::from_range(0..index_end),
            ghosted: IndexSet::new(),
            in_front: IndexSet::new(),
            generation: 0,
        })
    }

    /// Re-resolves every node if anything changed since the last build.
    ///
    /// Returns `true` if a rebuild happened. When nothing changed this is a
    /// flag check: no texel is touched and the generation stays put.
    pub fn build(&mut self) -> bool {
        if !self.needs_update.get() {
            return false;
        }

        let node_count = self.texels.len();
        let mut skipped = 0_usize;
        let (texels, assignment_count) = self.provider.with_state(|default, assignments| {
            let mut texels = vec![Texel::encode(default); node_count];
            for styled in assignments {
                let appearance = styled.appearance();
                let out_of_range = styled.collection().with_index_set(|set| {
                    apply_to_members(&mut texels, set, appearance)
                });
                if out_of_range > 0 {
                    trace!(
                        "skipped {out_of_range} out-of-range indices of a collection with {} members",
                        styled.collection().len()
                    );
                }
                skipped += out_of_range;
            }
            (texels, assignments.len())
        });

        let mut regular = IndexSet::new();
        let mut ghosted = IndexSet::new();
        let mut in_front = IndexSet::new();
        for (index, texel) in (0_u32..).zip(&texels) {
            match RenderPartition::of(*texel) {
                RenderPartition::Regular => regular.insert(index),
                RenderPartition::Ghosted => ghosted.insert(index),
                RenderPartition::InFront => in_front.insert(index),
            };
        }

        self.texels = texels;
        self.regular = regular;
        self.ghosted = ghosted;
        self.in_front = in_front;
        self.needs_update.set(false);
        self.generation += 1;

        debug!(
            "rebuilt {node_count} nodes from {assignment_count} assignments: \
             {} regular, {} ghosted, {} in front, {skipped} out-of-range indices skipped",
            self.regular.len(),
            self.ghosted.len(),
            self.in_front.len(),
        );
        true
    }

    /// Replaces the provider's default appearance.
    ///
    /// Every compositor sharing the provider is marked dirty, this one
    /// included.
    pub fn set_default_appearance(&mut self, appearance: NodeAppearance) {
        self.provider.set_default_appearance(appearance);
        self.needs_update.set(true);
    }

    /// Returns `true` if the next [`build`](Self::build) will re-resolve.
    #[must_use]
    pub fn needs_update(&self) -> bool {
        self.needs_update.get()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.texels.len()
    }

    /// Returns the number of builds that actually re-resolved.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the provider this compositor resolves.
    #[must_use]
    pub fn provider(&self) -> &NodeAppearanceProvider {
        &self.provider
    }

    /// Returns the texels, indexed by tree index.
    #[must_use]
    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    /// Returns the texel of one node, or `None` if `index` is out of range.
    #[must_use]
    pub fn texel(&self, index: u32) -> Option<Texel> {
        self.texels.get(index as usize).copied()
    }

    /// Returns the texels as `4 * node_count` bytes, ready for upload into
    /// an RGBA8 texture.
    #[must_use]
    pub fn texel_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Returns the nodes drawn normally.
    #[must_use]
    pub fn regular_nodes(&self) -> &IndexSet {
        &self.regular
    }

    /// Returns the nodes drawn de-emphasized.
    #[must_use]
    pub fn ghosted_nodes(&self) -> &IndexSet {
        &self.ghosted
    }

    /// Returns the nodes drawn on top of other geometry.
    #[must_use]
    pub fn in_front_nodes(&self) -> &IndexSet {
        &self.in_front
    }

    /// Returns the partition of one node, or `None` if `index` is out of
    /// range.
    #[must_use]
    pub fn partition_of(&self, index: u32) -> Option<RenderPartition> {
        self.texel(index).map(RenderPartition::of)
    }
}

impl Drop for NodeAppearanceCompositor {
    fn drop(&mut self) {
        self.provider.unsubscribe(self.subscription);
    }
}

impl fmt::Debug for NodeAppearanceCompositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeAppearanceCompositor")
            .field("node_count", &self.texels.len())
            .field("needs_update", &self.needs_update.get())
            .field("generation", &self.generation)
            .field("regular", &self.regular.len())
            .field("ghosted", &self.ghosted.len())
            .field("in_front", &self.in_front.len())
            .finish_non_exhaustive()
    }
}

/// Applies `appearance` to every member of `set` below `texels.len()`.
///
/// Returns the number of members that were out of range.
fn apply_to_members(texels: &mut [Texel], set: &IndexSet, appearance: &NodeAppearance) -> usize {
    let mut out_of_range = 0;
    for index in set {
        match texels.get_mut(index as usize) {
            Some(texel) => texel.apply(appearance),
            None => out_of_range += 1,
        }
    }
    out_of_range
}

fn mark_dirty(needs_update: Weak<Cell<bool>>) -> impl Fn(ProviderChange) + 'static {
    move |_change| {
        if let Some(flag) = needs_update.upgrade() {
            flag.set(true);
        }
    }
}
