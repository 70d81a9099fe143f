// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Styling: node appearance compositing for 3D scene viewers.
//!
//! A loaded model has a fixed number of renderable nodes, addressed by dense
//! tree indices `0..N`. Feature code (selection tools, rule engines, search
//! results) wants to change how some of those nodes look: recolor them, hide
//! them, de-emphasize them, draw them on top of everything else, or outline
//! them. This crate merges all of those requests into one packed buffer the
//! renderer can upload as a texture, plus three disjoint sets of nodes that
//! tell the renderer which pass each node belongs to.
//!
//! ## Core Concepts
//!
//! - [`NodeAppearance`]: a partial style. Every field is optional, and an
//!   absent field inherits whatever was resolved before it.
//! - [`NodeCollection`]: a shared, mutable set of tree indices that notifies
//!   its subscribers whenever its membership is replaced.
//! - [`NodeAppearanceProvider`]: the registry of (collection, appearance)
//!   assignments plus one default appearance. It forwards every relevant
//!   change as a single [`ProviderChange`] notification.
//! - [`NodeAppearanceCompositor`]: on [`build`](NodeAppearanceCompositor::build),
//!   resolves every node, encodes it into a [`Texel`], and sorts it into the
//!   regular, ghosted or in-front [`RenderPartition`]. Builds are skipped
//!   entirely when nothing changed since the last one.
//!
//! ## Resolution
//!
//! For each node the default appearance is applied first, then every
//! assignment whose collection contains the node, in application order.
//! Application order is ascending importance, and registration order among
//! equal importances; with the default importance of `0` this is simply
//! registration order. Each field takes its value from the last applied
//! appearance that sets it.
//!
//! ```rust
//! use thicket_styling::{
//!     IndexSet, NodeAppearance, NodeAppearanceCompositor, NodeAppearanceProvider,
//!     NodeCollection, RenderPartition, Texel,
//! };
//!
//! let provider = NodeAppearanceProvider::new();
//! let mut compositor = NodeAppearanceCompositor::new(4, &provider).unwrap();
//!
//! // Ghost everything, then bring a selection back and draw it in front.
//! compositor.set_default_appearance(NodeAppearance::GHOSTED);
//! let selection = NodeCollection::from_set(IndexSet::from_indices(&[1, 2]));
//! provider.assign_styled_node_collection(
//!     &selection,
//!     NodeAppearance::new()
//!         .with_render_ghosted(false)
//!         .with_render_in_front(true),
//! );
//!
//! assert!(compositor.build());
//! assert_eq!(compositor.texel(0), Some(Texel::new(0, 0, 0, 0b101)));
//! assert_eq!(compositor.partition_of(1), Some(RenderPartition::InFront));
//! assert_eq!(compositor.ghosted_nodes(), &IndexSet::from_indices(&[0, 3]));
//!
//! // Nothing changed: the second build is a no-op.
//! assert!(!compositor.build());
//!
//! // Mutating the collection invalidates the compositor.
//! selection.update_set(IndexSet::from_indices(&[3]));
//! assert!(compositor.needs_update());
//! compositor.build();
//! assert_eq!(compositor.in_front_nodes(), &IndexSet::from_indices(&[3]));
//! ```
//!
//! ## Threading
//!
//! Everything here is single-threaded and synchronous. The shared handles are
//! built on `Rc` and `RefCell`, so they are neither `Send` nor `Sync`; a host
//! that needs cross-thread access should guard the provider and its
//! compositors together behind one lock.
//!
//! ## Logging
//!
//! Rebuild statistics are emitted through the [`log`] facade at `debug`
//! level, and skipped out-of-range indices at `trace` level. No logger is
//! installed by this crate.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. The `std` feature only forwards
//! to dependencies.

#![no_std]

extern crate alloc;

mod appearance;
mod collection;
mod compositor;
mod listeners;
mod provider;
mod texel;

pub use appearance::{NodeAppearance, NodeOutlineColor, Rgb};
pub use collection::NodeCollection;
pub use compositor::{CapacityError, MAX_NODE_COUNT, NodeAppearanceCompositor, RenderPartition};
pub use listeners::SubscriptionId;
pub use provider::{NodeAppearanceProvider, NotAssignedError, ProviderChange, StyledNodeCollection};
pub use texel::{OUTLINE_SHIFT, OutlinePalette, RenderFlags, Texel};

pub use thicket_index_set::IndexSet;
