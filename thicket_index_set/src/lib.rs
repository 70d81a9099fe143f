// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Index Set: sets of dense tree indices.
//!
//! A loaded 3D model numbers its renderable nodes `0..N` ("tree indices").
//! Feature code groups those indices into sets for highlighting, hiding,
//! color coding and so on. [`IndexSet`] is the storage primitive for such
//! groupings:
//!
//! - Membership tests are O(1) amortized.
//! - Mutation cost is proportional to the number of indices touched, never
//!   to the size of the model.
//! - Two sets are equal when they contain the same indices, regardless of
//!   the order they were inserted in.
//!
//! Subtrees of a model occupy contiguous index ranges, so the set also
//! accepts ranges directly and can report its contents as sorted, coalesced
//! ranges.
//!
//! ## Minimal example
//!
//! ```rust
//! use thicket_index_set::IndexSet;
//!
//! // A subtree rooted at index 10 with 5 nodes.
//! let mut set = IndexSet::new();
//! set.insert_range(10..15);
//! set.insert(42);
//!
//! assert!(set.contains(12));
//! assert!(!set.contains(15));
//! assert_eq!(set.len(), 6);
//! assert_eq!(set.ranges(), vec![10..=14, 42..=42]);
//!
//! // Equality ignores insertion order.
//! let other: IndexSet = [42, 14, 13, 12, 11, 10].into_iter().collect();
//! assert_eq!(set, other);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use core::ops::{Bound, RangeBounds, RangeInclusive};

use hashbrown::HashSet;

/// A set of tree indices.
///
/// Internally a hash set of `u32`. Iteration through [`IndexSet::iter`] is in
/// unspecified order; use [`IndexSet::to_sorted_vec`] or
/// [`IndexSet::ranges`] when order matters.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct IndexSet {
    indices: HashSet<u32>,
}

impl IndexSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with room for at least `capacity` indices.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: HashSet::with_capacity(capacity),
        }
    }

    /// Creates a set from a list of indices. Duplicates are collapsed.
    #[must_use]
    pub fn from_indices(indices: &[u32]) -> Self {
        indices.iter().copied().collect()
    }

    /// Creates a set containing every index in `range`.
    #[must_use]
    pub fn from_range(range: impl RangeBounds<u32>) -> Self {
        let mut set = Self::new();
        set.insert_range(range);
        set
    }

    /// Returns the number of indices in the set.
    #[must_use]
    #[doc(alias = "count")]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the set contains no indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns `true` if `index` is in the set.
    #[must_use]
    #[inline]
    #[doc(alias = "has")]
    pub fn contains(&self, index: u32) -> bool {
        self.indices.contains(&index)
    }

    /// Adds `index` to the set.
    ///
    /// Returns `true` if the index was not already present.
    #[doc(alias = "add")]
    pub fn insert(&mut self, index: u32) -> bool {
        self.indices.insert(index)
    }

    /// Removes `index` from the set.
    ///
    /// Returns `true` if the index was present.
    pub fn remove(&mut self, index: u32) -> bool {
        self.indices.remove(&index)
    }

    /// Adds every index in `range` to the set.
    ///
    /// Empty and inverted ranges are ignored.
    #[doc(alias = "add_range")]
    pub fn insert_range(&mut self, range: impl RangeBounds<u32>) {
        let Some((start, end)) = inclusive_bounds(&range) else {
            return;
        };
        self.indices.reserve(span(start, end));
        self.indices.extend(start..=end);
    }

    /// Removes every index in `range` from the set.
    ///
    /// Walks whichever is smaller: the range or the set.
    pub fn remove_range(&mut self, range: impl RangeBounds<u32>) {
        let Some((start, end)) = inclusive_bounds(&range) else {
            return;
        };
        if span(start, end) >= self.indices.len() {
            self.indices.retain(|index| !(start..=end).contains(index));
        } else {
            for index in start..=end {
                self.indices.remove(&index);
            }
        }
    }

    /// Removes all indices.
    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Returns an iterator over the indices in unspecified order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.indices.iter(),
        }
    }

    /// Returns the indices in ascending order.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<u32> {
        let mut sorted: Vec<u32> = self.indices.iter().copied().collect();
        sorted.sort_unstable();
        sorted
    }

    /// Returns the contents as ascending, non-overlapping, non-adjacent
    /// inclusive ranges.
    #[must_use]
    pub fn ranges(&self) -> Vec<RangeInclusive<u32>> {
        let mut ranges: Vec<RangeInclusive<u32>> = Vec::new();
        for index in self.to_sorted_vec() {
            match ranges.last_mut() {
                Some(last) if last.end().checked_add(1) == Some(index) => {
                    *last = *last.start()..=index;
                }
                _ => ranges.push(index..=index),
            }
        }
        ranges
    }

    /// Returns the gaps between the ranges of [`ranges`](Self::ranges), as
    /// ascending inclusive ranges.
    ///
    /// Only gaps between members are reported; nothing below the smallest or
    /// above the largest member is included.
    #[must_use]
    pub fn inverted_ranges(&self) -> Vec<RangeInclusive<u32>> {
        self.ranges()
            .windows(2)
            .map(|pair| pair[0].end() + 1..=pair[1].start() - 1)
            .collect()
    }

    /// Adds every index of `other` to this set.
    pub fn union_with(&mut self, other: &Self) -> &mut Self {
        self.indices.extend(other.indices.iter().copied());
        self
    }

    /// Removes every index of `other` from this set.
    pub fn difference_with(&mut self, other: &Self) -> &mut Self {
        if other.len() >= self.len() {
            self.indices.retain(|index| !other.indices.contains(index));
        } else {
            for index in &other.indices {
                self.indices.remove(index);
            }
        }
        self
    }

    /// Keeps only the indices that are also in `other`.
    pub fn intersect_with(&mut self, other: &Self) -> &mut Self {
        self.indices.retain(|index| other.indices.contains(index));
        self
    }

    /// Returns `true` if the two sets share at least one index.
    #[must_use]
    pub fn has_intersection_with(&self, other: &Self) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.indices.iter().any(|index| large.indices.contains(index))
    }
}

/// Converts arbitrary bounds to a non-empty inclusive `(start, end)` pair.
fn inclusive_bounds(range: &impl RangeBounds<u32>) -> Option<(u32, u32)> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.checked_add(1)?,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end,
        Bound::Excluded(&end) => end.checked_sub(1)?,
        Bound::Unbounded => u32::MAX,
    };
    (start <= end).then_some((start, end))
}

/// Number of indices in `start..=end`, saturating on 32-bit targets.
fn span(start: u32, end: u32) -> usize {
    usize::try_from(u64::from(end - start) + 1).unwrap_or(usize::MAX)
}

impl fmt::Debug for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ranges()).finish()
    }
}

impl FromIterator<u32> for IndexSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}

impl Extend<u32> for IndexSet {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        self.indices.extend(iter);
    }
}

impl<'a> IntoIterator for &'a IndexSet {
    type Item = u32;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the indices of an [`IndexSet`], in unspecified order.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    inner: hashbrown::hash_set::Iter<'a, u32>,
}

impl Iterator for Iter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}
