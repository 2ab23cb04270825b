// Copyright 2025 the Quadtree Index Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the quadtree: node identifiers, stored items, and errors.

use kurbo::Rect;

/// Identifier for a node in the tree (generational).
///
/// Handles go stale when their node is collapsed away during restructuring or
/// when the tree is cleared; stale handles are never resurrected.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Sticky markers recording that a degenerate rectangle (zero width or
    /// zero height) has been inserted at some point in the tree's lifetime.
    /// Once set, a flag is never cleared.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub(crate) struct DegenerateFlags: u8 {
        /// A zero-width rectangle (vertical segment or point) was inserted.
        const ZERO_WIDTH  = 0b0000_0001;
        /// A zero-height rectangle (horizontal segment or point) was inserted.
        const ZERO_HEIGHT = 0b0000_0010;
    }
}

/// A payload paired with the rectangle it was inserted under.
///
/// This is the unit actually stored inside tree nodes. The bounds recorded
/// here are the exact bounds passed to [`Quadtree::add`](crate::Quadtree::add)
/// (after normalization) and only change through remove-and-reinsert.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Item<P> {
    /// The caller's value.
    pub payload: P,
    /// The rectangle the payload occupies.
    pub bounds: Rect,
}

/// The four stored payloads with extreme bounds centers, each independently.
///
/// Fields are `None` when the tree is empty. Ties on exactly equal center
/// coordinates resolve to whichever item the traversal finds first; the
/// traversal order is not part of the API contract.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Extremes<P> {
    /// Payload whose bounds center has the smallest x.
    pub min_x: Option<P>,
    /// Payload whose bounds center has the largest x.
    pub max_x: Option<P>,
    /// Payload whose bounds center has the smallest y.
    pub min_y: Option<P>,
    /// Payload whose bounds center has the largest y.
    pub max_y: Option<P>,
}

/// Error returned by [`Quadtree::add`](crate::Quadtree::add) when the supplied
/// rectangle contains a NaN or infinite coordinate.
///
/// No other operation produces this error; absence of a payload is always
/// reported through `bool`/`Option` return values instead.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InvalidBounds(pub Rect);

impl core::fmt::Display for InvalidBounds {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "bounds contain non-finite coordinates: {:?}", self.0)
    }
}

impl core::error::Error for InvalidBounds {}
