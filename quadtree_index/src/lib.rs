// Copyright 2025 the Quadtree Index Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadtree Index: an adaptive quadtree over 2D rectangles.
//!
//! Quadtree Index is a reusable building block for collision filtering, canvas
//! and diagram editors, and map viewers.
//!
//! - Insert, move, resize, and remove axis-aligned rectangles identified by a
//!   caller-supplied payload.
//! - Query by intersecting rectangle, containing rectangle, or point.
//! - No up-front world extent: the covered region sizes itself to the first
//!   object and doubles outward whenever an out-of-bounds object arrives.
//!
//! Nodes split once they hold more items than their capacity (one by default)
//! and collapse again as removals thin the tree out, so the structure tracks
//! the data's actual distribution rather than a configured grid.
//!
//! Degenerate rectangles (zero width and/or height) are first-class: points
//! and axis-aligned segments can be indexed and queried like anything else.
//!
//! Intersection queries are tolerance-aware: rectangles that merely touch at
//! an edge, or overlap by no more than 1e-7, are reported as non-intersecting.
//! Containment queries are exact and edge-inclusive.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Rect;
//! use quadtree_index::Quadtree;
//!
//! let mut tree: Quadtree<u32> = Quadtree::new();
//! tree.add(1, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
//! tree.add(2, Rect::new(100.0, 100.0, 110.0, 110.0)).unwrap();
//!
//! // The second insert was far outside the covered region; the tree grew.
//! assert!(tree.root_bounds().width() >= 110.0);
//!
//! assert_eq!(tree.intersecting(Rect::new(0.0, 0.0, 10.0, 10.0)), vec![1]);
//! assert_eq!(tree.distance_squared(1, 2), Some(20000.0));
//! ```
//!
//! ## API overview
//!
//! - [`Quadtree`]: the tree itself; all operations live here.
//! - [`NodeId`]: generational handle of a tree node, for structural
//!   inspection via [`Quadtree::walk`] and the node accessors.
//! - [`Item`]: a payload paired with its stored rectangle.
//! - [`Extremes`]: result of [`Quadtree::extremes`].
//! - [`InvalidBounds`]: the only error; returned by [`Quadtree::add`] for
//!   non-finite rectangles.
//!
//! ## Float semantics
//!
//! Coordinates are `f64` via [`kurbo`]. Non-finite rectangles are rejected at
//! the boundary ([`Quadtree::add`] errors, the update operations return
//! `false`), so the tree never stores a NaN.
//!
//! ## no_std
//!
//! This crate is `no_std` (with `alloc`). Enable the `std` feature (default)
//! or the `libm` feature to provide the float math Kurbo needs.

#![no_std]

extern crate alloc;

mod tree;
mod types;
mod util;

pub use tree::Quadtree;
pub use types::{Extremes, InvalidBounds, Item, NodeId};
